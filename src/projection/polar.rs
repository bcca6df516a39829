// Polar projection: direction (angle) vs altitude (radius)
//
// theta = (direction - 90) * pi / 180, so with screen y pointing down 0° lands above
// the centre and 90° to its right.

use std::f64::consts::PI;

use serde::Serialize;

use crate::constants::{ALT_MAX, ALT_MIN, POLAR_MARGIN};
use crate::series::Sample;
use super::{decimate, nothing_to_draw, Label, Point, Projection, Viewport};

const RING_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const LABEL_ANGLES: [u32; 4] = [0, 90, 180, 270];

/// One polar plot instance
#[derive(Debug, Clone)]
pub struct PolarPlot {
    pub title: String,
    pub altitude_min: Option<f64>,
    pub altitude_max: Option<f64>,
}

/// Reference ring at a fraction of the altitude range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring {
    pub radius: f64,
    pub altitude: f64,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarGeometry {
    pub title: String,
    pub center: Point,
    pub radius: f64,
    pub altitude_range: [f64; 2],
    pub rings: Vec<Ring>,
    pub angle_labels: Vec<Label>,
    pub points: Vec<Point>,
    pub overlay: Vec<Point>,
}

/// Project direction samples (value = direction, altitude attached) onto `viewport`.
pub fn project_polar(
    plot: &PolarPlot,
    primary: &[Sample],
    overlay: Option<&[Sample]>,
    viewport: Viewport,
) -> Projection {
    if nothing_to_draw(primary, overlay) {
        return Projection::no_data(&plot.title);
    }
    let overlay = overlay.unwrap_or(&[]);

    let radius = viewport.width.min(viewport.height) / 2.0 - POLAR_MARGIN;
    let (cx, cy) = (viewport.width / 2.0, viewport.height / 2.0);

    let altitudes: Vec<f64> = overlay
        .iter()
        .chain(primary)
        .filter_map(|s| s.altitude)
        .collect();
    let min_alt = plot.altitude_min.unwrap_or_else(|| {
        if altitudes.is_empty() {
            ALT_MIN
        } else {
            altitudes.iter().copied().fold(f64::INFINITY, f64::min)
        }
    });
    let max_alt = plot.altitude_max.unwrap_or_else(|| {
        if altitudes.is_empty() {
            ALT_MAX
        } else {
            altitudes.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
    });
    let span = max_alt - min_alt;
    let range = if span == 0.0 || span.is_nan() { 1.0 } else { span };

    let project = |s: &Sample| -> Option<Point> {
        let theta = (s.value - 90.0) * PI / 180.0;
        let r = (s.altitude? - min_alt) / range * radius;
        Some(Point {
            x: cx + r * theta.cos(),
            y: cy + r * theta.sin(),
        })
    };

    let rings = RING_FRACTIONS
        .iter()
        .map(|&fraction| {
            let r = fraction * radius;
            let altitude = min_alt + fraction * range;
            Ring {
                radius: r,
                altitude,
                label: Label {
                    x: cx + r + 5.0,
                    y: cy,
                    dy: 0.0,
                    text: format!("{:.0} m", altitude),
                },
            }
        })
        .collect();

    let angle_labels = LABEL_ANGLES
        .iter()
        .map(|&angle| {
            let rad = f64::from(angle) * PI / 180.0;
            Label {
                x: cx + radius * rad.cos(),
                y: cy + radius * rad.sin(),
                dy: if angle == 90 || angle == 270 { 3.0 } else { 0.0 },
                text: format!("{}°", (angle + 90) % 360),
            }
        })
        .collect();

    Projection::Polar(PolarGeometry {
        title: plot.title.clone(),
        center: Point { x: cx, y: cy },
        radius,
        altitude_range: [min_alt, max_alt],
        rings,
        angle_labels,
        points: decimate(primary).filter_map(project).collect(),
        overlay: overlay.iter().filter_map(project).collect(),
    })
}
