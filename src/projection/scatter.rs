// Cartesian scatter projection
//
// x-range comes from the unfiltered primary series plus the overlay; y-range is a
// fixed default per scale unless the caller pins either bound. A zero-width range
// collapses every point on that axis to the middle and yields a single tick.

use serde::Serialize;

use crate::constants::{
    ALT_MAX, ALT_MIN, LABEL_OVERLAP_THRESHOLD, MAX_ACC, PLOT_LEFT_PADDING, PLOT_PADDING,
    Y_AXIS_TITLE_POSITION,
};
use crate::series::Sample;
use super::{decimate, nothing_to_draw, Field, Line, Point, Projection, Rect, Viewport};

/// Kind of y-axis: sets the default range, the tick format and where the x-axis sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum YScale {
    Altitude,
    Acceleration,
}

impl YScale {
    fn default_range(self) -> (f64, f64) {
        match self {
            YScale::Altitude => (ALT_MIN, ALT_MAX),
            YScale::Acceleration => (-MAX_ACC, MAX_ACC),
        }
    }

    fn format_tick(self, tick: f64) -> String {
        match self {
            YScale::Altitude => format!("{:.0}", tick),
            YScale::Acceleration => format!("{:.3}", tick),
        }
    }
}

/// One scatter plot instance
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    pub x_title: String,
    pub y_title: String,
    pub x: Field,
    pub y: Field,
    pub scale: YScale,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
}

/// A tick on either axis. `text` is None when the label is suppressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickLabel {
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGeometry {
    pub x_title: String,
    pub y_title: String,
    pub frame: Rect,
    pub x_axis: Line,
    pub y_axis: Line,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
    pub x_ticks: Vec<TickLabel>,
    pub y_ticks: Vec<TickLabel>,
    pub points: Vec<Point>,
    pub overlay: Vec<Point>,
}

/// Linear axis mapping with the midpoint fallback for a zero-width range
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    range: f64,
    /// Pixel position of `min`
    start: f64,
    /// Signed pixel length of the axis
    span: f64,
    midpoint: f64,
}

impl Axis {
    fn scale(&self, v: f64) -> f64 {
        if self.range == 0.0 {
            self.midpoint
        } else {
            self.start + (v - self.min) / self.range * self.span
        }
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        if self.range == 0.0 {
            return vec![self.min];
        }
        let steps = (count - 1) as f64;
        (0..count).map(|i| self.min + i as f64 * self.range / steps).collect()
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Round half up, like a display would.
fn round_label(v: f64) -> String {
    format!("{}", (v + 0.5).floor() as i64)
}

/// Project a primary series (and an enabled overlay) onto a `viewport`.
pub fn project_scatter(
    plot: &ScatterPlot,
    primary: &[Sample],
    overlay: Option<&[Sample]>,
    viewport: Viewport,
) -> Projection {
    if nothing_to_draw(primary, overlay) {
        return Projection::no_data(&plot.y_title);
    }
    let overlay = overlay.unwrap_or(&[]);
    let (w, h) = (viewport.width, viewport.height);
    let (p, lp) = (PLOT_PADDING, PLOT_LEFT_PADDING);

    let x_values = primary.iter().chain(overlay).filter_map(|s| plot.x.of(s));
    let (x_min, x_max) = min_max(x_values).unwrap_or((0.0, 1.0));
    let (default_min, default_max) = plot.scale.default_range();
    let y_min = plot.y_min.unwrap_or(default_min);
    let y_max = plot.y_max.unwrap_or(default_max);

    let x_axis = Axis {
        min: x_min,
        range: x_max - x_min,
        start: lp,
        span: w - lp - p,
        midpoint: (w - lp - p) / 2.0 + lp,
    };
    let y_axis = Axis {
        min: y_min,
        range: y_max - y_min,
        start: h - p,
        span: -(h - 2.0 * p),
        midpoint: h / 2.0,
    };

    let x_axis_y = y_axis.scale(match plot.scale {
        YScale::Acceleration => 0.0,
        YScale::Altitude => y_min,
    });
    let y_axis_x = x_axis.scale(x_min);

    let x_ticks = x_axis
        .ticks(3)
        .into_iter()
        .map(|t| TickLabel {
            value: t,
            x: x_axis.scale(t),
            y: x_axis_y + 15.0,
            text: Some(round_label(t)),
        })
        .collect();

    let y_ticks = y_axis
        .ticks(5)
        .into_iter()
        .map(|t| {
            let y = y_axis.scale(t) + 3.0;
            let collides = (y - Y_AXIS_TITLE_POSITION).abs() < LABEL_OVERLAP_THRESHOLD;
            TickLabel {
                value: t,
                x: y_axis_x - 15.0,
                y,
                text: (!collides).then(|| plot.scale.format_tick(t)),
            }
        })
        .collect();

    let project = |s: &Sample| -> Option<Point> {
        Some(Point {
            x: x_axis.scale(plot.x.of(s)?),
            y: y_axis.scale(plot.y.of(s)?),
        })
    };
    let points = if plot.y == Field::Altitude {
        decimate(primary).filter_map(project).collect()
    } else {
        primary.iter().filter_map(project).collect()
    };
    let overlay_points = overlay.iter().filter_map(project).collect();

    Projection::Scatter(ScatterGeometry {
        x_title: plot.x_title.clone(),
        y_title: plot.y_title.clone(),
        frame: Rect {
            x: lp,
            y: p,
            width: w - lp - p,
            height: h - 2.0 * p,
        },
        x_axis: Line { x1: lp, y1: x_axis_y, x2: w - p, y2: x_axis_y },
        y_axis: Line { x1: y_axis_x, y1: p, x2: y_axis_x, y2: h - p },
        x_range: [x_min, x_max],
        y_range: [y_min, y_max],
        x_ticks,
        y_ticks,
        points,
        overlay: overlay_points,
    })
}
