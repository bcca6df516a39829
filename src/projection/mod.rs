// Projection of buffered series into screen space
// Pure functions of (series, optional overlay, viewport). Nothing here mutates engine state.

pub mod scatter;
pub mod polar;

use serde::Serialize;

use crate::constants::OMIT_POINTS;
use crate::net::messages::ViewportQuery;
use crate::parse::{SoundingField, WeatherSample};
use crate::series::Sample;

// Re-export main types
pub use scatter::{project_scatter, ScatterGeometry, ScatterPlot, TickLabel, YScale};
pub use polar::{project_polar, PolarGeometry, PolarPlot, Ring};

/// Plot area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

impl From<ViewportQuery> for Viewport {
    fn from(q: ViewportQuery) -> Self {
        Viewport::new(q.width, q.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Positioned text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    /// Baseline nudge (px)
    pub dy: f64,
    pub text: String,
}

/// Which coordinate of a sample a plot axis reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Time,
    Value,
    Altitude,
}

impl Field {
    pub fn of(self, sample: &Sample) -> Option<f64> {
        match self {
            Field::Time => Some(sample.time),
            Field::Value => Some(sample.value),
            Field::Altitude => sample.altitude,
        }
    }
}

/// Result of one projection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Placeholder when there is nothing to draw
    NoData { message: String },
    Scatter(ScatterGeometry),
    Polar(PolarGeometry),
}

impl Projection {
    pub(crate) fn no_data(title: &str) -> Self {
        Projection::NoData {
            message: format!("No data available for {}", title),
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Projection::NoData { .. })
    }
}

/// True when neither the primary series nor an enabled overlay has anything to draw.
pub(crate) fn nothing_to_draw(primary: &[Sample], overlay: Option<&[Sample]>) -> bool {
    primary.is_empty() && overlay.map_or(true, <[Sample]>::is_empty)
}

/// Every OMIT_POINTS-th sample, starting with the first.
pub fn decimate(samples: &[Sample]) -> impl Iterator<Item = &Sample> {
    samples.iter().step_by(OMIT_POINTS)
}

/// Sounding levels as overlay samples of one field against altitude.
///
/// Levels whose field is missing or kept as raw text are left out.
pub fn overlay_samples(sounding: &[WeatherSample], field: SoundingField) -> Vec<Sample> {
    sounding
        .iter()
        .filter_map(|level| {
            level.numeric(field).map(|value| Sample {
                time: 0.0,
                value,
                altitude: Some(level.altitude),
            })
        })
        .collect()
}
