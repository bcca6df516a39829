// Dashboard - the display's fixed set of plots, built from one engine snapshot

use serde::Serialize;

use crate::constants::{ALT_MAX, ALT_MIN};
use crate::engine::EngineSnapshot;
use crate::parse::SoundingField;
use crate::projection::{
    overlay_samples, project_polar, project_scatter, Field, PolarPlot, Projection, ScatterPlot,
    Viewport, YScale,
};
use crate::series::Quantity;

/// Projected geometry of every plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub viewport: Viewport,
    pub direction: Projection,
    pub temperature: Projection,
    pub acceleration: Projection,
    pub speed: Projection,
    pub humidity: Projection,
}

fn altitude_scatter(x_title: &str) -> ScatterPlot {
    ScatterPlot {
        x_title: x_title.to_string(),
        y_title: "Altitude (m)".to_string(),
        x: Field::Value,
        y: Field::Altitude,
        scale: YScale::Altitude,
        y_min: Some(ALT_MIN),
        y_max: Some(ALT_MAX),
    }
}

impl Dashboard {
    pub fn build(snapshot: &EngineSnapshot, viewport: Viewport) -> Self {
        let series = &snapshot.series;
        let overlay_of = |field: SoundingField| {
            snapshot
                .weather_overlay
                .then(|| overlay_samples(&snapshot.sounding, field))
        };

        let scatter = |plot: ScatterPlot, quantity: Quantity, field: SoundingField| {
            let overlay = overlay_of(field);
            project_scatter(&plot, series.get(quantity), overlay.as_deref(), viewport)
        };

        let polar = PolarPlot {
            title: "Direction vs Altitude".to_string(),
            altitude_min: Some(ALT_MIN),
            altitude_max: Some(ALT_MAX),
        };
        let direction_overlay = overlay_of(SoundingField::Direction);

        let acceleration = ScatterPlot {
            x_title: "Time (s)".to_string(),
            y_title: "Accel (m/s²)".to_string(),
            x: Field::Time,
            y: Field::Value,
            scale: YScale::Acceleration,
            y_min: None,
            y_max: None,
        };

        Dashboard {
            viewport,
            direction: project_polar(
                &polar,
                series.get(Quantity::Direction),
                direction_overlay.as_deref(),
                viewport,
            ),
            temperature: scatter(
                altitude_scatter("Temperature (°C)"),
                Quantity::Temperature,
                SoundingField::Temperature,
            ),
            acceleration: project_scatter(
                &acceleration,
                series.get(Quantity::Acceleration),
                None,
                viewport,
            ),
            speed: scatter(altitude_scatter("Speed (kt)"), Quantity::Speed, SoundingField::Speed),
            humidity: scatter(
                altitude_scatter("Humidity (%)"),
                Quantity::Humidity,
                SoundingField::Humidity,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SyncEngine;
    use crate::parse::parse_log;
    use crate::store::LogStore;
    use tokio::time::{Duration, Instant};

    fn engine_with_replay() -> SyncEngine {
        let t = Instant::now();
        let mut engine = SyncEngine::new(t);
        let text: Vec<String> = (0..30)
            .map(|i| format!(r#"{{"Runtime":{i},"Baro_Alt_m":{},"meanACC_Kal_m_s2":0.01,"Envelope_Temp_Deg":{},"HDG_deg":{}}}"#, 100 + i * 10, 40 + i, i * 12))
            .collect();
        engine.install_log(parse_log(&text.join("\n")), t);
        engine.toggle_mode(t);
        engine.replay_tick(t + Duration::from_secs(10));
        engine
    }

    #[test]
    fn test_empty_engine_has_no_data_everywhere() {
        let engine = SyncEngine::new(Instant::now());
        let dash = Dashboard::build(&engine.snapshot(), Viewport::new(300.0, 400.0));
        assert!(dash.direction.is_no_data());
        assert!(dash.temperature.is_no_data());
        assert!(dash.acceleration.is_no_data());
        assert!(dash.speed.is_no_data());
        assert!(dash.humidity.is_no_data());
        assert_eq!(
            dash.acceleration,
            Projection::NoData { message: "No data available for Accel (m/s²)".into() }
        );
    }

    #[test]
    fn test_plots_from_replay() {
        let engine = engine_with_replay();
        let dash = Dashboard::build(&engine.snapshot(), Viewport::new(300.0, 400.0));
        match &dash.temperature {
            Projection::Scatter(g) => {
                // 30 samples, every 10th drawn
                assert_eq!(g.points.len(), 3);
                assert_eq!(g.x_range, [40.0, 69.0]);
                assert_eq!(g.y_range, [ALT_MIN, ALT_MAX]);
                assert!(g.overlay.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        match &dash.acceleration {
            Projection::Scatter(g) => assert_eq!(g.points.len(), 30),
            other => panic!("unexpected {:?}", other),
        }
        match &dash.direction {
            Projection::Polar(g) => {
                assert_eq!(g.points.len(), 3);
                assert_eq!(g.altitude_range, [ALT_MIN, ALT_MAX]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_overlay_only_when_enabled() {
        let mut engine = SyncEngine::new(Instant::now());
        let sounding = LogStore::parse_sounding("h(mAMSL) T(°C) Spd(kt) Dir(°)\n100 10 5 0\n800 4 12 270\n").unwrap();
        engine.set_weather_overlay(true);
        engine.install_sounding(sounding);

        let dash = Dashboard::build(&engine.snapshot(), Viewport::new(300.0, 400.0));
        match &dash.speed {
            Projection::Scatter(g) => assert_eq!(g.overlay.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        match &dash.direction {
            Projection::Polar(g) => assert_eq!(g.overlay.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
        // No humidity column in this sounding
        assert!(dash.humidity.is_no_data());
        assert!(dash.acceleration.is_no_data());

        engine.set_weather_overlay(false);
        let dash = Dashboard::build(&engine.snapshot(), Viewport::new(300.0, 400.0));
        assert!(dash.speed.is_no_data());
    }
}
