// Flight Display - Main Entry Point
// Licensed under AGPL v3

use flight_display::config::Config;
use flight_display::net::{Endpoints, HttpSource, SnapshotServer};
use flight_display::session::{Command, SessionHandle, SessionOptions};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use clap::Parser;
use tracing::{info, error, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    info!("Starting flight display");
    info!("Log: {}", config.log_url);
    info!("Weather: {}", config.weather_url);
    info!("Live: {}", config.live_url);

    let source = HttpSource::new(Endpoints::from(&config))?;
    let session = SessionHandle::spawn(
        source,
        SessionOptions {
            start_in_replay: config.replay,
            weather_overlay: config.weather,
            status_interval: config.status_period(),
        },
    );

    // Optional: HTTP endpoint for a render client
    let mut server = match config.http_addr() {
        Some(Ok(addr)) => match SnapshotServer::start(addr, session.engine()).await {
            Ok(server) => Some(server),
            Err(e) => {
                error!("HTTP server failed to bind to {}: {}", addr, e);
                None
            }
        },
        Some(Err(e)) => {
            error!("Invalid --http-listen address: {}", e);
            None
        }
        None => None,
    };

    info!("Ready. Commands: mode, pause, resume, weather, reload, status, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
                    Err(err) => {
                        error!("Unable to listen for shutdown signal: {}", err);
                        return Err(err.into());
                    }
                }
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if !handle_line(&session, line.trim()).await {
                        break;
                    }
                }
                // Detached stdin: keep running until Ctrl+C
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    // Graceful shutdown
    info!("Shutting down...");
    if let Some(server) = server.as_mut() {
        server.shutdown().await;
    }
    session.shutdown().await;
    info!("Stopped");

    Ok(())
}

/// Run one console command. Returns false on quit.
async fn handle_line(session: &SessionHandle, line: &str) -> bool {
    match line {
        "" => {}
        "quit" | "exit" => return false,
        "status" => {
            let snap = session.snapshot().await;
            let latest = &snap.latest;
            info!(
                "{:?} | alt {:.2} m | vspd {:.2} m/s | acc {:.3} m/s² | dir {:.2}° | spd {:.2} kt | temp {:.2} °C | hum {:.2} | {}",
                snap.mode,
                latest.altitude,
                latest.vertical_speed,
                latest.acceleration,
                latest.direction,
                latest.speed,
                latest.temperature,
                latest.humidity,
                latest.timestamp,
            );
            info!(
                "Log records: {}, replay position: {:?}, weather overlay: {} ({} levels), band [{:.2}, {:.2}]",
                snap.log_records,
                snap.replay_position,
                snap.weather_overlay,
                snap.sounding.len(),
                snap.altitude_min,
                snap.altitude_max,
            );
            if let Some(e) = &snap.error {
                warn!("{}", e);
            }
        }
        "weather" => {
            let enabled = session.engine().read().await.weather_overlay();
            session.set_weather(!enabled).await;
        }
        other => match other.parse::<Command>() {
            Ok(cmd) => {
                session.send(cmd).await;
            }
            Err(e) => warn!("{}", e),
        },
    }
    true
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_span_events(if verbose {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    if verbose {
        subscriber
            .with_max_level(tracing::Level::DEBUG)
            .init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber
            .with_max_level(tracing::Level::INFO)
            .init();
    }
}
