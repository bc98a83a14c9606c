//! VelocityOS demo shell
//!
//! Runs the dashboard core headless against the drive simulator: GPS fixes
//! flow through the navigation session, a live-share relay pushes ticks to an
//! in-memory backend, and the fused speed plus ETA print once a second.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use velocity_core::nav::format_eta;
use velocity_core::prelude::*;
use velocity_core::store::types::LocationCategory;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = RuntimeConfig::load()?;
    info!(version = velocity_core::VERSION, "starting velocity-dash");

    let store = MemoryBackend::new();
    let destination = store.add_location(NewLocation {
        label: "Times Square".to_string(),
        address: "Manhattan, NY".to_string(),
        lat: 40.7580,
        lon: -73.9855,
        category: LocationCategory::Favorite,
    })?;

    let mut session = NavigationSession::new(DirectRouteProvider, store.clone());
    session.set_follow_timeout(config.follow_timeout());
    let mut gps = GpsWatch::spawn(SimulatedGps::new());

    let relay = LiveShareRelay::new(store.clone(), session.subscribe());
    let tracking_id = relay.start_with_interval(config.relay_interval());
    info!(%tracking_id, "live share started");

    // Watch our own share link the way a passenger's browser would.
    let viewer = Arc::new(TrackingViewer::new(store.clone(), tracking_id));
    let (_viewer_vis, viewer_vis_rx) = watch::channel(Visibility::Visible);
    let poll = viewer.spawn_poll(config.poll_interval(), viewer_vis_rx);

    // First fix establishes a position, then the route request can go out.
    if let Some(event) = gps.recv().await {
        session.handle_gps(event).await;
    }
    session.open_destination(Some(destination)).await;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    for _ in 0..30 {
        ticker.tick().await;
        if let Some(event) = gps.recv().await {
            session.handle_gps(event).await;
        }
        session.tick_follow(Instant::now());

        let speed = session.display_speed(config.units);
        match session.active_route() {
            Some(route) => info!(
                speed,
                distance_m = route.distance_meters as u64,
                eta = %format_eta(route.duration_seconds),
                "driving"
            ),
            None => info!(speed, "driving (no route)"),
        }
    }

    info!(status = ?viewer.status(), "tracking viewer");
    poll.shutdown().await;
    relay.stop();
    gps.shutdown();
    info!("demo drive finished");
    Ok(())
}
