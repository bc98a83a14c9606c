//! Tests for the navigation session orchestration

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use velocity_core::geo::LatLon;
    use velocity_core::nav::arrival_time;
    use velocity_core::nav::route::{RouteData, RouteProvider};
    use velocity_core::nav::session::{NavigationSession, REROUTE_THRESHOLD_M};
    use velocity_core::position::follow::CameraTarget;
    use velocity_core::position::{GpsEvent, GpsStatus, PositionSample};
    use velocity_core::store::types::LocationCategory;
    use velocity_core::store::{MemoryBackend, SavedLocation};
    use velocity_core::units::SpeedUnit;

    /// Returns a canned route and counts how many requests went out
    #[derive(Clone)]
    struct CountingRouter {
        requests: Arc<AtomicUsize>,
        route: RouteData,
    }

    impl CountingRouter {
        fn new(duration_seconds: f64) -> Self {
            Self {
                requests: Arc::new(AtomicUsize::new(0)),
                route: RouteData {
                    coordinates: vec![
                        LatLon::new(40.7128, -74.0060),
                        LatLon::new(40.7580, -73.9855),
                    ],
                    distance_meters: 5000.0,
                    duration_seconds,
                },
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl RouteProvider for CountingRouter {
        fn fetch_route(
            &self,
            _start: LatLon,
            _end: LatLon,
        ) -> impl Future<Output = Option<RouteData>> + Send {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let route = self.route.clone();
            async move { Some(route) }
        }
    }

    fn destination() -> SavedLocation {
        SavedLocation {
            id: "dest-1".to_string(),
            label: "Times Square".to_string(),
            address: "Manhattan, NY".to_string(),
            lat: 40.7580,
            lon: -73.9855,
            category: LocationCategory::Favorite,
            last_used_at: None,
        }
    }

    fn fix_at(pos: LatLon, ts: u64) -> GpsEvent {
        GpsEvent::Fix(PositionSample {
            pos,
            speed_mps: Some(10.0),
            heading_deg: Some(45.0),
            timestamp_ms: ts,
        })
    }

    #[tokio::test]
    async fn test_open_destination_issues_one_request() {
        let router = CountingRouter::new(300.0);
        let mut session = NavigationSession::new(router.clone(), MemoryBackend::new());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        session.open_destination(Some(destination())).await;

        assert_eq!(router.request_count(), 1);
        assert_eq!(
            session.active_route().unwrap().duration_seconds,
            300.0
        );
        assert_eq!(session.active_destination().unwrap().id, "dest-1");
    }

    #[tokio::test]
    async fn test_no_request_without_position() {
        let router = CountingRouter::new(300.0);
        let mut session = NavigationSession::new(router.clone(), MemoryBackend::new());

        session.open_destination(Some(destination())).await;
        assert_eq!(router.request_count(), 0);
        assert!(session.active_route().is_none());

        // The first fix supplies the missing origin and the request goes out.
        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        assert_eq!(router.request_count(), 1);
        assert!(session.active_route().is_some());
    }

    #[tokio::test]
    async fn test_jitter_does_not_reroute() {
        let router = CountingRouter::new(300.0);
        let mut session = NavigationSession::new(router.clone(), MemoryBackend::new());

        let origin = LatLon::new(40.7128, -74.0060);
        session.handle_gps(fix_at(origin, 0)).await;
        session.open_destination(Some(destination())).await;
        assert_eq!(router.request_count(), 1);

        // ~5 m north, well under the reroute threshold
        session
            .handle_gps(fix_at(LatLon::new(40.71285, -74.0060), 1_000))
            .await;
        assert_eq!(router.request_count(), 1);

        // ~110 m north crosses it
        session
            .handle_gps(fix_at(LatLon::new(40.7138, -74.0060), 2_000))
            .await;
        assert_eq!(router.request_count(), 2);
        assert!(REROUTE_THRESHOLD_M < 110.0);
    }

    #[tokio::test]
    async fn test_close_navigation_clears_route() {
        let router = CountingRouter::new(300.0);
        let mut session = NavigationSession::new(router.clone(), MemoryBackend::new());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        session.open_destination(Some(destination())).await;
        session.close_navigation();

        assert!(session.active_destination().is_none());
        assert!(session.active_route().is_none());

        // Further fixes must not hit the router
        session
            .handle_gps(fix_at(LatLon::new(40.72, -74.0060), 1_000))
            .await;
        assert_eq!(router.request_count(), 1);
    }

    #[tokio::test]
    async fn test_open_destination_records_recent() {
        let store = MemoryBackend::new();
        let mut session = NavigationSession::new(CountingRouter::new(300.0), store.clone());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        session.open_destination(Some(destination())).await;

        let recent = store.recent_locations();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "dest-1");
        assert!(recent[0].last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_opening_map_without_destination() {
        let router = CountingRouter::new(300.0);
        let store = MemoryBackend::new();
        let mut session = NavigationSession::new(router.clone(), store.clone());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        session.open_destination(None).await;

        assert_eq!(router.request_count(), 0);
        assert!(store.recent_locations().is_empty());
        assert!(session.is_following());
    }

    #[tokio::test]
    async fn test_gps_fault_zeroes_speed_and_sets_status() {
        let mut session =
            NavigationSession::new(CountingRouter::new(300.0), MemoryBackend::new());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        assert_eq!(session.snapshot().gps_status, GpsStatus::Granted);

        session
            .handle_gps(GpsEvent::Fault(
                velocity_core::position::GpsError::PermissionDenied,
            ))
            .await;
        let snap = session.snapshot();
        assert_eq!(snap.gps_status, GpsStatus::Denied);
        assert_eq!(snap.speed_mps, 0.0);
        assert_eq!(session.display_speed(SpeedUnit::Mph), 0);
        // last known position is kept for the map
        assert!(snap.pos.is_some());
    }

    #[tokio::test]
    async fn test_follow_resumes_after_inactivity() {
        let mut session =
            NavigationSession::new(CountingRouter::new(300.0), MemoryBackend::new());
        assert!(session.is_following());

        session.on_map_interaction();
        assert!(!session.is_following());

        let later = Instant::now() + Duration::from_secs(16);
        assert!(session.tick_follow(later));
        assert!(session.is_following());
    }

    #[tokio::test]
    async fn test_follow_timeout_is_configurable() {
        let config: velocity_core::config::RuntimeConfig =
            serde_json::from_str(r#"{"followTimeoutSecs": 5}"#).unwrap();
        let mut session =
            NavigationSession::new(CountingRouter::new(300.0), MemoryBackend::new());
        session.set_follow_timeout(config.follow_timeout());

        session.on_map_interaction();
        assert!(!session.tick_follow(Instant::now() + Duration::from_secs(4)));
        assert!(session.tick_follow(Instant::now() + Duration::from_secs(6)));
        assert!(session.is_following());
    }

    #[tokio::test]
    async fn test_camera_fits_route_while_navigating() {
        let mut session =
            NavigationSession::new(CountingRouter::new(300.0), MemoryBackend::new());

        let origin = LatLon::new(40.7128, -74.0060);
        session.handle_gps(fix_at(origin, 0)).await;
        assert!(matches!(
            session.camera_target(),
            Some(CameraTarget::Center { .. })
        ));

        session.open_destination(Some(destination())).await;
        assert!(matches!(
            session.camera_target(),
            Some(CameraTarget::FitBounds { .. })
        ));

        session.on_map_interaction();
        assert_eq!(session.camera_target(), None);
    }

    #[tokio::test]
    async fn test_route_duration_yields_arrival_time() {
        let router = CountingRouter::new(300.0);
        let mut session = NavigationSession::new(router, MemoryBackend::new());

        session
            .handle_gps(fix_at(LatLon::new(40.7128, -74.0060), 0))
            .await;
        session.open_destination(Some(destination())).await;

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 17, 37, 10).unwrap();
        let route = session.active_route().unwrap();
        let arrival = arrival_time(now, route.duration_seconds);
        assert_eq!(
            arrival,
            Utc.with_ymd_and_hms(2024, 5, 1, 17, 42, 10).unwrap()
        );
    }
}
