//! Demo Mode - Simulated drive generator for testing
//!
//! Generates realistic GPS fixes for UI testing without real hardware.
//! Simulates a car cruising around town with random accelerations, braking
//! and stops at lights.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::geo::{haversine_distance, LatLon};
use crate::nav::route::{RouteData, RouteProvider};
use crate::position::sampler::PositionStream;
use crate::position::{GpsEvent, PositionSample};

/// Demo drive simulator that generates realistic GPS fixes
pub struct DriveSimulator {
    /// Time when simulation started (ms)
    start_time_ms: u64,
    /// Last update time (ms)
    last_update_ms: u64,
    /// Time of the next phase change (ms from start)
    next_phase_at_ms: u64,
    /// Current driving phase
    phase: DrivePhase,
    /// Current speed (m/s, smoothed)
    current_speed: f64,
    /// Target speed for the current phase (m/s)
    target_speed: f64,
    /// Current position
    pos: LatLon,
    /// Current heading (degrees, 0 = north)
    heading_deg: f64,
    rng: StdRng,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DrivePhase {
    /// Steady speed
    Cruise,
    /// Speeding up toward the target
    Accelerate,
    /// Slowing down toward the target
    Brake,
    /// Stopped at a light
    Stopped,
}

impl Default for DriveSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DriveSimulator {
    /// Create a simulator starting near downtown Manhattan
    pub fn new() -> Self {
        Self::starting_at(LatLon::new(40.7128, -74.0060))
    }

    /// Create a simulator starting at `pos`
    pub fn starting_at(pos: LatLon) -> Self {
        let mut rng = StdRng::from_entropy();
        let first_change = rng.gen_range(5000..12000); // 5-12 seconds
        let heading = rng.gen_range(0.0..360.0);

        Self {
            start_time_ms: 0,
            last_update_ms: 0,
            next_phase_at_ms: first_change,
            phase: DrivePhase::Cruise,
            current_speed: 13.4, // ~30 mph
            target_speed: 13.4,
            pos,
            heading_deg: heading,
            rng,
        }
    }

    /// Advance the simulation and produce the current fix
    ///
    /// `elapsed_ms` is milliseconds since the simulation started.
    pub fn update(&mut self, elapsed_ms: u64) -> PositionSample {
        if self.start_time_ms == 0 {
            self.start_time_ms = elapsed_ms;
        }

        let sim_time = elapsed_ms - self.start_time_ms;
        let delta_ms = if self.last_update_ms > 0 {
            elapsed_ms.saturating_sub(self.last_update_ms)
        } else {
            0
        };
        self.last_update_ms = elapsed_ms;
        let dt = delta_ms as f64 / 1000.0;

        self.update_phase(sim_time);

        // Smooth speed toward the target; braking bites harder than throttle.
        let rate = if self.target_speed > self.current_speed {
            2.5 // m/s^2
        } else {
            4.0
        };
        let max_change = rate * dt;
        let diff = self.target_speed - self.current_speed;
        self.current_speed = (self.current_speed + diff.clamp(-max_change, max_change)).max(0.0);

        // Gentle wander so the track is not a ruler line
        if self.current_speed > 1.0 {
            self.heading_deg =
                (self.heading_deg + self.rng.gen_range(-2.0..2.0) * dt).rem_euclid(360.0);
        }

        // Advance along the heading
        let distance = self.current_speed * dt;
        let bearing = self.heading_deg.to_radians();
        let dlat = (distance * bearing.cos()) / 111_320.0;
        let dlon = (distance * bearing.sin())
            / (111_320.0 * self.pos.lat.to_radians().cos().max(0.01));
        self.pos = LatLon::new(self.pos.lat + dlat, self.pos.lon + dlon);

        PositionSample {
            pos: self.pos,
            speed_mps: Some(self.current_speed),
            heading_deg: if self.current_speed > 1.0 {
                Some(self.heading_deg)
            } else {
                None
            },
            timestamp_ms: elapsed_ms,
        }
    }

    fn update_phase(&mut self, sim_time: u64) {
        if sim_time < self.next_phase_at_ms {
            return;
        }
        // Pick the next phase; a stop always ends in acceleration.
        let (phase, target) = match self.phase {
            DrivePhase::Stopped => (DrivePhase::Accelerate, self.rng.gen_range(8.0..16.0)),
            _ => match self.rng.gen_range(0..4) {
                0 => (DrivePhase::Accelerate, self.rng.gen_range(13.0..25.0)),
                1 => (DrivePhase::Brake, self.rng.gen_range(4.0..10.0)),
                2 => (DrivePhase::Stopped, 0.0),
                _ => (DrivePhase::Cruise, self.current_speed.max(8.0)),
            },
        };
        self.phase = phase;
        self.target_speed = target;
        let hold = if phase == DrivePhase::Stopped {
            self.rng.gen_range(3000..8000)
        } else {
            self.rng.gen_range(5000..12000)
        };
        self.next_phase_at_ms = sim_time + hold;
    }
}

/// GPS source backed by [`DriveSimulator`], emitting one fix per second
pub struct SimulatedGps {
    sim: DriveSimulator,
    elapsed_ms: u64,
    cadence: Duration,
}

impl SimulatedGps {
    /// One fix per second from downtown Manhattan
    pub fn new() -> Self {
        Self::with_cadence(DriveSimulator::new(), Duration::from_secs(1))
    }

    /// Custom simulator and fix cadence
    pub fn with_cadence(sim: DriveSimulator, cadence: Duration) -> Self {
        Self {
            sim,
            elapsed_ms: 0,
            cadence,
        }
    }
}

impl Default for SimulatedGps {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionStream for SimulatedGps {
    fn next_event(&mut self) -> impl std::future::Future<Output = Option<GpsEvent>> + Send {
        self.elapsed_ms += self.cadence.as_millis() as u64;
        let sample = self.sim.update(self.elapsed_ms);
        let cadence = self.cadence;
        async move {
            tokio::time::sleep(cadence).await;
            Some(GpsEvent::Fix(sample))
        }
    }
}

/// Offline route provider: a straight line at a fixed urban speed
///
/// Stands in for the routing service in demo mode so navigation still shows
/// a route line and an ETA without network access.
pub struct DirectRouteProvider;

/// Assumed average speed for the straight-line ETA (m/s, ~40 km/h)
const DIRECT_SPEED_MPS: f64 = 11.1;

impl RouteProvider for DirectRouteProvider {
    fn fetch_route(
        &self,
        from: LatLon,
        to: LatLon,
    ) -> impl std::future::Future<Output = Option<RouteData>> + Send {
        let distance = haversine_distance(from, to);
        let route = RouteData {
            coordinates: vec![from, to],
            distance_meters: distance,
            duration_seconds: distance / DIRECT_SPEED_MPS,
        };
        async move { Some(route) }
    }
}
