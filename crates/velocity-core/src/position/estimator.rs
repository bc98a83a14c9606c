//! Speed estimator
//!
//! Fuses the device-reported speed with a distance/time fallback computed
//! from consecutive fixes, then smooths the result for the speedometer.
//! The smoothed value is presentation only; live-share ticks and every other
//! consumer read the raw estimate.

use crate::geo::{haversine_distance, LatLon};
use crate::units::{format_speed, SpeedUnit};

use super::PositionSample;

/// Shortest gap between fixes that still yields a usable distance/time speed.
/// Anything quicker is GPS jitter.
pub const MIN_SAMPLE_GAP_SECS: f64 = 0.5;

/// Longest gap between fixes the fallback accepts. Beyond this the previous
/// fix is stale (tunnel, signal loss) and the distance says nothing about
/// current speed.
pub const MAX_SAMPLE_GAP_SECS: f64 = 10.0;

/// Default exponential smoothing factor for the displayed speed
const DISPLAY_SMOOTHING: f64 = 0.35;

#[derive(Debug, Clone, Copy)]
struct PrevFix {
    pos: LatLon,
    timestamp_ms: u64,
}

/// Incremental speed estimator over a stream of position samples
#[derive(Debug)]
pub struct SpeedEstimator {
    prev: Option<PrevFix>,
    /// Raw fused estimate from the latest sample, m/s
    current: f64,
    /// Smoothed presentation value, m/s
    display: f64,
    smoothing: f64,
}

impl SpeedEstimator {
    /// Create an estimator with the default display smoothing
    pub fn new() -> Self {
        Self::with_smoothing(DISPLAY_SMOOTHING)
    }

    /// Create an estimator with a custom smoothing factor in (0, 1]
    ///
    /// 1.0 disables smoothing entirely.
    pub fn with_smoothing(smoothing: f64) -> Self {
        Self {
            prev: None,
            current: 0.0,
            display: 0.0,
            smoothing: smoothing.clamp(f64::EPSILON, 1.0),
        }
    }

    /// Process one sample and return the raw fused speed in m/s
    ///
    /// A missing device speed counts as 0, never an error. The previous-fix
    /// reference is replaced only after the sample has been fully processed.
    pub fn ingest(&mut self, sample: &PositionSample) -> f64 {
        let device = sample.speed_mps.unwrap_or(0.0).max(0.0);
        let mut fused = device;

        if let Some(prev) = self.prev {
            let dt = sample.timestamp_ms.saturating_sub(prev.timestamp_ms) as f64 / 1000.0;
            if dt > MIN_SAMPLE_GAP_SECS && dt < MAX_SAMPLE_GAP_SECS {
                let calc = haversine_distance(prev.pos, sample.pos) / dt;
                fused = (device + calc) / 2.0;
            }
        }

        let fused = fused.max(0.0);
        self.prev = Some(PrevFix {
            pos: sample.pos,
            timestamp_ms: sample.timestamp_ms,
        });
        self.current = fused;
        self.display += self.smoothing * (fused - self.display);
        fused
    }

    /// Latest raw fused speed in m/s
    pub fn speed_mps(&self) -> f64 {
        self.current
    }

    /// Smoothed speed for the speedometer, unit-converted and rounded
    pub fn display_speed(&self, unit: SpeedUnit) -> u32 {
        format_speed(Some(self.display), unit)
    }

    /// Forget the previous fix and zero the estimate (signal loss)
    pub fn reset(&mut self) {
        self.prev = None;
        self.current = 0.0;
        self.display = 0.0;
    }
}

impl Default for SpeedEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lat: f64, lon: f64, speed: Option<f64>, ts: u64) -> PositionSample {
        PositionSample {
            pos: LatLon::new(lat, lon),
            speed_mps: speed,
            heading_deg: None,
            timestamp_ms: ts,
        }
    }

    #[test]
    fn test_first_sample_uses_device_speed() {
        let mut est = SpeedEstimator::new();
        assert_eq!(est.ingest(&sample(40.0, -74.0, Some(10.0), 0)), 10.0);
    }

    #[test]
    fn test_null_device_speed_is_zero() {
        let mut est = SpeedEstimator::new();
        assert_eq!(est.ingest(&sample(40.0, -74.0, None, 0)), 0.0);
    }

    #[test]
    fn test_blend_inside_window() {
        let mut est = SpeedEstimator::new();
        est.ingest(&sample(40.0, -74.0, Some(0.0), 0));
        // ~111m north over 2s -> calc ~55.6 m/s, device 10 -> mean ~32.8
        let fused = est.ingest(&sample(40.001, -74.0, Some(10.0), 2_000));
        let calc = haversine_distance(LatLon::new(40.0, -74.0), LatLon::new(40.001, -74.0)) / 2.0;
        assert!((fused - (10.0 + calc) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_gap_too_short_rejected() {
        let mut est = SpeedEstimator::new();
        est.ingest(&sample(40.0, -74.0, Some(0.0), 0));
        // 0.4s later: fallback must be ignored, device speed only
        assert_eq!(est.ingest(&sample(40.001, -74.0, Some(7.0), 400)), 7.0);
    }

    #[test]
    fn test_gap_too_long_rejected() {
        let mut est = SpeedEstimator::new();
        est.ingest(&sample(40.0, -74.0, Some(0.0), 0));
        // 12s later: previous fix is stale
        assert_eq!(est.ingest(&sample(40.01, -74.0, Some(7.0), 12_000)), 7.0);
        // and with no device speed the estimate is 0
        assert_eq!(est.ingest(&sample(40.02, -74.0, None, 24_000)), 0.0);
    }

    #[test]
    fn test_display_smoothing_lags_target() {
        let mut est = SpeedEstimator::with_smoothing(0.5);
        est.ingest(&sample(40.0, -74.0, Some(20.0), 0));
        // raw is instant, display approaches it
        assert_eq!(est.speed_mps(), 20.0);
        assert_eq!(est.display_speed(SpeedUnit::Kph), 36); // 10 m/s smoothed
    }

    #[test]
    fn test_reset_clears_state() {
        let mut est = SpeedEstimator::new();
        est.ingest(&sample(40.0, -74.0, Some(20.0), 0));
        est.reset();
        assert_eq!(est.speed_mps(), 0.0);
        // next sample is treated as the first again
        assert_eq!(est.ingest(&sample(40.1, -74.0, Some(5.0), 1_000)), 5.0);
    }
}
