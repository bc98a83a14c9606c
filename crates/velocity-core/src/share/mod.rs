//! Live location sharing
//!
//! The relay that periodically pushes the vehicle's position to the backend,
//! and the viewer that polls it from the other end of the share link.

pub mod relay;
pub mod viewer;

pub use relay::{LiveShareRelay, LiveShareTick, TickSink, RELAY_INTERVAL};
pub use viewer::{TrackingFeed, TrackingViewer, ViewerStatus, POLL_INTERVAL};
