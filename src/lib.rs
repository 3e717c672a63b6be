//! Indoor Positioning
//!
//! A controller facade for indoor positioning: lifecycle management,
//! run-state-guarded configuration, and ordered asynchronous delivery of
//! heading updates, location fixes, and errors to a single subscriber.
//!
//! The positioning engine itself (BLE beacon ranging, camera VLC decoding)
//! is not part of this crate: live input sits behind the
//! [`PositioningSource`] trait and is installed by the integrator, while
//! simulation and mobile-setup modes are served by built-in sources.

pub mod api;
pub mod core;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use api::{Event, IndoorPositioning, PositioningError, PositioningResult, Subscription};
pub use core::{ExpectedAccuracy, Heading, Location, LOCATION_FIX_TIMEOUT, VERSION};
pub use source::{
    DeviceServices, HostDeviceServices, MockDeviceServices, MockSource, PositioningSource,
    Sample, SimulationSource, SourceError, SourceResult, StaticSource,
};
pub use utils::config::{
    ConfigError, GeoPoint, HeadingOrientation, Mode, SimulationPlan, SiteConfiguration,
    StaticFix, Waypoint,
};
