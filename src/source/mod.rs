//! Data source abstraction for positioning input
//!
//! The actual positioning engine is deliberately not part of this crate:
//! live BLE/VLC fusion sits behind the [`PositioningSource`] trait and is
//! installed by the integrator. The crate ships a simulation source, a
//! static mobile-setup source, and a scriptable source for tests.

pub mod error;
pub mod mock;
pub mod services;
pub mod simulation;
pub mod static_site;

pub use error::{SourceError, SourceResult};
pub use mock::MockSource;
pub use services::{DeviceServices, HostDeviceServices, MockDeviceServices};
pub use simulation::SimulationSource;
pub use static_site::StaticSource;

use crate::core::{Heading, Location};
use crate::utils::config::SiteConfiguration;

/// One sample produced by a positioning source
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Heading(Heading),
    Location(Location),
}

/// Abstraction over the thing that produces heading and location samples.
///
/// Sources are polled from the session worker thread. `poll` must not
/// block: it returns `Ok(None)` when no sample is available yet.
pub trait PositioningSource: Send {
    /// Bind the source to a parsed site configuration.
    fn open(&mut self, site: &SiteConfiguration) -> SourceResult<()>;

    /// Fetch the next sample, if any.
    fn poll(&mut self) -> SourceResult<Option<Sample>>;

    /// Release any resources held by the source.
    fn close(&mut self);

    /// Short human-readable source name for logging.
    fn describe(&self) -> &str;
}
