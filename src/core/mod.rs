pub mod constants;
pub mod types;

pub use constants::{LOCATION_FIX_TIMEOUT, SOURCE_POLL_INTERVAL, VERSION};
pub use types::{normalize_degrees, ExpectedAccuracy, Heading, Location};
