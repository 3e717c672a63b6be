//! Controller facade, event delivery, and the positioning error domain

pub mod controller;
pub mod error;
pub mod events;
mod session;

pub use controller::IndoorPositioning;
pub use error::{PositioningError, PositioningResult};
pub use events::{Event, Subscription};
