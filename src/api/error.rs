//! Positioning error domain
//!
//! Lifecycle violations (codes 1..=3) come back synchronously from the call
//! that caused them. Operational failures (codes 4..=11) are discovered
//! while a session runs and are delivered as [`Event::Failure`] on the
//! subscription.
//!
//! [`Event::Failure`]: crate::api::events::Event::Failure

use crate::source::SourceError;
use std::fmt;

/// Result type for controller operations
pub type PositioningResult<T> = Result<T, PositioningError>;

/// The different indoor positioning errors
#[derive(Debug, Clone, PartialEq)]
pub enum PositioningError {
    /// A property was mutated while a session is active
    CannotSetPropertyWhileRunning { property: &'static str },
    /// start() was called while already running
    AlreadyRunning,
    /// stop() was called while already stopped
    AlreadyStopped,
    /// The device is not supported
    DeviceNotSupported,
    /// No access to the camera
    CameraAccessNotGranted,
    /// No access to location
    LocationNotGranted,
    /// No location fix within the fix timeout window
    LocationTimeout { waited_ms: u64 },
    /// Connection to the positioning source failed
    ConnectionFailed { details: String },
    /// The site configuration is missing or unusable
    ConfigurationFailed { reason: String },
    /// Bluetooth is powered off
    BluetoothPoweredOff,
    /// The camera does not support VLC positioning
    CameraNotSupported,
}

impl PositioningError {
    /// Stable numeric error code matching the original SDK error domain.
    pub fn code(&self) -> i32 {
        match self {
            PositioningError::CannotSetPropertyWhileRunning { .. } => 1,
            PositioningError::AlreadyRunning => 2,
            PositioningError::AlreadyStopped => 3,
            PositioningError::DeviceNotSupported => 4,
            PositioningError::CameraAccessNotGranted => 5,
            PositioningError::LocationNotGranted => 6,
            PositioningError::LocationTimeout { .. } => 7,
            PositioningError::ConnectionFailed { .. } => 8,
            PositioningError::ConfigurationFailed { .. } => 9,
            PositioningError::BluetoothPoweredOff => 10,
            PositioningError::CameraNotSupported => 11,
        }
    }

    /// Whether this error is rejected synchronously by a lifecycle or
    /// property call rather than delivered on the subscription.
    pub fn is_lifecycle(&self) -> bool {
        self.code() <= 3
    }
}

impl fmt::Display for PositioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositioningError::CannotSetPropertyWhileRunning { property } => {
                write!(f, "Cannot set {} while running", property)
            }
            PositioningError::AlreadyRunning => write!(f, "Already running"),
            PositioningError::AlreadyStopped => write!(f, "Already stopped"),
            PositioningError::DeviceNotSupported => write!(f, "Device not supported"),
            PositioningError::CameraAccessNotGranted => {
                write!(f, "Camera access not granted")
            }
            PositioningError::LocationNotGranted => {
                write!(f, "Location access not granted")
            }
            PositioningError::LocationTimeout { waited_ms } => {
                write!(f, "Location timeout after {}ms", waited_ms)
            }
            PositioningError::ConnectionFailed { details } => {
                write!(f, "Connection failed: {}", details)
            }
            PositioningError::ConfigurationFailed { reason } => {
                write!(f, "Configuration failed: {}", reason)
            }
            PositioningError::BluetoothPoweredOff => write!(f, "Bluetooth not turned on"),
            PositioningError::CameraNotSupported => write!(f, "Camera not supported"),
        }
    }
}

impl std::error::Error for PositioningError {}

impl From<SourceError> for PositioningError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::ConnectionFailed { details } => {
                PositioningError::ConnectionFailed { details }
            }
            SourceError::ConfigurationRejected { reason } => {
                PositioningError::ConfigurationFailed { reason }
            }
            SourceError::Unavailable { details } => {
                PositioningError::ConnectionFailed { details }
            }
        }
    }
}
