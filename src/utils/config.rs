//! Controller configuration surface and site configuration parsing
//!
//! The configuration blob handed to the controller is an opaque string from
//! the caller's point of view. The built-in data sources expect it to be a
//! JSON site description; a blob that does not parse or validate surfaces as
//! a configuration failure on the event queue once a session starts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The way in which the library fetches input data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Fetches live data from an installed source
    Default,
    /// Simulated movement along the configured path
    Simulation,
    /// Static data for mobile setup
    MobileSetup,
}

impl Mode {
    /// Numeric value as exposed by the original SDK (1..=3).
    pub fn value(self) -> i32 {
        match self {
            Mode::Default => 1,
            Mode::Simulation => 2,
            Mode::MobileSetup => 3,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Mode::Default),
            2 => Some(Mode::Simulation),
            3 => Some(Mode::MobileSetup),
            _ => None,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Default
    }
}

/// Which device orientation is used as the reference point for due north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadingOrientation {
    /// Device held upright, home button at the bottom
    Portrait,
    /// Device held upright, home button at the top
    PortraitUpsideDown,
    /// Device held upright, home button on the right side
    LandscapeLeft,
    /// Device held upright, home button on the left side
    LandscapeRight,
}

impl HeadingOrientation {
    /// Numeric value as exposed by the original SDK (1..=4).
    pub fn value(self) -> i32 {
        match self {
            HeadingOrientation::Portrait => 1,
            HeadingOrientation::PortraitUpsideDown => 2,
            HeadingOrientation::LandscapeLeft => 3,
            HeadingOrientation::LandscapeRight => 4,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(HeadingOrientation::Portrait),
            2 => Some(HeadingOrientation::PortraitUpsideDown),
            3 => Some(HeadingOrientation::LandscapeLeft),
            4 => Some(HeadingOrientation::LandscapeRight),
            _ => None,
        }
    }

    /// Offset added to raw headings so that due north is reported relative
    /// to the configured device orientation.
    pub fn offset_degrees(self) -> f64 {
        match self {
            HeadingOrientation::Portrait => 0.0,
            HeadingOrientation::PortraitUpsideDown => 180.0,
            HeadingOrientation::LandscapeLeft => 90.0,
            HeadingOrientation::LandscapeRight => 270.0,
        }
    }
}

impl Default for HeadingOrientation {
    fn default() -> Self {
        HeadingOrientation::Portrait
    }
}

/// Configuration parsing and validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Blob is not valid JSON or misses required fields
    Parse { message: String },
    /// A field is present but holds an unusable value
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// A section required by the selected mode is missing
    MissingSection { section: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { message } => {
                write!(f, "Failed to parse site configuration: {}", message)
            }
            ConfigError::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::MissingSection { section } => {
                write!(f, "Site configuration misses the '{}' section", section)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A geodetic reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    fn validate(&self, parameter: &str) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ConfigError::InvalidParameter {
                parameter: format!("{}.latitude", parameter),
                value: self.latitude.to_string(),
                reason: "latitude must be within [-90, 90]".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ConfigError::InvalidParameter {
                parameter: format!("{}.longitude", parameter),
                value: self.longitude.to_string(),
                reason: "longitude must be within [-180, 180]".to_string(),
            });
        }
        Ok(())
    }
}

/// A waypoint along the simulated walking path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub floor_level: Option<i32>,
}

/// Movement plan used by the simulation source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPlan {
    pub waypoints: Vec<Waypoint>,
    /// Interval between emitted fixes, milliseconds
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
    /// Walking speed along the path, meters per second
    #[serde(default = "default_speed_mps")]
    pub speed_mps: f64,
}

fn default_step_interval_ms() -> u64 {
    500
}

fn default_speed_mps() -> f64 {
    1.2
}

/// Fixed location reported in mobile-setup mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub floor_level: Option<i32>,
}

/// Parsed form of the configuration blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    pub site_id: String,
    pub origin: GeoPoint,
    #[serde(default)]
    pub floors: Vec<i32>,
    /// Whether the site uses camera-based VLC positioning
    #[serde(default)]
    pub requires_vlc: bool,
    #[serde(default)]
    pub simulation: Option<SimulationPlan>,
    #[serde(default)]
    pub static_fix: Option<StaticFix>,
}

impl SiteConfiguration {
    /// Parse and validate a configuration blob.
    pub fn from_json(blob: &str) -> Result<Self, ConfigError> {
        let site: SiteConfiguration =
            serde_json::from_str(blob).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        site.validate()?;
        Ok(site)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_id.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "site_id".to_string(),
                value: String::new(),
                reason: "site identifier must not be empty".to_string(),
            });
        }

        self.origin.validate("origin")?;

        if let Some(plan) = &self.simulation {
            if plan.waypoints.len() < 2 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "simulation.waypoints".to_string(),
                    value: plan.waypoints.len().to_string(),
                    reason: "a simulation path needs at least 2 waypoints".to_string(),
                });
            }
            if plan.speed_mps <= 0.0 || !plan.speed_mps.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    parameter: "simulation.speed_mps".to_string(),
                    value: plan.speed_mps.to_string(),
                    reason: "speed must be positive".to_string(),
                });
            }
            if plan.step_interval_ms == 0 {
                return Err(ConfigError::InvalidParameter {
                    parameter: "simulation.step_interval_ms".to_string(),
                    value: "0".to_string(),
                    reason: "step interval must be positive".to_string(),
                });
            }
            for (index, waypoint) in plan.waypoints.iter().enumerate() {
                let point = GeoPoint {
                    latitude: waypoint.latitude,
                    longitude: waypoint.longitude,
                    altitude: waypoint.altitude,
                };
                point.validate(&format!("simulation.waypoints[{}]", index))?;
            }
        }

        if let Some(fix) = &self.static_fix {
            let point = GeoPoint {
                latitude: fix.latitude,
                longitude: fix.longitude,
                altitude: fix.altitude,
            };
            point.validate("static_fix")?;
        }

        Ok(())
    }
}
