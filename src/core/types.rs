//! Heading and location records delivered to the subscriber

use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees into the `[0, 360)` range.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Qualitative confidence level of a location fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedAccuracy {
    /// Expected accuracy not yet known
    Unknown,
    /// Expected accuracy low
    Low,
    /// Expected accuracy medium
    Medium,
    /// Expected accuracy high
    High,
}

impl ExpectedAccuracy {
    /// Numeric level as exposed by the original SDK (1 = unknown .. 4 = high).
    pub fn level(&self) -> i32 {
        match self {
            ExpectedAccuracy::Unknown => 1,
            ExpectedAccuracy::Low => 2,
            ExpectedAccuracy::Medium => 3,
            ExpectedAccuracy::High => 4,
        }
    }

    /// Map a numeric level back to an indicator; anything out of range is Unknown.
    pub fn from_level(level: i32) -> Self {
        match level {
            2 => ExpectedAccuracy::Low,
            3 => ExpectedAccuracy::Medium,
            4 => ExpectedAccuracy::High,
            _ => ExpectedAccuracy::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpectedAccuracy::Unknown => "Unknown",
            ExpectedAccuracy::Low => "Low",
            ExpectedAccuracy::Medium => "Medium",
            ExpectedAccuracy::High => "High",
        }
    }
}

impl Default for ExpectedAccuracy {
    fn default() -> Self {
        ExpectedAccuracy::Unknown
    }
}

/// A heading update reported while positioning is running.
///
/// `degrees` is relative to the geographic North Pole: 0 means the device
/// points true north, 90 due east, and so on. `arbitrary_north_degrees` is
/// relative to the direction the device faced when the session started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    #[serde(rename = "headingDegrees")]
    pub degrees: f64,
    /// Heading accuracy in degrees
    #[serde(rename = "headingAccuracy")]
    pub accuracy: f64,
    #[serde(rename = "headingArbitraryNorthDegrees")]
    pub arbitrary_north_degrees: f64,
}

impl Heading {
    pub fn new(degrees: f64, accuracy: f64, arbitrary_north_degrees: f64) -> Self {
        Self {
            degrees: normalize_degrees(degrees),
            accuracy,
            arbitrary_north_degrees: normalize_degrees(arbitrary_north_degrees),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.degrees.is_finite()
            && self.accuracy.is_finite()
            && self.accuracy >= 0.0
            && self.arbitrary_north_degrees.is_finite()
    }
}

/// A location fix reported while positioning is running.
///
/// Latitude and longitude use the WGS84 reference frame, accuracies are in
/// meters. `floor_level` is `None` when the floor is unknown; the serialized
/// form omits the field entirely in that case rather than encoding a
/// sentinel value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(rename = "horizontalAccuracy")]
    pub horizontal_accuracy: f64,
    #[serde(rename = "verticalAccuracy")]
    pub vertical_accuracy: f64,
    #[serde(
        rename = "floorLevel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub floor_level: Option<i32>,
    #[serde(rename = "expectedAccuracyLevel")]
    pub expected_accuracy: ExpectedAccuracy,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.altitude.is_finite()
            && self.horizontal_accuracy.is_finite()
            && self.horizontal_accuracy >= 0.0
            && self.vertical_accuracy.is_finite()
            && self.vertical_accuracy >= 0.0
    }
}
