//! Static source for mobile-setup mode
//!
//! Mobile setup works against static data: the source repeats the
//! configured fix (or the site origin when no explicit fix is configured)
//! at a fixed cadence so commissioning tools always have a current sample.

use crate::core::{ExpectedAccuracy, Location};
use crate::source::{PositioningSource, Sample, SourceError, SourceResult};
use crate::utils::config::SiteConfiguration;
use std::time::{Duration, Instant};

const REPEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Source that repeats one configured fix
pub struct StaticSource {
    fix: Option<Location>,
    last_emit: Option<Instant>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            fix: None,
            last_emit: None,
        }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositioningSource for StaticSource {
    fn open(&mut self, site: &SiteConfiguration) -> SourceResult<()> {
        let fix = match &site.static_fix {
            Some(fix) => Location {
                latitude: fix.latitude,
                longitude: fix.longitude,
                altitude: fix.altitude,
                horizontal_accuracy: 1.0,
                vertical_accuracy: 1.0,
                floor_level: fix.floor_level,
                expected_accuracy: ExpectedAccuracy::High,
            },
            None => Location {
                latitude: site.origin.latitude,
                longitude: site.origin.longitude,
                altitude: site.origin.altitude,
                horizontal_accuracy: 5.0,
                vertical_accuracy: 5.0,
                floor_level: None,
                expected_accuracy: ExpectedAccuracy::Unknown,
            },
        };

        self.fix = Some(fix);
        self.last_emit = None;
        Ok(())
    }

    fn poll(&mut self) -> SourceResult<Option<Sample>> {
        let fix = self.fix.clone().ok_or_else(|| SourceError::Unavailable {
            details: "static source polled before open".to_string(),
        })?;

        let due = match self.last_emit {
            Some(last) => last.elapsed() >= REPEAT_INTERVAL,
            None => true,
        };
        if !due {
            return Ok(None);
        }

        self.last_emit = Some(Instant::now());
        Ok(Some(Sample::Location(fix)))
    }

    fn close(&mut self) {
        self.fix = None;
    }

    fn describe(&self) -> &str {
        "mobile-setup-static"
    }
}
