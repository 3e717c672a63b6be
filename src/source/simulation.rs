//! Simulated movement source
//!
//! Walks the waypoint path from the site configuration at a configurable
//! pace, emitting interpolated location fixes and headings derived from the
//! path bearing. The reported accuracy ramps from low to high as the
//! simulated fix settles, mimicking how a live engine converges.

use crate::core::{normalize_degrees, ExpectedAccuracy, Heading, Location};
use crate::source::{PositioningSource, Sample, SourceError, SourceResult};
use crate::utils::config::{SimulationPlan, SiteConfiguration, Waypoint};
use rand::Rng;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two waypoints in meters.
fn haversine_m(a: &Waypoint, b: &Waypoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial bearing from one waypoint to the next, degrees clockwise from north.
fn bearing_degrees(a: &Waypoint, b: &Waypoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let y = d_lon.sin() * lat_b.cos();
    let x = lat_a.cos() * lat_b.sin() - lat_a.sin() * lat_b.cos() * d_lon.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Source that replays a simulated walk through the site
pub struct SimulationSource {
    plan: Option<SimulationPlan>,
    segment: usize,
    progress: f64,
    last_tick: Option<Instant>,
    pending: VecDeque<Sample>,
    fixes_emitted: u32,
}

impl SimulationSource {
    pub fn new() -> Self {
        Self {
            plan: None,
            segment: 0,
            progress: 0.0,
            last_tick: None,
            pending: VecDeque::new(),
            fixes_emitted: 0,
        }
    }

    fn plan(&self) -> SourceResult<&SimulationPlan> {
        self.plan.as_ref().ok_or_else(|| SourceError::Unavailable {
            details: "simulation source polled before open".to_string(),
        })
    }

    /// Accuracy indicator for the nth emitted fix: the simulated engine
    /// settles after a handful of fixes.
    fn accuracy_for(fixes_emitted: u32) -> (ExpectedAccuracy, f64) {
        match fixes_emitted {
            0..=2 => (ExpectedAccuracy::Low, 8.0),
            3..=7 => (ExpectedAccuracy::Medium, 4.0),
            _ => (ExpectedAccuracy::High, 2.0),
        }
    }

    /// Advance the walk by one step and queue the resulting samples.
    fn tick(&mut self) -> SourceResult<()> {
        let plan = self.plan()?.clone();
        let waypoints = &plan.waypoints;

        let from = waypoints[self.segment % waypoints.len()];
        let to = waypoints[(self.segment + 1) % waypoints.len()];

        let segment_length = haversine_m(&from, &to).max(0.1);
        let step_m = plan.speed_mps * plan.step_interval_ms as f64 / 1000.0;
        self.progress += step_m / segment_length;
        while self.progress >= 1.0 {
            self.progress -= 1.0;
            self.segment = (self.segment + 1) % waypoints.len();
        }

        let from = waypoints[self.segment % waypoints.len()];
        let to = waypoints[(self.segment + 1) % waypoints.len()];

        // Segments are tens of meters at most, linear interpolation is fine.
        let t = self.progress;
        let mut rng = rand::thread_rng();
        let jitter: f64 = rng.gen_range(-0.5..0.5);

        let (indicator, horizontal_accuracy) = Self::accuracy_for(self.fixes_emitted);
        let location = Location {
            latitude: from.latitude + (to.latitude - from.latitude) * t,
            longitude: from.longitude + (to.longitude - from.longitude) * t,
            altitude: from.altitude + (to.altitude - from.altitude) * t,
            horizontal_accuracy: (horizontal_accuracy + jitter).max(0.5),
            vertical_accuracy: 2.0,
            floor_level: from.floor_level,
            expected_accuracy: indicator,
        };

        let bearing = bearing_degrees(&from, &to);
        let heading = Heading::new(bearing + rng.gen_range(-2.0..2.0), 3.0, 0.0);

        self.pending.push_back(Sample::Location(location));
        self.pending.push_back(Sample::Heading(heading));
        self.fixes_emitted += 1;
        Ok(())
    }
}

impl Default for SimulationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PositioningSource for SimulationSource {
    fn open(&mut self, site: &SiteConfiguration) -> SourceResult<()> {
        let plan = site
            .simulation
            .clone()
            .ok_or_else(|| SourceError::ConfigurationRejected {
                reason: "site configuration carries no simulation path".to_string(),
            })?;

        self.plan = Some(plan);
        self.segment = 0;
        self.progress = 0.0;
        self.last_tick = None;
        self.pending.clear();
        self.fixes_emitted = 0;
        Ok(())
    }

    fn poll(&mut self) -> SourceResult<Option<Sample>> {
        if let Some(sample) = self.pending.pop_front() {
            return Ok(Some(sample));
        }

        let step = Duration::from_millis(self.plan()?.step_interval_ms);
        let due = match self.last_tick {
            Some(last) => last.elapsed() >= step,
            None => true,
        };
        if !due {
            return Ok(None);
        }

        self.last_tick = Some(Instant::now());
        self.tick()?;
        Ok(self.pending.pop_front())
    }

    fn close(&mut self) {
        self.plan = None;
        self.pending.clear();
    }

    fn describe(&self) -> &str {
        "simulation"
    }
}
