//! Scriptable source for tests and development

use crate::core::{Heading, Location};
use crate::source::{PositioningSource, Sample, SourceError, SourceResult};
use crate::utils::config::SiteConfiguration;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum ScriptStep {
    Emit(Sample),
    Fail(SourceError),
}

/// Source that replays a pre-scripted sequence of samples and failures.
///
/// Samples are delivered one per poll without pacing; once the script is
/// exhausted the source reports no data, keeping the session alive. Use
/// `fail_open` to reject the session during source setup and an empty
/// script to provoke the location fix timeout.
#[derive(Clone, Default)]
pub struct MockSource {
    script: VecDeque<ScriptStep>,
    open_error: Option<SourceError>,
    opened: bool,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_location(&mut self, location: Location) -> &mut Self {
        self.script
            .push_back(ScriptStep::Emit(Sample::Location(location)));
        self
    }

    pub fn push_heading(&mut self, heading: Heading) -> &mut Self {
        self.script
            .push_back(ScriptStep::Emit(Sample::Heading(heading)));
        self
    }

    pub fn push_failure(&mut self, error: SourceError) -> &mut Self {
        self.script.push_back(ScriptStep::Fail(error));
        self
    }

    pub fn fail_open(&mut self, error: SourceError) -> &mut Self {
        self.open_error = Some(error);
        self
    }
}

impl PositioningSource for MockSource {
    fn open(&mut self, _site: &SiteConfiguration) -> SourceResult<()> {
        if let Some(error) = self.open_error.clone() {
            return Err(error);
        }
        self.opened = true;
        Ok(())
    }

    fn poll(&mut self) -> SourceResult<Option<Sample>> {
        if !self.opened {
            return Err(SourceError::Unavailable {
                details: "mock source polled before open".to_string(),
            });
        }

        match self.script.pop_front() {
            Some(ScriptStep::Emit(sample)) => Ok(Some(sample)),
            Some(ScriptStep::Fail(error)) => Err(error),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn describe(&self) -> &str {
        "mock"
    }
}
