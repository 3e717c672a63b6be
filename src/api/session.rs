//! Session worker: preflight, fix acquisition, and the poll loop
//!
//! One worker thread exists per active session. It owns the data source for
//! the session's lifetime and is the only producer on the event sink, which
//! keeps delivery strictly ordered.

use crate::api::error::{PositioningError, PositioningResult};
use crate::api::events::{Event, EventSink};
use crate::core::{normalize_degrees, Heading};
use crate::source::{DeviceServices, PositioningSource, Sample, SimulationSource, StaticSource};
use crate::utils::config::{HeadingOrientation, Mode, SiteConfiguration};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Idle,
    Starting,
    Running,
}

const STATE_IDLE: u8 = 0;
const STATE_STARTING: u8 = 1;
const STATE_RUNNING: u8 = 2;

/// State cell shared between the controller and the worker thread
pub(crate) struct SessionShared {
    state: AtomicU8,
    stop: AtomicBool,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_STARTING),
            stop: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        match self.state.load(Ordering::SeqCst) {
            STATE_STARTING => SessionState::Starting,
            STATE_RUNNING => SessionState::Running,
            _ => SessionState::Idle,
        }
    }

    fn set_state(&self, state: SessionState) {
        let value = match state {
            SessionState::Idle => STATE_IDLE,
            SessionState::Starting => STATE_STARTING,
            SessionState::Running => STATE_RUNNING,
        };
        self.state.store(value, Ordering::SeqCst);
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Controller-side handle of a spawned session
pub(crate) struct SessionHandle {
    pub(crate) shared: Arc<SessionShared>,
    join: JoinHandle<()>,
}

impl SessionHandle {
    /// Signal the worker to stop and wait for it to wind down.
    pub(crate) fn stop_and_join(self) {
        self.shared.request_stop();
        if self.join.join().is_err() {
            warn!("session worker panicked during shutdown");
        }
    }
}

/// Everything a session needs, snapshotted at start()
pub(crate) struct SessionParams {
    pub(crate) mode: Mode,
    pub(crate) heading_orientation: HeadingOrientation,
    pub(crate) configuration: Option<String>,
    pub(crate) live_source: Option<Box<dyn PositioningSource>>,
    pub(crate) fix_timeout: Duration,
    pub(crate) poll_interval: Duration,
}

pub(crate) fn spawn(
    params: SessionParams,
    services: Arc<dyn DeviceServices>,
    sink: EventSink,
) -> SessionHandle {
    let shared = Arc::new(SessionShared::new());
    let worker_shared = Arc::clone(&shared);

    let join = thread::spawn(move || {
        let outcome = run(params, services, &sink, &worker_shared);
        // The session must read as ended before the host learns of a
        // failure: a subscriber reacting to the terminal event may call
        // stop() or start() right away.
        worker_shared.set_state(SessionState::Idle);
        if let Err(error) = outcome {
            warn!("session ended with error: {}", error);
            sink.emit(Event::failure(error));
        }
    });

    SessionHandle { shared, join }
}

/// Rebases raw headings onto the configured orientation and the session's
/// arbitrary north. The first heading of a session defines arbitrary 0.
struct HeadingTransform {
    orientation: HeadingOrientation,
    origin: Option<f64>,
}

impl HeadingTransform {
    fn new(orientation: HeadingOrientation) -> Self {
        Self {
            orientation,
            origin: None,
        }
    }

    fn apply(&mut self, raw: Heading) -> Heading {
        let degrees = normalize_degrees(raw.degrees + self.orientation.offset_degrees());
        let origin = *self.origin.get_or_insert(degrees);
        Heading {
            degrees,
            accuracy: raw.accuracy,
            arbitrary_north_degrees: normalize_degrees(degrees - origin),
        }
    }
}

fn preflight(services: &dyn DeviceServices, site: &SiteConfiguration) -> PositioningResult<()> {
    if !services.device_supported() {
        return Err(PositioningError::DeviceNotSupported);
    }
    if !services.location_access_granted() {
        return Err(PositioningError::LocationNotGranted);
    }
    if !services.camera_access_granted() {
        return Err(PositioningError::CameraAccessNotGranted);
    }
    if !services.bluetooth_powered_on() {
        return Err(PositioningError::BluetoothPoweredOff);
    }
    if site.requires_vlc && !services.camera_supports_vlc() {
        return Err(PositioningError::CameraNotSupported);
    }
    Ok(())
}

fn run(
    mut params: SessionParams,
    services: Arc<dyn DeviceServices>,
    sink: &EventSink,
    shared: &SessionShared,
) -> PositioningResult<()> {
    let blob = params
        .configuration
        .take()
        .ok_or_else(|| PositioningError::ConfigurationFailed {
            reason: "no site configuration set".to_string(),
        })?;
    let site = SiteConfiguration::from_json(&blob).map_err(|e| {
        PositioningError::ConfigurationFailed {
            reason: e.to_string(),
        }
    })?;

    preflight(services.as_ref(), &site)?;

    let mut source: Box<dyn PositioningSource> = match params.mode {
        Mode::Default => {
            params
                .live_source
                .take()
                .ok_or_else(|| PositioningError::ConfigurationFailed {
                    reason: "no live source installed for default mode".to_string(),
                })?
        }
        Mode::Simulation => Box::new(SimulationSource::new()),
        Mode::MobileSetup => Box::new(StaticSource::new()),
    };

    if let Err(error) = source.open(&site) {
        return Err(error.into());
    }
    info!(
        "positioning session opened source '{}' for site '{}'",
        source.describe(),
        site.site_id
    );
    sink.emit(Event::log(format!(
        "source '{}' opened for site '{}'",
        source.describe(),
        site.site_id
    )));

    let mut transform = HeadingTransform::new(params.heading_orientation);
    let result = serve(&mut *source, &mut transform, params, sink, shared);
    source.close();
    result
}

fn serve(
    source: &mut dyn PositioningSource,
    transform: &mut HeadingTransform,
    params: SessionParams,
    sink: &EventSink,
    shared: &SessionShared,
) -> PositioningResult<()> {
    // Positioning has not begun until the first fix arrives.
    let deadline = Instant::now() + params.fix_timeout;
    while shared.state() == SessionState::Starting {
        if shared.stop_requested() {
            debug!("session cancelled while waiting for first fix");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(PositioningError::LocationTimeout {
                waited_ms: params.fix_timeout.as_millis() as u64,
            });
        }
        match source.poll() {
            Ok(Some(sample)) => {
                if matches!(sample, Sample::Location(_)) {
                    shared.set_state(SessionState::Running);
                    info!("first location fix acquired, session running");
                    sink.emit(Event::log("first location fix acquired"));
                }
                emit(transform, sink, sample);
            }
            Ok(None) => thread::sleep(params.poll_interval),
            Err(error) => return Err(error.into()),
        }
    }

    while !shared.stop_requested() {
        match source.poll() {
            Ok(Some(sample)) => emit(transform, sink, sample),
            Ok(None) => thread::sleep(params.poll_interval),
            Err(error) => return Err(error.into()),
        }
    }

    debug!("session stop requested, winding down");
    Ok(())
}

fn emit(transform: &mut HeadingTransform, sink: &EventSink, sample: Sample) {
    match sample {
        Sample::Heading(heading) => {
            sink.emit(Event::HeadingUpdate(transform.apply(heading)));
        }
        Sample::Location(location) => {
            sink.emit(Event::LocationUpdate(location));
        }
    }
}
