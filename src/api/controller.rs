//! The indoor positioning controller facade
//!
//! The controller provides location and heading information of the device.
//! The minimal steps to use it are: obtain the process-wide instance with
//! [`IndoorPositioning::shared`], set the site configuration, subscribe for
//! events, and start positioning. All asynchronous outcomes, including
//! operational errors, arrive on the [`Subscription`].
//!
//! [`Subscription`]: crate::api::events::Subscription

use crate::api::error::{PositioningError, PositioningResult};
use crate::api::events::{EventSink, Subscription};
use crate::api::session::{self, SessionHandle, SessionParams, SessionState};
use crate::core::constants::{LOCATION_FIX_TIMEOUT, SOURCE_POLL_INTERVAL, VERSION};
use crate::source::{DeviceServices, HostDeviceServices, PositioningSource};
use crate::utils::config::{HeadingOrientation, Mode};
use log::info;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::Duration;

type SourceFactory = Box<dyn Fn() -> Box<dyn PositioningSource> + Send + Sync>;

struct ControllerState {
    mode: Mode,
    heading_orientation: HeadingOrientation,
    configuration: Option<String>,
    source_factory: Option<SourceFactory>,
    session: Option<SessionHandle>,
}

/// Controller for indoor positioning sessions.
///
/// Configuration may only change while stopped; `start` and `stop` are not
/// reentrant. One worker thread exists per active session and every
/// asynchronous notification goes through the single live subscription, in
/// occurrence order.
pub struct IndoorPositioning {
    inner: Mutex<ControllerState>,
    sink: EventSink,
    services: Arc<dyn DeviceServices>,
    fix_timeout: Duration,
    poll_interval: Duration,
}

impl IndoorPositioning {
    /// Obtain the process-wide controller instance.
    pub fn shared() -> &'static IndoorPositioning {
        static SHARED: OnceLock<IndoorPositioning> = OnceLock::new();
        SHARED.get_or_init(|| IndoorPositioning::with_services(Arc::new(HostDeviceServices)))
    }

    /// Build a controller around a custom platform layer.
    ///
    /// Hosts normally use [`shared`](Self::shared); direct construction
    /// exists for embedders that answer capability checks themselves and
    /// for tests that need isolated instances.
    pub fn with_services(services: Arc<dyn DeviceServices>) -> Self {
        Self {
            inner: Mutex::new(ControllerState {
                mode: Mode::default(),
                heading_orientation: HeadingOrientation::default(),
                configuration: None,
                source_factory: None,
                session: None,
            }),
            sink: EventSink::new(),
            services,
            fix_timeout: LOCATION_FIX_TIMEOUT,
            poll_interval: SOURCE_POLL_INTERVAL,
        }
    }

    /// The current library version.
    pub fn version(&self) -> &'static str {
        VERSION
    }

    fn lock_inner(&self) -> MutexGuard<'_, ControllerState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// True while a session is alive in any form; reaps a worker that ended
    /// on its own (asynchronous failure) as a side effect.
    fn session_active(inner: &mut ControllerState) -> bool {
        if let Some(handle) = &inner.session {
            if handle.shared.state() != SessionState::Idle {
                return true;
            }
        }
        if let Some(handle) = inner.session.take() {
            handle.stop_and_join();
        }
        false
    }

    fn ensure_stopped(
        inner: &mut ControllerState,
        property: &'static str,
    ) -> PositioningResult<()> {
        if Self::session_active(inner) {
            Err(PositioningError::CannotSetPropertyWhileRunning { property })
        } else {
            Ok(())
        }
    }

    pub fn mode(&self) -> Mode {
        self.lock_inner().mode
    }

    /// Set the way in which the library fetches input data. Fails while a
    /// session is active.
    pub fn set_mode(&self, mode: Mode) -> PositioningResult<()> {
        let mut inner = self.lock_inner();
        Self::ensure_stopped(&mut inner, "mode")?;
        inner.mode = mode;
        Ok(())
    }

    pub fn heading_orientation(&self) -> HeadingOrientation {
        self.lock_inner().heading_orientation
    }

    /// Set which device orientation is the reference point for due north.
    /// Fails while a session is active.
    pub fn set_heading_orientation(
        &self,
        orientation: HeadingOrientation,
    ) -> PositioningResult<()> {
        let mut inner = self.lock_inner();
        Self::ensure_stopped(&mut inner, "headingOrientation")?;
        inner.heading_orientation = orientation;
        Ok(())
    }

    pub fn configuration(&self) -> Option<String> {
        self.lock_inner().configuration.clone()
    }

    /// Set the site configuration blob. Mandatory before starting; the blob
    /// is validated when the session starts, not here. Fails while a
    /// session is active.
    pub fn set_configuration(&self, configuration: Option<String>) -> PositioningResult<()> {
        let mut inner = self.lock_inner();
        Self::ensure_stopped(&mut inner, "configuration")?;
        inner.configuration = configuration;
        Ok(())
    }

    /// Install the factory for the live positioning source used in
    /// [`Mode::Default`]. Fails while a session is active.
    pub fn install_source<F>(&self, factory: F) -> PositioningResult<()>
    where
        F: Fn() -> Box<dyn PositioningSource> + Send + Sync + 'static,
    {
        let mut inner = self.lock_inner();
        Self::ensure_stopped(&mut inner, "source")?;
        inner.source_factory = Some(Box::new(factory));
        Ok(())
    }

    /// Whether positioning is currently running. Remains false until the
    /// session acquires its first location fix.
    pub fn running(&self) -> bool {
        self.lock_inner()
            .session
            .as_ref()
            .map(|handle| handle.shared.state() == SessionState::Running)
            .unwrap_or(false)
    }

    /// Register as the consumer of controller events.
    ///
    /// There is at most one live subscription; subscribing again replaces
    /// the previous one, whose endpoint simply stops receiving. Dropping a
    /// subscription never affects the session itself.
    pub fn subscribe(&self) -> Subscription {
        self.sink.subscribe()
    }

    /// Start indoor positioning.
    ///
    /// Rejects synchronously when a session is already active. Everything
    /// else, permission checks, configuration validation, source setup and
    /// the 5 second wait for a first fix, happens asynchronously and is
    /// reported through the subscription.
    pub fn start(&self) -> PositioningResult<()> {
        let mut inner = self.lock_inner();
        if Self::session_active(&mut inner) {
            return Err(PositioningError::AlreadyRunning);
        }

        let live_source = match (inner.mode, &inner.source_factory) {
            (Mode::Default, Some(factory)) => Some(factory()),
            _ => None,
        };
        let params = SessionParams {
            mode: inner.mode,
            heading_orientation: inner.heading_orientation,
            configuration: inner.configuration.clone(),
            live_source,
            fix_timeout: self.fix_timeout,
            poll_interval: self.poll_interval,
        };

        info!("starting positioning session in {:?} mode", inner.mode);
        inner.session = Some(session::spawn(
            params,
            Arc::clone(&self.services),
            self.sink.clone(),
        ));
        Ok(())
    }

    /// Stop indoor positioning.
    ///
    /// Rejects synchronously when no session is active. Stopping a session
    /// that is still waiting for its first fix cancels it.
    pub fn stop(&self) -> PositioningResult<()> {
        let mut inner = self.lock_inner();
        if !Self::session_active(&mut inner) {
            return Err(PositioningError::AlreadyStopped);
        }

        if let Some(handle) = inner.session.take() {
            handle.stop_and_join();
        }
        info!("positioning session stopped");
        Ok(())
    }
}
