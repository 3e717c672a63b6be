//! Device capability checks performed before a session starts
//!
//! The controller cannot inspect radios or permission state itself; the host
//! platform answers through this trait. The default implementation reports
//! everything available, which matches embedding the library in a host that
//! has already negotiated its permissions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Host platform answers used during session preflight
pub trait DeviceServices: Send + Sync {
    /// Whether the device hardware is supported at all.
    fn device_supported(&self) -> bool;

    /// Whether camera access has been granted to the host application.
    fn camera_access_granted(&self) -> bool;

    /// Whether location access has been granted to the host application.
    fn location_access_granted(&self) -> bool;

    /// Whether the Bluetooth radio is powered on.
    fn bluetooth_powered_on(&self) -> bool;

    /// Whether the camera can decode VLC signals.
    fn camera_supports_vlc(&self) -> bool;
}

/// Default services: every capability reported as available.
pub struct HostDeviceServices;

impl DeviceServices for HostDeviceServices {
    fn device_supported(&self) -> bool {
        true
    }

    fn camera_access_granted(&self) -> bool {
        true
    }

    fn location_access_granted(&self) -> bool {
        true
    }

    fn bluetooth_powered_on(&self) -> bool {
        true
    }

    fn camera_supports_vlc(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct MockFlags {
    device_unsupported: AtomicBool,
    camera_denied: AtomicBool,
    location_denied: AtomicBool,
    bluetooth_off: AtomicBool,
    camera_without_vlc: AtomicBool,
}

/// Scriptable services for tests; all capabilities granted until revoked.
#[derive(Clone, Default)]
pub struct MockDeviceServices {
    flags: Arc<MockFlags>,
}

impl MockDeviceServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_device_supported(&self, supported: bool) {
        self.flags
            .device_unsupported
            .store(!supported, Ordering::SeqCst);
    }

    pub fn set_camera_access_granted(&self, granted: bool) {
        self.flags.camera_denied.store(!granted, Ordering::SeqCst);
    }

    pub fn set_location_access_granted(&self, granted: bool) {
        self.flags.location_denied.store(!granted, Ordering::SeqCst);
    }

    pub fn set_bluetooth_powered_on(&self, powered_on: bool) {
        self.flags.bluetooth_off.store(!powered_on, Ordering::SeqCst);
    }

    pub fn set_camera_supports_vlc(&self, supported: bool) {
        self.flags
            .camera_without_vlc
            .store(!supported, Ordering::SeqCst);
    }
}

impl DeviceServices for MockDeviceServices {
    fn device_supported(&self) -> bool {
        !self.flags.device_unsupported.load(Ordering::SeqCst)
    }

    fn camera_access_granted(&self) -> bool {
        !self.flags.camera_denied.load(Ordering::SeqCst)
    }

    fn location_access_granted(&self) -> bool {
        !self.flags.location_denied.load(Ordering::SeqCst)
    }

    fn bluetooth_powered_on(&self) -> bool {
        !self.flags.bluetooth_off.load(Ordering::SeqCst)
    }

    fn camera_supports_vlc(&self) -> bool {
        !self.flags.camera_without_vlc.load(Ordering::SeqCst)
    }
}
