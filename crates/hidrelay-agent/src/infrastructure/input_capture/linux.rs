//! Linux evdev capture backend.
//!
//! Devices are found with `evdev::enumerate()` and classified by
//! [`resolve_roles`].  A dedicated thread waits on both device file
//! descriptors with `poll(2)`, so it wakes at least once per poll timeout to
//! notice a shutdown even when no input arrives.
//!
//! Each device sits behind an `Arc<Mutex<Device>>` shared by the capture
//! thread (reads) and the mode controller (`EVIOCGRAB`).  The capture thread
//! only holds a lock while draining the kernel buffer; it never holds one
//! while pushing onto the channel.
//!
//! Reading `/dev/input/event*` normally requires membership in the `input`
//! group.

#![cfg(target_os = "linux")]

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use evdev::{Device, Key};
use hidrelay_core::{DeviceRole, InputEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::decoder::FrameDecoder;
use super::{
    resolve_roles, CaptureError, CapturedEvent, DeviceCandidate, InputSource, EVENT_CHANNEL_CAPACITY,
};
use crate::application::mode_control::DeviceGrab;

const POLL_FAILURE: libc::c_short = libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;

/// Capture source reading the keyboard and mouse evdev nodes.
pub struct EvdevInputSource {
    keyboard: Arc<Mutex<Device>>,
    mouse: Arc<Mutex<Device>>,
    poll_timeout: Duration,
    stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EvdevInputSource {
    /// Enumerates input devices and opens the keyboard and mouse.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceNotFound`] when either role cannot be
    /// resolved.
    pub fn discover(mouse_name: Option<&str>, poll_timeout: Duration) -> Result<Self, CaptureError> {
        let devices: Vec<_> = evdev::enumerate().collect();
        let candidates: Vec<DeviceCandidate> = devices
            .iter()
            .map(|(path, device)| DeviceCandidate {
                path: path.display().to_string(),
                name: device.name().unwrap_or_default().to_string(),
                has_alpha_keys: device.supported_keys().map_or(false, |keys| keys.contains(Key::KEY_A)),
                has_primary_button: device.supported_keys().map_or(false, |keys| keys.contains(Key::BTN_LEFT)),
            })
            .collect();
        debug!(count = candidates.len(), "enumerated input devices");

        let roles = resolve_roles(&candidates, mouse_name)?;
        for (role, index) in [(DeviceRole::Keyboard, roles.keyboard), (DeviceRole::Mouse, roles.mouse)] {
            let c = &candidates[index];
            info!(%role, path = %c.path, name = %c.name, "{role} found");
        }

        let mut slots: Vec<Option<Device>> = devices.into_iter().map(|(_, device)| Some(device)).collect();
        let mut take = |index: usize, role| {
            slots
                .get_mut(index)
                .and_then(Option::take)
                .ok_or(CaptureError::DeviceNotFound(role))
        };
        let keyboard = take(roles.keyboard, DeviceRole::Keyboard)?;
        let mouse = take(roles.mouse, DeviceRole::Mouse)?;

        Ok(Self {
            keyboard: Arc::new(Mutex::new(keyboard)),
            mouse: Arc::new(Mutex::new(mouse)),
            poll_timeout,
            stop: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        })
    }

    fn device(&self, role: DeviceRole) -> &Arc<Mutex<Device>> {
        match role {
            DeviceRole::Keyboard => &self.keyboard,
            DeviceRole::Mouse => &self.mouse,
        }
    }
}

impl DeviceGrab for EvdevInputSource {
    fn grab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        lock_device(self.device(role))
            .and_then(|mut device| device.grab())
            .map_err(|e| CaptureError::Grab { role, reason: e.to_string() })
    }

    fn ungrab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        lock_device(self.device(role))
            .and_then(|mut device| device.ungrab())
            .map_err(|e| CaptureError::Ungrab { role, reason: e.to_string() })
    }
}

impl InputSource for EvdevInputSource {
    fn start(&self, running: Arc<AtomicBool>) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError> {
        let mut worker = self.worker.lock().map_err(|_| CaptureError::Start("worker lock poisoned".into()))?;
        if worker.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        let mut watched = Vec::with_capacity(2);
        for role in DeviceRole::ALL {
            let device = Arc::clone(self.device(role));
            let fd = lock_device(&device).map_err(|e| CaptureError::Start(e.to_string()))?.as_raw_fd();
            watched.push(Watched { decoder: FrameDecoder::new(role), device, fd });
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let stop = Arc::clone(&self.stop);
        let timeout_ms = timeout_millis(self.poll_timeout);
        let handle = thread::Builder::new()
            .name("hidrelay-evdev-poll".to_string())
            .spawn(move || run_poll_loop(watched, tx, running, stop, timeout_ms))
            .map_err(|e| CaptureError::Start(e.to_string()))?;

        *worker = Some(handle);
        Ok(rx)
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let handle = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("capture thread panicked");
            }
        }
    }
}

/// One device in the poll set.
struct Watched {
    decoder: FrameDecoder,
    device: Arc<Mutex<Device>>,
    fd: RawFd,
}

fn run_poll_loop(
    mut watched: Vec<Watched>,
    tx: mpsc::Sender<CapturedEvent>,
    running: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    timeout_ms: libc::c_int,
) {
    debug!("capture thread started");

    while running.load(Ordering::Relaxed) && !stop.load(Ordering::Relaxed) && !watched.is_empty() {
        let mut fds: Vec<libc::pollfd> = watched
            .iter()
            .map(|w| libc::pollfd { fd: w.fd, events: libc::POLLIN, revents: 0 })
            .collect();

        // SAFETY: `fds` is a live, correctly sized array of pollfd for the
        // duration of the call.
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            error!("poll failed: {err}");
            break;
        }
        if ready == 0 {
            continue;
        }

        let mut lost = Vec::new();
        for (index, pfd) in fds.iter().enumerate() {
            let entry = &mut watched[index];
            if pfd.revents & libc::POLLIN != 0 {
                match read_batch(entry) {
                    Ok(events) => {
                        let role = entry.decoder.role();
                        for event in events {
                            if tx.blocking_send((role, event)).is_err() {
                                debug!("event receiver dropped; capture thread exiting");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        error!(role = %entry.decoder.role(), "read failed: {e}");
                        lost.push(index);
                        continue;
                    }
                }
            }
            if pfd.revents & POLL_FAILURE != 0 {
                lost.push(index);
            }
        }

        for index in lost.into_iter().rev() {
            let gone = watched.remove(index);
            error!(role = %gone.decoder.role(), "input device lost; no longer reading it");
        }
    }

    debug!("capture thread stopped");
}

/// Drains everything the kernel has buffered for one device.
fn read_batch(entry: &mut Watched) -> io::Result<Vec<InputEvent>> {
    let mut out = Vec::new();
    {
        let mut device = lock_device(&entry.device)?;
        let fetched = device.fetch_events();
        match fetched {
            Ok(events) => {
                for ev in events {
                    entry.decoder.push(ev.event_type().0, ev.code(), ev.value(), &mut out);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(e),
        };
    }
    entry.decoder.finish(&mut out);
    Ok(out)
}

fn lock_device(device: &Mutex<Device>) -> io::Result<MutexGuard<'_, Device>> {
    device.lock().map_err(|_| io::Error::new(io::ErrorKind::Other, "device lock poisoned"))
}

/// `poll(2)` timeout in milliseconds, at least 1 so the loop never spins.
fn timeout_millis(timeout: Duration) -> libc::c_int {
    timeout.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int
}
