//! Windows low-level keyboard and mouse hook implementation.
//!
//! This module installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks using the
//! Windows API.  Both hooks share a dedicated Win32 message-loop thread; the
//! callbacks normalize each event and push it onto the capture channel with
//! `try_send`, so a full channel drops the event instead of stalling the
//! system-wide hook.
//!
//! # Grab on Windows
//!
//! There is no `EVIOCGRAB`.  A grabbed role's events are still delivered to
//! the pipeline, but the hook returns `LRESULT(1)` so the rest of the system
//! never sees them.  While the mouse is grabbed the cursor stays put, so
//! deltas are measured against the last position the system accepted.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::{Cell, RefCell};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use hidrelay_core::{ButtonEdge, DeviceRole, InputEvent, KeyEdge, KeyMapper, MouseButton};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
};

use super::{CaptureError, CapturedEvent, InputSource, EVENT_CHANNEL_CAPACITY};
use crate::application::mode_control::DeviceGrab;

const WHEEL_DELTA: i32 = 120;
const XBUTTON1: u16 = 0x0001;

static SUPPRESS_KEYBOARD: AtomicBool = AtomicBool::new(false);
static SUPPRESS_MOUSE: AtomicBool = AtomicBool::new(false);

/// Global sender used by hook callbacks.  Set once by
/// [`WindowsHookSource::start`].
static EVENT_SENDER: OnceLock<mpsc::Sender<CapturedEvent>> = OnceLock::new();

/// Id of the hook thread, so `stop()` can post `WM_QUIT` to it.
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);

thread_local! {
    /// Keys currently held, indexed by VK code.  Distinguishes auto-repeat
    /// (a second key-down) from the first press.
    static PRESSED: RefCell<[bool; 256]> = const { RefCell::new([false; 256]) };
    /// Last cursor position the system accepted.
    static LAST_POS: Cell<Option<(i32, i32)>> = const { Cell::new(None) };
}

/// Capture source backed by low-level hooks.
#[derive(Debug, Default)]
pub struct WindowsHookSource;

impl WindowsHookSource {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceGrab for WindowsHookSource {
    fn grab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        suppress_flag(role).store(true, Ordering::SeqCst);
        Ok(())
    }

    fn ungrab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        suppress_flag(role).store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl InputSource for WindowsHookSource {
    fn start(&self, _running: Arc<AtomicBool>) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        EVENT_SENDER.set(tx).map_err(|_| CaptureError::AlreadyStarted)?;

        // The hook thread reports whether installation worked before entering
        // its message loop.
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<(), String>>(1);
        thread::Builder::new()
            .name("hidrelay-hook-loop".to_string())
            .spawn(move || run_hook_message_loop(ready_tx))
            .map_err(|e| CaptureError::Start(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("low-level keyboard and mouse hooks installed");
                Ok(rx)
            }
            Ok(Err(reason)) => Err(CaptureError::Start(reason)),
            Err(_) => Err(CaptureError::Start("hook thread exited during startup".to_string())),
        }
    }

    fn stop(&self) {
        SUPPRESS_KEYBOARD.store(false, Ordering::SeqCst);
        SUPPRESS_MOUSE.store(false, Ordering::SeqCst);

        let thread_id = HOOK_THREAD_ID.swap(0, Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: posting a message to a thread id has no memory-safety
            // preconditions; a stale id only makes the call fail.
            if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
                debug!("could not stop hook thread: {e}");
            }
        }
    }
}

fn suppress_flag(role: DeviceRole) -> &'static AtomicBool {
    match role {
        DeviceRole::Keyboard => &SUPPRESS_KEYBOARD,
        DeviceRole::Mouse => &SUPPRESS_MOUSE,
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop(ready: std::sync::mpsc::SyncSender<Result<(), String>>) {
    // SAFETY: SetWindowsHookExW requires the calling thread to run a message
    // loop, which this thread does below.
    let kbd_hook = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(format!("WH_KEYBOARD_LL: {e}")));
            return;
        }
    };
    // SAFETY: as above.
    let mouse_hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0) } {
        Ok(hook) => hook,
        Err(e) => {
            // SAFETY: kbd_hook was returned by SetWindowsHookExW above.
            unsafe { UnhookWindowsHookEx(kbd_hook).ok() };
            let _ = ready.send(Err(format!("WH_MOUSE_LL: {e}")));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    HOOK_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);
    let _ = ready.send(Ok(()));

    // Win32 message loop; blocks until WM_QUIT is posted.
    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        UnhookWindowsHookEx(kbd_hook).ok();
        UnhookWindowsHookEx(mouse_hook).ok();
    }
    debug!("hook thread stopped");
}

fn deliver(role: DeviceRole, event: InputEvent) {
    if let Some(sender) = EVENT_SENDER.get() {
        if let Err(mpsc::error::TrySendError::Full(_)) = sender.try_send((role, event)) {
            error!(%role, "capture channel full; event dropped");
        }
    }
}

/// Classifies a key message, tracking held keys to recognise auto-repeat.
fn key_edge(vk: u8, down: bool) -> KeyEdge {
    PRESSED.with(|pressed| {
        let mut pressed = pressed.borrow_mut();
        let slot = &mut pressed[usize::from(vk)];
        let edge = match (down, *slot) {
            (true, true) => KeyEdge::Repeat,
            (true, false) => KeyEdge::Down,
            (false, _) => KeyEdge::Up,
        };
        *slot = down;
        edge
    })
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the hook message loop thread.  It must return
/// quickly or the OS removes the hook.
unsafe extern "system" fn keyboard_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
    let vk = kbs.vkCode as u8;

    let down = match w_param.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => true,
        WM_KEYUP | WM_SYSKEYUP => false,
        _ => return CallNextHookEx(None, n_code, w_param, l_param),
    };

    let edge = key_edge(vk, down);
    deliver(DeviceRole::Keyboard, InputEvent::key(KeyMapper::windows_vk_to_key(vk), edge));

    if SUPPRESS_KEYBOARD.load(Ordering::SeqCst) {
        return LRESULT(1);
    }
    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 {
        // SAFETY: Must call CallNextHookEx when n_code < 0.
        return CallNextHookEx(None, n_code, w_param, l_param);
    }

    // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let suppressed = SUPPRESS_MOUSE.load(Ordering::SeqCst);
    let high_word = (mhs.mouseData >> 16) as u16;

    let button = |button, edge| Some(InputEvent::MouseButton { button, edge });
    let event = match w_param.0 as u32 {
        WM_MOUSEMOVE => mouse_delta(mhs.pt.x, mhs.pt.y, suppressed),
        WM_LBUTTONDOWN => button(MouseButton::Left, ButtonEdge::Down),
        WM_LBUTTONUP => button(MouseButton::Left, ButtonEdge::Up),
        WM_RBUTTONDOWN => button(MouseButton::Right, ButtonEdge::Down),
        WM_RBUTTONUP => button(MouseButton::Right, ButtonEdge::Up),
        WM_MBUTTONDOWN => button(MouseButton::Middle, ButtonEdge::Down),
        WM_MBUTTONUP => button(MouseButton::Middle, ButtonEdge::Up),
        WM_XBUTTONDOWN | WM_XBUTTONUP => {
            let which = if high_word == XBUTTON1 { MouseButton::Side } else { MouseButton::Extra };
            let edge = if w_param.0 as u32 == WM_XBUTTONDOWN { ButtonEdge::Down } else { ButtonEdge::Up };
            button(which, edge)
        }
        WM_MOUSEWHEEL => wheel_detents(high_word as i16).map(|delta| InputEvent::MouseWheel { delta }),
        _ => None,
    };

    if let Some(event) = event {
        deliver(DeviceRole::Mouse, event);
    }

    if suppressed {
        return LRESULT(1);
    }
    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Relative motion from absolute hook coordinates.
///
/// The reference only advances when the move is let through: a suppressed
/// move never reaches the cursor.
fn mouse_delta(x: i32, y: i32, suppressed: bool) -> Option<InputEvent> {
    LAST_POS.with(|last| {
        let event = last.get().map(|(lx, ly)| InputEvent::MouseMove { dx: x - lx, dy: y - ly });
        if !suppressed || last.get().is_none() {
            last.set(Some((x, y)));
        }
        event
    })
}

/// Converts a raw wheel delta into detents.  High-resolution wheels report
/// fractions of a detent; those round away from zero to one detent.
fn wheel_detents(raw: i16) -> Option<i32> {
    let raw = i32::from(raw);
    match raw / WHEEL_DELTA {
        0 if raw == 0 => None,
        0 => Some(raw.signum()),
        detents => Some(detents),
    }
}
