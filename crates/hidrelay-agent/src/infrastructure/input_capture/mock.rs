//! Mock input source for testing.
//!
//! Lets tests inject synthetic events without `/dev/input` access or a
//! running Windows message loop, and records every grab and release the mode
//! controller issues.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use hidrelay_core::{DeviceRole, InputEvent};
use tokio::sync::mpsc;

use super::{CaptureError, CapturedEvent, InputSource, EVENT_CHANNEL_CAPACITY};
use crate::application::mode_control::DeviceGrab;

/// One recorded [`DeviceGrab`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabCall {
    Grab(DeviceRole),
    Ungrab(DeviceRole),
}

/// In-process [`InputSource`] driven by the test.
#[derive(Default)]
pub struct MockInputSource {
    sender: Mutex<Option<mpsc::Sender<CapturedEvent>>>,
    calls: Mutex<Vec<GrabCall>>,
    failing: Mutex<Option<DeviceRole>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `grab` of `role` fail.
    pub fn fail_grab(&self, role: DeviceRole) {
        *self.failing.lock().expect("lock poisoned") = Some(role);
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub async fn inject(&self, role: DeviceRole, event: InputEvent) {
        let sender = self
            .sender
            .lock()
            .expect("lock poisoned")
            .clone()
            .expect("MockInputSource::inject called before start()");
        sender.send((role, event)).await.expect("receiver has been dropped");
    }

    /// Every grab/ungrab call so far, in order.
    pub fn grab_calls(&self) -> Vec<GrabCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

impl DeviceGrab for MockInputSource {
    fn grab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        self.calls.lock().expect("lock poisoned").push(GrabCall::Grab(role));
        if *self.failing.lock().expect("lock poisoned") == Some(role) {
            return Err(CaptureError::Grab { role, reason: "injected failure".to_string() });
        }
        Ok(())
    }

    fn ungrab(&self, role: DeviceRole) -> Result<(), CaptureError> {
        self.calls.lock().expect("lock poisoned").push(GrabCall::Ungrab(role));
        Ok(())
    }
}

impl InputSource for MockInputSource {
    fn start(&self, _running: Arc<AtomicBool>) -> Result<mpsc::Receiver<CapturedEvent>, CaptureError> {
        let mut sender = self.sender.lock().expect("lock poisoned");
        if sender.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        *sender = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the sender closes the channel.
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidrelay_core::{KeyCode, KeyEdge};

    fn running() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(true))
    }

    #[tokio::test]
    async fn test_mock_input_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let mut rx = source.start(running()).expect("start");

        // Act
        source.inject(DeviceRole::Keyboard, InputEvent::key(KeyCode::KeyA, KeyEdge::Down)).await;

        // Assert
        let (role, event) = rx.recv().await.expect("event");
        assert_eq!(role, DeviceRole::Keyboard);
        assert_eq!(event, InputEvent::key(KeyCode::KeyA, KeyEdge::Down));
    }

    #[tokio::test]
    async fn test_stop_closes_channel() {
        let source = MockInputSource::new();
        let mut rx = source.start(running()).unwrap();

        source.stop();

        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let source = MockInputSource::new();
        let _rx = source.start(running()).unwrap();
        assert!(matches!(source.start(running()), Err(CaptureError::AlreadyStarted)));
    }

    #[test]
    fn test_grab_calls_are_recorded_and_failure_is_injectable() {
        let source = MockInputSource::new();
        source.fail_grab(DeviceRole::Mouse);

        assert!(source.grab(DeviceRole::Keyboard).is_ok());
        assert!(source.grab(DeviceRole::Mouse).is_err());
        assert!(source.ungrab(DeviceRole::Mouse).is_ok());

        assert_eq!(
            source.grab_calls(),
            vec![
                GrabCall::Grab(DeviceRole::Keyboard),
                GrabCall::Grab(DeviceRole::Mouse),
                GrabCall::Ungrab(DeviceRole::Mouse),
            ]
        );
    }
}
