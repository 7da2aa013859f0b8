//! HidRelay agent entry point.
//!
//! Grabs the local keyboard and mouse on demand and relays them as text
//! commands to a network HID endpoint over WebSocket.  Pressing and
//! releasing the toggle key (backtick by default) flips between using the
//! devices locally and forwarding them.
//!
//! # Usage
//!
//! ```text
//! hidrelay [OPTIONS]
//!
//! Options:
//!   --config <PATH>         Config file [default: platform config dir]
//!   --url <URL>             Endpoint URL, e.g. ws://192.168.0.139:81/
//!   --toggle-key <KEY>      Toggle key name, e.g. KEY_GRAVE or ScrollLock
//!   --mouse-name <NAME>     Exact name of the mouse device to capture
//!   --log-level <LEVEL>     Log level when RUST_LOG is unset
//!   --split-move-axes       Send X and Y motion as separate messages
//! ```
//!
//! Every option can also come from the environment (`HIDRELAY_CONFIG`,
//! `HIDRELAY_URL`, `HIDRELAY_TOGGLE_KEY`, `HIDRELAY_MOUSE_NAME`,
//! `HIDRELAY_LOG`, `HIDRELAY_SPLIT_MOVE_AXES`).  Command-line values win over
//! the config file.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ capture thread    (evdev poll loop / Win32 hook loop) ─┐ mpsc
//!  ├─ processing loop   ForwardInputUseCase::handle_event  ◀─┘
//!  ├─ reconnect loop    TransportManager::run_reconnect_loop
//!  └─ signal task       Ctrl-C / SIGTERM → running = false
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use hidrelay_agent::application::context::ForwardContext;
use hidrelay_agent::application::forward_input::ForwardInputUseCase;
use hidrelay_agent::application::mode_control::{DeviceGrab, ModeController};
use hidrelay_agent::infrastructure::input_capture::{self, CaptureError, InputSource};
use hidrelay_agent::infrastructure::network::{ReconnectPolicy, TransportManager, WebSocketConnector};
use hidrelay_agent::infrastructure::storage::config::{self, AppConfig};

/// Receive timeout of the processing loop; bounds shutdown latency and
/// paces idle flushes of held-back motion.
const IDLE_TICK: Duration = Duration::from_millis(100);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Relays the local keyboard and mouse to a network HID endpoint.
#[derive(Debug, Parser)]
#[command(name = "hidrelay", about = "Relay local keyboard and mouse input to a WebSocket HID endpoint", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "HIDRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Full endpoint URL, replacing the configured scheme, host, port and path.
    #[arg(long, env = "HIDRELAY_URL")]
    url: Option<String>,

    /// Key that toggles forwarding (friendly or evdev name).
    #[arg(long, env = "HIDRELAY_TOGGLE_KEY")]
    toggle_key: Option<String>,

    /// Exact device name of the mouse to capture.
    #[arg(long, env = "HIDRELAY_MOUSE_NAME")]
    mouse_name: Option<String>,

    /// Log level or filter directive, used when `RUST_LOG` is unset.
    #[arg(long, env = "HIDRELAY_LOG")]
    log_level: Option<String>,

    /// Send each pointer move as separate X and Y messages.
    #[arg(long, env = "HIDRELAY_SPLIT_MOVE_AXES")]
    split_move_axes: bool,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// merged configuration fails validation.
    fn into_app_config(self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => config::load_config().context("loading config")?,
        };

        if let Some(url) = self.url {
            cfg.endpoint.url = Some(url);
        }
        if let Some(key) = self.toggle_key {
            cfg.input.toggle_key = key;
        }
        if let Some(name) = self.mouse_name {
            cfg.input.mouse_name = Some(name);
        }
        if let Some(level) = self.log_level {
            cfg.agent.log_level = level;
        }
        if self.split_move_axes {
            cfg.transport.split_move_axes = true;
        }

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Cli::parse().into_app_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.agent.log_level)),
        )
        .init();

    info!("HidRelay agent starting");

    // Shutdown flag shared across all background services.
    let running = Arc::new(AtomicBool::new(true));

    // ── Capture devices ───────────────────────────────────────────────────────
    let (source, devices) = open_input_source(&cfg).context("opening input devices")?;
    let mut events = source.start(Arc::clone(&running)).context("starting input capture")?;

    // ── Forwarding pipeline ───────────────────────────────────────────────────
    let toggle_key = cfg.toggle_key()?;
    let context = Arc::new(ForwardContext::new(toggle_key, cfg.move_interval()));
    let modes = Arc::new(ModeController::new(Arc::clone(&context), devices));

    let url = cfg.endpoint.url();
    let connector = Arc::new(WebSocketConnector::new(url.clone(), cfg.connect_timeout()));
    let transport = Arc::new(
        TransportManager::new(connector, cfg.transport.split_move_axes).with_send_timeout(cfg.send_timeout()),
    );
    let use_case = ForwardInputUseCase::new(Arc::clone(&context), Arc::clone(&modes), transport.clone());

    // ── Endpoint connection ───────────────────────────────────────────────────
    if let Err(e) = transport.connect().await {
        warn!("initial connection to {url} failed: {e}; will keep retrying");
    }
    let policy = ReconnectPolicy { backoff: cfg.backoff(), check_interval: cfg.check_interval() };
    let reconnect = tokio::spawn(Arc::clone(&transport).run_reconnect_loop(Arc::clone(&running), policy));

    // ── Ctrl-C / SIGTERM handler ──────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        running_clone.store(false, Ordering::Relaxed);
    });

    info!(toggle = %toggle_key.name(), endpoint = %url, "HidRelay ready; press the toggle key to start forwarding");

    // ── Processing loop ───────────────────────────────────────────────────────
    while running.load(Ordering::Relaxed) {
        match tokio::time::timeout(IDLE_TICK, events.recv()).await {
            Ok(Some((role, event))) => {
                if let Err(e) = use_case.handle_event(role, event, Instant::now()).await {
                    error!(%role, "failed to handle event: {e}");
                }
            }
            Ok(None) => {
                error!("capture stopped; shutting down");
                break;
            }
            Err(_) => {
                if let Err(e) = use_case.on_idle(Instant::now()).await {
                    error!("idle flush failed: {e}");
                }
            }
        }
    }

    // ── Teardown ──────────────────────────────────────────────────────────────
    running.store(false, Ordering::Relaxed);
    modes.release_all();
    drop(events);
    if let Err(e) = input_capture::stop_capture(source).await {
        warn!("capture shutdown panicked: {e}");
    }
    if let Err(e) = reconnect.await {
        warn!("reconnect task ended abnormally: {e}");
    }
    transport.disconnect().await;

    info!("HidRelay agent stopped");
    Ok(())
}

/// The capture source and its grab handle (the same object, seen through
/// both traits).
type Capture = (Arc<dyn InputSource>, Arc<dyn DeviceGrab>);

#[cfg(target_os = "linux")]
fn open_input_source(cfg: &AppConfig) -> Result<Capture, CaptureError> {
    use hidrelay_agent::infrastructure::input_capture::linux::EvdevInputSource;

    let source = Arc::new(EvdevInputSource::discover(cfg.input.mouse_name.as_deref(), cfg.poll_timeout())?);
    let devices: Arc<dyn DeviceGrab> = source.clone();
    let source: Arc<dyn InputSource> = source;
    Ok((source, devices))
}

#[cfg(target_os = "windows")]
fn open_input_source(cfg: &AppConfig) -> Result<Capture, CaptureError> {
    use hidrelay_agent::infrastructure::input_capture::windows::WindowsHookSource;

    if cfg.input.mouse_name.is_some() {
        warn!("mouse_name is ignored on Windows; hooks see every pointing device");
    }
    let source = Arc::new(WindowsHookSource::new());
    let devices: Arc<dyn DeviceGrab> = source.clone();
    let source: Arc<dyn InputSource> = source;
    Ok((source, devices))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn open_input_source(_cfg: &AppConfig) -> Result<Capture, CaptureError> {
    Err(CaptureError::UnsupportedPlatform(std::env::consts::OS.to_string()))
}

/// Resolves on Ctrl-C, or on SIGTERM where that exists.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!("could not install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
