//! WinKey host entry point.
//!
//! Headless CLI: spawns the native hook helper, prints every key event as a
//! JSON line on stdout, and suppresses the keys listed in the config file.
//! Logs go to stderr so stdout stays machine-readable.
//!
//! ```text
//! main()
//!  └─ load_or_create_config() -- platform config.toml, written with defaults if absent
//!  └─ GlobalKeyboardListener   -- NativeHelper + KeyServer session task
//!       └─ print / suppress handler
//!  └─ wait for Ctrl-C or helper exit
//! ```

use std::io::Write;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use winkey_core::KeyEvent;
use winkey_server::infrastructure::helper::{default_helper_path, NativeHelper};
use winkey_server::infrastructure::storage::config::{self, AppConfig};
use winkey_server::{GlobalKeyboardListener, KeyStates, WindowsConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = config::load_or_create_config();
    let cfg = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    // Level comes from the config file unless `RUST_LOG` is set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.server.log_level)),
        )
        .init();

    if let Err(e) = &loaded {
        warn!("using default configuration: {e}");
    }

    let helper_path = match &cfg.server.helper_path {
        Some(path) => path.clone(),
        None => default_helper_path().context("resolving key helper path")?,
    };
    info!(helper = %helper_path.display(), "WinKey host starting");

    let mut listener =
        GlobalKeyboardListener::new(NativeHelper::new(helper_path), WindowsConfig::from(&cfg.server));

    let suppress_keys = cfg.listener.suppress_keys.clone();
    let log_events = cfg.listener.log_events;
    listener
        .add_listener(move |event: &KeyEvent, _: &KeyStates| {
            if log_events {
                print_event(event);
            }
            event.name.is_some_and(|name| suppress_keys.contains(&name))
        })
        .context("starting key helper")?;

    info!("WinKey host ready. Press Ctrl-C to exit.");

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("shutdown signal received");
            Ok(())
        }
        result = listener.wait() => result,
    };

    listener.kill().await;

    if let Err(e) = &outcome {
        error!("key helper session failed: {e}");
    }
    info!("WinKey host stopped");
    outcome.context("key helper session")
}

fn print_event(event: &KeyEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            let mut stdout = std::io::stdout().lock();
            if writeln!(stdout, "{json}").and_then(|()| stdout.flush()).is_err() {
                warn!("stdout closed; dropping key event");
            }
        }
        Err(e) => warn!("failed to encode key event: {e}"),
    }
}
