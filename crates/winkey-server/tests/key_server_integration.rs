//! Integration tests for the key server and the multi-handler listener.
//!
//! These drive the public API end-to-end over the in-memory mock helper:
//! event lines go in on the helper's stdout, directives come back on its stdin.

use std::sync::{Arc, Mutex};

use winkey_core::{Directive, KeyEvent, KeyState, StandardKey};
use winkey_server::infrastructure::helper::mock::{MockHelper, MockHelperHandle, MockHelperIo};
use winkey_server::{
    GlobalKeyboardListener, KeyServer, KeyStates, Propagation, ServerError, WindowsConfig,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

async fn exchange(io: &mut MockHelperIo, line: &str) -> Option<Directive> {
    io.send_line(line).await.expect("send line");
    io.next_directive().await
}

/// Starts a server whose listener suppresses every key in `suppress`.
fn start_server(
    suppress: &'static [StandardKey],
    config: WindowsConfig,
) -> (KeyServer<MockHelper>, MockHelperHandle, MockHelperIo) {
    let (helper, handle) = MockHelper::new();
    let mut server = KeyServer::new(
        helper,
        move |event: &KeyEvent| event.name.is_some_and(|name| suppress.contains(&name)),
        config,
    );
    server.start().expect("server must start");
    let io = handle.take_io().expect("helper io after start");
    (server, handle, io)
}

// ── KeyServer ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_letter_event_reaches_listener_with_all_fields() {
    // Arrange
    let seen: Arc<Mutex<Vec<KeyEvent>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let (helper, handle) = MockHelper::new();
    let mut server = KeyServer::new(
        helper,
        move |event: &KeyEvent| {
            sink.lock().unwrap().push(event.clone());
            false
        },
        WindowsConfig::default(),
    );
    server.start().unwrap();
    let mut io = handle.take_io().unwrap();

    // Act
    let directive = exchange(&mut io, "65,DOWN,30").await;

    // Assert
    assert_eq!(directive, Some(Directive::Propagate));
    let event = seen.lock().unwrap()[0].clone();
    assert_eq!(event.vk_code, Some(65));
    assert_eq!(event.name, Some(StandardKey::A));
    assert_eq!(event.state, KeyState::Down);
    assert_eq!(event.scan_code, Some(30));
    assert_eq!(event.raw_key.map(|info| info.raw_name), Some("VK_A"));

    server.stop().await;
}

#[tokio::test]
async fn test_windows_l_chord_release_is_swallowed() {
    // The listener swallows L. Windows was pressed first and let through, so
    // without the correction its release would fire the Start menu.
    let (mut server, _handle, mut io) = start_server(&[StandardKey::L], WindowsConfig::default());

    assert_eq!(exchange(&mut io, "91,DOWN,91").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "76,DOWN,38").await, Some(Directive::Suppress));
    assert_eq!(exchange(&mut io, "76,UP,38").await, Some(Directive::Suppress));
    assert_eq!(exchange(&mut io, "91,UP,91").await, Some(Directive::Suppress));

    // The correction is one-shot.
    assert_eq!(exchange(&mut io, "91,DOWN,91").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "91,UP,91").await, Some(Directive::Propagate));

    server.stop().await;
}

#[tokio::test]
async fn test_windows_l_chord_release_passes_with_capture_disabled() {
    let config = WindowsConfig {
        capture_windows_key_up: false,
    };
    let (mut server, _handle, mut io) = start_server(&[StandardKey::L], config);

    exchange(&mut io, "91,DOWN,91").await;
    exchange(&mut io, "76,DOWN,38").await;

    assert_eq!(exchange(&mut io, "91,UP,91").await, Some(Directive::Propagate));
    server.stop().await;
}

#[tokio::test]
async fn test_partial_writes_produce_one_directive_per_line() {
    let (mut server, _handle, mut io) = start_server(&[StandardKey::A], WindowsConfig::default());

    io.send_raw(b"65,DO").await.unwrap();
    io.send_raw(b"WN,30\n66,DOWN,48\n67,").await.unwrap();
    io.send_raw(b"DOWN,46\n").await.unwrap();

    assert_eq!(io.next_directive().await, Some(Directive::Suppress));
    assert_eq!(io.next_directive().await, Some(Directive::Propagate));
    assert_eq!(io.next_directive().await, Some(Directive::Propagate));
    server.stop().await;
}

#[tokio::test]
async fn test_unknown_and_malformed_lines_are_still_answered() {
    let (mut server, _handle, mut io) = start_server(&[], WindowsConfig::default());

    assert_eq!(exchange(&mut io, "255,DOWN,0").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "abc,DOWN,30").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "65").await, Some(Directive::Propagate));
    server.stop().await;
}

#[tokio::test]
async fn test_helper_crash_surfaces_through_wait() {
    let (mut server, _handle, mut io) = start_server(&[], WindowsConfig::default());
    exchange(&mut io, "65,DOWN,30").await;

    io.close_output();

    assert!(matches!(server.wait().await, Err(ServerError::HelperExited)));
    // The server can be brought back up after a crash.
    server.start().expect("restart after crash");
    server.stop().await;
}

#[tokio::test]
async fn test_missing_helper_fails_start() {
    let (helper, _handle) = MockHelper::failing();
    let mut server = KeyServer::new(helper, |_: &KeyEvent| false, WindowsConfig::default());

    let err = server.start().unwrap_err();

    assert!(err.to_string().contains("mock://WinKeyServer.exe"), "got: {err}");
}

// ── GlobalKeyboardListener ────────────────────────────────────────────────────

#[tokio::test]
async fn test_global_listener_combines_handlers_and_stops_when_empty() {
    // Arrange
    let (helper, handle) = MockHelper::new();
    let mut listener = GlobalKeyboardListener::new(helper, WindowsConfig::default());
    let logged: Arc<Mutex<Vec<StandardKey>>> = Arc::default();
    let sink = Arc::clone(&logged);

    let logger = listener
        .add_listener(move |event: &KeyEvent, _: &KeyStates| {
            if let Some(name) = event.name {
                sink.lock().unwrap().push(name);
            }
            Propagation::PROPAGATE
        })
        .unwrap();
    let blocker = listener
        .add_listener(|event: &KeyEvent, states: &KeyStates| {
            event.name == Some(StandardKey::Q) && states.is_down(StandardKey::LeftCtrl)
        })
        .unwrap();
    let mut io = handle.take_io().unwrap();

    // Act / Assert
    assert_eq!(exchange(&mut io, "81,DOWN,16").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "162,DOWN,29").await, Some(Directive::Propagate));
    assert_eq!(exchange(&mut io, "81,DOWN,16").await, Some(Directive::Suppress));
    assert_eq!(
        *logged.lock().unwrap(),
        vec![StandardKey::Q, StandardKey::LeftCtrl, StandardKey::Q]
    );

    assert!(listener.remove_listener(blocker).await);
    assert!(listener.is_running());
    assert!(listener.remove_listener(logger).await);
    assert!(!listener.is_running());
    assert_eq!(handle.spawn_count(), 1);
}
