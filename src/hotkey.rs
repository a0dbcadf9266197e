//! Global start/stop hotkey.
//!
//! The hotkey is registered on its own thread, which also pumps that
//! thread's message queue so `WM_HOTKEY` is delivered. Presses are forwarded
//! to the event loop as plain toggle requests; the listener thread never
//! touches window state.

use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{GopherError, Result};

/// Parse a chord like `ctrl+alt+g`.
pub fn parse_hotkey(chord: &str) -> Result<HotKey> {
    if chord.trim().is_empty() {
        return Err(GopherError::hotkey("empty hotkey"));
    }
    chord
        .parse::<HotKey>()
        .map_err(|e| GopherError::hotkey(format!("invalid hotkey '{chord}': {e}")))
}

/// Register `chord` and return a stream of toggle requests.
///
/// Fails if the chord cannot be parsed or is already taken by another
/// application.
pub fn spawn_toggle_listener(chord: &str) -> Result<mpsc::UnboundedReceiver<()>> {
    let hotkey = parse_hotkey(chord)?;
    let id = hotkey.id();

    let (toggles, receiver) = mpsc::unbounded_channel();
    GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
        if event.id == id && event.state == HotKeyState::Pressed {
            debug!(event = "hotkey.pressed", id);
            let _ = toggles.send(());
        }
    }));

    let (ready_tx, ready_rx) = std_mpsc::channel::<Result<()>>();
    thread::Builder::new()
        .name("gopher-hotkey".to_string())
        .spawn(move || {
            let manager = match GlobalHotKeyManager::new() {
                Ok(manager) => manager,
                Err(e) => {
                    let _ = ready_tx.send(Err(GopherError::hotkey(format!(
                        "failed to create hotkey manager: {e}"
                    ))));
                    return;
                }
            };
            if let Err(e) = manager.register(hotkey) {
                let _ = ready_tx.send(Err(GopherError::hotkey(format!(
                    "failed to register hotkey: {e}"
                ))));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            pump_messages();
            drop(manager);
        })?;

    ready_rx
        .recv()
        .map_err(|_| GopherError::hotkey("hotkey thread exited during setup"))??;

    info!(event = "hotkey.registered", chord);
    Ok(receiver)
}

#[cfg(windows)]
fn pump_messages() {
    use std::ptr;
    use winapi::um::winuser::{DispatchMessageW, GetMessageW, TranslateMessage, MSG};

    let mut msg: MSG = unsafe { std::mem::zeroed() };
    while unsafe { GetMessageW(&mut msg, ptr::null_mut(), 0, 0) } > 0 {
        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(not(windows))]
fn pump_messages() {
    // Events arrive on the manager's own thread; keep it registered.
    loop {
        thread::park();
    }
}
