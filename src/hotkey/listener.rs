//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! `rdev::listen` blocks for the life of the process and cannot run inside a
//! tokio task, so [`HotkeyListener::start`] spawns it on its own thread.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has no graceful shutdown API.  Dropping the listener sets a
//! stop flag so the callback discards further events; the OS thread itself
//! stays blocked in the rdev event loop until process exit, holding no
//! resources that need cleanup.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::UserCommand;

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

/// Handle to a running hotkey listener thread.
///
/// Drop it to stop forwarding commands.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    // Never joined; rdev::listen never returns.
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn the listener thread watching two bindings.
    ///
    /// * `toggle_key` — emits [`UserCommand::ToggleTranscriptionUi`] on release.
    /// * `proofread_key` — emits [`UserCommand::ProofreadSelection`] on release.
    ///
    /// Commands are forwarded over `tx` with `blocking_send`, which is the
    /// correct way to feed a tokio channel from a plain OS thread.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread.
    pub fn start(
        toggle_key: rdev::Key,
        proofread_key: rdev::Key,
        tx: mpsc::Sender<UserCommand>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }

                    let rdev::EventType::KeyRelease(k) = event.event_type else {
                        return;
                    };

                    let command = if k == toggle_key {
                        UserCommand::ToggleTranscriptionUi
                    } else if k == proofread_key {
                        UserCommand::ProofreadSelection
                    } else {
                        return;
                    };

                    if tx.blocking_send(command).is_err() {
                        log::debug!("hotkey-listener: command channel closed");
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                }
            })
            .expect("failed to spawn hotkey-listener thread");

        Self {
            stop,
            _thread: thread,
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
