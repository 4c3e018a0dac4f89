//! Global hotkeys that drive the background service, backed by `rdev`.
//!
//! Two bindings exist: one toggles the transcription surface, one triggers
//! proofreading of the current selection.  Both fire on key *release* so a
//! held key does not auto-repeat into a burst of commands.
//!
//! `rdev::listen()` blocks forever and therefore runs on a dedicated OS
//! thread owned by [`HotkeyListener`]; see [`listener`] for the shutdown
//! caveats.

pub mod listener;

pub use listener::HotkeyListener;

// ---------------------------------------------------------------------------
// UserCommand
// ---------------------------------------------------------------------------

/// Commands produced by hotkey activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Open the transcription surface, or stop it if already recording.
    ToggleTranscriptionUi,
    /// Proofread whatever text is currently selected.
    ProofreadSelection,
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a config string (`"F9"`, `"Escape"`, `"a"`) into an [`rdev::Key`].
///
/// Returns `None` for unrecognized names; callers fall back to the default
/// binding and warn.
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    function_key(name)
        .or_else(|| named_key(name))
        .or_else(|| letter_key(name))
}

fn function_key(name: &str) -> Option<rdev::Key> {
    let n: u8 = name.strip_prefix('F')?.parse().ok()?;
    use rdev::Key::*;
    Some(match n {
        1 => F1,
        2 => F2,
        3 => F3,
        4 => F4,
        5 => F5,
        6 => F6,
        7 => F7,
        8 => F8,
        9 => F9,
        10 => F10,
        11 => F11,
        12 => F12,
        _ => return None,
    })
}

fn named_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key::*;
    Some(match name {
        "Escape" | "Esc" => Escape,
        "Space" => Space,
        "Return" | "Enter" => Return,
        "Tab" => Tab,
        "Backspace" => Backspace,
        "Delete" | "Del" => Delete,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "Up" | "UpArrow" => UpArrow,
        "Down" | "DownArrow" => DownArrow,
        "Left" | "LeftArrow" => LeftArrow,
        "Right" | "RightArrow" => RightArrow,
        "Pause" => Pause,
        _ => return None,
    })
}

fn letter_key(name: &str) -> Option<rdev::Key> {
    let mut chars = name.chars();
    let c = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() {
        return None;
    }
    use rdev::Key::*;
    Some(match c {
        'a' => KeyA,
        'b' => KeyB,
        'c' => KeyC,
        'd' => KeyD,
        'e' => KeyE,
        'f' => KeyF,
        'g' => KeyG,
        'h' => KeyH,
        'i' => KeyI,
        'j' => KeyJ,
        'k' => KeyK,
        'l' => KeyL,
        'm' => KeyM,
        'n' => KeyN,
        'o' => KeyO,
        'p' => KeyP,
        'q' => KeyQ,
        'r' => KeyR,
        's' => KeyS,
        't' => KeyT,
        'u' => KeyU,
        'v' => KeyV,
        'w' => KeyW,
        'x' => KeyX,
        'y' => KeyY,
        'z' => KeyZ,
        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
