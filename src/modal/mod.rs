//! Recording surface state machine.
//!
//! [`ModalController`] orchestrates an [`AudioSession`](crate::audio::AudioSession)
//! and a [`Transcribe`](crate::remote::Transcribe) backend through the
//! states of the floating transcription surface:
//!
//! ```text
//! Idle (not shown) ──open──▶ Recording ──stop──▶ Processing ──ok──▶ Closed
//!                     │                              └──err──▶ Failed
//!                     └──start error──▶ Closed
//! any state ──cancel──▶ Closed
//! ```
//!
//! No timers are modeled; every transition is driven by an explicit user or
//! platform event.

pub mod controller;

pub use controller::{ModalController, ModalEvent, ModalPhase, ModalState};
