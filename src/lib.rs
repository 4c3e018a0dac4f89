//! Proofscribe — select text anywhere, fix it with a hotkey.
//!
//! Two services cooperate over an action-tagged [`relay`]:
//!
//! * the **background** half ([`background::Background`]) listens for global
//!   hotkeys and owns the [`remote`] transcription / proofreading client;
//! * the **content** half ([`content::ContentContext`]) is attached to a
//!   [`page`](crate::page::HostPage), captures selections, runs the
//!   recording [`modal`] and splices result text back in place.
//!
//! The split mirrors a privilege boundary: only the background side holds
//! the API credential, only the content side can touch page text.

pub mod audio;
pub mod background;
pub mod config;
pub mod content;
pub mod hotkey;
pub mod modal;
pub mod page;
pub mod relay;
pub mod remote;
pub mod selection;
