//! Remote transcription / proofreading API.
//!
//! * [`Transcribe`] / [`Proofread`] — async traits implemented by all
//!   backends, mockable in tests.
//! * [`ApiClient`] — the production HTTP client (multipart upload for
//!   transcription, JSON body for proofreading, bearer credential on both).
//! * [`ApiError`] — error variants for remote operations.
//!
//! Both calls are plain request/response wrappers: no retries, no timeout
//! override; failures propagate as one error value to the caller.

pub mod client;

pub use client::{ApiClient, ApiError, Proofread, Transcribe};
