//! Deferred analytics capture.
//!
//! Page views and events recorded before the user's identity is known are
//! held in a [`capture::CaptureQueue`] and replayed in arrival order once
//! identity resolves; after that every hit goes straight to the
//! [`capture::TelemetrySink`].

pub mod analytics;
pub mod capture;
#[cfg(feature = "cli")]
pub mod cli_app;
pub mod core;
pub mod logger;
pub mod replay;
pub mod sinks;

pub use crate::capture::{CaptureQueue, Disposition, Hit, Properties, TelemetrySink};
pub use crate::core::errors::{DcapError, Result};
