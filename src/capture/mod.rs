//! Deferred capture: hits, the sink contract, and the ordering queue.

pub mod hit;
pub mod queue;
pub mod sink;

pub use hit::{Hit, Properties};
pub use queue::{CaptureQueue, Disposition};
pub use sink::TelemetrySink;
