//! Concrete telemetry sinks.

pub mod jsonl;

pub use jsonl::JsonlSink;
