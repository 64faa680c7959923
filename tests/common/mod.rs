//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use deferred_capture::{DcapError, Properties, Result, TelemetrySink};
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PageView(String, Properties),
    Event(String, Properties),
}

/// Sink double that records calls and can fail emits whose name or uri
/// matches `fail_on`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<String>,
}

impl RecordingSink {
    pub fn failing_on(label: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(label.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| match call {
                Call::PageView(label, _) | Call::Event(label, _) => label,
            })
            .collect()
    }

    fn push(&self, operation: &'static str, label: &str, call: Call) -> Result<()> {
        if self.fail_on.as_deref() == Some(label) {
            return Err(DcapError::Sink {
                sink: "recording",
                operation,
                details: format!("refusing {label}"),
            });
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl TelemetrySink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn emit_pageview(&self, uri: &str, properties: &Properties) -> Result<()> {
        self.push(
            "emit_pageview",
            uri,
            Call::PageView(uri.to_string(), properties.clone()),
        )
    }

    fn emit_event(&self, name: &str, properties: &Properties) -> Result<()> {
        self.push(
            "emit_event",
            name,
            Call::Event(name.to_string(), properties.clone()),
        )
    }
}

/// Result of one `dcap` invocation.
pub struct CliResult {
    pub output: Output,
    pub stdout: String,
    pub stderr: String,
}

pub fn run_dcap(args: &[&str], cwd: &Path) -> CliResult {
    let output = Command::new(env!("CARGO_BIN_EXE_dcap"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn dcap");
    CliResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        output,
    }
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
