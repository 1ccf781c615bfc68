//! Enable gates: a host-controlled switch per site.
//!
//! A site without a gate is always enabled. A gate that cannot be resolved
//! right now yields [`GateError`], which the engine treats as "skip this
//! tick" rather than as enabled or disabled.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error returned when a gate's value cannot be determined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("enable gate {gate} unavailable: {reason}")]
pub struct GateError {
    gate: String,
    reason: String,
}

/// A boolean the host controls to pause fetching for a site.
pub trait EnableGate: fmt::Debug + Send + Sync {
    /// Current value, or an error if it cannot be resolved right now.
    fn is_enabled(&self) -> Result<bool, GateError>;
}

/// In-memory gate, flipped by whoever holds a clone.
#[derive(Debug, Clone)]
pub struct SwitchGate(Arc<AtomicBool>);

impl SwitchGate {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::SeqCst);
    }
}

impl EnableGate for SwitchGate {
    fn is_enabled(&self) -> Result<bool, GateError> {
        Ok(self.0.load(Ordering::SeqCst))
    }
}

/// Gate backed by a small text file holding `on` or `off`.
///
/// `on`/`true`/`1` and `off`/`false`/`0` are accepted, case-insensitively.
/// A missing file or any other content is unavailable, not disabled.
#[derive(Debug, Clone)]
pub struct FlagFileGate {
    path: PathBuf,
}

impl FlagFileGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn error(&self, reason: impl Into<String>) -> GateError {
        GateError {
            gate: self.path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl EnableGate for FlagFileGate {
    fn is_enabled(&self) -> Result<bool, GateError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.error(e.to_string()))?;

        match contents.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Ok(true),
            "off" | "false" | "0" => Ok(false),
            other => Err(self.error(format!("unrecognized value {other:?}"))),
        }
    }
}
