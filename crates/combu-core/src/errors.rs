//! Structured error types shared across combu crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`CombuError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (key names, arities, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for combination generation and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum CombuError {
    /// A key named by an order, plan or pack is absent from the parameters.
    #[error("key error: {0}")]
    Key(ErrorInfo),
    /// A candidate does not fit the shape of its key.
    #[error("type error: {0}")]
    Type(ErrorInfo),
    /// A record was rejected by the operation it was built for.
    #[error("argument error: {0}")]
    Argument(ErrorInfo),
    /// Failure raised by a target operation or a hook.
    #[error("target error: {0}")]
    Target(ErrorInfo),
    /// Worker pool failures, including panics raised inside a worker.
    #[error("worker error: {0}")]
    Worker(ErrorInfo),
    /// Invalid execution options.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Combination count does not fit the platform word size.
    #[error("overflow error: {0}")]
    Overflow(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl CombuError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            CombuError::Key(info)
            | CombuError::Type(info)
            | CombuError::Argument(info)
            | CombuError::Target(info)
            | CombuError::Worker(info)
            | CombuError::Config(info)
            | CombuError::Overflow(info)
            | CombuError::Serde(info) => info,
        }
    }

    /// Wraps an arbitrary failure from a target operation or hook.
    pub fn target(err: impl ToString) -> Self {
        CombuError::Target(ErrorInfo::new("target", err.to_string()))
    }

    /// Reports a missing or unexpected argument name.
    pub fn argument(code: &str, name: impl Into<String>, message: impl Into<String>) -> Self {
        CombuError::Argument(ErrorInfo::new(code, message).with_context("name", name))
    }
}
