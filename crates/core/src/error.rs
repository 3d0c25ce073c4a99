// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The crate-spanning error type and its wire-stable `code` string.

use serde::Serialize;
use thiserror::Error;

/// Stable error classification shared by every layer of the daemon.
///
/// `Display` yields the exact kebab-case `code` string sent to clients in
/// error replies, per §7 of the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Validation,
    SanitizationBlock,
    SanitizationWarn,
    DepthExceeded,
    Unauthorized,
    NotFound,
    InvalidStateTransition,
    RateLimited,
    Dedup,
    CircuitOpen,
    Timeout,
    Io,
    Internal,
}

crate::simple_display! {
    ErrorKind {
        Validation => "validation",
        SanitizationBlock => "sanitization-block",
        SanitizationWarn => "sanitization-warn",
        DepthExceeded => "depth-exceeded",
        Unauthorized => "unauthorized",
        NotFound => "not-found",
        InvalidStateTransition => "invalid-state-transition",
        RateLimited => "rate-limited",
        Dedup => "dedup",
        CircuitOpen => "circuit-open",
        Timeout => "timeout",
        Io => "io",
        Internal => "internal",
    }
}

/// The daemon's one crate-spanning error type.
///
/// Handlers return this; the router converts it into the wire `error`
/// reply shape using [`HubError::kind`] as the stable `code`.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct HubError {
    pub kind: ErrorKind,
    pub message: String,
}

impl HubError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> String {
        self.kind.to_string()
    }
}

macro_rules! kind_ctor {
    ($fn_name:ident, $variant:ident) => {
        impl HubError {
            pub fn $fn_name(message: impl Into<String>) -> Self {
                Self::new(ErrorKind::$variant, message)
            }
        }
    };
}

kind_ctor!(validation, Validation);
kind_ctor!(sanitization_block, SanitizationBlock);
kind_ctor!(depth_exceeded, DepthExceeded);
kind_ctor!(unauthorized, Unauthorized);
kind_ctor!(not_found, NotFound);
kind_ctor!(invalid_state_transition, InvalidStateTransition);
kind_ctor!(rate_limited, RateLimited);
kind_ctor!(dedup, Dedup);
kind_ctor!(circuit_open, CircuitOpen);
kind_ctor!(timeout, Timeout);
kind_ctor!(io, Io);
kind_ctor!(internal, Internal);

impl From<std::io::Error> for HubError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorKind::Validation, e.to_string())
    }
}

pub type HubResult<T> = Result<T, HubError>;
