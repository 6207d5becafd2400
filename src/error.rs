/*
Copyright 2024-2025 The Airport Flight Authors

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

     https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The error taxonomy from the protocol design: every failure in the crate
//! is tagged with an [`ErrorKind`] and converted to a [`tonic::Status`] at
//! the RPC boundary. User-code errors are surfaced as `internal` unless
//! they carry a recognized sentinel kind.

use snafu::Snafu;

/// The closed taxonomy of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    Unauthenticated,
    Forbidden,
    NotFound,
    AlreadyExists,
    Precondition,
    Unimplemented,
    Timeout,
    NullRowid,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub fn as_tonic_code(self) -> tonic::Code {
        match self {
            ErrorKind::InvalidArgument => tonic::Code::InvalidArgument,
            ErrorKind::Unauthenticated => tonic::Code::Unauthenticated,
            ErrorKind::Forbidden => tonic::Code::PermissionDenied,
            ErrorKind::NotFound => tonic::Code::NotFound,
            ErrorKind::AlreadyExists => tonic::Code::AlreadyExists,
            ErrorKind::Precondition => tonic::Code::FailedPrecondition,
            ErrorKind::Unimplemented => tonic::Code::Unimplemented,
            ErrorKind::Timeout => tonic::Code::DeadlineExceeded,
            ErrorKind::NullRowid => tonic::Code::InvalidArgument,
            ErrorKind::Internal => tonic::Code::Internal,
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AirportError {
    #[snafu(display("invalid argument: {message}"))]
    InvalidArgument { message: String },

    #[snafu(display("unauthenticated: {message}"))]
    Unauthenticated { message: String },

    #[snafu(display("forbidden: {message}"))]
    Forbidden { message: String },

    #[snafu(display("not found: {message}"))]
    NotFound { message: String },

    #[snafu(display("already exists: {message}"))]
    AlreadyExists { message: String },

    #[snafu(display("precondition failed: {message}"))]
    Precondition { message: String },

    #[snafu(display("unimplemented: {message}"))]
    Unimplemented { message: String },

    #[snafu(display("timeout: {message}"))]
    Timeout { message: String },

    #[snafu(display("null rowid in {table} during {operation}"))]
    NullRowid { table: String, operation: String },

    #[snafu(display("internal error: {message}"))]
    Internal { message: String },
}

impl AirportError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AirportError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            AirportError::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            AirportError::Forbidden { .. } => ErrorKind::Forbidden,
            AirportError::NotFound { .. } => ErrorKind::NotFound,
            AirportError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            AirportError::Precondition { .. } => ErrorKind::Precondition,
            AirportError::Unimplemented { .. } => ErrorKind::Unimplemented,
            AirportError::Timeout { .. } => ErrorKind::Timeout,
            AirportError::NullRowid { .. } => ErrorKind::NullRowid,
            AirportError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AirportError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AirportError::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        AirportError::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        AirportError::Precondition {
            message: message.into(),
        }
    }

    pub fn unimplemented(message: impl Into<String>) -> Self {
        AirportError::Unimplemented {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AirportError::Internal {
            message: message.into(),
        }
    }

    /// Wraps an opaque user-storage error as `internal`, per the
    /// propagation policy: user errors are `internal` unless they already
    /// carry a recognized sentinel kind.
    pub fn from_user_error(err: impl std::fmt::Display) -> Self {
        AirportError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T, E = AirportError> = std::result::Result<T, E>;

impl From<AirportError> for tonic::Status {
    fn from(err: AirportError) -> Self {
        tracing::debug!(kind = ?err.kind(), %err, "airport request failed");
        tonic::Status::new(err.kind().as_tonic_code(), err.to_string())
    }
}
