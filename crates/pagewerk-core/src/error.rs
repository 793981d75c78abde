// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagewerk.

use std::fmt;

use thiserror::Error;

/// Coarse failure classes reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied arguments were rejected before any work started.
    InvalidArgument,
    /// An image or document could not be opened or decoded.
    ResourceUnavailable,
    /// Writing the output or rendering a page failed.
    IoFailure,
    /// Anything else.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid argument",
            Self::ResourceUnavailable => "resource unavailable",
            Self::IoFailure => "I/O failure",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Top-level error type for all Pagewerk operations.
#[derive(Debug, Error)]
pub enum PagewerkError {
    // -- Argument errors --
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Resource errors --
    #[error("image decoding failed: {0}")]
    ImageDecode(String),

    #[error("document unavailable: {0}")]
    SourceUnavailable(String),

    // -- I/O errors --
    #[error("failed to write document: {0}")]
    Write(String),

    #[error("failed to render page: {0}")]
    Render(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Everything else --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PagewerkError {
    /// Failure class used by the progress protocol.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::ImageDecode(_) | Self::SourceUnavailable(_) => ErrorKind::ResourceUnavailable,
            Self::Write(_) | Self::Render(_) | Self::Io(_) => ErrorKind::IoFailure,
            Self::PdfError(_) | Self::Serialization(_) => ErrorKind::Unknown,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagewerkError>;
