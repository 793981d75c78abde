// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error messages shown by the command-line front end.
//
// Every technical error is mapped to a short message with a concrete
// suggestion. Severity drives whether the front end suggests a retry.

use crate::error::PagewerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Disk hiccup or similar; running the command again may work.
    Transient,
    /// The user must change something (arguments, file choice, permissions).
    ActionRequired,
    /// Retrying with the same input will fail the same way.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the user should try next.
    pub suggestion: String,
    /// Whether running the same command again may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PagewerkError` into a `HumanError`.
pub fn humanize_error(err: &PagewerkError) -> HumanError {
    match err {
        PagewerkError::InvalidArgument(detail) => HumanError {
            message: "Those options can't be used.".into(),
            suggestion: format!("Check the command line and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::ImageDecode(_) => HumanError {
            message: "One of the photos couldn't be read.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::SourceUnavailable(detail) => HumanError {
            message: "The document couldn't be opened.".into(),
            suggestion: format!("Make sure the file exists and is a PDF. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewerkError::Write(_) => HumanError {
            message: "The document couldn't be saved.".into(),
            suggestion: "Check that the output folder is writable and the disk isn't full. Any partly written file should be deleted.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PagewerkError::Render(_) => HumanError {
            message: "A page of this document couldn't be shown.".into(),
            suggestion: "The file may be damaged, or it may contain content other than photos.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Pagewerk doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or choose a different location.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        PagewerkError::PdfError(_) => HumanError {
            message: "Something went wrong while building the pages.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PagewerkError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Fix or delete config.json in the Pagewerk data folder.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failure_is_transient() {
        let human = humanize_error(&PagewerkError::Write("disk full".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = PagewerkError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn invalid_argument_carries_detail() {
        let human = humanize_error(&PagewerkError::InvalidArgument("no photos".into()));
        assert!(human.suggestion.contains("no photos"));
    }
}
