// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress protocol shared by the encoder and the decoder.
//
// Order of events for one invocation:
//
//   on_start → on_progress(1..=total) → [on_save_file, encoder only]
//            → on_success | on_fail
//
// A precondition failure skips straight to on_fail. Exactly one terminal
// event is delivered per invocation. All events fire synchronously on the
// thread running the pipeline.

use pagewerk_core::{PagewerkError, ProgressEvent};

/// Receives pipeline events. Every method defaults to a no-op, so an
/// implementation only overrides what it cares about.
///
/// `T` is the success payload: a path for the encoder, the rendered pages for
/// the decoder.
pub trait ProgressReporter<T: ?Sized> {
    fn on_start(&mut self) {}

    fn on_progress(&mut self, _event: ProgressEvent) {}

    /// All pages are finished and the document is about to be written.
    fn on_save_file(&mut self) {}

    fn on_success(&mut self, _result: &T) {}

    /// `error.kind()` gives the failure class.
    fn on_fail(&mut self, _error: &PagewerkError) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl<T: ?Sized> ProgressReporter<T> for NoProgress {}

/// Event as observed by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    Start,
    Progress(ProgressEvent),
    SaveFile,
    Success,
    Fail(pagewerk_core::ErrorKind),
}

/// Keeps every event it receives, in order. Useful for tests and for front
/// ends that replay progress after the fact.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    pub events: Vec<RecordedEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of all progress events, in delivery order.
    pub fn progress_indices(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Progress(p) => Some(p.index),
                _ => None,
            })
            .collect()
    }

    /// Number of `on_success` plus `on_fail` events.
    pub fn terminal_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, RecordedEvent::Success | RecordedEvent::Fail(_)))
            .count()
    }
}

impl<T: ?Sized> ProgressReporter<T> for RecordingReporter {
    fn on_start(&mut self) {
        self.events.push(RecordedEvent::Start);
    }

    fn on_progress(&mut self, event: ProgressEvent) {
        self.events.push(RecordedEvent::Progress(event));
    }

    fn on_save_file(&mut self) {
        self.events.push(RecordedEvent::SaveFile);
    }

    fn on_success(&mut self, _result: &T) {
        self.events.push(RecordedEvent::Success);
    }

    fn on_fail(&mut self, error: &PagewerkError) {
        self.events.push(RecordedEvent::Fail(error.kind()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewerk_core::ErrorKind;
    use std::path::Path;

    struct CountStarts(usize);

    impl ProgressReporter<Path> for CountStarts {
        fn on_start(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn unimplemented_handlers_are_silent() {
        let mut reporter = CountStarts(0);
        reporter.on_start();
        reporter.on_progress(ProgressEvent { index: 1, total: 1 });
        reporter.on_save_file();
        reporter.on_success(Path::new("/tmp/out.pdf"));
        assert_eq!(reporter.0, 1);
    }

    #[test]
    fn recording_keeps_order() {
        let mut recorder = RecordingReporter::new();
        {
            let reporter: &mut dyn ProgressReporter<Path> = &mut recorder;
            reporter.on_start();
            reporter.on_progress(ProgressEvent { index: 1, total: 2 });
            reporter.on_progress(ProgressEvent { index: 2, total: 2 });
            reporter.on_fail(&PagewerkError::Write("disk full".into()));
        }
        assert_eq!(recorder.events.first(), Some(&RecordedEvent::Start));
        assert_eq!(recorder.progress_indices(), vec![1, 2]);
        assert_eq!(
            recorder.events.last(),
            Some(&RecordedEvent::Fail(ErrorKind::IoFailure))
        );
        assert_eq!(recorder.terminal_count(), 1);
    }
}
