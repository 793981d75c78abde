// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline runner — executes an encoder or decoder job on a blocking worker
// thread and shows its progress on the terminal.
//
// The job reports through a `ChannelReporter`, which forwards every event over
// an unbounded channel. The async side is the single consumer and drives an
// `indicatif` progress bar. The channel closes when the job returns and drops
// its reporter.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pagewerk_core::error::{PagewerkError, Result};
use pagewerk_core::{ErrorKind, ProgressEvent};
use pagewerk_document::ProgressReporter;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, instrument};

/// Progress event as seen by the presentation side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Start,
    Progress(ProgressEvent),
    SaveFile,
    Finished,
    Failed(ErrorKind),
}

/// Forwards pipeline events to the presentation task.
pub struct ChannelReporter {
    tx: UnboundedSender<PipelineEvent>,
}

impl ChannelReporter {
    pub fn new(tx: UnboundedSender<PipelineEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: PipelineEvent) {
        // The receiver only goes away if the presentation task has stopped.
        if self.tx.send(event).is_err() {
            debug!("Progress receiver closed");
        }
    }
}

impl<T: ?Sized> ProgressReporter<T> for ChannelReporter {
    fn on_start(&mut self) {
        self.send(PipelineEvent::Start);
    }

    fn on_progress(&mut self, event: ProgressEvent) {
        self.send(PipelineEvent::Progress(event));
    }

    fn on_save_file(&mut self) {
        self.send(PipelineEvent::SaveFile);
    }

    fn on_success(&mut self, _result: &T) {
        self.send(PipelineEvent::Finished);
    }

    fn on_fail(&mut self, error: &PagewerkError) {
        self.send(PipelineEvent::Failed(error.kind()));
    }
}

/// Run `job` on the blocking thread pool, presenting its events under
/// `label`, and return its result.
#[instrument(skip(job))]
pub async fn run_blocking<T, F>(label: &'static str, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut ChannelReporter) -> Result<T> + Send + 'static,
{
    let (tx, rx) = unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || {
        let mut reporter = ChannelReporter::new(tx);
        job(&mut reporter)
    });

    present(label, rx).await;

    worker
        .await
        .map_err(|err| PagewerkError::Io(std::io::Error::other(format!("worker failed: {err}"))))?
}

async fn present(label: &'static str, mut rx: UnboundedReceiver<PipelineEvent>) {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::Start => {
                bar.set_message(label);
                bar.enable_steady_tick(Duration::from_millis(120));
            }
            PipelineEvent::Progress(ProgressEvent { index, total }) => {
                bar.set_length(total as u64);
                bar.set_position(index as u64);
            }
            PipelineEvent::SaveFile => bar.set_message("Saving document..."),
            PipelineEvent::Finished => bar.finish_with_message("Done"),
            PipelineEvent::Failed(kind) => bar.abandon_with_message(format!("Failed: {kind}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn reporter_forwards_in_order() {
        let (tx, mut rx) = unbounded_channel();
        let mut reporter = ChannelReporter::new(tx);
        {
            let r: &mut dyn ProgressReporter<Path> = &mut reporter;
            r.on_start();
            r.on_progress(ProgressEvent { index: 1, total: 1 });
            r.on_save_file();
            r.on_success(Path::new("/tmp/x.pdf"));
        }
        drop(reporter);

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                PipelineEvent::Start,
                PipelineEvent::Progress(ProgressEvent { index: 1, total: 1 }),
                PipelineEvent::SaveFile,
                PipelineEvent::Finished,
            ]
        );
    }

    #[test]
    fn closed_receiver_is_not_fatal() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut reporter = ChannelReporter::new(tx);
        ProgressReporter::<Path>::on_fail(&mut reporter, &PagewerkError::Render("x".into()));
    }

    #[tokio::test]
    async fn job_result_comes_back() {
        let value = run_blocking("test", |reporter| {
            ProgressReporter::<Path>::on_start(reporter);
            ProgressReporter::<Path>::on_success(reporter, Path::new("/tmp"));
            Ok(42)
        })
        .await
        .unwrap();
        assert_eq!(value, 42);

        let err = run_blocking::<(), _>("test", |_| Err(PagewerkError::Write("full".into())))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }
}
