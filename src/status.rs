use std::sync::Arc;
use tokio::sync::watch;

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Error,
}

/// Holds the pipeline state and publishes every transition to subscribers.
///
/// Cloning shares the same state; the front-end keeps one clone for the status
/// bar while the orchestrator drives transitions through another.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    state: Arc<watch::Sender<PipelineState>>,
}

impl Default for StatusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PipelineState::Idle);
        Self {
            state: Arc::new(tx),
        }
    }

    pub fn current(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// `Idle`/`Error` -> `Running`. Leaves the state untouched and fails when a
    /// run is already in progress.
    pub fn begin_run(&self) -> Result<(), ExportError> {
        let started = self.state.send_if_modified(|state| {
            if *state == PipelineState::Running {
                false
            } else {
                *state = PipelineState::Running;
                true
            }
        });
        if started {
            Ok(())
        } else {
            Err(ExportError::RunInProgress)
        }
    }

    /// `Running` -> `Idle`.
    pub fn complete(&self) {
        self.finish(PipelineState::Idle);
    }

    /// `Running` -> `Error`.
    pub fn fail(&self) {
        self.finish(PipelineState::Error);
    }

    fn finish(&self, next: PipelineState) {
        self.state.send_if_modified(|state| {
            if *state == PipelineState::Running {
                *state = next;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        assert_eq!(StatusReporter::new().current(), PipelineState::Idle);
    }

    #[test]
    fn test_run_lifecycle() {
        let status = StatusReporter::new();
        status.begin_run().unwrap();
        assert_eq!(status.current(), PipelineState::Running);
        status.complete();
        assert_eq!(status.current(), PipelineState::Idle);
    }

    #[test]
    fn test_second_run_rejected_while_running() {
        let status = StatusReporter::new();
        status.begin_run().unwrap();
        assert!(matches!(status.begin_run(), Err(ExportError::RunInProgress)));
        assert_eq!(status.current(), PipelineState::Running);
    }

    #[test]
    fn test_error_clears_on_next_run() {
        let status = StatusReporter::new();
        status.begin_run().unwrap();
        status.fail();
        assert_eq!(status.current(), PipelineState::Error);

        status.begin_run().unwrap();
        assert_eq!(status.current(), PipelineState::Running);
    }

    #[test]
    fn test_finish_outside_a_run_is_ignored() {
        let status = StatusReporter::new();
        status.fail();
        assert_eq!(status.current(), PipelineState::Idle);
    }

    #[test]
    fn test_clones_share_state() {
        let status = StatusReporter::new();
        let observer = status.clone();
        status.begin_run().unwrap();
        assert_eq!(observer.current(), PipelineState::Running);
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let status = StatusReporter::new();
        let mut rx = status.subscribe();

        status.begin_run().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), PipelineState::Running);

        status.fail();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), PipelineState::Error);
    }
}
