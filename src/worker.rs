//! Background question analysis
//!
//! Runs classification on a tokio task so the UI keeps drawing while the
//! backend answers, and reports results back over a channel. Only one
//! analysis is in flight at a time: submitting a new question aborts the
//! previous task, so a superseded question never reaches the cache.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::routing::{Classifier, RouteSource, RoutingAnalysis};

/// Messages sent from the analysis task to the main app
#[derive(Debug, Clone)]
pub enum AnalysisMessage {
    /// Classification finished for a question
    Completed {
        question: String,
        analysis: RoutingAnalysis,
        source: RouteSource,
    },
}

/// Handle for submitting questions and receiving their analyses
pub struct AnalysisWorker {
    /// Channel for receiving analysis messages
    pub receiver: mpsc::Receiver<AnalysisMessage>,
    /// Sender cloned into each spawned task
    sender: mpsc::Sender<AnalysisMessage>,
    /// Currently running analysis, if any
    in_flight: Option<JoinHandle<()>>,
}

impl Default for AnalysisWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisWorker {
    /// Creates an idle worker
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(8);
        Self {
            receiver,
            sender,
            in_flight: None,
        }
    }

    /// Starts classifying `question`, aborting any analysis still running
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, classifier: Classifier, question: String) {
        self.cancel();
        debug!(question = %question, "submitting question for analysis");

        let tx = self.sender.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let (analysis, source) = classifier.classify_with_fallback(&question).await;
            let _ = tx
                .send(AnalysisMessage::Completed {
                    question,
                    analysis,
                    source,
                })
                .await;
        }));
    }

    /// Aborts the running analysis, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Whether an analysis task is still running
    pub fn is_busy(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Checks for a finished analysis without blocking
///
/// # Returns
/// * `Some(AnalysisMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(worker: &mut AnalysisWorker) -> Option<AnalysisMessage> {
    worker.receiver.try_recv().ok()
}
