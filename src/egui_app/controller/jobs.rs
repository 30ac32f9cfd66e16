use crate::classifier::{
    ClassifierClient, ClassifierError, ClassifierOutcome, ClassifierRequest, RequestKind,
};
use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::mpsc::{Receiver, Sender},
    thread,
};

type TryRecvError = std::sync::mpsc::TryRecvError;
type JobOutcome = Result<ClassifierOutcome, ClassifierError>;

#[derive(Debug)]
pub(crate) struct ClassifierJobResult {
    pub(crate) kind: RequestKind,
    pub(crate) result: JobOutcome,
}

/// Runs classifier requests off the UI thread, one at a time.
pub(crate) struct ClassifierJobs {
    message_tx: Sender<ClassifierJobResult>,
    message_rx: Receiver<ClassifierJobResult>,
    in_progress: Option<RequestKind>,
}

impl ClassifierJobs {
    pub(crate) fn new() -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel();
        Self {
            message_tx,
            message_rx,
            in_progress: None,
        }
    }

    pub(crate) fn in_progress(&self) -> Option<RequestKind> {
        self.in_progress
    }

    /// Start a request; returns `false` without sending when one is already running.
    pub(crate) fn begin(&mut self, client: ClassifierClient, request: ClassifierRequest) -> bool {
        let kind = request.kind();
        self.spawn(kind, move || client.send(&request))
    }

    /// Run `work` on a worker thread. A panic is delivered as a failed result so the
    /// in-flight slot is always released.
    fn spawn<F>(&mut self, kind: RequestKind, work: F) -> bool
    where
        F: FnOnce() -> JobOutcome + Send + 'static,
    {
        if self.in_progress.is_some() {
            return false;
        }
        self.in_progress = Some(kind);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!("{} worker panicked: {message}", kind.as_str());
                Err(ClassifierError::Worker(message))
            });
            let _ = tx.send(ClassifierJobResult { kind, result });
        });
        true
    }

    pub(crate) fn try_recv(&mut self) -> Result<ClassifierJobResult, TryRecvError> {
        let message = self.message_rx.try_recv()?;
        self.in_progress = None;
        Ok(message)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic payload".to_string()
    }
}
