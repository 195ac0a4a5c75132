//! Background work handles polled from the UI thread.

use crate::error::{Error, Result};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// A result that will be produced by a worker thread.
///
/// Dropping the handle abandons the result; the worker finishes on its own.
#[derive(Debug)]
pub struct Job<T> {
    rx: Receiver<Result<T>>,
}

impl<T: Send + 'static> Job<T> {
    pub fn spawn<F>(name: &str, work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                // receiver may be gone if the job was abandoned
                let _ = tx.send(work());
            });
        if let Err(e) = spawned {
            tracing::error!("could not start worker {name}: {e}");
        }
        Self { rx }
    }

    /// A job that is already complete.
    pub fn ready(value: Result<T>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(value);
        Self { rx }
    }

    /// Non-blocking; `None` while the worker is still busy.
    pub fn poll(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::WorkerDisconnected)),
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| Error::WorkerDisconnected)?
    }
}
