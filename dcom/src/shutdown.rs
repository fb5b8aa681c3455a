use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A handle to an async task. The task is shut down when the handle is dropped.
#[derive(Debug)]
pub(crate) struct TaskHandle {
    tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawn the future built by `create` onto the current runtime
    ///
    /// The future receives the shutdown channel and must return once it is closed.
    pub(crate) fn spawn<F, T>(create: F) -> Self
    where
        F: FnOnce(mpsc::Receiver<()>) -> T,
        T: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(create(rx));
        Self { tx, handle }
    }

    /// Close the shutdown channel and wait for the task to exit
    pub(crate) async fn shutdown(self) {
        let Self { tx, handle } = self;
        drop(tx);
        if let Err(err) = handle.await {
            tracing::warn!("task did not exit cleanly: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_waits_for_task_exit() {
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        let handle = TaskHandle::spawn(|mut rx| async move {
            let _ = rx.recv().await;
            let _ = done_tx.send(()).await;
        });

        handle.shutdown().await;
        assert!(done_rx.try_recv().is_ok());
    }
}
