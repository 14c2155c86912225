use std::future::Future;

use tokio::sync::oneshot;

use crate::{ExecutorError, Result};

/// Runs `job` on a dedicated OS thread with its own single-threaded tokio runtime.
///
/// V8 isolates cannot leave the thread that created them, so every sandbox
/// lives and dies inside one of these threads and only plain data comes back.
pub(crate) async fn run_isolated<F, Fut, T>(job: F) -> Result<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>>,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    std::thread::Builder::new()
        .name("rung-sandbox".to_string())
        .spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt.block_on(job()),
                Err(e) => Err(ExecutorError::Internal(format!(
                    "Failed to create sandbox runtime: {e}"
                ))),
            };

            // Receiver may be gone if the caller was cancelled
            let _ = tx.send(result);
        })
        .map_err(|e| ExecutorError::Internal(format!("Failed to spawn sandbox thread: {e}")))?;

    rx.await
        .map_err(|_| ExecutorError::Internal("Sandbox thread dropped its result".to_string()))?
}
