use std::future::Future;

use futures::FutureExt;
use tokio::task::JoinHandle;

use crate::error::AppError;

use super::FetchResult;

/// A spawned request owned by the view that started it.
///
/// Dropping the owner aborts the task, so a result can never land in a view
/// that has already been torn down.
pub struct ScopedTask<T> {
    handle: Option<JoinHandle<FetchResult<T>>>,
}

impl<T: Send + 'static> ScopedTask<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = FetchResult<T>> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    /// An empty slot that never yields.
    pub fn idle() -> Self {
        Self { handle: None }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Collect the result once the task has finished, without blocking.
    pub fn try_take(&mut self) -> Option<FetchResult<T>> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        self.poll_once()
    }

    /// Poll the handle in place. It leaves the slot only when a result is ready,
    /// since a finished task can still report pending once the coop budget is spent.
    fn poll_once(&mut self) -> Option<FetchResult<T>> {
        let joined = self.handle.as_mut()?.now_or_never()?;
        self.handle = None;
        Some(match joined {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => Err(AppError::Cancelled),
            Err(join_err) => Err(join_err.into()),
        })
    }

    /// Wait for the result, for flows that block on a single request.
    pub async fn join(mut self) -> FetchResult<T> {
        let Some(handle) = self.handle.take() else {
            return Err(AppError::Cancelled);
        };
        match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_cancelled() => Err(AppError::Cancelled),
            Err(join_err) => Err(join_err.into()),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for ScopedTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
