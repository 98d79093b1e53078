//! Bounded exponential-backoff retry for rate-limit-class failures.
//!
//! Only [`RemoteError::RateLimited`] is retried; every other failure
//! propagates immediately to the caller's per-path error handling.

use super::{RemoteItem, RemoteStore};
use crate::types::RemoteError;
use log::warn;
use std::time::Duration;

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_BASE_DELAY_MS: u64 = 500;

/// Decorator adding backoff retry to any [`RemoteStore`].
///
/// Backoff schedule with the defaults: 500ms, 1s, 2s, 4s, 8s.
pub struct RetryingStore<S> {
    inner: S,
    max_retries: u32,
    base_delay: Duration,
}

impl<S: RemoteStore> RetryingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }

    /// Override the retry budget and base delay (mainly for tests).
    pub fn with_schedule(inner: S, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn with_retry<T>(
        &self,
        operation: &str,
        mut call: impl FnMut(&S) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut attempt = 0;
        loop {
            match call(&self.inner) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    warn!(
                        "{} rate limited, retrying in {:?} (attempt {}/{})",
                        operation,
                        delay,
                        attempt + 1,
                        self.max_retries
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl<S: RemoteStore> RemoteStore for RetryingStore<S> {
    fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        self.with_retry("list_children", |s| s.list_children(folder_id))
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, RemoteError> {
        self.with_retry("create_folder", |s| s.create_folder(name, parent_id))
    }

    fn upload_file(
        &self,
        name: &str,
        content: &[u8],
        mime_type: &str,
        parent_id: &str,
    ) -> Result<String, RemoteError> {
        self.with_retry("upload_file", |s| {
            s.upload_file(name, content, mime_type, parent_id)
        })
    }

    fn update_file(
        &self,
        id: &str,
        content: &[u8],
        mime_type: &str,
    ) -> Result<String, RemoteError> {
        self.with_retry("update_file", |s| s.update_file(id, content, mime_type))
    }

    fn download_file(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        self.with_retry("download_file", |s| s.download_file(id))
    }

    fn delete_file(&self, id: &str) -> Result<(), RemoteError> {
        self.with_retry("delete_file", |s| s.delete_file(id))
    }
}
