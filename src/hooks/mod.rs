//! Query and mutation hooks.
//!
//! A hook pairs one backend call with the cache bookkeeping around it:
//!
//! - **Reads** compose a [`QueryKey`], answer from the cache while the entry
//!   is fresh, and otherwise fetch and store. A read whose required id is
//!   empty is disabled and returns `Ok(None)` without touching the network.
//! - **Mutations** issue exactly one request. On success they invalidate every
//!   key the change could affect and raise a success notification; on failure
//!   they raise a generic failure notification and return the error.
//!   A mutation of the same kind that is already in flight is rejected with
//!   [`ClientError::MutationPending`] before any request is made.
//!
//! Mutations are not coalesced across kinds: two different callers updating
//! the same entity both reach the backend, and the last response wins.

pub mod notebook;
pub mod presets;
pub mod prompts;
pub mod transformations;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::NotebookApi;
use crate::cache::{QueryCache, QueryKey};
use crate::error::{ClientError, ClientResult};
use crate::notify::{Notification, Notifier};

pub use notebook::NotebookHooks;
pub use presets::PresetHooks;
pub use prompts::PromptHooks;
pub use transformations::TransformationHooks;

const RETRY_HINT: &str = "Please try again.";

/// Handles every hook needs: the backend, the shared cache and the notifier.
#[derive(Clone)]
pub struct HookContext {
    pub api: Arc<dyn NotebookApi>,
    pub cache: Arc<QueryCache>,
    pub notifier: Arc<dyn Notifier>,
}

impl HookContext {
    pub fn new(
        api: Arc<dyn NotebookApi>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    /// Cached read. `enabled` gates the fetch; a disabled read returns `None`.
    pub(crate) async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        enabled: bool,
        fetch: F,
    ) -> ClientResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        if !enabled {
            return Ok(None);
        }
        if let Some(hit) = self.cache.get::<T>(&key) {
            return Ok(Some(hit));
        }
        let value = fetch().await?;
        self.cache.store(key, &value);
        Ok(Some(value))
    }

    /// Run one mutation under its pending flag.
    pub(crate) async fn mutate<T, F, Fut, I>(
        &self,
        flag: &PendingFlag,
        messages: Messages,
        op: F,
        invalidates: I,
    ) -> ClientResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
        I: FnOnce(&T) -> Vec<QueryKey>,
    {
        let _guard = flag.begin()?;
        match op().await {
            Ok(value) => {
                self.cache.invalidate(&invalidates(&value));
                self.notifier
                    .notify(Notification::success(messages.success, ""));
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(operation = flag.name, error = %err, "mutation failed");
                self.notifier
                    .notify(Notification::failure(messages.failure, RETRY_HINT));
                Err(err)
            }
        }
    }
}

/// Titles of the notifications one mutation raises.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Messages {
    pub success: &'static str,
    pub failure: &'static str,
}

/// In-flight marker for one mutation kind.
#[derive(Debug)]
pub struct PendingFlag {
    name: &'static str,
    busy: AtomicBool,
}

impl PendingFlag {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    fn begin(&self) -> ClientResult<PendingGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClientError::MutationPending(self.name));
        }
        Ok(PendingGuard { flag: self })
    }
}

#[derive(Debug)]
struct PendingGuard<'a> {
    flag: &'a PendingFlag,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::SeqCst);
    }
}

/// True when an identifier argument is usable for a request.
pub(crate) fn has_id(id: &str) -> bool {
    !id.trim().is_empty()
}
