//! Async synchronization store.
//!
//! Drives a [`StoreState`] through a [`Remote`]: each action records that it
//! started, awaits the server, then settles the state with the outcome. Every
//! step is a single atomic state replacement published to all subscribers,
//! so optimistic changes are visible before the server answers.

use super::selector::Selector;
use crate::api::ApiError;
use crate::remote::{Remote, RestRemote};
use chrono::Utc;
use optimist_engine::{QueryParams, Resource, Settlement, StoreState};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cached, optimistically updated view of a remote collection.
///
/// Cheap to clone; all clones share one state.
pub struct SyncStore<R: Resource, B = RestRemote<R>> {
    remote: Arc<B>,
    state: Arc<watch::Sender<StoreState<R>>>,
}

impl<R: Resource, B> Clone for SyncStore<R, B> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: Resource, B: Remote<R>> SyncStore<R, B> {
    /// Create a store with empty initial state.
    pub fn new(remote: B) -> Self {
        let (state, _) = watch::channel(StoreState::new());
        Self {
            remote: Arc::new(remote),
            state: Arc::new(state),
        }
    }

    /// The remote this store synchronizes with.
    pub fn remote(&self) -> &B {
        &self.remote
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> StoreState<R> {
        self.state.borrow().clone()
    }

    /// Read the current state without copying it.
    pub fn with_state<T>(&self, read: impl FnOnce(&StoreState<R>) -> T) -> T {
        read(&self.state.borrow())
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<R>> {
        self.state.subscribe()
    }

    /// Watch one slice of the state; wakes only when that slice changes.
    pub fn select<T, F>(&self, select: F) -> Selector<R, T, F>
    where
        T: Clone + PartialEq,
        F: Fn(&StoreState<R>) -> T,
    {
        Selector::new(self.state.subscribe(), select)
    }

    // =================== FETCH OPERATIONS ===================

    /// Replace the collection with a page from the server.
    ///
    /// On failure the collection is emptied and the general error set.
    pub async fn fetch_list(&self, params: Option<QueryParams>) {
        self.fetch_list_with_cancel(params, &CancellationToken::new())
            .await
    }

    /// [`fetch_list`](Self::fetch_list) that gives up when `cancel` fires,
    /// leaving the collection as it was.
    pub async fn fetch_list_with_cancel(
        &self,
        params: Option<QueryParams>,
        cancel: &CancellationToken,
    ) {
        let params = params.unwrap_or_default();
        self.modify(|s| s.begin_fetch_list());

        let outcome = self
            .call("fetch_list", cancel, self.remote.list(&params))
            .await;
        if let Settlement::Confirmed(records) = &outcome {
            debug!(kind = R::KIND, count = records.len(), "list fetched");
        }

        self.modify(|s| s.settle_fetch_list(outcome, params.page, params.limit));
    }

    /// Select one record fetched from the server.
    ///
    /// On failure the selection is cleared; the collection is never touched.
    pub async fn fetch_detail(&self, id: &str) {
        self.fetch_detail_with_cancel(id, &CancellationToken::new())
            .await
    }

    /// [`fetch_detail`](Self::fetch_detail) that gives up when `cancel` fires.
    pub async fn fetch_detail_with_cancel(&self, id: &str, cancel: &CancellationToken) {
        self.modify(|s| s.begin_fetch_detail());
        let outcome = self.call("fetch_detail", cancel, self.remote.get(id)).await;
        self.modify(|s| s.settle_fetch_detail(outcome));
    }

    /// Replace the collection with search matches.
    ///
    /// Unlike [`fetch_list`](Self::fetch_list), a failed search keeps the
    /// collection and only sets the general error.
    pub async fn search(&self, query: &str) {
        self.search_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// [`search`](Self::search) that gives up when `cancel` fires.
    pub async fn search_with_cancel(&self, query: &str, cancel: &CancellationToken) {
        self.modify(|s| s.begin_search());
        let outcome = self.call("search", cancel, self.remote.search(query)).await;
        self.modify(|s| s.settle_search(outcome));
    }

    // =================== CRUD OPERATIONS ===================

    /// Create a record and prepend the server's copy.
    ///
    /// Nothing is inserted until the server confirms. Returns whether it
    /// succeeded; the create error slot says why not.
    pub async fn create(&self, draft: &R::Draft) -> bool {
        self.create_with_cancel(draft, &CancellationToken::new())
            .await
    }

    /// [`create`](Self::create) that gives up when `cancel` fires.
    pub async fn create_with_cancel(&self, draft: &R::Draft, cancel: &CancellationToken) -> bool {
        self.modify(|s| s.begin_create());

        let outcome = match R::validate_draft(draft) {
            Ok(()) => self.call("create", cancel, self.remote.create(draft)).await,
            Err(e) => {
                debug!(kind = R::KIND, error = %e, "draft rejected before sending");
                Settlement::Failed(e.to_string())
            }
        };

        let created_id = match &outcome {
            Settlement::Confirmed(record) => Some(record.id().to_owned()),
            _ => None,
        };
        let ok = self.modify(|s| s.settle_create(outcome));
        if let Some(id) = created_id {
            info!(kind = R::KIND, id = %id, "record created");
        }
        ok
    }

    /// Patch a record optimistically, then confirm with the server.
    ///
    /// The patched record is visible immediately. On success it is replaced
    /// by the server's copy; on failure it is restored exactly. A record that
    /// already has an update or delete in flight is rejected without a
    /// request. Returns whether it succeeded.
    pub async fn update(&self, id: &str, patch: &R::Patch) -> bool {
        self.update_with_cancel(id, patch, &CancellationToken::new())
            .await
    }

    /// [`update`](Self::update) that rolls back when `cancel` fires.
    pub async fn update_with_cancel(
        &self,
        id: &str,
        patch: &R::Patch,
        cancel: &CancellationToken,
    ) -> bool {
        let ticket = match self.modify(|s| s.begin_update(id, patch, Utc::now())) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(kind = R::KIND, id = %id, error = %e, "update rejected");
                return false;
            }
        };

        let outcome = self
            .call("update", cancel, self.remote.update(id, patch))
            .await;
        let ok = self.modify(|s| s.settle_update(ticket, outcome));
        if !ok {
            debug!(kind = R::KIND, id = %id, "update rolled back");
        }
        ok
    }

    /// Remove a record optimistically, then confirm with the server.
    ///
    /// On failure the record is put back. Returns whether it succeeded.
    pub async fn delete(&self, id: &str) -> bool {
        self.delete_with_cancel(id, &CancellationToken::new())
            .await
    }

    /// [`delete`](Self::delete) that rolls back when `cancel` fires.
    pub async fn delete_with_cancel(&self, id: &str, cancel: &CancellationToken) -> bool {
        let ticket = match self.modify(|s| s.begin_delete(id)) {
            Ok(ticket) => ticket,
            Err(e) => {
                warn!(kind = R::KIND, id = %id, error = %e, "delete rejected");
                return false;
            }
        };

        let outcome = self.call("delete", cancel, self.remote.delete(id)).await;
        let ok = self.modify(|s| s.settle_delete(ticket, outcome));
        if ok {
            info!(kind = R::KIND, id = %id, "record deleted");
        } else {
            debug!(kind = R::KIND, id = %id, "delete rolled back");
        }
        ok
    }

    // =================== LOCAL ACTIONS ===================

    /// Set or clear the selected record.
    pub fn set_selected(&self, record: Option<R>) {
        self.modify(|s| s.set_selected(record));
    }

    /// Reset every error slot.
    pub fn clear_errors(&self) {
        self.modify(|s| s.clear_errors());
    }

    /// Reset the collection, selection and pagination.
    pub fn clear_collection(&self) {
        self.modify(|s| s.clear_collection());
    }

    // =================== INTERNALS ===================

    /// Apply one atomic step and notify subscribers.
    fn modify<T>(&self, step: impl FnOnce(&mut StoreState<R>) -> T) -> T {
        let mut output = None;
        self.state.send_modify(|state| output = Some(step(state)));
        match output {
            Some(output) => output,
            None => unreachable!("send_modify always runs its closure"),
        }
    }

    /// Await a remote call unless `cancel` fires first. Dropping the call
    /// aborts the underlying request.
    async fn call<T>(
        &self,
        op: &'static str,
        cancel: &CancellationToken,
        request: impl Future<Output = Result<T, ApiError>>,
    ) -> Settlement<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(kind = R::KIND, op, "request cancelled");
                Settlement::Cancelled
            }
            result = request => match result {
                Ok(value) => Settlement::Confirmed(value),
                Err(e) => {
                    warn!(kind = R::KIND, op, status = e.status(), error = %e, "request failed");
                    Settlement::Failed(e.message())
                }
            },
        }
    }
}
