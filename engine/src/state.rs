//! Store state - the cache plus everything the views watch.
//!
//! Every operation is a `begin_*` call made before the request goes out and
//! a `settle_*` call made with its outcome. Update and delete hand back a
//! ticket carrying the snapshot needed to compensate; the ticket must be
//! settled exactly once.

use crate::{
    error::Result, Collection, Error, Pagination, RecordId, Resource, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a request ended, as far as the state is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T> {
    /// The server answered with this value.
    Confirmed(T),
    /// The request failed with this human-readable message.
    Failed(String),
    /// The caller gave up on the request.
    Cancelled,
}

impl<T> Settlement<T> {
    /// Build a settlement from a result, keeping only the error message.
    pub fn from_result<E: std::fmt::Display>(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Settlement::Confirmed(value),
            Err(e) => Settlement::Failed(e.to_string()),
        }
    }
}

/// Whether each class of operation has a request in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFlags {
    pub fetching_list: bool,
    pub creating: bool,
    pub updating: bool,
    pub deleting: bool,
    pub fetching_detail: bool,
}

impl OperationFlags {
    /// Whether anything at all is in flight.
    pub fn any(&self) -> bool {
        self.fetching_list || self.creating || self.updating || self.deleting || self.fetching_detail
    }
}

/// Most recent failure message per operation class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSlots {
    /// Reads: list, detail, search
    pub general: Option<String>,
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl ErrorSlots {
    /// Whether every slot is empty.
    pub fn is_clear(&self) -> bool {
        self.general.is_none() && self.create.is_none() && self.update.is_none() && self.delete.is_none()
    }
}

/// In-flight counters. A flag reads true while its counter is non-zero, so
/// one of two overlapping calls settling does not hide the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InFlight {
    fetching_list: u32,
    creating: u32,
    updating: u32,
    deleting: u32,
    fetching_detail: u32,
}

/// Compensation data for an update in flight.
#[derive(Debug)]
#[must_use = "an update ticket must be settled to release the record"]
pub struct UpdateTicket<R> {
    id: RecordId,
    snapshot: Option<R>,
}

impl<R> UpdateTicket<R> {
    /// Key of the record under update.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The record as it was before the optimistic patch, if it was cached.
    pub fn snapshot(&self) -> Option<&R> {
        self.snapshot.as_ref()
    }
}

/// Compensation data for a delete in flight.
#[derive(Debug)]
#[must_use = "a delete ticket must be settled to release the record"]
pub struct DeleteTicket<R> {
    id: RecordId,
    removed: Option<(usize, R)>,
}

impl<R> DeleteTicket<R> {
    /// Key of the record under deletion.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The removed record, if it was cached.
    pub fn removed(&self) -> Option<&R> {
        self.removed.as_ref().map(|(_, r)| r)
    }
}

/// The whole observable state of a synchronization store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<R: Resource> {
    collection: Collection<R>,
    selected: Option<R>,
    in_flight: InFlight,
    errors: ErrorSlots,
    pagination: Pagination,
    /// Keys with an update or delete in flight
    busy: BTreeSet<RecordId>,
}

impl<R: Resource> Default for StoreState<R> {
    fn default() -> Self {
        Self {
            collection: Collection::new(),
            selected: None,
            in_flight: InFlight::default(),
            errors: ErrorSlots::default(),
            pagination: Pagination::default(),
            busy: BTreeSet::new(),
        }
    }
}

impl<R: Resource> StoreState<R> {
    /// Create the initial, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    // =================== READ ACCESS ===================

    /// The cached records.
    pub fn collection(&self) -> &Collection<R> {
        &self.collection
    }

    /// The cached records as a slice.
    pub fn records(&self) -> &[R] {
        self.collection.as_slice()
    }

    /// The selected record.
    pub fn selected(&self) -> Option<&R> {
        self.selected.as_ref()
    }

    /// In-flight flags per operation class.
    pub fn flags(&self) -> OperationFlags {
        OperationFlags {
            fetching_list: self.in_flight.fetching_list > 0,
            creating: self.in_flight.creating > 0,
            updating: self.in_flight.updating > 0,
            deleting: self.in_flight.deleting > 0,
            fetching_detail: self.in_flight.fetching_detail > 0,
        }
    }

    /// Error slots.
    pub fn errors(&self) -> &ErrorSlots {
        &self.errors
    }

    /// Pagination derived from the last successful list fetch.
    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Whether `id` has an update or delete in flight.
    pub fn is_busy(&self, id: &str) -> bool {
        self.busy.contains(id)
    }

    // =================== FETCH LIST ===================

    /// A list fetch is starting.
    pub fn begin_fetch_list(&mut self) {
        self.in_flight.fetching_list += 1;
        self.errors.general = None;
    }

    /// A list fetch ended.
    ///
    /// Success replaces the whole collection and recomputes pagination from
    /// the requested `page`/`limit`. Failure empties the collection. A
    /// cancelled fetch leaves everything as it was.
    pub fn settle_fetch_list(
        &mut self,
        outcome: Settlement<Vec<R>>,
        page: Option<u32>,
        limit: Option<u32>,
    ) {
        self.in_flight.fetching_list = self.in_flight.fetching_list.saturating_sub(1);
        match outcome {
            Settlement::Confirmed(records) => {
                self.collection.replace_all(records);
                self.pagination = Pagination::derive(page, limit, self.collection.len());
                self.errors.general = None;
            }
            Settlement::Failed(message) => {
                self.collection.clear();
                self.errors.general = Some(message);
            }
            Settlement::Cancelled => {}
        }
    }

    // =================== SEARCH ===================

    /// A search is starting. Shares the list flag.
    pub fn begin_search(&mut self) {
        self.begin_fetch_list();
    }

    /// A search ended.
    ///
    /// Success replaces the whole collection; failure keeps it and only
    /// records the error. Pagination is left alone.
    pub fn settle_search(&mut self, outcome: Settlement<Vec<R>>) {
        self.in_flight.fetching_list = self.in_flight.fetching_list.saturating_sub(1);
        match outcome {
            Settlement::Confirmed(records) => {
                self.collection.replace_all(records);
                self.errors.general = None;
            }
            Settlement::Failed(message) => {
                self.errors.general = Some(message);
            }
            Settlement::Cancelled => {}
        }
    }

    // =================== FETCH DETAIL ===================

    /// A detail fetch is starting.
    pub fn begin_fetch_detail(&mut self) {
        self.in_flight.fetching_detail += 1;
        self.errors.general = None;
    }

    /// A detail fetch ended. The collection is never touched.
    pub fn settle_fetch_detail(&mut self, outcome: Settlement<R>) {
        self.in_flight.fetching_detail = self.in_flight.fetching_detail.saturating_sub(1);
        match outcome {
            Settlement::Confirmed(record) => {
                self.selected = Some(record);
                self.errors.general = None;
            }
            Settlement::Failed(message) => {
                self.selected = None;
                self.errors.general = Some(message);
            }
            Settlement::Cancelled => {}
        }
    }

    // =================== CREATE ===================

    /// A create is starting.
    pub fn begin_create(&mut self) {
        self.in_flight.creating += 1;
        self.errors.create = None;
    }

    /// A create ended. Only a confirmed record enters the collection, at the
    /// front. Returns whether it succeeded.
    pub fn settle_create(&mut self, outcome: Settlement<R>) -> bool {
        self.in_flight.creating = self.in_flight.creating.saturating_sub(1);
        match outcome {
            Settlement::Confirmed(record) => {
                self.collection.prepend(record);
                self.errors.create = None;
                true
            }
            Settlement::Failed(message) => {
                self.errors.create = Some(message);
                false
            }
            Settlement::Cancelled => false,
        }
    }

    // =================== UPDATE ===================

    /// An update is starting: snapshot the record, then patch it in place and
    /// stamp `now` as its last-updated time.
    ///
    /// Fails with [`Error::RecordBusy`] (written to the update slot) when the
    /// key already has an update or delete in flight; nothing else changes.
    pub fn begin_update(
        &mut self,
        id: &str,
        patch: &R::Patch,
        now: Timestamp,
    ) -> Result<UpdateTicket<R>> {
        self.errors.update = None;
        if let Err(e) = self.claim(id) {
            self.errors.update = Some(e.to_string());
            return Err(e);
        }
        self.in_flight.updating += 1;

        let snapshot = self.collection.get(id).cloned();
        if let Some(record) = self.collection.get_mut(id) {
            record.apply_patch(patch);
            record.touch(now);
        }

        Ok(UpdateTicket {
            id: id.to_owned(),
            snapshot,
        })
    }

    /// An update ended.
    ///
    /// Success stores the server's record in place of the optimistic guess and
    /// refreshes the selection if it has the same key. Failure or
    /// cancellation puts the snapshot back exactly. Returns whether it
    /// succeeded.
    pub fn settle_update(&mut self, ticket: UpdateTicket<R>, outcome: Settlement<R>) -> bool {
        self.in_flight.updating = self.in_flight.updating.saturating_sub(1);
        self.busy.remove(&ticket.id);

        match outcome {
            Settlement::Confirmed(record) => {
                if self.selected.as_ref().is_some_and(|s| s.id() == ticket.id) {
                    self.selected = Some(record.clone());
                }
                self.collection.replace(&ticket.id, record);
                self.errors.update = None;
                true
            }
            Settlement::Failed(message) => {
                self.roll_back_update(ticket);
                self.errors.update = Some(message);
                false
            }
            Settlement::Cancelled => {
                self.roll_back_update(ticket);
                false
            }
        }
    }

    fn roll_back_update(&mut self, ticket: UpdateTicket<R>) {
        if let Some(snapshot) = ticket.snapshot {
            self.collection.replace(&ticket.id, snapshot);
        }
    }

    // =================== DELETE ===================

    /// A delete is starting: the record leaves the collection immediately.
    ///
    /// Fails with [`Error::RecordBusy`] (written to the delete slot) when the
    /// key already has an update or delete in flight.
    pub fn begin_delete(&mut self, id: &str) -> Result<DeleteTicket<R>> {
        self.errors.delete = None;
        if let Err(e) = self.claim(id) {
            self.errors.delete = Some(e.to_string());
            return Err(e);
        }
        self.in_flight.deleting += 1;

        Ok(DeleteTicket {
            id: id.to_owned(),
            removed: self.collection.remove(id),
        })
    }

    /// A delete ended.
    ///
    /// Success clears the selection if it has the deleted key. Failure or
    /// cancellation reinserts the record at its former index (or at the end
    /// if the collection shrank meanwhile). Returns whether it succeeded.
    pub fn settle_delete(&mut self, ticket: DeleteTicket<R>, outcome: Settlement<()>) -> bool {
        self.in_flight.deleting = self.in_flight.deleting.saturating_sub(1);
        self.busy.remove(&ticket.id);

        match outcome {
            Settlement::Confirmed(()) => {
                if self.selected.as_ref().is_some_and(|s| s.id() == ticket.id) {
                    self.selected = None;
                }
                self.errors.delete = None;
                true
            }
            Settlement::Failed(message) => {
                self.roll_back_delete(ticket);
                self.errors.delete = Some(message);
                false
            }
            Settlement::Cancelled => {
                self.roll_back_delete(ticket);
                false
            }
        }
    }

    fn roll_back_delete(&mut self, ticket: DeleteTicket<R>) {
        if let Some((index, record)) = ticket.removed {
            self.collection.insert_at(index, record);
        }
    }

    fn claim(&mut self, id: &str) -> Result<()> {
        if self.busy.contains(id) {
            return Err(Error::RecordBusy(id.to_owned()));
        }
        self.busy.insert(id.to_owned());
        Ok(())
    }

    // =================== LOCAL ACTIONS ===================

    /// Set or clear the selected record.
    pub fn set_selected(&mut self, record: Option<R>) {
        self.selected = record;
    }

    /// Reset every error slot.
    pub fn clear_errors(&mut self) {
        self.errors = ErrorSlots::default();
    }

    /// Reset the collection, selection and pagination.
    pub fn clear_collection(&mut self) {
        self.collection.clear();
        self.selected = None;
        self.pagination = Pagination::default();
    }
}
