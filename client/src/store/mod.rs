//! Observable synchronization store.

mod selector;
mod sync_store;

pub use selector::Selector;
pub use sync_store::SyncStore;
