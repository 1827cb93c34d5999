//! The contract a record type fulfils to be cached by the store.

use crate::{error::Result, Timestamp};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// A remote entity addressed by a unique string key.
///
/// `Draft` is what the client sends to create one; the server answers with
/// the full record including its assigned id and timestamps. `Patch` is a
/// partial update where absent fields are left alone.
pub trait Resource:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Input for creating a record.
    type Draft: Serialize + Debug + Send + Sync;
    /// Partial update applied optimistically and sent to the server.
    type Patch: Serialize + Debug + Send + Sync;

    /// Singular noun used in log lines ("user", "post").
    const KIND: &'static str;

    /// The unique key of this record.
    fn id(&self) -> &str;

    /// Apply the fields present in `patch` to this record.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Stamp a new last-updated time.
    fn touch(&mut self, at: Timestamp);

    /// Check a draft before it is sent.
    fn validate_draft(_draft: &Self::Draft) -> Result<()> {
        Ok(())
    }
}
