//! # Optimist Engine
//!
//! The pure state machine behind an optimistic CRUD synchronization store.
//!
//! This crate holds a cached copy of a remote resource collection and knows
//! how every operation changes that cache: when it starts, when the server
//! confirms it, when it fails, and how to compensate. It never talks to the
//! network; the `optimist-client` crate drives these transitions around real
//! HTTP calls.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine only sees outcomes, never requests
//! - **Explicit compensation**: every optimistic change is captured in a
//!   ticket that must be settled, and settling a failure restores the
//!   captured snapshot exactly
//! - **Unique keys**: a [`Collection`] never holds two records with the same id
//!
//! ## Core Concepts
//!
//! ### Resources
//!
//! A [`Resource`] is a record type addressed by a string key, with a draft
//! type for creation and a patch type for partial updates. [`User`] and
//! [`Post`] are the bundled resources.
//!
//! ### State
//!
//! [`StoreState`] holds the collection, the selected record, per-kind
//! in-flight flags, per-kind error slots and the pagination descriptor.
//! Each operation is a `begin_*` / `settle_*` pair.
//!
//! ## Quick Start
//!
//! ```rust
//! use optimist_engine::{Settlement, StoreState, User, UserPatch, Role, UserStatus};
//! use chrono::{TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let ana = User {
//!     id: "42".into(),
//!     name: "Ana".into(),
//!     email: "a@x.com".into(),
//!     avatar: None,
//!     role: Role::User,
//!     status: UserStatus::Active,
//!     created_at: t0,
//!     updated_at: t0,
//! };
//!
//! let mut state = StoreState::<User>::new();
//! state.begin_fetch_list();
//! state.settle_fetch_list(Settlement::Confirmed(vec![ana.clone()]), None, None);
//!
//! // Rename optimistically, then learn the server rejected it.
//! let patch = UserPatch { name: Some("Ann".into()), ..Default::default() };
//! let ticket = state.begin_update("42", &patch, Utc::now()).unwrap();
//! assert_eq!(state.collection().get("42").unwrap().name, "Ann");
//!
//! let ok = state.settle_update(ticket, Settlement::Failed("HTTP 500: Internal Server Error".into()));
//! assert!(!ok);
//! assert_eq!(state.collection().get("42"), Some(&ana));
//! ```

pub mod collection;
pub mod error;
pub mod pagination;
pub mod post;
pub mod query;
pub mod resource;
pub mod state;
pub mod user;
pub mod validate;

// Re-export main types at crate root
pub use collection::Collection;
pub use error::Error;
pub use pagination::{Pagination, DEFAULT_LIMIT, DEFAULT_PAGE};
pub use post::{Post, PostAuthor, PostDraft, PostPatch, PostStatus};
pub use query::{QueryParams, SortOrder};
pub use resource::Resource;
pub use state::{
    DeleteTicket, ErrorSlots, OperationFlags, Settlement, StoreState, UpdateTicket,
};
pub use user::{Role, User, UserDraft, UserPatch, UserStatus};
pub use validate::{FieldKind, FieldRule};

/// Type aliases for clarity
pub type RecordId = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
