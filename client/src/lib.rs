//! # Optimist Client
//!
//! Optimistic CRUD synchronization over a REST API.
//!
//! [`SyncStore`] keeps a cached collection of records in step with a server.
//! Updates and deletes are applied to the cache first and rolled back
//! exactly if the server rejects them; creates wait for the server's copy.
//! Every state change is published through a `tokio::sync::watch` channel
//! so views can [`subscribe`](SyncStore::subscribe) to the whole state or
//! [`select`](SyncStore::select) one slice of it.
//!
//! The network sits behind the [`Remote`] trait. [`RestRemote`] implements
//! it over [`ApiClient`], a JSON client with a per-request timeout, bearer
//! auth and failures normalized into [`ApiError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use optimist_client::{ApiClient, ClientConfig, Endpoints, RestRemote, SyncStore};
//! use optimist_engine::{QueryParams, User, UserPatch};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::from_config(&ClientConfig::from_env()?)?;
//! let store = SyncStore::new(RestRemote::<User>::new(client, Endpoints::USERS));
//!
//! store.fetch_list(Some(QueryParams::page(1, 10))).await;
//!
//! let patch = UserPatch { name: Some("Ann".into()), ..Default::default() };
//! if !store.update("42", &patch).await {
//!     eprintln!("{:?}", store.snapshot().errors().update);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod remote;
pub mod store;

pub use api::{build_endpoint, ApiClient, ApiClientBuilder, ApiError, Endpoints};
pub use config::{ClientConfig, ConfigError};
pub use remote::{Remote, RestRemote};
pub use store::{Selector, SyncStore};
pub use tokio_util::sync::CancellationToken;
