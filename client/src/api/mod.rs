//! HTTP access to the remote REST API.

mod client;
mod endpoints;
mod error;

pub use client::*;
pub use endpoints::*;
pub use error::*;
