//! kgflow API - request builders, host capability trait and HTTP transport
//!
//! Builders are pure: parameters in, [`HttpRequest`] out. [`GraphApi`] pairs
//! them with a [`Host`], fetching credentials and issuing exactly one call per
//! operation.

pub mod builders;
pub mod client;
pub mod credential;
pub mod host;
pub mod request;
pub mod transport;

pub use client::GraphApi;
pub use credential::{CredentialDescriptor, CredentialProperty};
pub use host::Host;
pub use request::{endpoint, HttpMethod, HttpRequest};
pub use transport::{ReqwestTransport, Transport};
