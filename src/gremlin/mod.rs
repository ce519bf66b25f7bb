//! Gremlin query layer
//!
//! - `traversal`: typed steps rendered to Gremlin-Groovy scripts
//! - `value`: GraphSON v3 decoding
//! - `client`: HTTP transport with failure classification
//! - `sigv4`: IAM request signing for Neptune

pub mod client;
pub mod sigv4;
pub mod traversal;
pub mod value;

pub use client::{ClientBuildError, GremlinHttpClient};
pub use sigv4::{Credentials, SigV4Signer, SigningError};
pub use traversal::{Source, Step, Traversal};
pub use value::{DecodeError, EdgeEnd, GEdge, GValue, GVertex, Token};
