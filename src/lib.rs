//! # packbolt
//!
//! A blocking client for the Bolt graph database protocol.
//!
//! ## Features
//!
//! - **PackStream** - Encoder and decoder for the tagged value format
//! - **Chunk framing** - `tokio_util` codecs, driven synchronously
//! - **Sessions** - Handshake, INIT, pipelined RUN + PULL_ALL and failure
//!   acknowledgement over any `Read + Write` transport
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use packbolt::{Session, SessionConfig, Value};
//!
//! fn main() -> Result<(), packbolt::DriverError> {
//!     let config = SessionConfig::builder()
//!         .with_basic_auth("neo4j", "password")
//!         .build();
//!     let mut session = Session::open_with_config("localhost", 7687, config)?;
//!
//!     let mut params = BTreeMap::new();
//!     params.insert("name".to_string(), Value::from("Alice"));
//!     let rows = session.query("CREATE (n:Person {name: $name}) RETURN n", params)?;
//!     for row in &rows {
//!         println!("{:?}", row.get("n"));
//!     }
//!
//!     session.close()
//! }
//! ```
//!
//! ## Failures
//!
//! A statement rejected by the server leaves the session failed until the
//! failure is acknowledged:
//!
//! ```rust,no_run
//! # use std::collections::BTreeMap;
//! # use packbolt::{DriverError, Session};
//! # fn example(session: &mut Session) -> Result<(), DriverError> {
//! match session.query("RETRUN 1", BTreeMap::new()) {
//!     Err(e) if e.is_query_failure() => session.ack_failure()?,
//!     Err(e) => return Err(e),
//!     Ok(_) => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`driver`] - Session, configuration and result records
//! - [`bolt`] - Low-level protocol implementation

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bolt;
pub mod driver;

// Re-exports for convenience
pub use driver::{
    DriverError, DriverResult, Field, Record, Session, SessionConfig, SessionConfigBuilder,
    SessionState, Transport,
};

pub use bolt::{AuthToken, BoltError, BoltVersion, Node, PackStreamError, Structure, Value};
