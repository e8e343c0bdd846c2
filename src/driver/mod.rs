//! Driver Module
//!
//! Blocking session API on top of [`crate::bolt`].
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use packbolt::driver::Session;
//!
//! let mut session = Session::open("localhost", 7687)?;
//! for record in session.query("RETURN 1 AS x", BTreeMap::new())? {
//!     println!("{:?}", record.get("x"));
//! }
//! session.close()?;
//! # Ok::<(), packbolt::DriverError>(())
//! ```

pub mod config;
pub mod connection;
mod error;
mod record;
mod session;

// Re-exports
pub use config::{SessionConfig, SessionConfigBuilder, DEFAULT_USER_AGENT};
pub use connection::{Connection, Transport};
pub use error::{DriverError, DriverResult};
pub use record::{Field, Record};
pub use session::{Session, SessionState};
