//! Icon upload reconciliation for the presence icon cache.
//!
//! [`IconResolver`] turns icon bytes into a public URL, uploading a
//! normalized thumbnail only when the object store and the local index do
//! not already agree that it exists.

pub mod error;
pub mod guard;
pub mod resolver;

pub use error::{IconError, IconResult};
pub use guard::{InFlight, InFlightGuard};
pub use resolver::{IconResolver, MigrationReport};
