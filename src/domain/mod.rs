//! Domain layer: entities, ports and the error taxonomy. No I/O lives here.

pub mod entities;
pub mod errors;
pub mod ports;

pub use entities::*;
pub use errors::{DomainError, Result};
