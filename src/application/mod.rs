//! Application layer: demo services
//!
//! This layer drives the domain components and narrates through I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
