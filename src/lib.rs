//! Sales console - query and export gateway
//!
//! Forwards authenticated requests from the admin console to the sales
//! backend, and provides the client-side pipeline that composes filters,
//! walks paginated collections and dispatches report exports.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod proxy;

pub use application::Application;
pub use error::{Error, Result};
