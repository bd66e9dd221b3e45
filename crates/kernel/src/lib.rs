//! Trellis Kernel Library
//!
//! Page tree storage, the menu pool, and navigation tree composition.
//! The `trellis` binary renders menus from YAML site fixtures.

pub mod config;
pub mod error;
pub mod menu;
pub mod models;
pub mod site;

pub use config::Config;
pub use error::{NavError, NavResult};
pub use site::Site;
