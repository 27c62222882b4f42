//! Banking module for banks, clients, accounts and the registry that ties them together.
mod account;
mod config;
mod entity;
mod error;
mod operation;
mod registry;
mod source;
mod state;
mod types;

pub use account::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use operation::*;
pub use registry::*;
pub use source::*;
pub use state::*;
pub use types::*;
