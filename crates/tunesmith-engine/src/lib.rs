pub mod api;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod poll;
pub mod session;
pub mod workflow;

pub use tunesmith_common::error;
pub use tunesmith_common::protocol;
