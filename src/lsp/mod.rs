//! LSP Protocol Implementation
//!
//! Document tracking and the formatting request on top of tower-lsp.

pub mod backend;
pub mod document;
pub mod handlers;
pub mod server;

pub use backend::Backend;
