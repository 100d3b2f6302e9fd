//! OCaml/Reason Format Server
//!
//! A Language Server Protocol server that formats OCaml and Reason documents
//! by running `ocamlformat` and `refmt`.
//!
//! This library provides:
//! - Formatter configuration from user, project, CLI and client layers
//! - Scratch-file staging for formatter runs
//! - Invocation of the external formatters
//! - Whole-document replacement edits

pub mod config;
pub mod edit;
pub mod formatter;
pub mod language;
pub mod lsp;
pub mod scratch;

// Re-exports for clean public API
pub use config::{Config, FormatterSettings};
pub use formatter::{FormatError, FormatRequest, FormatterCommand, Invocation};
pub use language::Language;
pub use scratch::{ScratchDir, ScratchFile};
