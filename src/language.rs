//! Supported source languages and the formatter conventions tied to each.

use std::fmt;
use std::path::Path;

use crate::formatter::Invocation;

/// A source language with an external formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    OCaml,
    Reason,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::OCaml, Language::Reason];

    /// Map an LSP language identifier to a language
    pub fn from_language_id(id: &str) -> Option<Self> {
        let id = id.to_ascii_lowercase();
        match id.as_str() {
            "ocaml" | "ocaml.interface" => Some(Language::OCaml),
            "reason" | "reason.interface" => Some(Language::Reason),
            _ => None,
        }
    }

    /// Guess the language from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ml" | "mli" => Some(Language::OCaml),
            "re" | "rei" => Some(Language::Reason),
            _ => None,
        }
    }

    /// Command looked up on PATH when no formatter path is configured
    pub fn default_command(self) -> &'static str {
        match self {
            Language::OCaml => "ocamlformat",
            Language::Reason => "refmt",
        }
    }

    pub fn language_id(self) -> &'static str {
        match self {
            Language::OCaml => "ocaml",
            Language::Reason => "reason",
        }
    }

    /// `ocamlformat` prints to stdout, `refmt` rewrites its argument.
    pub fn invocation(self) -> Invocation {
        match self {
            Language::OCaml => Invocation::Stdout,
            Language::Reason => Invocation::InPlace,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language_id())
    }
}
