use tower_lsp::lsp_types::Url;

use crate::language::Language;

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub content: String,
    pub language_id: String,
    pub version: i32,
}

impl DocumentState {
    /// Language from the client's language id, falling back to the file extension
    pub fn language(&self, uri: &Url) -> Option<Language> {
        Language::from_language_id(&self.language_id).or_else(|| {
            let path = uri.to_file_path().ok()?;
            Language::from_path(&path)
        })
    }

    /// Content, if the document is still at `version`
    pub fn content_at(&self, version: i32) -> Option<&str> {
        (self.version == version).then_some(self.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_only_for_matching_version() {
        let mut state = document("ocaml");
        state.content = "let x=1;;\n".to_string();
        assert_eq!(state.content_at(1), Some("let x=1;;\n"));

        // Edited while a formatter was running
        state.content = "let x=1;;\nlet y=2;;\n".to_string();
        state.version = 2;
        assert_eq!(state.content_at(1), None);
        assert_eq!(state.content_at(2), Some("let x=1;;\nlet y=2;;\n"));
    }

    fn document(language_id: &str) -> DocumentState {
        DocumentState {
            content: String::new(),
            language_id: language_id.to_string(),
            version: 1,
        }
    }

    #[test]
    fn test_language_prefers_client_language_id() {
        let uri = Url::parse("file:///work/notes.txt").unwrap();
        assert_eq!(document("reason").language(&uri), Some(Language::Reason));
    }

    #[test]
    fn test_language_falls_back_to_extension() {
        let uri = Url::parse("file:///work/src/main.ml").unwrap();
        assert_eq!(document("plaintext").language(&uri), Some(Language::OCaml));

        let uri = Url::parse("untitled:Untitled-1").unwrap();
        assert_eq!(document("plaintext").language(&uri), None);
    }
}
