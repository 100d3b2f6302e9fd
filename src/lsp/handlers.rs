use tower_lsp::jsonrpc::{Error as RpcError, ErrorCode, Result as LspResult};
use tower_lsp::lsp_types::*;

use crate::config::FormatterSettings;
use crate::edit::formatting_edits;
use crate::formatter::{FormatError, FormatRequest};
use crate::lsp::backend::Backend;

/// Trait for handling whole-document formatting
#[tower_lsp::async_trait]
pub trait HandleFormatting {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>>;

    async fn format_request(
        &self,
        uri: &Url,
    ) -> Result<Option<(FormatRequest, i32)>, FormatError>;
}

/// Trait for handling settings pushed by the client
#[tower_lsp::async_trait]
pub trait HandleConfiguration {
    async fn apply_client_settings(&self, settings: serde_json::Value);
}

/// Failed formatting surfaces to the editor as a request error
fn format_error_to_rpc(error: FormatError) -> RpcError {
    RpcError {
        code: ErrorCode::InternalError,
        message: error.to_string().into(),
        data: None,
    }
}

#[tower_lsp::async_trait]
impl HandleFormatting for Backend {
    async fn handle_formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> LspResult<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;

        let (request, version) = match self.format_request(&uri).await {
            Ok(Some(pending)) => pending,
            Ok(None) => return Ok(Some(Vec::new())),
            Err(e) => {
                log::warn!("Cannot format {}: {}", uri, e);
                return Err(format_error_to_rpc(e));
            }
        };

        let formatted = match request.run(&self.scratch).await {
            Ok(formatted) => formatted,
            Err(e) => {
                log::warn!("Formatting {} failed: {}", uri, e);
                return Err(format_error_to_rpc(e));
            }
        };

        // Output for an older version would clobber edits made while the formatter ran
        let docs = self.documents.lock().await;
        let current = docs.get(&uri).and_then(|state| state.content_at(version));
        if current.is_none() {
            log::debug!("{} changed during formatting; dropping result", uri);
        }
        Ok(Some(formatting_edits(current, formatted)))
    }

    /// Build the request for an open document, paired with the version it
    /// was built from; `None` if the document is not open
    async fn format_request(
        &self,
        uri: &Url,
    ) -> Result<Option<(FormatRequest, i32)>, FormatError> {
        let (language, version) = {
            let docs = self.documents.lock().await;
            let Some(state) = docs.get(uri) else {
                return Ok(None);
            };
            let language = state
                .language(uri)
                .ok_or_else(|| FormatError::UnsupportedLanguage(state.language_id.clone()))?;
            (language, state.version)
        };

        let source = uri.to_file_path().map_err(|_| FormatError::NotAFile {
            uri: uri.to_string(),
        })?;

        let client_root = self.client_root.read().await.clone();
        let config = self.config.read().await;
        let root = config.workspace_root(client_root.as_deref());
        let command = config.resolve_formatter(language, &root);

        let request = FormatRequest {
            language,
            source,
            root,
            command,
        };
        Ok(Some((request, version)))
    }
}

#[tower_lsp::async_trait]
impl HandleConfiguration for Backend {
    async fn apply_client_settings(&self, settings: serde_json::Value) {
        match FormatterSettings::from_client_value(settings) {
            Ok(settings) => {
                log::debug!("Client settings updated: {:?}", settings);
                self.config.write().await.set_client_settings(settings);
            }
            Err(e) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Ignoring invalid ocaml-reason-format settings: {}", e),
                    )
                    .await;
            }
        }
    }
}
