use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::config::FormatterSettings;
use crate::language::Language;
use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{HandleConfiguration, HandleFormatting};
use crate::scratch::ScratchDir;
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub config: Arc<RwLock<Config>>,
    /// Root announced by the client during `initialize`
    pub client_root: Arc<RwLock<Option<PathBuf>>>,
    pub scratch: ScratchDir,
}

impl Backend {
    pub fn new(client: Client, config: Config) -> Self {
        let scratch = ScratchDir::new(config.scratch_dir.clone());

        Self {
            client,
            documents: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(RwLock::new(config)),
            client_root: Arc::new(RwLock::new(None)),
            scratch,
        }
    }
}

#[allow(deprecated)]
fn client_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
        .or_else(|| {
            params
                .workspace_folders
                .as_ref()?
                .first()?
                .uri
                .to_file_path()
                .ok()
        })
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        let announced_root = client_root(&params);

        if let Some(options) = params.initialization_options {
            match FormatterSettings::from_client_value(options) {
                Ok(settings) => self.config.write().await.set_client_settings(settings),
                Err(e) => log::warn!("Ignoring invalid initialization options: {}", e),
            }
        }

        {
            let mut config = self.config.write().await;
            let root = config.workspace_root(announced_root.as_deref());
            match config.load_project_config(&root) {
                Ok(true) => log::info!("Loaded project config from {}", root.display()),
                Ok(false) => {}
                Err(e) => log::warn!("{:#}", e),
            }
        }
        *self.client_root.write().await = announced_root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                document_formatting_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "ocaml-reason-format-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let root = self.client_root.read().await.clone();
        let config = self.config.read().await;
        let root = config.workspace_root(root.as_deref());
        for language in Language::ALL {
            let command = config.resolve_formatter(language, &root);
            log::info!(
                "{} documents will be formatted with {}",
                language,
                command.program.display()
            );
        }
        drop(config);

        self.client
            .log_message(MessageType::INFO, "ocaml-reason-format-ls initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn formatting(
        &self,
        params: DocumentFormattingParams,
    ) -> tower_lsp::jsonrpc::Result<Option<Vec<TextEdit>>> {
        self.handle_formatting(params).await
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_client_settings(params.settings).await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        let state = DocumentState {
            content: document.text,
            language_id: document.language_id,
            version: document.version,
        };

        let mut docs = self.documents.lock().await;
        docs.insert(document.uri, state);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        if let Some(change) = params.content_changes.into_iter().last() {
            let mut docs = self.documents.lock().await;
            if let Some(state) = docs.get_mut(&uri) {
                state.content = change.text;
                state.version = params.text_document.version;
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let mut docs = self.documents.lock().await;
        docs.remove(&params.text_document.uri);
    }
}
