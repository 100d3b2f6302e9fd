use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::lsp::backend::Backend;
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    log::info!(
        "Staging formatter files under {}",
        config.scratch_dir.display()
    );

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config.clone())).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
