use anyhow::Result;
use ocaml_reason_format::lsp::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    serve().await
}
