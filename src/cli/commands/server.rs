use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, resolve_server};
use crate::cli::utils::output_document;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health,

    #[command(about = "Show server information from API root endpoint")]
    Info,
}

pub async fn handle(
    cmd: ServerCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = ApiClient::new(&resolve_server(server, session.as_ref()))?;

    let document = match cmd {
        ServerCommands::Health => client.health().await?,
        ServerCommands::Info => client.info().await?,
    };

    output_document(output_format, &document)
}
