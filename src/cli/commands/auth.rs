use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{clear_session, load_session, resolve_server, save_session, Session};
use crate::cli::utils::{output_document, output_success, secret_or_prompt};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Obtain an access/refresh token pair and store it")]
    Login {
        #[arg(help = "Subject")]
        subject: String,
        #[arg(long, env = "JOBTRACK_SECRET", help = "Secret (will prompt if not provided)")]
        secret: Option<String>,
    },

    #[command(about = "Forget the stored tokens")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Exchange the stored refresh token for a new access token")]
    Refresh,

    #[command(about = "Show the subject behind the stored access token")]
    Whoami,

    #[command(about = "Print the stored access token (for scripting)")]
    Token,
}

pub async fn handle(
    cmd: AuthCommands,
    server: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { subject, secret } => {
            let server = resolve_server(server, None);
            let secret = secret_or_prompt(secret, "Secret")?;
            let client = ApiClient::new(&server)?;

            let pair = client.obtain(&subject, &secret).await?;
            let session = Session::new(server.clone(), subject.clone(), pair.access, pair.refresh);
            save_session(&session)?;

            output_success(
                output_format,
                &format!("Logged in as '{}' on {}", subject, server),
                Some(json!({ "subject": subject, "server": server })),
            )
        }
        AuthCommands::Logout => {
            let message = if clear_session()? {
                "Session removed"
            } else {
                "No session to remove"
            };
            output_success(output_format, message, None)
        }
        AuthCommands::Status => match load_session()? {
            Some(session) => output_document(
                output_format,
                &json!({
                    "logged_in": true,
                    "subject": session.subject,
                    "server": session.server,
                    "obtained_at": session.obtained_at,
                    "refreshed_at": session.refreshed_at,
                }),
            ),
            None => output_document(output_format, &json!({ "logged_in": false })),
        },
        AuthCommands::Refresh => {
            let mut session = require_session()?;
            let client = ApiClient::new(&resolve_server(server, Some(&session)))?;

            let access = client.refresh(&session.refresh).await?;
            session.replace_access(access.access);
            save_session(&session)?;

            output_success(output_format, "Access token refreshed", None)
        }
        AuthCommands::Whoami => {
            let mut session = require_session()?;
            let client = ApiClient::new(&resolve_server(server, Some(&session)))?;

            let identity = match client.whoami(&session.access).await {
                Ok(identity) => identity,
                // Access tokens are short-lived; try one refresh before giving up.
                Err(e) if e.is_unauthorized() => {
                    tracing::debug!("access token rejected, refreshing");
                    let access = client.refresh(&session.refresh).await?;
                    session.replace_access(access.access);
                    save_session(&session)?;
                    client.whoami(&session.access).await?
                }
                Err(e) => return Err(e.into()),
            };

            output_document(output_format, &identity)
        }
        AuthCommands::Token => {
            let session = require_session()?;
            println!("{}", session.access);
            Ok(())
        }
    }
}

fn require_session() -> anyhow::Result<Session> {
    load_session()?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `jobtrack auth login <subject>` first"))
}
