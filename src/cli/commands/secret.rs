use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_document, secret_or_prompt};
use crate::cli::OutputFormat;
use crate::credentials::{hash_secret, CredentialRecord};

#[derive(Subcommand)]
pub enum SecretCommands {
    #[command(about = "Print a credentials-file entry for a subject")]
    Hash {
        #[arg(help = "Subject the secret belongs to")]
        subject: String,
        #[arg(long, help = "Secret (will prompt if not provided)")]
        secret: Option<String>,
    },
}

pub fn handle(cmd: SecretCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SecretCommands::Hash { subject, secret } => {
            let secret = secret_or_prompt(secret, "Secret")?;
            let record = CredentialRecord {
                subject,
                secret_hash: hash_secret(&secret)?,
            };

            match output_format {
                OutputFormat::Json => output_document(output_format, &json!(record)),
                OutputFormat::Text => {
                    // Ready to paste under `credentials:` in the YAML file.
                    print!("{}", serde_yaml::to_string(&vec![record])?);
                    Ok(())
                }
            }
        }
    }
}
