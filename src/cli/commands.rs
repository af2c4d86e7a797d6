//! CLI command definitions and handlers

use clap::Subcommand;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::core::client::TransfluentClient;
use crate::core::models::{
    FileCompletion, FileFormat, FileTranslateOutcome, FileTranslateRequest, TextRef,
    TextsTranslateRequest, TranslationLevel,
};
use crate::server::webhook::{self, WebhookConfig};

/// Commands for the Transfluent client
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported languages
    Languages,

    /// Print the API token (authenticating if needed) for reuse via TRANSFLUENT_TOKEN
    Token,

    /// Create a new account and print its token
    CreateAccount {
        /// Email address of the new account
        #[arg(long)]
        email: String,

        /// Accept the terms of service
        #[arg(long)]
        accept_terms: bool,
    },

    /// Show translation status of a file
    Status {
        /// File identifier, e.g. /app/strings.xml
        #[arg(short, long)]
        identifier: String,

        /// Language code, e.g. en-gb
        #[arg(short, long)]
        language: String,
    },

    /// Check whether a file is completely translated
    Complete {
        #[arg(short, long)]
        identifier: String,

        #[arg(short, long)]
        language: String,
    },

    /// Download a (translated) file
    Read {
        #[arg(short, long)]
        identifier: String,

        #[arg(short, long)]
        language: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a local file
    Save {
        #[arg(short, long)]
        identifier: String,

        #[arg(short, long)]
        language: String,

        /// Local file to upload
        #[arg(short, long)]
        file: PathBuf,

        /// File type: MooTools-locale, iOS-strings, Android-strings, Android-arrays, json-file, YAML-file
        #[arg(long)]
        format: FileFormat,

        /// Upload translations only, keep the master file
        #[arg(long)]
        translations_only: bool,
    },

    /// Order translation of a file
    Translate {
        #[arg(short, long)]
        identifier: String,

        /// Source language
        #[arg(short, long)]
        language: String,

        /// Target languages (repeat or comma separate)
        #[arg(short, long, value_delimiter = ',', required = true)]
        target: Vec<String>,

        /// Translation level
        #[arg(long, default_value = "translation")]
        level: TranslationLevel,

        /// Context comment for the translator
        #[arg(long, default_value = "")]
        comment: String,

        /// URL called when the translation is completed
        #[arg(long, default_value = "")]
        callback_url: String,

        /// URL notified when processing starts
        #[arg(long)]
        processing_callback: Option<String>,

        /// Refresh the master content from this file first
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Save texts given as key=value pairs
    Texts {
        #[arg(short, long)]
        group: Option<String>,

        #[arg(short, long)]
        language: String,

        /// key=value pairs
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Order translation of saved texts
    TextsTranslate {
        #[arg(short, long)]
        group: Option<String>,

        #[arg(short, long)]
        language: String,

        /// Text ids (repeat or comma separate)
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        #[arg(short, long, value_delimiter = ',', required = true)]
        target: Vec<String>,

        #[arg(long, default_value = "translation")]
        level: TranslationLevel,

        #[arg(long, default_value = "")]
        comment: String,

        #[arg(long)]
        callback_url: Option<String>,
    },

    /// Retrieve a text
    Text {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        language: String,

        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show translation status of a text
    TextStatus {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        language: String,

        #[arg(short, long)]
        group: Option<String>,
    },

    /// Start the callback receiver
    ServeWebhook {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Route of the callback endpoint
        #[arg(long, default_value = "/callback")]
        path: String,

        /// Shared secret expected in the _secret query parameter (default: TRANSFLUENT_WEBHOOK_SECRET)
        #[arg(long)]
        secret: Option<String>,
    },
}

impl Commands {
    /// Whether the command talks to the API and needs a client
    pub fn needs_client(&self) -> bool {
        !matches!(self, Commands::ServeWebhook { .. })
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_texts(pairs: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("expected key=value, got: {}", pair))
        })
        .collect()
}

/// Handle the webhook server command
pub async fn handle_serve_webhook(
    host: String,
    port: u16,
    path: String,
    secret: Option<String>,
) -> anyhow::Result<()> {
    let secret = secret.or_else(|| std::env::var("TRANSFLUENT_WEBHOOK_SECRET").ok());
    let config = WebhookConfig { path, secret };
    webhook::run_server(host, port, config, webhook::logging_handler()).await
}

/// Handle a command that calls the API
pub async fn handle(client: &TransfluentClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Languages => print_json(&client.languages().await?)?,
        Commands::Token => println!("{}", client.get_token().await?),
        Commands::CreateAccount {
            email,
            accept_terms,
        } => println!("{}", client.create_account(&email, accept_terms).await?),
        Commands::Status {
            identifier,
            language,
        } => print_json(&client.file_status(&identifier, &language).await?)?,
        Commands::Complete {
            identifier,
            language,
        } => match client.is_file_complete(&identifier, &language).await? {
            FileCompletion::Complete => println!("complete"),
            FileCompletion::InProgress(progress) => println!("{}", progress),
        },
        Commands::Read {
            identifier,
            language,
            output,
        } => {
            let bytes = client.file_read(&identifier, &language).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, &bytes).await?;
                    info!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => std::io::stdout().write_all(&bytes)?,
            }
        }
        Commands::Save {
            identifier,
            language,
            file,
            format,
            translations_only,
        } => print_json(
            &client
                .save_file(&identifier, &language, format, &file, translations_only)
                .await?,
        )?,
        Commands::Translate {
            identifier,
            language,
            target,
            level,
            comment,
            callback_url,
            processing_callback,
            file,
        } => {
            let mut request = FileTranslateRequest::new(identifier, language, target)
                .with_level(level)
                .with_comment(comment)
                .with_callback_url(callback_url);
            if let Some(url) = processing_callback {
                request = request.with_event_callback("processing", url);
            }
            if let Some(file) = file {
                request = request.with_file(file);
            }

            match client.file_translate(&request).await? {
                FileTranslateOutcome::Ordered(response) => print_json(&response)?,
                FileTranslateOutcome::ProcessingAcknowledged(ack) => println!("{}", ack),
            }
        }
        Commands::Texts {
            group,
            language,
            texts,
        } => {
            let texts = parse_texts(&texts)?;
            print_json(&client.texts(group.as_deref(), &language, &texts).await?)?
        }
        Commands::TextsTranslate {
            group,
            language,
            ids,
            target,
            level,
            comment,
            callback_url,
        } => {
            let mut request =
                TextsTranslateRequest::new(language, ids.into_iter().map(TextRef::new).collect(), target)
                    .with_level(level)
                    .with_comment(comment);
            if let Some(group) = group {
                request = request.with_group(group);
            }
            if let Some(url) = callback_url {
                request = request.with_callback_url(url);
            }
            print_json(&client.texts_translate(&request).await?)?
        }
        Commands::Text {
            id,
            language,
            group,
        } => print_json(&client.text(&id, &language, group.as_deref()).await?)?,
        Commands::TextStatus {
            id,
            language,
            group,
        } => print_json(&client.text_status(&id, &language, group.as_deref()).await?)?,
        Commands::ServeWebhook {
            host,
            port,
            path,
            secret,
        } => handle_serve_webhook(host, port, path, secret).await?,
    }

    Ok(())
}
