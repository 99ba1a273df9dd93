//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SourceConfig;
use crate::connector::SourceZendeskSupport;
use crate::engine::{ConnectionStatus, Message, SyncConfig};
use crate::error::{Error, Result};
use crate::state::StateManager;
use tokio::sync::mpsc;

/// Messages buffered between the sync and stdout
const OUTPUT_BUFFER: usize = 256;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => {
                self.output(&Message::Spec {
                    spec: SourceZendeskSupport::spec(),
                });
                Ok(())
            }
            Commands::Check => self.check().await,
            Commands::Discover => self.discover().await,
            Commands::Read {
                streams,
                max_records,
                no_state_per_page,
            } => {
                let sync = SyncConfig::new()
                    .with_state_per_page(!no_state_per_page)
                    .with_max_records(max_records.unwrap_or(0));
                self.read(streams.as_deref(), sync).await
            }
        }
    }

    /// Load config; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<SourceConfig> {
        if let Some(json) = &self.cli.config_json {
            return SourceConfig::from_json(json);
        }
        match &self.cli.config {
            Some(path) => SourceConfig::from_file(path),
            None => Err(Error::config(
                "Config not specified (use --config or --config-json)",
            )),
        }
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    async fn check(&self) -> Result<()> {
        let status = match self.load_config().and_then(SourceZendeskSupport::new) {
            Ok(source) => source.check_connection().await,
            Err(e) => ConnectionStatus::failed(e.to_string()),
        };
        self.output(&Message::ConnectionStatus { status });
        Ok(())
    }

    async fn discover(&self) -> Result<()> {
        let source = SourceZendeskSupport::new(self.load_config()?)?;
        let streams = source.discover().await;
        self.output(&Message::Catalog { streams });
        Ok(())
    }

    async fn read(&self, streams: Option<&str>, sync: SyncConfig) -> Result<()> {
        let source = SourceZendeskSupport::new(self.load_config()?)?.with_sync_config(sync);
        let state = self.load_state()?;

        let selected: Vec<String> = streams
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let (tx, mut rx) = mpsc::channel(OUTPUT_BUFFER);
        let read = source.read(&selected, state.clone(), tx);
        let drain = async {
            while let Some(message) = rx.recv().await {
                self.output(&message);
                if message.is_state() {
                    state.save().await?;
                }
            }
            Ok::<_, Error>(())
        };
        let (summary, drained) = tokio::join!(read, drain);
        drained?;
        let summary = summary?;
        state.save().await?;

        self.output(&Message::info(format!(
            "Sync complete: {} records, {} pages, {} streams ({} skipped) in {}ms",
            summary.stats.records_synced,
            summary.stats.pages_fetched,
            summary.stats.streams_synced + summary.stats.streams_skipped,
            summary.stats.streams_skipped,
            summary.stats.duration_ms
        )));
        Ok(())
    }

    /// Output a message
    fn output(&self, msg: &Message) {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!("Failed to serialize message: {e}"),
        }
    }
}
