use crate::config::toml_config::{MigratorConfig, StoreKind};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "feed-migrator")]
#[command(about = "Export and import a single form feed as JSON")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use a JSON store file instead of the configured store
    #[arg(long, global = true)]
    pub store_file: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List forms
    Forms,

    /// List the feeds of a form
    Feeds {
        #[arg(long)]
        form: u64,

        /// Only show feeds of the configured kind
        #[arg(long)]
        kind_only: bool,
    },

    /// Export one feed to a JSON file
    Export {
        #[arg(long)]
        form: u64,

        #[arg(long)]
        feed: u64,

        /// Directory to write the file into
        #[arg(short, long)]
        output: Option<String>,

        /// Print the document instead of writing a file
        #[arg(long)]
        stdout: bool,

        #[arg(long)]
        pretty: bool,
    },

    /// Import a previously exported feed into a form
    Import {
        /// Destination form
        #[arg(long)]
        form: u64,

        /// Read the document from a file instead of stdin
        #[arg(short, long)]
        file: Option<String>,

        /// Keep the document's own is_active value
        #[arg(long)]
        no_activate: bool,
    },

    /// Print the page view model as JSON
    Page {
        #[arg(long)]
        form: Option<u64>,

        #[arg(long)]
        kind_only: bool,
    },
}

impl CliConfig {
    /// 載入設定檔 (沒有指定時使用預設值) 並套用命令列覆蓋
    pub fn load_config(&self) -> Result<MigratorConfig> {
        let mut config = match &self.config {
            Some(path) => MigratorConfig::from_file(path)?,
            None => MigratorConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut MigratorConfig) {
        if let Some(path) = &self.store_file {
            config.store.kind = StoreKind::File;
            config.store.path = path.clone();
        }

        match &self.command {
            Command::Export { output, pretty, .. } => {
                if let Some(output) = output {
                    config.export.output_path = output.clone();
                }
                if *pretty {
                    config.export.pretty = true;
                }
            }
            Command::Import { no_activate, .. } => {
                if *no_activate {
                    config.import.activate_on_import = false;
                }
            }
            _ => {}
        }
    }
}
