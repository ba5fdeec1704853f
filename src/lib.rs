pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::MigratorConfig;

pub use adapters::{FileFeedStore, InMemoryFeedStore, LocalStorage, RestFeedStore};
pub use core::migrator::FeedMigrator;
pub use core::page::{render_page, Notice, ViewModel};
pub use utils::error::{MigratorError, Result};
