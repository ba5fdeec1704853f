use clap::Parser;
use feed_migrator::config::Command;
use feed_migrator::core::FeedStore;
use feed_migrator::utils::error::ErrorSeverity;
use feed_migrator::utils::{logger, validation::Validate};
use feed_migrator::{
    adapters, render_page, CliConfig, FeedMigrator, LocalStorage, MigratorConfig, MigratorError,
    Notice,
};
use tokio::io::AsyncReadExt;

type Migrator = FeedMigrator<Box<dyn FeedStore>, MigratorConfig>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.logging.json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting feed-migrator");
    tracing::debug!("Effective config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let store = match adapters::store_from_config(&config.store) {
        Ok(store) => store,
        Err(e) => exit_with(&e),
    };
    let migrator = FeedMigrator::new(store, config);

    if let Err(e) = run(&cli.command, &migrator).await {
        tracing::error!(
            "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
            command_name(&cli.command),
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run(command: &Command, migrator: &Migrator) -> feed_migrator::Result<()> {
    match command {
        Command::Forms => {
            for form in migrator.store().list_forms().await? {
                println!("{}", form.label());
            }
        }
        Command::Feeds { form, kind_only } => {
            let state = migrator.page_state(Some(*form), *kind_only).await;
            let view = render_page(&state);
            if let Some(export) = view.export {
                for feed in &export.feeds {
                    println!("{}", feed.label);
                }
                if let Some(notice) = export.empty_notice {
                    eprintln!("⚠️ {}", notice.message);
                }
            }
        }
        Command::Export {
            form, feed, stdout, ..
        } => {
            let file = migrator.export_file(*form, *feed).await?;
            if *stdout {
                println!("{}", file.body);
            } else {
                let storage = LocalStorage::new(migrator.config().export.output_path.clone());
                file.write_to(&storage).await?;
                let path = storage.full_path(&file.filename);
                tracing::info!("📁 Output saved to: {}", path.display());
                println!("✅ Exported feed {} to {}", feed, path.display());
            }
        }
        Command::Import { form, file, .. } => {
            let raw = match file {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut raw = String::new();
                    tokio::io::stdin().read_to_string(&mut raw).await?;
                    raw
                }
            };

            let outcome = migrator.import(&raw, *form).await?;
            println!("✅ {}", Notice::imported(&outcome).message);
        }
        Command::Page { form, kind_only } => {
            let state = migrator.page_state(*form, *kind_only).await;
            let view = render_page(&state);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Forms => "forms",
        Command::Feeds { .. } => "feeds",
        Command::Export { .. } => "export",
        Command::Import { .. } => "import",
        Command::Page { .. } => "page",
    }
}

fn exit_with(error: &MigratorError) -> ! {
    // 輸出用戶友好的錯誤信息
    let notice = Notice::from_error(error);
    eprintln!("❌ {}", notice.message);
    eprintln!("💡 建議: {}", error.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match error.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
