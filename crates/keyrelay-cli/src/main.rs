use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use keyrelay_core::{Config, KeywordSet};
use keyrelay_relay::RelayBot;
use keyrelay_sheets::{GoogleSheets, MemorySheets, SheetClient, SheetsApi};
use keyrelay_telegram::{TelegramBot, Update};
use tokio::sync::mpsc;
use tracing::info;

/// Relay Telegram messages that contain a keyword into a dated Google Sheets tab.
#[derive(Parser)]
#[command(name = "keyrelay", version, about)]
struct Cli {
    /// Config file (YAML, or JSON with a `.json` extension). Defaults to
    /// `config/config.yml`, or `/app/config/config.yml` when ENVIRONMENT=production.
    #[arg(long, env = "KEYRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Load `<NAME>.json` from ../config/, ../../config/, config/ or app/ instead.
    #[arg(long = "env", value_name = "NAME", conflicts_with = "config")]
    json_env: Option<String>,

    /// Keep matched rows in memory instead of writing to Google Sheets.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    info!("keyrelay v{}", env!("CARGO_PKG_VERSION"));

    let config = match &cli.json_env {
        Some(name) => Config::load_named_json(name),
        None => Config::load(cli.config.as_deref()),
    }
    .context("loading configuration")?;

    let policy = config.relay.cursor_policy;
    let spreadsheet_id = config.google.spreadsheet_id.clone();

    if cli.dry_run {
        info!("dry run: rows are kept in memory");
        let sheets = SheetClient::new(MemorySheets::new(), spreadsheet_id, policy);
        return serve(sheets, &config).await;
    }

    let api = GoogleSheets::connect(&config.google)
        .await
        .context("connecting to google sheets")?;
    serve(SheetClient::new(api, spreadsheet_id, policy), &config).await
}

async fn serve<S: SheetsApi>(sheets: SheetClient<S>, config: &Config) -> anyhow::Result<()> {
    let telegram = Arc::new(
        TelegramBot::connect(&config.telegram.token)
            .await
            .context("connecting to telegram")?,
    );
    let (updates, poller) = telegram.spawn_poller(config.relay.update_buffer);

    let mut bot = RelayBot::new(
        sheets,
        telegram,
        KeywordSet::default(),
        config.telegram.admin_id,
    );

    let result = run_until_interrupt(&mut bot, updates).await;
    poller.abort();
    result
}

async fn run_until_interrupt<S: SheetsApi>(
    bot: &mut RelayBot<S, Arc<TelegramBot>>,
    updates: mpsc::Receiver<Update>,
) -> anyhow::Result<()> {
    tokio::select! {
        _ = bot.run(updates) => Ok(()),
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for ctrl-c")?;
            info!("interrupt received, shutting down");
            Ok(())
        }
    }
}
