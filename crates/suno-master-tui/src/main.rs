// Suno Master Pro entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load .env, then config (defaults copied on first run)
// 3. Build the LLM client and resolve the instruction preamble
// 4. Create mpsc channels
// 5. Spawn app logic task
// 6. Run the TUI until the user quits
// 7. Cleanup on exit

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use suno_master_core::config;
use suno_master_core::prompt;
use suno_master_llm::LlmClient;
use suno_master_tui::app;
use suno_master_tui::tui::{self, ViewState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Suno Master Pro starting up");

    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: model={}, max_tokens={}",
        config.llm.model, config.llm.max_tokens
    );

    let llm_client = LlmClient::from_config(&config);
    let credential_missing = !llm_client.is_active();
    if credential_missing {
        warn!("No API key configured; generation is disabled");
    } else {
        info!("LLM client initialized (API key configured)");
    }

    let instructions = prompt::default_instructions(config.prompt.custom_instructions.as_deref());

    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, llm_client, llm_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(llm_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    let view_state = ViewState::new(instructions, credential_missing);
    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {}", e);
    }

    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Suno Master Pro shut down cleanly");
    Ok(())
}

/// Log to `logs/suno-master.log`; the terminal belongs to the TUI.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("suno-master.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("suno_master=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
