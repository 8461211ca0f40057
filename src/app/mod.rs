mod wiring;

use crate::{cli, context, rest, storage::SqliteStorage};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub struct App {
    pub ctx: context::Context,
    pub storage: SqliteStorage,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = cli::parse();
        let ctx = context::Context::from_cli(&cli);

        crate::tracing::init(ctx.config.log_file.as_deref().map(Path::new));
        log::info!("🚀 Starting shoevote");
        log::info!("📂 Data dir: {}", ctx.config.data_dir);
        log::info!("🗄️  Database: {}", ctx.db_path().to_string_lossy());

        wiring::init_data_dir(&ctx).context("initializing data dir")?;
        let storage = wiring::init_storage(&ctx)?;

        Ok((Self { ctx, storage }, cli))
    }
}

pub async fn run_daemon(app: App) -> Result<()> {
    let admin_secret = app.ctx.config.admin_secret.clone().context(
        "admin secret is required in daemon mode (--admin-secret or SHOEVOTE_ADMIN_SECRET)",
    )?;

    log::info!("🌐 REST API: http://{}", app.ctx.config.api_listen);
    log::info!("🧮 Gallery page size: {}", app.ctx.config.page_size);
    if let Some(path) = app.ctx.config.log_file.as_deref() {
        log::info!("📝 Log file: {}", path);
    }

    let shutdown = CancellationToken::new();

    let state = rest::AppState::new(
        app.storage.clone(),
        admin_secret,
        app.ctx.config.page_size,
    );
    let api_addr = app.ctx.config.api_listen;
    let rest_shutdown = shutdown.clone();

    let mut rest_handle = tokio::spawn(async move {
        if let Err(e) = rest::serve(api_addr, state, rest_shutdown).await {
            log::error!("REST server error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("🧨 Ctrl-C received, shutting down");
            shutdown.cancel();
            rest_handle.await?;
        }
        res = &mut rest_handle => {
            res?;
        }
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}

pub async fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;

    if let Some(cmd) = &cli.cmd {
        // one-shot command mode
        cmd.run(&app.ctx)?;
        return Ok(());
    }

    run_daemon(app).await
}
