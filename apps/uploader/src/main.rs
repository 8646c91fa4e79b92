//! `lago-uploader`: uploads files to Lago storage from the command line.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lago_session::{FileSessionStore, MemorySessionStore, SessionStore, keys};
use lago_upload::{
    CancellationToken, FileSource, HttpBackend, UploadContext, UploadCoordinator, UploadError,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::UploaderConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg = UploaderConfig::load(cli.config.as_deref())?;
    cfg.apply_env();
    if let Some(url) = cli.base_url.clone() {
        cfg.base_url = url;
    }

    let mut backend = HttpBackend::new(cfg.base_url.clone(), cfg.request_timeout())
        .context("failed to build HTTP client")?;
    if let Some(store) = session_store(&cli, &cfg)? {
        backend = backend.with_session_store(store);
    }
    let coordinator = UploadCoordinator::new(backend, cfg.coordinator_options())?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    let mut failed = 0usize;
    for path in &cli.files {
        if cancel.is_cancelled() {
            info!("cancelled");
            std::process::exit(130);
        }

        let source = match FileSource::open(path, cli.mime.as_deref()).await {
            Ok(s) => s,
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot open file");
                failed += 1;
                continue;
            }
        };

        let name = path.display().to_string();
        let ctx = UploadContext::new()
            .with_cancel(cancel.clone())
            .on_progress(move |pct| info!(file = %name, progress = pct, "uploading"));

        match coordinator.upload(&source, &ctx).await {
            Ok(outcome) => println!("{}", serde_json::to_string(&outcome)?),
            Err(UploadError::Cancelled) => {
                info!(path = %path.display(), "cancelled");
                std::process::exit(130);
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "upload failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} uploads did not finish", cli.files.len());
    }
    Ok(())
}

/// Picks the token source: `--token` wins, then the configured or
/// default session file if it exists.
fn session_store(
    cli: &Cli,
    cfg: &UploaderConfig,
) -> anyhow::Result<Option<Arc<dyn SessionStore>>> {
    if let Some(token) = &cli.token {
        return Ok(Some(Arc::new(MemorySessionStore::with(
            keys::ACCESS_TOKEN,
            token,
        ))));
    }

    let path = match cfg
        .session_path
        .clone()
        .or_else(lago_session::default_session_path)
    {
        Some(p) if p.exists() => p,
        _ => return Ok(None),
    };

    let store = FileSessionStore::new(path.clone())
        .with_context(|| format!("failed to read session {}", path.display()))?;
    if store.get(keys::ACCESS_TOKEN).is_none() {
        warn!(path = %path.display(), "session has no access token");
    }
    Ok(Some(Arc::new(store)))
}
