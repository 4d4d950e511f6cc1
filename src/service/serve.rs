use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use outfit_types::VectorStore;

use crate::server::{router, AppState};
use crate::service::context::AppContext;
use crate::service::ingest::ingest_on_start;
use crate::ui::Output;

/// `outfit serve`：启动时导入规则，然后提供 HTTP 推荐接口
pub async fn serve(config_path: Option<&Path>, addr: Option<SocketAddr>) -> Result<()> {
    let output = Output::new();
    let ctx = AppContext::load(config_path).await?;

    output.database_info(
        &ctx.store_path,
        ctx.store.count().await?,
        ctx.embedder.model(),
        ctx.embedder.dimension(),
    );

    if ctx.config.ingest_on_start {
        // 导入失败不影响启动
        let ingested = ingest_on_start(
            ctx.embedder.as_ref(),
            ctx.store.as_ref(),
            &ctx.config.rules_path,
        )
        .await;
        if let Some(report) = ingested {
            output.stats(&[("inserted", report.inserted), ("failed", report.failed)]);
        }
    }

    let state = AppState {
        recommender: Arc::new(ctx.recommender()?),
        default_preference: ctx.config.default_preference.clone(),
        default_location: ctx.config.server.location.clone(),
        deadline: ctx.config.timeouts.request(),
    };

    let addr = addr.unwrap_or(ctx.config.server.addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.status("Listening", &format!("http://{}", addr));
    tracing::info!("Server started on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    ctx.store.close().await?;
    output.finish("serving");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
