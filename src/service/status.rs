use anyhow::Result;
use std::path::Path;

use outfit_local::CollectionMetadata;
use outfit_types::VectorStore;

use crate::service::context::AppContext;
use crate::ui::Output;

/// 显示向量库状态和当前使用的服务
pub async fn status(config_path: Option<&Path>) -> Result<()> {
    let output = Output::new();
    let ctx = AppContext::load(config_path).await?;

    let record_count = ctx.store.count().await?;
    output.database_info(
        &ctx.store_path,
        record_count,
        ctx.embedder.model(),
        ctx.embedder.dimension(),
    );

    match CollectionMetadata::load(&ctx.store_path, ctx.store.collection())? {
        Some(metadata) => output.status(
            "Collection",
            &format!(
                "{} (created {})",
                metadata.collection,
                metadata.created_at.format("%Y-%m-%d %H:%M")
            ),
        ),
        None => output.status(
            "Collection",
            &format!("{} (not created yet)", ctx.store.collection()),
        ),
    }

    output.status("Embedding", &ctx.config.embedding);
    output.status("LLM", &ctx.config.llm);
    output.status("Weather", &ctx.config.weather);
    output.status("Rules", &ctx.config.rules_path.display().to_string());

    ctx.store.close().await?;
    Ok(())
}
