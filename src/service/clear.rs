use anyhow::Result;
use std::path::Path;

use outfit_types::VectorStore;

use crate::service::context::AppContext;
use crate::ui::Output;

/// 清空集合中的所有记录（高危操作）
pub async fn clear(config_path: Option<&Path>, skip_confirm: bool) -> Result<()> {
    let output = Output::new();
    let ctx = AppContext::load(config_path).await?;

    let record_count = ctx.store.count().await?;
    output.database_info(
        &ctx.store_path,
        record_count,
        ctx.embedder.model(),
        ctx.embedder.dimension(),
    );

    if record_count == 0 {
        output.info("Collection is empty, nothing to clear.");
        ctx.store.close().await?;
        return Ok(());
    }

    output.warning("this will delete all clothing rules and stored recommendations");
    output.info(&format!("collection: {}", ctx.store.collection()));
    output.info(&format!("{} records will be deleted", record_count));

    if !skip_confirm && !output.confirm("yes")? {
        output.info("Operation cancelled");
        ctx.store.close().await?;
        return Ok(());
    }

    output.begin_operation("Clearing", ctx.store.collection());
    ctx.store.clear().await?;
    ctx.store.close().await?;

    output.finish("clearing");
    Ok(())
}
