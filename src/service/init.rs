use anyhow::{Context, Result};
use std::path::Path;

use outfit_types::VectorStore;

use crate::config::{AppConfig, ProvidersConfig};
use crate::service::context::AppContext;
use crate::ui::Output;

const CONFIG_TEMPLATE: &str = include_str!("../../config.example.toml");
const PROVIDERS_TEMPLATE: &str = include_str!("../../providers.example.toml");

/// 写入示例配置（已存在的文件保持不变），返回是否新建了文件
fn write_template(output: &Output, path: &Path, content: &str, resource: &str) -> Result<bool> {
    if path.exists() {
        output.resource_action("Found", resource, path);
        return Ok(false);
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}: {}", resource, path.display()))?;
    output.resource_action("Creating", resource, path);
    Ok(true)
}

/// 初始化配置目录和向量库集合
/// local: true 表示在 ./.outfit 初始化，false 表示在 ~/.outfit 初始化
pub async fn initialize(local: bool) -> Result<()> {
    let output = Output::new();
    let config_dir = if local {
        AppConfig::local_dir()
    } else {
        AppConfig::global_dir()
    };

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_path = config_dir.join(AppConfig::FILE_NAME);
    let created_config = write_template(&output, &config_path, CONFIG_TEMPLATE, "config")?;
    let created_providers = write_template(
        &output,
        &config_dir.join(ProvidersConfig::FILE_NAME),
        PROVIDERS_TEMPLATE,
        "providers",
    )?;

    if created_config || created_providers {
        output.note("Edit providers.toml to set the LLM and weather API keys");
    }

    let ctx = AppContext::load(Some(&config_path)).await?;
    ctx.store.ensure_collection().await?;
    output.database_info(
        &ctx.store_path,
        ctx.store.count().await?,
        ctx.embedder.model(),
        ctx.embedder.dimension(),
    );
    ctx.store.close().await?;

    output.finish("initialization");
    Ok(())
}
