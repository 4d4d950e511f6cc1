use anyhow::{Context, Result};
use lancedb::connection::Connection as LanceConnection;
use std::path::Path;

pub struct Connection {
    conn: LanceConnection,
}

impl Connection {
    pub async fn connect(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create database directory: {}", path.display()))?;

        let uri = path
            .to_str()
            .with_context(|| format!("Database path is not valid UTF-8: {}", path.display()))?;

        let conn = lancedb::connect(uri)
            .execute()
            .await
            .with_context(|| format!("Failed to connect to database: {}", uri))?;

        Ok(Self { conn })
    }

    pub fn inner(&self) -> &LanceConnection {
        &self.conn
    }
}
