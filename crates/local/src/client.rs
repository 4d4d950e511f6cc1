use arrow_array::{Array, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::table::Table;
use lancedb::DistanceType;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use outfit_types::{
    NewRecord, RuleFilter, StorageConfig, StoreError, StoreOp, VectorStore, FIELD_LIMITS,
};

use crate::db::table::record_to_batch;
use crate::db::{filter_expression, CollectionMetadata, Connection, TableOperations};

/// LanceDB 本地向量存储
pub struct LocalVectorStore {
    conn: Connection,
    path: PathBuf,
    collection: String,
    model: String,
    dimension: usize,
    timeout: Duration,
    next_id: AtomicI64,
    closed: AtomicBool,
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        let path = PathBuf::from(&config.path);

        let conn = match tokio::time::timeout(config.timeout, Connection::connect(&path)).await {
            Ok(result) => result.map_err(|e| StoreError::for_op(StoreOp::Connect, e))?,
            Err(_) => {
                return Err(StoreError::Timeout {
                    op: StoreOp::Connect,
                    secs: config.timeout.as_secs(),
                })
            }
        };

        // 集合已存在时校验维度
        let metadata = CollectionMetadata::load(&path, &config.collection)
            .map_err(|e| StoreError::for_op(StoreOp::Connect, e))?;
        if let Some(metadata) = metadata {
            if metadata.dimension != config.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: metadata.dimension,
                    actual: config.dimension,
                });
            }
        }

        tracing::debug!(
            "Connected to vector store: path={}, collection={}, dimension={}",
            path.display(),
            config.collection,
            config.dimension
        );

        Ok(Self {
            conn,
            path,
            collection: config.collection.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            timeout: config.timeout,
            next_id: AtomicI64::new(chrono::Utc::now().timestamp_micros()),
            closed: AtomicBool::new(false),
        })
    }

    fn collection(&self) -> &str {
        &self.collection
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_collection(&self) -> Result<(), StoreError> {
        let op = StoreOp::EnsureCollection;
        if self.table_exists(op).await? {
            return Ok(());
        }

        let created = self
            .bounded(
                op,
                TableOperations::create_table(self.conn.inner(), &self.collection, self.dimension),
            )
            .await;

        // 并发创建时另一方可能已经建好表
        if let Err(e) = created {
            if self.table_exists(op).await? {
                return Ok(());
            }
            return Err(e);
        }

        CollectionMetadata::new(self.collection.clone(), self.model.clone(), self.dimension)
            .save(&self.path)
            .map_err(|e| StoreError::for_op(op, e))?;

        tracing::info!(
            "Created collection '{}' ({}d)",
            self.collection,
            self.dimension
        );
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let op = StoreOp::Count;
        if !self.table_exists(op).await? {
            return Ok(0);
        }

        let table = self.open_table(op).await?;
        self.bounded(op, table.count_rows(None)).await
    }

    async fn insert(&self, record: NewRecord) -> Result<(), StoreError> {
        let op = StoreOp::Insert;
        FIELD_LIMITS.validate(&record, self.dimension)?;

        self.ensure_collection().await?;
        let table = self.open_table(op).await?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let batch = record_to_batch(id, &record).map_err(|e| StoreError::for_op(op, e))?;
        let schema = batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);

        self.bounded(op, table.add(Box::new(batches)).execute()).await?;

        tracing::debug!("Inserted record {} into '{}'", id, self.collection);
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        filter: &RuleFilter,
        top_k: usize,
    ) -> Result<Vec<String>, StoreError> {
        let op = StoreOp::Search;

        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        if top_k == 0 || !self.table_exists(op).await? {
            return Ok(vec![]);
        }

        let table = self.open_table(op).await?;
        let expr = filter_expression(filter);
        tracing::debug!("Searching '{}' where {}", self.collection, expr);

        let query = table
            .vector_search(vector)
            .map_err(|e| StoreError::for_op(op, e))?
            .distance_type(DistanceType::L2)
            .only_if(expr)
            .select(Select::columns(&["outfit", "_distance"]))
            .limit(top_k);

        let batches = self
            .bounded(op, async move {
                let mut stream = query.execute().await?;
                let mut batches = Vec::new();
                while let Some(batch) = stream.try_next().await? {
                    batches.push(batch);
                }
                Ok::<_, anyhow::Error>(batches)
            })
            .await?;

        let mut hits = parse_search_results(batches).map_err(|e| StoreError::for_op(op, e))?;
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.truncate(top_k);

        Ok(hits.into_iter().map(|(outfit, _)| outfit).collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let op = StoreOp::Clear;
        if !self.table_exists(op).await? {
            return Ok(());
        }

        let table = self.open_table(op).await?;
        self.bounded(op, table.delete("id IS NOT NULL")).await?;

        tracing::info!("Cleared collection '{}'", self.collection);
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Closed vector store '{}'", self.collection);
        }
        Ok(())
    }
}

// 私有辅助方法
impl LocalVectorStore {
    /// 为存储调用加上超时，并把底层错误归类为写入/查询错误
    async fn bounded<T, E, F>(&self, op: StoreOp, fut: F) -> Result<T, StoreError>
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }

        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| StoreError::for_op(op, e)),
            Err(_) => Err(StoreError::Timeout {
                op,
                secs: self.timeout.as_secs(),
            }),
        }
    }

    async fn table_exists(&self, op: StoreOp) -> Result<bool, StoreError> {
        self.bounded(
            op,
            TableOperations::table_exists(self.conn.inner(), &self.collection),
        )
        .await
    }

    async fn open_table(&self, op: StoreOp) -> Result<Table, StoreError> {
        self.bounded(
            op,
            TableOperations::open_table(self.conn.inner(), &self.collection),
        )
        .await
    }
}

/// 解析检索结果为 (outfit, distance)
fn parse_search_results(batches: Vec<RecordBatch>) -> anyhow::Result<Vec<(String, f32)>> {
    use anyhow::Context;

    let mut results = Vec::new();

    for batch in batches {
        let num_rows = batch.num_rows();
        if num_rows == 0 {
            continue;
        }

        let outfit_array = batch
            .column_by_name("outfit")
            .context("Missing 'outfit' column")?
            .as_any()
            .downcast_ref::<StringArray>()
            .context("Invalid 'outfit' column type")?;

        let distance_array = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        for i in 0..num_rows {
            let distance = distance_array
                .filter(|arr| arr.is_valid(i))
                .map(|arr| arr.value(i))
                .unwrap_or(f32::MAX);

            results.push((outfit_array.value(i).to_string(), distance));
        }
    }

    Ok(results)
}
