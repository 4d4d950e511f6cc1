use anyhow::Result;
use arrow_array::{
    ArrayRef, FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use lancedb::table::Table;
use std::sync::Arc;

use outfit_types::NewRecord;

pub struct TableOperations;

impl TableOperations {
    pub async fn create_table(
        conn: &lancedb::connection::Connection,
        table_name: &str,
        vector_dim: usize,
    ) -> Result<Table> {
        let table = conn
            .create_empty_table(table_name, record_schema(vector_dim))
            .execute()
            .await?;

        Ok(table)
    }

    pub async fn open_table(
        conn: &lancedb::connection::Connection,
        table_name: &str,
    ) -> Result<Table> {
        let table = conn.open_table(table_name).execute().await?;

        Ok(table)
    }

    pub async fn table_exists(
        conn: &lancedb::connection::Connection,
        table_name: &str,
    ) -> Result<bool> {
        let names = conn.table_names().execute().await?;
        Ok(names.iter().any(|name| name == table_name))
    }
}

/// 集合 schema
///
/// id 为存储分配的 int64 主键；vector 为固定维度的 float32 数组；
/// 其余字段作为可过滤属性。
pub fn record_schema(vector_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                vector_dim as i32,
            ),
            false,
        ),
        Field::new("temperature_min", DataType::Int32, false),
        Field::new("temperature_max", DataType::Int32, false),
        Field::new("weather", DataType::Utf8, false),
        Field::new("preference", DataType::Utf8, false),
        Field::new("outfit", DataType::Utf8, false),
    ]))
}

/// 将记录转换为单行 RecordBatch
pub fn record_to_batch(id: i64, record: &NewRecord) -> Result<RecordBatch> {
    let dim = record.vector.len();
    let attrs = &record.attributes;

    let vector_values = Float32Array::from(record.vector.clone());
    let vector_array = FixedSizeListArray::new(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dim as i32,
        Arc::new(vector_values),
        None,
    );

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![id])),
        Arc::new(StringArray::from(vec![record.text.as_str()])),
        Arc::new(vector_array),
        Arc::new(Int32Array::from(vec![attrs.temperature_min])),
        Arc::new(Int32Array::from(vec![attrs.temperature_max])),
        Arc::new(StringArray::from(vec![attrs.weather.as_str()])),
        Arc::new(StringArray::from(vec![attrs.preference.as_str()])),
        Arc::new(StringArray::from(vec![attrs.outfit.as_str()])),
    ];

    Ok(RecordBatch::try_new(record_schema(dim), arrays)?)
}
