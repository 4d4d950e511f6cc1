use thiserror::Error;

/// 存储操作类型，用于区分连接、写入和查询错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Connect,
    EnsureCollection,
    Insert,
    Search,
    Count,
    Clear,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreOp::Connect => "connect",
            StoreOp::EnsureCollection => "ensure collection",
            StoreOp::Insert => "insert",
            StoreOp::Search => "search",
            StoreOp::Count => "count",
            StoreOp::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// 向量存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 打开数据库或读取集合元数据失败
    #[error("store connect failed: {0}")]
    Connect(String),

    /// 写入失败（插入、建表、清空）
    #[error("store write failed: {0}")]
    Write(String),

    /// 查询失败（检索、计数）
    #[error("store query failed: {0}")]
    Query(String),

    #[error("vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("field '{field}' too long: {length} characters, max {max_length}")]
    FieldTooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    #[error("store {op} timed out after {secs}s")]
    Timeout { op: StoreOp, secs: u64 },

    #[error("store connection is closed")]
    Closed,
}

impl StoreError {
    /// 按操作类型包装底层错误
    pub fn for_op(op: StoreOp, err: impl std::fmt::Display) -> Self {
        match op {
            StoreOp::Connect => StoreError::Connect(err.to_string()),
            StoreOp::Search | StoreOp::Count => StoreError::Query(format!("{}: {}", op, err)),
            StoreOp::EnsureCollection | StoreOp::Insert | StoreOp::Clear => {
                StoreError::Write(format!("{}: {}", op, err))
            }
        }
    }
}
