pub mod connection;
pub mod filter;
pub mod metadata;
pub mod table;

pub use connection::Connection;
pub use filter::filter_expression;
pub use metadata::CollectionMetadata;
pub use table::TableOperations;
