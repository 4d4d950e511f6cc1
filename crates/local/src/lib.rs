//! Outfit Local - LanceDB-based local vector store
//!
//! This crate implements the VectorStore trait using LanceDB
//! for local vector storage with filtered L2 search.

mod client;
mod db;

// Re-export the client (implements VectorStore)
pub use client::LocalVectorStore;
// Re-export collection metadata and filter rendering for the service layer
pub use db::{filter_expression, CollectionMetadata};
