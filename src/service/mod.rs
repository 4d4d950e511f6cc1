pub mod clear;
pub mod context;
pub mod ingest;
pub mod init;
pub mod policy;
pub mod recommend;
pub mod serve;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;
