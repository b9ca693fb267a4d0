pub mod export_log;
pub mod kv_store;
