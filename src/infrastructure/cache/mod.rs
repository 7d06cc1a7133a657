pub mod memory_token_store;
pub mod redis_token_store;
