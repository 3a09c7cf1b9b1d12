//! # RMA Cache
//!
//! 查詢結果快取：以端點與排序後的參數為鍵，TTL 到期或變更操作後失效。

pub mod clock;
pub mod key;
pub mod mutation;
pub mod query_cache;

// Re-export 主要類型
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use mutation::{endpoints, Mutation, Scope};
pub use query_cache::{QueryCache, DEFAULT_TTL};
