//! TTL 查詢快取

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::key::CacheKey;
use crate::mutation::Mutation;

/// 預設存活時間
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// 執行緒安全的查詢結果快取
///
/// 條目在 `elapsed >= ttl` 時視為過期。
pub struct QueryCache<V, C = SystemClock>
where
    V: Clone,
    C: Clock,
{
    entries: Arc<RwLock<HashMap<CacheKey, Entry<V>>>>,
    ttl: Duration,
    clock: C,
}

impl<V: Clone> QueryCache<V, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_TTL, SystemClock)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<V: Clone> Default for QueryCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> QueryCache<V, C>
where
    V: Clone,
    C: Clock,
{
    /// 以自訂時鐘建立（測試用）
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Entry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Entry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) < self.ttl
    }

    /// 讀取未過期的值
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.read();
            match entries.get(key) {
                Some(entry) if self.is_fresh(entry, now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // 過期條目順便移除
        let mut entries = self.write();
        if let Some(entry) = entries.get(key) {
            if !self.is_fresh(entry, now) {
                entries.remove(key);
                tracing::debug!("快取過期: {}", key);
            }
        }
        None
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        let inserted_at = self.clock.now();
        self.write().insert(key, Entry { value, inserted_at });
    }

    /// 命中則回傳快取值，否則計算並寫入
    pub fn get_or_insert_with<F>(&self, key: CacheKey, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// 同上，計算失敗時不寫入
    pub fn try_get_or_insert_with<F, E>(&self, key: CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// 移除字串形式包含 `pattern` 的所有條目，回傳移除數量
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| !key.render().contains(pattern));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("快取失效 pattern={} 移除 {} 筆", pattern, removed);
        }
        removed
    }

    /// 依變更操作使相關條目失效
    pub fn apply_mutation(&self, mutation: &Mutation) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| !mutation.invalidates(key));
        let removed = before - entries.len();
        tracing::debug!("{:?} 使 {} 筆快取失效", mutation, removed);
        removed
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// 移除所有過期條目
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.inserted_at) < self.ttl);
        before - entries.len()
    }

    /// 條目數（含尚未清除的過期條目）
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<V, C> Clone for QueryCache<V, C>
where
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            clock: self.clock.clone(),
        }
    }
}
