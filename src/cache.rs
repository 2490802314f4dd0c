use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::exception::Exception;
use crate::pattern::{self, CompiledPattern};

pub const DEFAULT_PATTERN_CACHE_SIZE: usize = 64;

pub struct PatternCache {
    cache: LruCache<String, Arc<CompiledPattern>>,
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::from_capacity(DEFAULT_PATTERN_CACHE_SIZE)
    }
}

impl PatternCache {
    // 根据容量构造，0 表示使用默认容量
    pub fn from_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(
            NonZeroUsize::new(DEFAULT_PATTERN_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN),
        );
        Self {
            cache: LruCache::new(capacity),
        }
    }
    // 放入
    pub fn push(&mut self, pattern: CompiledPattern) -> Arc<CompiledPattern> {
        let pattern = Arc::new(pattern);
        self.cache
            .put(pattern.template().to_string(), Arc::clone(&pattern));
        pattern
    }
    // 查询
    pub fn find(&mut self, template: &str) -> Option<Arc<CompiledPattern>> {
        self.cache.get(template).cloned()
    }
    // 查询，未命中时编译并放入
    pub fn find_or_compile(&mut self, template: &str) -> Result<Arc<CompiledPattern>, Exception> {
        match self.find(template) {
            Some(pattern) => Ok(pattern),
            None => Ok(self.push(pattern::compile(template)?)),
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}
