//! 本地对象 URL
//!
//! 下载得到的二进制内容登记在 [`ObjectUrlRegistry`] 中，
//! 通过 `blob:` URL 引用。每个 [`LocalUrl`] 只能撤销一次：
//! 显式调用 [`LocalUrl::revoke`] 会消耗它，未撤销就被丢弃时在 `Drop` 中撤销。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, warn};

const URL_PREFIX: &str = "blob:resume-flow/";

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<String, Bytes>,
    created: u64,
    revoked: u64,
    stale_revocations: u64,
}

/// 对象 URL 登记表，可在多个会话间共享
#[derive(Debug, Clone, Default)]
pub struct ObjectUrlRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为一段二进制内容分配新的 URL
    pub fn create(&self, blob: Bytes) -> LocalUrl {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let url = format!("{}{}", URL_PREFIX, inner.next_id);
        inner.live.insert(url.clone(), blob);
        inner.created += 1;
        debug!("分配对象 URL: {}", url);

        LocalUrl {
            url,
            registry: self.clone(),
            revoked: false,
        }
    }

    /// 解引用，已撤销的 URL 返回 None
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.inner.lock().live.get(url).cloned()
    }

    fn revoke_url(&self, url: &str) {
        let mut inner = self.inner.lock();
        if inner.live.remove(url).is_some() {
            inner.revoked += 1;
            debug!("撤销对象 URL: {}", url);
        } else {
            inner.stale_revocations += 1;
            warn!("⚠️ 对象 URL 已不存在: {}", url);
        }
    }

    /// 当前未撤销的 URL 数量
    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }

    pub fn created_count(&self) -> u64 {
        self.inner.lock().created
    }

    pub fn revoked_count(&self) -> u64 {
        self.inner.lock().revoked
    }

    /// 撤销时发现 URL 已不存在的次数，正常情况下始终为 0
    pub fn stale_revocations(&self) -> u64 {
        self.inner.lock().stale_revocations
    }
}

/// 指向登记表中一段内容的本地 URL
pub struct LocalUrl {
    url: String,
    registry: ObjectUrlRegistry,
    revoked: bool,
}

impl LocalUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// 读取内容
    pub fn resolve(&self) -> Option<Bytes> {
        self.registry.resolve(&self.url)
    }

    /// 撤销并消耗该 URL
    pub fn revoke(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.registry.revoke_url(&self.url);
        }
    }
}

impl fmt::Debug for LocalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalUrl").field("url", &self.url).finish()
    }
}

impl Drop for LocalUrl {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_resolve() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.create(Bytes::from_static(b"%PDF-1.7"));

        assert!(url.as_str().starts_with("blob:"));
        assert_eq!(url.resolve().unwrap(), Bytes::from_static(b"%PDF-1.7"));
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_revoke_is_exactly_once() {
        let registry = ObjectUrlRegistry::new();
        let url = registry.create(Bytes::from_static(b"a"));
        let raw = url.as_str().to_string();

        url.revoke();

        assert!(registry.resolve(&raw).is_none());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revoked_count(), 1);
        assert_eq!(registry.stale_revocations(), 0);
    }

    #[test]
    fn test_drop_revokes() {
        let registry = ObjectUrlRegistry::new();
        {
            let _a = registry.create(Bytes::from_static(b"a"));
            let _b = registry.create(Bytes::from_static(b"b"));
            assert_eq!(registry.live_count(), 2);
        }
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.created_count(), 2);
        assert_eq!(registry.revoked_count(), 2);
    }

    #[test]
    fn test_urls_are_unique() {
        let registry = ObjectUrlRegistry::new();
        let a = registry.create(Bytes::new());
        let b = registry.create(Bytes::new());
        assert_ne!(a.as_str(), b.as_str());
    }
}
