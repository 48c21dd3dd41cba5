//! 产物预览存储
//!
//! 保存当前会话已下载产物的本地 URL，按产物逻辑名索引

use bytes::Bytes;
use tracing::debug;

use super::object_url::LocalUrl;

/// 一个已下载的产物
#[derive(Debug)]
pub struct ArtifactHandle {
    /// 逻辑名（classic / modern / cover_letter）
    pub name: String,
    /// 服务端文件名
    pub filename: String,
    pub media_type: String,
    pub blob: Bytes,
    local_url: LocalUrl,
}

impl ArtifactHandle {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        media_type: impl Into<String>,
        blob: Bytes,
        local_url: LocalUrl,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            media_type: media_type.into(),
            blob,
            local_url,
        }
    }

    pub fn url(&self) -> &str {
        self.local_url.as_str()
    }

    pub fn local_url(&self) -> &LocalUrl {
        &self.local_url
    }

    /// 撤销本地 URL
    pub fn revoke(self) {
        self.local_url.revoke();
    }
}

/// 预览存储，保持插入顺序
#[derive(Debug, Default)]
pub struct PreviewStore {
    handles: Vec<ArtifactHandle>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 存入产物，同名的旧产物先撤销
    pub fn put(&mut self, name: &str, mut handle: ArtifactHandle) {
        handle.name = name.to_string();
        if let Some(pos) = self.handles.iter().position(|h| h.name == name) {
            let old = self.handles.remove(pos);
            debug!("替换预览产物 {}: {} -> {}", name, old.url(), handle.url());
            old.revoke();
            self.handles.insert(pos, handle);
        } else {
            self.handles.push(handle);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactHandle> {
        self.handles.iter().find(|h| h.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArtifactHandle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 撤销全部产物并清空，返回撤销的数量；可重复调用
    pub fn clear(&mut self) -> usize {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.revoke();
        }
        if count > 0 {
            debug!("已清空预览存储, 撤销 {} 个本地 URL", count);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ObjectUrlRegistry;

    fn handle(registry: &ObjectUrlRegistry, name: &str) -> ArtifactHandle {
        let blob = Bytes::from(format!("{}-content", name));
        ArtifactHandle::new(
            name,
            format!("{}.pdf", name),
            "application/pdf",
            blob.clone(),
            registry.create(blob),
        )
    }

    #[test]
    fn test_put_replaces_and_revokes_previous() {
        let registry = ObjectUrlRegistry::new();
        let mut store = PreviewStore::new();

        store.put("classic", handle(&registry, "classic"));
        let first_url = store.get("classic").unwrap().url().to_string();
        store.put("classic", handle(&registry, "classic"));

        assert_eq!(store.len(), 1);
        assert!(registry.resolve(&first_url).is_none());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let registry = ObjectUrlRegistry::new();
        let mut store = PreviewStore::new();
        store.put("classic", handle(&registry, "classic"));
        store.put("modern", handle(&registry, "modern"));

        assert_eq!(store.clear(), 2);
        assert_eq!(store.clear(), 0);
        assert_eq!(store.clear(), 0);

        assert!(store.is_empty());
        assert_eq!(registry.revoked_count(), 2);
        assert_eq!(registry.stale_revocations(), 0);
    }

    #[test]
    fn test_keeps_insertion_order() {
        let registry = ObjectUrlRegistry::new();
        let mut store = PreviewStore::new();
        store.put("modern", handle(&registry, "modern"));
        store.put("classic", handle(&registry, "classic"));

        let names: Vec<_> = store.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["modern", "classic"]);
    }
}
