//! In-process layout store with optional JSON-file persistence.
//!
//! All rows live behind one `RwLock`. Every mutation runs against a copy of
//! the rows, is written to disk (when a file is configured), and only then
//! replaces the live state, so readers never observe a half-applied
//! `set_default` or a state the file does not hold.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::LayoutRepository;
use crate::error::{EtiketError, Result};
use crate::layout::{LayoutConfiguration, LayoutDraft, LayoutId, OwnerScope};

#[derive(Debug, Clone)]
struct Row {
    /// Insertion order; breaks `created_at` ties.
    seq: u64,
    layout: LayoutConfiguration,
}

#[derive(Debug, Clone, Default)]
struct Rows {
    rows: Vec<Row>,
    next_seq: u64,
}

impl Rows {
    fn find(&self, id: LayoutId) -> Result<&Row> {
        self.rows
            .iter()
            .find(|r| r.layout.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn find_mut(&mut self, id: LayoutId) -> Result<&mut Row> {
        self.rows
            .iter_mut()
            .find(|r| r.layout.id == id)
            .ok_or_else(|| not_found(id))
    }

    fn in_scope<'a>(&'a self, scope: &'a OwnerScope) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |r| &r.layout.owner_scope == scope)
    }

    fn push(&mut self, layout: LayoutConfiguration) {
        self.rows.push(Row {
            seq: self.next_seq,
            layout,
        });
        self.next_seq += 1;
    }

    /// Set `id` as the single default of `scope`.
    fn promote(&mut self, id: LayoutId, scope: &OwnerScope) {
        for row in self.rows.iter_mut().filter(|r| &r.layout.owner_scope == scope) {
            row.layout.is_default = row.layout.id == id;
        }
    }

    /// Restore one default per non-empty scope after loading from disk.
    fn repair_defaults(&mut self) {
        let scopes: HashSet<OwnerScope> = self
            .rows
            .iter()
            .map(|r| r.layout.owner_scope.clone())
            .collect();

        for scope in scopes {
            let mut rows: Vec<&Row> = self.in_scope(&scope).collect();
            rows.sort_by(|a, b| newest_first(a, b));
            let defaults = rows.iter().filter(|r| r.layout.is_default).count();
            if defaults == 1 {
                continue;
            }
            let keep = rows
                .iter()
                .find(|r| r.layout.is_default)
                .or_else(|| rows.first())
                .map(|r| r.layout.id);
            if let Some(keep) = keep {
                tracing::warn!(
                    scope = %scope,
                    defaults,
                    layout_id = %keep,
                    "repairing default layout flags"
                );
                self.promote(keep, &scope);
            }
        }
    }
}

fn newest_first(a: &Row, b: &Row) -> std::cmp::Ordering {
    b.layout
        .created_at
        .cmp(&a.layout.created_at)
        .then(b.seq.cmp(&a.seq))
}

fn not_found(id: LayoutId) -> EtiketError {
    EtiketError::NotFound(format!("layout {} not found", id))
}

/// Layout store held in memory, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    state: RwLock<Rows>,
    path: Option<PathBuf>,
}

impl MemoryLayoutStore {
    /// Empty store without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading existing rows if the file exists.
    ///
    /// Loaded rows are backfilled and clamped into range, and each scope is
    /// left with exactly one default.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut rows = Rows::default();

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let mut layouts: Vec<LayoutConfiguration> = serde_json::from_slice(&bytes)
                    .map_err(|e| {
                        EtiketError::StorageFailure(format!(
                            "failed to parse {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                layouts.sort_by_key(|l| l.created_at);
                let mut seen = HashSet::new();
                for mut layout in layouts {
                    if !seen.insert(layout.id) {
                        tracing::warn!(layout_id = %layout.id, "dropping duplicate layout id");
                        continue;
                    }
                    for clamped in layout.style.clamp_ranges() {
                        tracing::warn!(
                            layout_id = %layout.id,
                            field = clamped.field.name(),
                            stored = clamped.requested,
                            applied = clamped.applied,
                            "stored value out of range"
                        );
                    }
                    rows.push(layout);
                }
                rows.repair_defaults();
                tracing::info!(path = %path.display(), count = rows.rows.len(), "loaded layouts");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no layout file yet, starting empty");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            state: RwLock::new(rows),
            path: Some(path),
        })
    }

    /// Write `rows` to the backing file via temp-file + rename.
    async fn persist(&self, rows: &Rows) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let layouts: Vec<&LayoutConfiguration> = rows.rows.iter().map(|r| &r.layout).collect();
        let json = serde_json::to_vec_pretty(&layouts)
            .map_err(|e| EtiketError::StorageFailure(e.to_string()))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let write = async {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&tmp, &json).await?;
            tokio::fs::rename(&tmp, path).await
        };
        write.await.map_err(|e| {
            EtiketError::StorageFailure(format!("failed to write {}: {}", path.display(), e))
        })
    }

    /// Apply `mutate` to a copy of the rows, persist, then commit.
    async fn mutate<T>(&self, mutate: impl FnOnce(&mut Rows) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = mutate(&mut next)?;
        self.persist(&next).await?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl LayoutRepository for MemoryLayoutStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<LayoutConfiguration>> {
        let state = self.state.read().await;
        let mut rows: Vec<&Row> = state.in_scope(scope).collect();
        rows.sort_by(|a, b| newest_first(a, b));
        Ok(rows.into_iter().map(|r| r.layout.clone()).collect())
    }

    async fn get(&self, id: LayoutId) -> Result<LayoutConfiguration> {
        let state = self.state.read().await;
        state.find(id).map(|r| r.layout.clone())
    }

    async fn create(&self, scope: &OwnerScope, draft: LayoutDraft) -> Result<LayoutConfiguration> {
        draft.validate()?;
        let layout = self
            .mutate(|rows| {
                let first = rows.in_scope(scope).next().is_none();
                let layout = LayoutConfiguration {
                    id: LayoutId::new(),
                    name: draft.name.trim().to_string(),
                    owner_scope: scope.clone(),
                    is_default: first,
                    created_at: Utc::now(),
                    style: draft.style,
                };
                rows.push(layout.clone());
                Ok(layout)
            })
            .await?;

        tracing::info!(
            layout_id = %layout.id,
            scope = %scope,
            is_default = layout.is_default,
            "layout created"
        );
        Ok(layout)
    }

    async fn update(&self, id: LayoutId, draft: LayoutDraft) -> Result<LayoutConfiguration> {
        draft.validate()?;
        let layout = self
            .mutate(|rows| {
                let row = rows.find_mut(id)?;
                row.layout.name = draft.name.trim().to_string();
                row.layout.style = draft.style;
                Ok(row.layout.clone())
            })
            .await?;

        tracing::info!(layout_id = %id, "layout updated");
        Ok(layout)
    }

    async fn set_default(&self, id: LayoutId, scope: &OwnerScope) -> Result<LayoutConfiguration> {
        let layout = self
            .mutate(|rows| {
                if &rows.find(id)?.layout.owner_scope != scope {
                    return Err(EtiketError::NotFound(format!(
                        "layout {} not found in scope {}",
                        id, scope
                    )));
                }
                rows.promote(id, scope);
                rows.find(id).map(|r| r.layout.clone())
            })
            .await?;

        tracing::info!(layout_id = %id, scope = %scope, "default layout changed");
        Ok(layout)
    }

    async fn delete(&self, id: LayoutId) -> Result<()> {
        self.mutate(|rows| {
            let target = rows.find(id)?.layout.clone();
            if rows.in_scope(&target.owner_scope).count() == 1 {
                return Err(EtiketError::ForbiddenOperation(format!(
                    "layout {} is the only layout of scope {}",
                    id, target.owner_scope
                )));
            }
            if target.is_default {
                return Err(EtiketError::ForbiddenOperation(format!(
                    "layout {} is the default of scope {}; choose a replacement first",
                    id, target.owner_scope
                )));
            }
            rows.rows.retain(|r| r.layout.id != id);
            Ok(())
        })
        .await?;

        tracing::info!(layout_id = %id, "layout deleted");
        Ok(())
    }

    async fn delete_with_replacement(
        &self,
        id: LayoutId,
        replacement: LayoutId,
    ) -> Result<LayoutConfiguration> {
        let promoted = self
            .mutate(|rows| {
                let scope = rows.find(id)?.layout.owner_scope.clone();
                let candidate = rows.find(replacement)?;
                if replacement == id {
                    return Err(EtiketError::ForbiddenOperation(format!(
                        "layout {} cannot replace itself",
                        id
                    )));
                }
                if candidate.layout.owner_scope != scope {
                    return Err(EtiketError::ForbiddenOperation(format!(
                        "replacement {} belongs to scope {}, not {}",
                        replacement, candidate.layout.owner_scope, scope
                    )));
                }
                rows.promote(replacement, &scope);
                rows.rows.retain(|r| r.layout.id != id);
                rows.find(replacement).map(|r| r.layout.clone())
            })
            .await?;

        tracing::info!(
            layout_id = %id,
            replacement = %replacement,
            "layout deleted, default replaced"
        );
        Ok(promoted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutStyle;

    fn draft(name: &str) -> LayoutDraft {
        LayoutDraft::new(name)
    }

    fn defaults(layouts: &[LayoutConfiguration]) -> Vec<LayoutId> {
        layouts.iter().filter(|l| l.is_default).map(|l| l.id).collect()
    }

    #[tokio::test]
    async fn test_first_layout_is_default() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::Tenant;
        let a = store.create(&scope, draft("A")).await.unwrap();
        let b = store.create(&scope, draft("B")).await.unwrap();
        assert!(a.is_default);
        assert!(!b.is_default);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped() {
        let store = MemoryLayoutStore::new();
        let tenant = OwnerScope::Tenant;
        let user = OwnerScope::user("m-1");
        let a = store.create(&tenant, draft("A")).await.unwrap();
        let b = store.create(&tenant, draft("B")).await.unwrap();
        let u = store.create(&user, draft("U")).await.unwrap();

        let ids: Vec<LayoutId> = store.list(&tenant).await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
        let user_layouts = store.list(&user).await.unwrap();
        assert_eq!(user_layouts.len(), 1);
        // Each scope gets its own default
        assert!(user_layouts[0].is_default);
        assert_eq!(user_layouts[0].id, u.id);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = MemoryLayoutStore::new();
        let err = store.get(LayoutId::new()).await.unwrap_err();
        assert!(matches!(err, EtiketError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let store = MemoryLayoutStore::new();
        let mut d = draft("Bad");
        d.style.font_size = 20;
        let err = store.create(&OwnerScope::Tenant, d).await.unwrap_err();
        assert_eq!(err.field(), Some("font_size"));
        assert!(store.list(&OwnerScope::Tenant).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_style_but_not_default() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::Tenant;
        let a = store.create(&scope, draft("A")).await.unwrap();
        let b = store.create(&scope, draft("B")).await.unwrap();

        let new_draft = LayoutDraft {
            name: "B2".into(),
            style: LayoutStyle {
                header_color: "#FF0000".into(),
                ..Default::default()
            },
        };
        let updated = store.update(b.id, new_draft).await.unwrap();
        assert_eq!(updated.name, "B2");
        assert_eq!(updated.style.header_color, "#FF0000");
        assert!(!updated.is_default);
        assert_eq!(updated.created_at, b.created_at);
        assert!(store.get(a.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_set_default_moves_flag() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::Tenant;
        let a = store.create(&scope, draft("A")).await.unwrap();
        let b = store.create(&scope, draft("B")).await.unwrap();

        store.set_default(b.id, &scope).await.unwrap();
        assert!(!store.get(a.id).await.unwrap().is_default);
        assert!(store.get(b.id).await.unwrap().is_default);
        assert_eq!(store.default_for(&scope).await.unwrap().unwrap().id, b.id);
    }

    #[tokio::test]
    async fn test_set_default_other_scope_is_not_found() {
        let store = MemoryLayoutStore::new();
        let a = store.create(&OwnerScope::Tenant, draft("A")).await.unwrap();
        let err = store
            .set_default(a.id, &OwnerScope::user("m-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, EtiketError::NotFound(_)));
        assert!(store.get(a.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_delete_last_layout_forbidden() {
        let store = MemoryLayoutStore::new();
        let a = store.create(&OwnerScope::Tenant, draft("A")).await.unwrap();
        let err = store.delete(a.id).await.unwrap_err();
        assert!(matches!(err, EtiketError::ForbiddenOperation(_)));
        assert_eq!(store.list(&OwnerScope::Tenant).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_default_requires_replacement() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::Tenant;
        let a = store.create(&scope, draft("A")).await.unwrap();
        let b = store.create(&scope, draft("B")).await.unwrap();

        let err = store.delete(a.id).await.unwrap_err();
        assert!(matches!(err, EtiketError::ForbiddenOperation(_)));

        let promoted = store.delete_with_replacement(a.id, b.id).await.unwrap();
        assert_eq!(promoted.id, b.id);
        assert!(promoted.is_default);
        let remaining = store.list(&scope).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(defaults(&remaining), vec![b.id]);
    }

    #[tokio::test]
    async fn test_delete_non_default() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::Tenant;
        let a = store.create(&scope, draft("A")).await.unwrap();
        let b = store.create(&scope, draft("B")).await.unwrap();
        store.delete(b.id).await.unwrap();
        assert_eq!(defaults(&store.list(&scope).await.unwrap()), vec![a.id]);
        assert!(matches!(
            store.delete(b.id).await,
            Err(EtiketError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replacement_must_share_scope() {
        let store = MemoryLayoutStore::new();
        let a = store.create(&OwnerScope::Tenant, draft("A")).await.unwrap();
        store.create(&OwnerScope::Tenant, draft("B")).await.unwrap();
        let u = store.create(&OwnerScope::user("m"), draft("U")).await.unwrap();
        let err = store.delete_with_replacement(a.id, u.id).await.unwrap_err();
        assert!(matches!(err, EtiketError::ForbiddenOperation(_)));
        let err = store.delete_with_replacement(a.id, a.id).await.unwrap_err();
        assert!(matches!(err, EtiketError::ForbiddenOperation(_)));
        assert!(store.get(a.id).await.unwrap().is_default);
    }

    #[tokio::test]
    async fn test_default_unique_across_operation_sequences() {
        let store = MemoryLayoutStore::new();
        let scope = OwnerScope::user("seq");
        let mut seed: u64 = 0x2545_F491;

        for step in 0..200 {
            // xorshift keeps the sequence reproducible
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;

            let layouts = store.list(&scope).await.unwrap();
            let pick = |n: u64| layouts[(n as usize) % layouts.len()].id;
            match seed % 4 {
                0 => {
                    store.create(&scope, draft(&format!("L{}", step))).await.unwrap();
                }
                1 if !layouts.is_empty() => {
                    store.set_default(pick(seed >> 8), &scope).await.unwrap();
                }
                2 if !layouts.is_empty() => {
                    let _ = store.delete(pick(seed >> 8)).await;
                }
                3 if layouts.len() > 1 => {
                    let id = pick(seed >> 8);
                    let replacement = layouts.iter().find(|l| l.id != id).unwrap().id;
                    store.delete_with_replacement(id, replacement).await.unwrap();
                }
                _ => {}
            }

            let after = store.list(&scope).await.unwrap();
            if !after.is_empty() {
                assert_eq!(defaults(&after).len(), 1, "step {}", step);
            }
        }
    }

    #[tokio::test]
    async fn test_file_persistence_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");
        let scope = OwnerScope::Tenant;

        let (a, b) = {
            let store = MemoryLayoutStore::open(&path).await.unwrap();
            let a = store.create(&scope, draft("A")).await.unwrap();
            let b = store.create(&scope, draft("B")).await.unwrap();
            store.set_default(b.id, &scope).await.unwrap();
            (a, b)
        };

        let reopened = MemoryLayoutStore::open(&path).await.unwrap();
        let layouts = reopened.list(&scope).await.unwrap();
        assert_eq!(layouts.len(), 2);
        assert_eq!(defaults(&layouts), vec![b.id]);
        assert_eq!(reopened.get(a.id).await.unwrap().name, "A");
    }

    #[tokio::test]
    async fn test_tmp_named_data_file_survives_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.tmp");
        let scope = OwnerScope::Tenant;

        let a = {
            let store = MemoryLayoutStore::open(&path).await.unwrap();
            let a = store.create(&scope, draft("A")).await.unwrap();
            store.create(&scope, draft("B")).await.unwrap();
            a
        };

        assert!(path.exists());
        assert!(!dir.path().join("layouts.tmp.tmp").exists());
        let reopened = MemoryLayoutStore::open(&path).await.unwrap();
        assert_eq!(reopened.list(&scope).await.unwrap().len(), 2);
        assert_eq!(reopened.get(a.id).await.unwrap().name, "A");
    }

    #[tokio::test]
    async fn test_open_drops_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");
        let id = "6f1c1a7e-8f55-4a8e-9a55-2d0f1d5f3a10";
        let rows = serde_json::json!([
            {
                "id": id,
                "name": "First",
                "owner_scope": {"kind": "tenant"},
                "is_default": true,
                "created_at": "2023-01-01T00:00:00Z"
            },
            {
                "id": id,
                "name": "Copy",
                "owner_scope": {"kind": "tenant"},
                "is_default": true,
                "created_at": "2023-06-01T00:00:00Z"
            },
            {
                "id": "0b7e3f2c-5a1d-4c6e-8f9a-1b2c3d4e5f60",
                "name": "Other",
                "owner_scope": {"kind": "tenant"},
                "is_default": false,
                "created_at": "2023-03-01T00:00:00Z"
            }
        ]);
        std::fs::write(&path, serde_json::to_vec(&rows).unwrap()).unwrap();

        let store = MemoryLayoutStore::open(&path).await.unwrap();
        let layouts = store.list(&OwnerScope::Tenant).await.unwrap();
        assert_eq!(layouts.len(), 2);
        assert_eq!(defaults(&layouts).len(), 1);

        let kept: LayoutId = serde_json::from_value(serde_json::json!(id)).unwrap();
        assert_eq!(store.get(kept).await.unwrap().name, "First");
        let other = layouts.iter().find(|l| l.id != kept).unwrap().id;
        store.delete_with_replacement(kept, other).await.unwrap();
        assert!(store.get(kept).await.is_err());
        assert_eq!(store.list(&OwnerScope::Tenant).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_repairs_and_clamps_legacy_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layouts.json");
        let rows = serde_json::json!([
            {
                "id": "6f1c1a7e-8f55-4a8e-9a55-2d0f1d5f3a10",
                "name": "Old",
                "owner_scope": {"kind": "tenant"},
                "is_default": false,
                "created_at": "2023-01-01T00:00:00Z",
                "font_size": 40
            },
            {
                "id": "0b7e3f2c-5a1d-4c6e-8f9a-1b2c3d4e5f60",
                "name": "Newer",
                "owner_scope": {"kind": "tenant"},
                "is_default": false,
                "created_at": "2023-06-01T00:00:00Z"
            }
        ]);
        std::fs::write(&path, serde_json::to_vec(&rows).unwrap()).unwrap();

        let store = MemoryLayoutStore::open(&path).await.unwrap();
        let layouts = store.list(&OwnerScope::Tenant).await.unwrap();
        assert_eq!(layouts[0].name, "Newer");
        assert!(layouts[0].is_default);
        assert_eq!(layouts[1].style.font_size, 16);
        assert_eq!(layouts[1].style.logo_width, 100);
        assert_eq!(layouts[1].style.logo_height, 50);
    }
}
