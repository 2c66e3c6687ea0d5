//! # Layout Repository
//!
//! CRUD and default-selection over named layouts, scoped to a tenant or a
//! user, plus logo asset upload.
//!
//! ## Default invariant
//!
//! Every non-empty owner scope has exactly one default layout:
//!
//! - the first layout created in a scope becomes its default
//! - [`LayoutRepository::set_default`] moves the flag in one critical section
//! - [`LayoutRepository::delete`] refuses to remove the last layout or the
//!   current default; the caller names the new default through
//!   [`LayoutRepository::delete_with_replacement`]
//!
//! `update` never touches default flags.

mod assets;
mod memory;

pub use assets::{AssetStore, FsAssetStore, MemoryAssetStore, StoredAsset, logo_key};
pub use memory::MemoryLayoutStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::layout::{LayoutConfiguration, LayoutDraft, LayoutId, OwnerScope};

/// Backing store for label layouts.
#[async_trait]
pub trait LayoutRepository: Send + Sync {
    /// Layouts of `scope`, newest first.
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<LayoutConfiguration>>;

    async fn get(&self, id: LayoutId) -> Result<LayoutConfiguration>;

    /// Store a new layout. The first layout of a scope is always its default;
    /// later ones are created non-default.
    async fn create(&self, scope: &OwnerScope, draft: LayoutDraft) -> Result<LayoutConfiguration>;

    /// Replace name and style of an existing layout.
    async fn update(&self, id: LayoutId, draft: LayoutDraft) -> Result<LayoutConfiguration>;

    /// Make `id` the only default of `scope`.
    async fn set_default(&self, id: LayoutId, scope: &OwnerScope) -> Result<LayoutConfiguration>;

    /// Remove a non-default layout.
    async fn delete(&self, id: LayoutId) -> Result<()>;

    /// Promote `replacement` to default and remove `id`, atomically.
    /// Returns the new default.
    async fn delete_with_replacement(
        &self,
        id: LayoutId,
        replacement: LayoutId,
    ) -> Result<LayoutConfiguration>;

    /// The default layout of `scope`, if the scope has any layouts.
    async fn default_for(&self, scope: &OwnerScope) -> Result<Option<LayoutConfiguration>> {
        Ok(self.list(scope).await?.into_iter().find(|l| l.is_default))
    }
}
