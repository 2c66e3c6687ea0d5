//! # Layout Editor
//!
//! [`EditorController`] owns one draft layout for one owner scope. Every edit
//! is applied to the draft and re-rendered straight away; nothing reaches the
//! repository until an explicit save.
//!
//! ## Phases
//!
//! ```text
//! Loading --load()--> Idle --edit--> Dirty --begin_save()--> Saving
//!                      ^                                        |
//!                      +------------ complete_save() -----------+
//! ```
//!
//! A save runs as a detached [`PendingSave`], so edits keep flowing while it
//! is in flight. Edits made in that window survive the save and leave the
//! controller `Dirty`.
//!
//! Repository failures never discard the draft. They are returned to the
//! caller and also recorded as dismissable [`Notice`]s.

use std::sync::Arc;

use crate::error::{EtiketError, Result};
use crate::layout::{
    Clamped, FieldEdit, LayoutConfiguration, LayoutDraft, LayoutId, MAX_NAME_LEN, NumericField,
    OwnerScope, SEEDED_LAYOUT_NAME, is_hex_color,
};
use crate::render::{RenderDiagnostic, Renderer, ShipmentRenderContext, VisualTree};
use crate::repository::{AssetStore, LayoutRepository};

/// Where the editor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Idle,
    Dirty,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message that stays until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// A logo file waiting to be uploaded by the next save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLogo {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

#[derive(Debug, Clone)]
struct Draft {
    /// `None` until the draft has been stored once.
    id: Option<LayoutId>,
    layout: LayoutDraft,
    is_default: bool,
}

impl Draft {
    fn stored(layout: &LayoutConfiguration) -> Self {
        Self {
            id: Some(layout.id),
            layout: layout.to_draft(),
            is_default: layout.is_default,
        }
    }
}

/// A save detached from the controller.
///
/// Obtained from [`EditorController::begin_save`]; [`run`](Self::run) it and
/// hand the outcome to [`EditorController::complete_save`].
pub struct PendingSave {
    repo: Arc<dyn LayoutRepository>,
    assets: Arc<dyn AssetStore>,
    scope: OwnerScope,
    id: Option<LayoutId>,
    draft: LayoutDraft,
    logo: Option<PendingLogo>,
    generation: u64,
    edit_seq: u64,
}

/// Result of a [`PendingSave`].
pub struct SaveOutcome {
    /// Draft generation the save was taken from.
    generation: u64,
    edit_seq: u64,
    /// Logo URL the draft had when the save started.
    previous_logo_url: String,
    uploaded_logo_url: Option<String>,
    /// Returned when the upload did not happen, so it can be retried.
    unsent_logo: Option<PendingLogo>,
    result: Result<LayoutConfiguration>,
}

impl SaveOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

impl PendingSave {
    /// Upload the staged logo (if any), then create or update the layout.
    pub async fn run(self) -> SaveOutcome {
        let PendingSave {
            repo,
            assets,
            scope,
            id,
            mut draft,
            logo,
            generation,
            edit_seq,
        } = self;
        let previous_logo_url = draft.style.logo_url.clone();

        let mut uploaded_logo_url = None;
        if let Some(pending) = &logo {
            match assets
                .upload_logo(&scope, &pending.bytes, &pending.file_name)
                .await
            {
                Ok(url) => {
                    draft.style.logo_url = url.clone();
                    uploaded_logo_url = Some(url);
                }
                Err(e) => {
                    return SaveOutcome {
                        generation,
                        edit_seq,
                        previous_logo_url,
                        uploaded_logo_url: None,
                        unsent_logo: logo,
                        result: Err(e),
                    };
                }
            }
        }

        let result = match id {
            Some(id) => repo.update(id, draft).await,
            None => repo.create(&scope, draft).await,
        };
        SaveOutcome {
            generation,
            edit_seq,
            previous_logo_url,
            uploaded_logo_url,
            unsent_logo: None,
            result,
        }
    }
}

/// Single-owner editing session over one owner scope's layouts.
pub struct EditorController {
    repo: Arc<dyn LayoutRepository>,
    assets: Arc<dyn AssetStore>,
    scope: OwnerScope,
    renderer: Renderer,
    context: ShipmentRenderContext,

    layouts: Vec<LayoutConfiguration>,
    draft: Draft,
    /// What `discard_changes` reverts to.
    baseline: Draft,
    pending_logo: Option<PendingLogo>,
    preview: VisualTree,

    loaded: bool,
    saving: bool,
    dirty: bool,
    /// Bumped whenever the draft is replaced by another layout.
    generation: u64,
    /// Bumped on every draft mutation.
    edit_seq: u64,

    notices: Vec<Notice>,
    next_notice_id: u64,
    invalid_fields: Vec<String>,
}

impl EditorController {
    /// Controller previewing against the mock shipment. Call
    /// [`load`](Self::load) before editing.
    pub fn new(
        repo: Arc<dyn LayoutRepository>,
        assets: Arc<dyn AssetStore>,
        scope: OwnerScope,
    ) -> Self {
        let renderer = Renderer::new();
        let context = ShipmentRenderContext::mock();
        let draft = Draft {
            id: None,
            layout: LayoutDraft::new(SEEDED_LAYOUT_NAME),
            is_default: false,
        };
        let preview = renderer.render(&draft.layout.style, &context);
        Self {
            repo,
            assets,
            scope,
            renderer,
            context,
            layouts: Vec::new(),
            baseline: draft.clone(),
            draft,
            pending_logo: None,
            preview,
            loaded: false,
            saving: false,
            dirty: false,
            generation: 0,
            edit_seq: 0,
            notices: Vec::new(),
            next_notice_id: 1,
            invalid_fields: Vec::new(),
        }
    }

    /// Preview against `context` instead of the mock shipment.
    pub fn with_context(mut self, context: ShipmentRenderContext) -> Self {
        self.context = context;
        self.rerender();
        self
    }

    // Accessors

    pub fn phase(&self) -> Phase {
        if !self.loaded {
            Phase::Loading
        } else if self.saving {
            Phase::Saving
        } else if self.dirty {
            Phase::Dirty
        } else {
            Phase::Idle
        }
    }

    pub fn scope(&self) -> &OwnerScope {
        &self.scope
    }

    /// Layouts of the scope as last listed, newest first.
    pub fn layouts(&self) -> &[LayoutConfiguration] {
        &self.layouts
    }

    pub fn draft(&self) -> &LayoutDraft {
        &self.draft.layout
    }

    pub fn draft_id(&self) -> Option<LayoutId> {
        self.draft.id
    }

    /// Whether the stored layout behind the draft is the scope default.
    pub fn draft_is_default(&self) -> bool {
        self.draft.is_default
    }

    pub fn preview(&self) -> &VisualTree {
        &self.preview
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn pending_logo(&self) -> Option<&PendingLogo> {
        self.pending_logo.as_ref()
    }

    /// Fields the last failed validation pointed at.
    pub fn invalid_fields(&self) -> &[String] {
        &self.invalid_fields
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Remove a notice. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Preview warning when the barcode could not be encoded.
    pub fn barcode_warning(&self) -> Option<String> {
        self.preview.diagnostics.iter().find_map(|d| match d {
            RenderDiagnostic::Barcode { error } => Some(format!("Barcode not rendered: {}", error)),
        })
    }

    // Loading and selection

    /// List the scope and select its default layout, seeding one if the scope
    /// is empty.
    pub async fn load(&mut self) -> Result<()> {
        let mut layouts = self
            .repo
            .list(&self.scope)
            .await
            .map_err(|e| self.fail(e))?;

        if layouts.is_empty() {
            let seeded = self
                .repo
                .create(&self.scope, LayoutDraft::new(SEEDED_LAYOUT_NAME))
                .await
                .map_err(|e| self.fail(e))?;
            tracing::info!(scope = %self.scope, layout_id = %seeded.id, "seeded default layout");
            layouts.push(seeded);
        }

        let selected = layouts
            .iter()
            .find(|l| l.is_default)
            .or_else(|| layouts.first())
            .cloned();
        self.layouts = layouts;
        if let Some(layout) = selected {
            self.replace_draft(Draft::stored(&layout));
        }
        self.loaded = true;
        tracing::debug!(scope = %self.scope, count = self.layouts.len(), "editor loaded");
        Ok(())
    }

    /// Replace the draft with a stored layout.
    ///
    /// Fails with `UnsavedChanges` while the draft has edits; call
    /// [`discard_changes`](Self::discard_changes) or save first.
    pub async fn select_layout(&mut self, id: LayoutId) -> Result<()> {
        self.ensure_clean()?;
        let listed = self.layouts.iter().find(|l| l.id == id).cloned();
        let layout = match listed {
            Some(layout) => layout,
            None => {
                let layout = self.repo.get(id).await.map_err(|e| self.fail(e))?;
                if layout.owner_scope != self.scope {
                    return Err(self.fail(EtiketError::NotFound(format!(
                        "layout {} not found in scope {}",
                        id, self.scope
                    ))));
                }
                layout
            }
        };
        self.replace_draft(Draft::stored(&layout));
        tracing::debug!(layout_id = %id, "layout selected");
        Ok(())
    }

    /// Start an unsaved layout from safe defaults. The next save creates it.
    pub fn start_draft(&mut self, name: impl Into<String>) -> Result<()> {
        self.ensure_clean()?;
        self.replace_draft(Draft {
            id: None,
            layout: LayoutDraft::new(name),
            is_default: false,
        });
        self.mark_dirty();
        Ok(())
    }

    /// Throw away unsaved edits and any staged logo.
    pub fn discard_changes(&mut self) {
        let baseline = self.baseline.clone();
        self.replace_draft(baseline);
        tracing::debug!("draft changes discarded");
    }

    // Editing

    /// Apply one edit and re-render. Out-of-range numbers are clamped and
    /// reported with a warning notice.
    pub fn edit_field(&mut self, edit: FieldEdit) -> Option<Clamped> {
        let clamped = edit.apply(&mut self.draft.layout);
        if let Some(c) = &clamped {
            self.notify(
                NoticeLevel::Warning,
                format!(
                    "{} {} is out of range, using {}",
                    c.field.name(),
                    c.requested,
                    c.applied
                ),
            );
        }
        if !self.invalid_fields.is_empty() {
            self.invalid_fields = invalid_fields(&self.draft.layout);
        }
        self.mark_dirty();
        self.rerender();
        clamped
    }

    /// Parse a UI key/value pair and apply it. Unknown keys and mistyped
    /// values leave the draft untouched and highlight the field.
    pub fn edit_field_raw(&mut self, key: &str, value: &serde_json::Value) -> Result<Option<Clamped>> {
        match FieldEdit::parse(key, value) {
            Ok(edit) => Ok(self.edit_field(edit)),
            Err(e) => {
                if let Some(field) = e.field() {
                    self.highlight(field);
                }
                self.notify(NoticeLevel::Warning, e.to_string());
                Err(e)
            }
        }
    }

    /// Stage a logo for upload on the next save.
    pub fn attach_logo(&mut self, bytes: Vec<u8>, file_name: impl Into<String>) {
        self.pending_logo = Some(PendingLogo {
            bytes,
            file_name: file_name.into(),
        });
        self.mark_dirty();
    }

    // Saving

    /// Validate the draft and detach a save.
    ///
    /// Invalid drafts are blocked with their fields highlighted. A second
    /// save while one is outstanding fails with `SaveInProgress`.
    pub fn begin_save(&mut self) -> Result<PendingSave> {
        if self.saving {
            return Err(EtiketError::SaveInProgress);
        }
        if let Err(e) = self.draft.layout.validate() {
            self.invalid_fields = invalid_fields(&self.draft.layout);
            self.notify(NoticeLevel::Warning, e.to_string());
            return Err(e);
        }
        self.invalid_fields.clear();
        self.saving = true;
        tracing::debug!(layout_id = ?self.draft.id, edit_seq = self.edit_seq, "save started");

        Ok(PendingSave {
            repo: Arc::clone(&self.repo),
            assets: Arc::clone(&self.assets),
            scope: self.scope.clone(),
            id: self.draft.id,
            draft: self.draft.layout.clone(),
            logo: self.pending_logo.take(),
            generation: self.generation,
            edit_seq: self.edit_seq,
        })
    }

    /// Fold a finished save back into the controller.
    pub fn complete_save(&mut self, outcome: SaveOutcome) -> Result<LayoutConfiguration> {
        self.saving = false;
        let SaveOutcome {
            generation,
            edit_seq,
            previous_logo_url,
            uploaded_logo_url,
            unsent_logo,
            result,
        } = outcome;
        let same_draft = generation == self.generation;

        let layout = match result {
            Ok(layout) => layout,
            Err(e) => {
                if same_draft {
                    if self.pending_logo.is_none() {
                        self.pending_logo = unsent_logo;
                    }
                    if let Some(field) = e.field() {
                        self.highlight(field);
                    }
                }
                tracing::warn!(error = %e, "save failed");
                return Err(self.fail(e));
            }
        };

        self.upsert_listed(layout.clone());
        let stored = Draft::stored(&layout);

        if !same_draft {
            // The draft was replaced while the save ran; it keeps its own identity
            if self.draft.id == stored.id {
                self.baseline = stored.clone();
                if !self.dirty {
                    self.draft = stored;
                }
            }
        } else if edit_seq == self.edit_seq {
            self.baseline = stored.clone();
            self.draft = stored;
            self.dirty = false;
        } else {
            // Edited while the save was in flight: keep those edits
            self.baseline = stored.clone();
            self.draft.id = stored.id;
            self.draft.is_default = stored.is_default;
            if let Some(url) = uploaded_logo_url {
                if self.draft.layout.style.logo_url == previous_logo_url {
                    self.draft.layout.style.logo_url = url;
                }
            }
        }
        self.rerender();
        self.notify(NoticeLevel::Info, format!("Layout \"{}\" saved", layout.name));
        tracing::debug!(layout_id = %layout.id, dirty = self.dirty, "save completed");
        Ok(layout)
    }

    /// Save and wait for the result.
    pub async fn save(&mut self) -> Result<LayoutConfiguration> {
        let pending = self.begin_save()?;
        let outcome = pending.run().await;
        self.complete_save(outcome)
    }

    // Repository actions

    /// Create a layout from safe defaults and select it.
    pub async fn create_new(&mut self, name: &str) -> Result<LayoutConfiguration> {
        self.ensure_clean()?;
        self.ensure_not_saving()?;

        self.saving = true;
        let created = self
            .repo
            .create(&self.scope, LayoutDraft::new(name))
            .await;
        self.saving = false;

        let layout = match created {
            Ok(layout) => layout,
            Err(e) => {
                if let Some(field) = e.field() {
                    self.highlight(field);
                }
                return Err(self.fail(e));
            }
        };
        self.refresh().await?;
        self.replace_draft(Draft::stored(&layout));
        self.notify(NoticeLevel::Info, format!("Layout \"{}\" created", layout.name));
        Ok(layout)
    }

    /// Make the stored layout behind the draft the scope default.
    pub async fn set_as_default(&mut self) -> Result<LayoutConfiguration> {
        self.ensure_not_saving()?;
        let id = self.stored_id()?;

        self.saving = true;
        let result = self.repo.set_default(id, &self.scope).await;
        self.saving = false;

        let layout = result.map_err(|e| self.fail(e))?;
        self.draft.is_default = true;
        self.baseline.is_default = true;
        self.refresh().await?;
        self.notify(NoticeLevel::Info, format!("\"{}\" is now the default", layout.name));
        Ok(layout)
    }

    /// Delete the stored layout behind the draft and select the default.
    ///
    /// When the draft is the default, the newest remaining layout becomes the
    /// new default.
    pub async fn delete(&mut self) -> Result<()> {
        self.ensure_not_saving()?;
        let id = self.stored_id()?;
        let replacement = if self.draft.is_default {
            self.layouts.iter().find(|l| l.id != id).map(|l| l.id)
        } else {
            None
        };

        self.saving = true;
        let result = match replacement {
            Some(replacement) => self
                .repo
                .delete_with_replacement(id, replacement)
                .await
                .map(|_| ()),
            None => self.repo.delete(id).await,
        };
        self.saving = false;
        result.map_err(|e| self.fail(e))?;

        self.refresh().await?;
        let next = self
            .layouts
            .iter()
            .find(|l| l.is_default)
            .or_else(|| self.layouts.first())
            .cloned();
        if let Some(layout) = next {
            self.replace_draft(Draft::stored(&layout));
        }
        self.notify(NoticeLevel::Info, "Layout deleted");
        Ok(())
    }

    /// Re-list the scope.
    pub async fn refresh(&mut self) -> Result<()> {
        let layouts = self
            .repo
            .list(&self.scope)
            .await
            .map_err(|e| self.fail(e))?;
        self.layouts = layouts;
        Ok(())
    }

    // Internals

    fn ensure_clean(&mut self) -> Result<()> {
        if self.dirty {
            self.notify(
                NoticeLevel::Warning,
                "Save or discard the current changes first",
            );
            return Err(EtiketError::UnsavedChanges);
        }
        Ok(())
    }

    fn ensure_not_saving(&self) -> Result<()> {
        if self.saving {
            return Err(EtiketError::SaveInProgress);
        }
        Ok(())
    }

    fn stored_id(&mut self) -> Result<LayoutId> {
        match self.draft.id {
            Some(id) => Ok(id),
            None => Err(self.fail(EtiketError::ForbiddenOperation(
                "the draft has not been saved yet".into(),
            ))),
        }
    }

    fn replace_draft(&mut self, draft: Draft) {
        self.generation += 1;
        self.baseline = draft.clone();
        self.draft = draft;
        self.pending_logo = None;
        self.dirty = false;
        self.invalid_fields.clear();
        self.rerender();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.edit_seq += 1;
    }

    fn rerender(&mut self) {
        self.preview = self.renderer.render(&self.draft.layout.style, &self.context);
    }

    fn upsert_listed(&mut self, layout: LayoutConfiguration) {
        match self.layouts.iter_mut().find(|l| l.id == layout.id) {
            Some(existing) => *existing = layout,
            None => self.layouts.insert(0, layout),
        }
    }

    fn highlight(&mut self, field: &str) {
        if !self.invalid_fields.iter().any(|f| f == field) {
            self.invalid_fields.push(field.to_string());
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    /// Record `e` as an error notice and hand it back.
    fn fail(&mut self, e: EtiketError) -> EtiketError {
        tracing::warn!(scope = %self.scope, error = %e, "editor operation failed");
        self.notify(NoticeLevel::Error, e.to_string());
        e
    }
}

/// Every field of `draft` that would fail validation.
fn invalid_fields(draft: &LayoutDraft) -> Vec<String> {
    let mut out = Vec::new();
    let name = draft.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        out.push("name".to_string());
    }
    for field in NumericField::ALL {
        if !field.contains(field.get(&draft.style)) {
            out.push(field.name().to_string());
        }
    }
    for (name, color) in draft.style.colors() {
        if !is_hex_color(color) {
            out.push(name.to_string());
        }
    }
    out
}
