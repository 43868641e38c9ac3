//! List view controller.
//!
//! One per entity kind. While mounted it holds a refresh subscription and
//! re-fetches the whole collection on entry and whenever the signal moves.
//! It owns the search text, the row selection, the delete confirmation and,
//! while open, the editor overlay.

use super::editor::{Editor, SaveBlocked, SaveRequest};
use super::notice::Notice;
use crate::catalog::{
    filter_by_name, CatalogEntity, CatalogError, EntityId, RefreshSubscription, Repository,
};
use ratatui::widgets::TableState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: EntityId,
    pub name: String,
}

/// A confirmed delete, detached so it can run in a task.
pub struct DeleteRequest<E> {
    repo: Repository<E>,
    id: EntityId,
}

impl<E: CatalogEntity> DeleteRequest<E> {
    pub async fn execute(self) -> Result<(), CatalogError> {
        self.repo.delete(&self.id).await
    }
}

pub struct ListView<E: CatalogEntity> {
    repo: Repository<E>,
    items: Vec<E>,
    search: String,
    searching: bool,
    pub table_state: TableState,

    subscription: Option<RefreshSubscription>,
    needs_fetch: bool,
    loading: bool,

    editor: Option<Editor>,
    // Bumped each time an editor opens; saves carry the value they were
    // issued under.
    editor_generation: u64,
    saving: Option<u64>,
    confirm: Option<PendingDelete>,
    deleting: bool,
    notice: Option<Notice>,
}

impl<E: CatalogEntity> ListView<E> {
    pub fn new(repo: Repository<E>) -> Self {
        ListView {
            repo,
            items: Vec::new(),
            search: String::new(),
            searching: false,
            table_state: TableState::default().with_selected(Some(0)),
            subscription: None,
            needs_fetch: false,
            loading: false,
            editor: None,
            editor_generation: 0,
            saving: None,
            confirm: None,
            deleting: false,
            notice: None,
        }
    }

    // Mounting and fetching

    pub fn mount(&mut self) {
        self.subscription = Some(self.repo.catalog().signal().subscribe());
        self.needs_fetch = true;
    }

    /// Drop the subscription and everything fetched under it.
    pub fn unmount(&mut self) {
        self.subscription = None;
        self.needs_fetch = false;
        self.items.clear();
        self.search.clear();
        self.searching = false;
        self.editor = None;
        self.confirm = None;
        self.notice = None;
        self.table_state.select(Some(0));
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Ask for a re-fetch outside the signal, e.g. a manual refresh key.
    pub fn request_reload(&mut self) {
        if self.is_mounted() {
            self.needs_fetch = true;
        }
    }

    /// Returns a repository to fetch with when a fetch is due. Signal moves
    /// seen while a fetch is running are kept for the next round.
    pub fn poll_refresh(&mut self) -> Option<Repository<E>> {
        let subscription = self.subscription.as_mut()?;
        if subscription.take_pending() {
            self.needs_fetch = true;
        }
        if !self.needs_fetch || self.loading {
            return None;
        }
        self.needs_fetch = false;
        self.loading = true;
        Some(self.repo.clone())
    }

    /// A failed fetch shows as an empty list plus a notice.
    pub fn apply_listing(&mut self, result: Result<Vec<E>, CatalogError>) {
        self.loading = false;
        if !self.is_mounted() {
            return;
        }
        match result {
            Ok(items) => self.items = items,
            Err(e) => {
                tracing::warn!(kind = E::KIND.path(), error = %e, "list fetch failed");
                self.items.clear();
                self.notice = Some(Notice::error(format!(
                    "Could not load {} list: {}",
                    E::KIND.path(),
                    e
                )));
            }
        }
        self.clamp_selection();
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    // Search

    /// Rows matching the search text, in store order.
    pub fn visible(&self) -> Vec<&E> {
        filter_by_name(&self.items, &self.search)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    pub fn stop_search(&mut self) {
        self.searching = false;
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.clamp_selection();
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.clamp_selection();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.searching = false;
        self.clamp_selection();
    }

    // Selection

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        let i = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(i.min(len.saturating_sub(1))));
    }

    pub fn select_next(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        if i < self.visible().len().saturating_sub(1) {
            self.table_state.select(Some(i + 1));
        }
    }

    pub fn select_prev(&mut self) {
        let i = self.table_state.selected().unwrap_or(0);
        if i > 0 {
            self.table_state.select(Some(i - 1));
        }
    }

    pub fn select_first(&mut self) {
        self.table_state.select(Some(0));
    }

    pub fn select_last(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.table_state.select(Some(len - 1));
        }
    }

    pub fn selected(&self) -> Option<&E> {
        let i = self.table_state.selected()?;
        self.visible().get(i).copied()
    }

    // Editor overlay

    pub fn open_create(&mut self) {
        self.confirm = None;
        self.editor_generation += 1;
        self.editor = Some(Editor::create(E::KIND));
    }

    /// Open the editor on the selected row's current snapshot.
    pub fn open_edit(&mut self) -> bool {
        let Some(prefill) = self.selected().map(CatalogEntity::prefill) else {
            return false;
        };
        self.confirm = None;
        self.editor_generation += 1;
        self.editor = Some(Editor::edit(E::KIND, prefill));
        true
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    /// Closes without touching the store or the signal. A save already
    /// sent keeps running; its result no longer reaches any editor.
    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    /// One save per list at a time, whichever editor issued it.
    pub fn begin_save(&mut self) -> Result<(u64, SaveRequest), SaveBlocked> {
        let generation = self.editor_generation;
        let editor = self.editor.as_mut().ok_or(SaveBlocked::Closed)?;
        if self.saving.is_some() {
            editor.set_error(format!("Another {} save is still running", E::KIND.path()));
            return Err(SaveBlocked::InFlight);
        }
        let request = editor.begin_save()?;
        self.saving = Some(generation);
        Ok((generation, request))
    }

    pub fn finish_save(&mut self, generation: u64, result: Result<(), CatalogError>) {
        if self.saving == Some(generation) {
            self.saving = None;
        }
        let current = generation == self.editor_generation;
        match self.editor.as_mut() {
            Some(editor) if current => {
                let created = editor.is_create();
                if editor.finish_save(result) {
                    self.editor = None;
                    let verb = if created { "added" } else { "updated" };
                    self.notice =
                        Some(Notice::info(format!("{} {} successfully", E::KIND, verb)));
                }
            }
            _ => {
                // The editor that issued this save has been closed.
                self.notice = Some(match result {
                    Ok(()) => Notice::info(format!("{} saved", E::KIND)),
                    Err(e) => {
                        tracing::warn!(kind = E::KIND.path(), error = %e, "save failed");
                        Notice::error(format!("Failed to save {}: {}", E::KIND.path(), e))
                    }
                });
            }
        }
    }

    // Delete

    pub fn request_delete(&mut self) {
        if let Some(entity) = self.selected() {
            self.confirm = Some(PendingDelete {
                id: entity.id().clone(),
                name: entity.name().to_string(),
            });
        }
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.confirm.as_ref()
    }

    pub fn decline_delete(&mut self) {
        self.confirm = None;
    }

    pub fn confirm_delete(&mut self) -> Option<DeleteRequest<E>> {
        if self.deleting {
            return None;
        }
        let pending = self.confirm.take()?;
        self.deleting = true;
        Some(DeleteRequest {
            repo: self.repo.clone(),
            id: pending.id,
        })
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn finish_delete(&mut self, result: Result<(), CatalogError>) {
        self.deleting = false;
        self.notice = Some(match result {
            Ok(()) => Notice::info(format!("{} deleted", E::KIND)),
            Err(e @ CatalogError::NotFound { .. }) => Notice::error(e.to_string()),
            Err(e) => Notice::error(format!("Failed to delete {}: {}", E::KIND.path(), e)),
        });
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}
