//! User-level mutations.
//!
//! Every operation follows the same shape: raise the relevant loading flag,
//! make one resource-client call, then resynchronize the store from
//! authoritative server state (a full detail re-fetch, or a locally-computed
//! merge for cheap renames), and clear the flag. Failures become `error`
//! events; state is never partially applied, because nothing is written
//! before the server call succeeds - except the create-project placeholder,
//! the one sanctioned optimistic insert, which is rolled back on failure.

use std::future::Future;
use std::sync::Arc;

use story_types::{
    CreateCardRequest, CreateRelationshipRequest, CreateWorldviewCardRequest, MoveCardRequest,
    PlotPointRequest, Project, ProjectId, UpdateCardRequest, UpdateManuscriptBlockRequest,
    UpdateRelationshipRequest, UpdateScenarioRequest, UpdateWorldviewCardRequest,
};

use crate::bus::{CoreEvent, Topic};
use crate::client::{ResourceClient, ResourceError};
use crate::guard::{ActionGuards, ActionKind};
use crate::store::{LoadingKey, StatePatch, Store};

/// The mutation orchestrator. UI entry points call these methods; each one
/// resolves only after subscribed views have re-rendered from the new state.
#[derive(Clone)]
pub struct ProjectActions {
    store: Store,
    client: Arc<dyn ResourceClient>,
    guards: ActionGuards,
}

impl ProjectActions {
    pub fn new(store: Store, client: Arc<dyn ResourceClient>, guards: ActionGuards) -> Self {
        Self {
            store,
            client,
            guards,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn guards(&self) -> &ActionGuards {
        &self.guards
    }

    fn emit_error(&self, message: String) {
        self.store.bus().emit(Topic::Error, &CoreEvent::Error(message));
    }

    /// Re-fetch the authoritative detailed project after a successful
    /// mutation. A failure here is a consistency failure: the server applied
    /// the change but the local view is stale until the next refresh.
    async fn resync(&self, project: &ProjectId) {
        match self.client.fetch_project_detail(project).await {
            Ok(detail) => self.store.apply_project(detail),
            Err(err) => {
                tracing::warn!(project = %project, error = %err, "re-fetch after mutation failed; keeping stale state");
                self.emit_error(format!("Saved, but failed to refresh project data: {err}"));
            }
        }
    }

    /// The common mutate-then-resync shape shared by group, card, worldview
    /// and relationship operations.
    async fn mutate_and_resync<F>(&self, project: &ProjectId, failure: &'static str, op: F)
    where
        F: Future<Output = Result<(), ResourceError>>,
    {
        self.store.set_loading(LoadingKey::Saving, true);
        match op.await {
            Ok(()) => self.resync(project).await,
            Err(err) => {
                tracing::warn!(project = %project, error = %err, message = failure, "mutation rejected");
                self.emit_error(format!("{failure}: {err}"));
            }
        }
        self.store.set_loading(LoadingKey::Saving, false);
    }

    // ------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------

    /// Fetch the summary list and replace the store's project list.
    pub async fn load_projects(&self) {
        self.store.patch(StatePatch {
            is_loading: Some(true),
            ..Default::default()
        });
        self.store.set_loading(LoadingKey::ProjectList, true);

        match self.client.fetch_projects().await {
            Ok(projects) => {
                self.store.patch(StatePatch::projects(
                    projects.into_iter().map(Arc::new).collect(),
                ));
                self.store
                    .bus()
                    .emit(Topic::ProjectsLoaded, &CoreEvent::ProjectsLoaded);
            }
            Err(err) => self.emit_error(format!("Failed to load projects: {err}")),
        }

        self.store.set_loading(LoadingKey::ProjectList, false);
        self.store.patch(StatePatch {
            is_loading: Some(false),
            ..Default::default()
        });
    }

    /// Direct detail fetch and focus. Guarded: a pointer-down and a click on
    /// the same list row run this once, not twice.
    pub async fn select_project(&self, id: &ProjectId) {
        let Some(_token) = self.guards.try_begin(ActionKind::SelectProject) else {
            return;
        };
        self.store.set_loading(LoadingKey::ProjectDetail, true);

        match self.client.fetch_project_detail(id).await {
            Ok(detail) => {
                self.store.apply_project(detail);
                self.store.focus_project(id);
                self.store
                    .bus()
                    .emit(Topic::ProjectLoaded, &CoreEvent::ProjectLoaded(id.clone()));
            }
            Err(err) => self.emit_error(format!("Failed to load project: {err}")),
        }

        self.store.set_loading(LoadingKey::ProjectDetail, false);
    }

    /// Create a project. A placeholder entry is inserted optimistically so
    /// the list shows the new name immediately; it is replaced by the server
    /// record on success and removed on failure.
    pub async fn create_project(&self, name: &str) {
        let Some(_token) = self.guards.try_begin(ActionKind::CreateProject) else {
            return;
        };
        self.store.set_loading(LoadingKey::Saving, true);

        let placeholder_id = ProjectId::placeholder();
        self.store
            .apply_project(Project::summary(placeholder_id.clone(), name, false));

        match self.client.create_project(name).await {
            Ok(project) => {
                let id = project.id.clone();
                self.store.remove_project(&placeholder_id);
                self.store.apply_project(project);
                self.store.focus_project(&id);
                self.store
                    .bus()
                    .emit(Topic::ProjectLoaded, &CoreEvent::ProjectLoaded(id));
            }
            Err(err) => {
                self.store.remove_project(&placeholder_id);
                self.emit_error(format!("Failed to create project: {err}"));
            }
        }

        self.store.set_loading(LoadingKey::Saving, false);
    }

    /// Rename a project. A cheap rename gets a locally-computed merge instead
    /// of a full re-fetch; the list entry and the focused copy stay in sync
    /// through the store helper.
    pub async fn rename_project(&self, id: &ProjectId, name: &str) {
        let Some(_token) = self.guards.try_begin(ActionKind::RenameProject) else {
            return;
        };

        match self.client.rename_project(id, name).await {
            Ok(()) => {
                if let Some(existing) = self.store.snapshot().project(id) {
                    let mut renamed = (**existing).clone();
                    renamed.name = name.to_string();
                    self.store.apply_project(renamed);
                }
            }
            Err(err) => self.emit_error(format!("Failed to rename project: {err}")),
        }
    }

    pub async fn delete_project(&self, id: &ProjectId) {
        let Some(_token) = self.guards.try_begin(ActionKind::DeleteProject) else {
            return;
        };
        self.store.set_loading(LoadingKey::Saving, true);

        match self.client.delete_project(id).await {
            Ok(()) => self.store.remove_project(id),
            Err(err) => self.emit_error(format!("Failed to delete project: {err}")),
        }

        self.store.set_loading(LoadingKey::Saving, false);
    }

    // ------------------------------------------------------------------
    // Character groups & cards
    // ------------------------------------------------------------------

    pub async fn create_group(&self, project: &ProjectId, name: &str) {
        self.mutate_and_resync(
            project,
            "Failed to create group",
            self.client.create_group(project, name),
        )
        .await;
    }

    pub async fn delete_group(&self, project: &ProjectId, group_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete group",
            self.client.delete_group(project, group_id),
        )
        .await;
    }

    pub async fn create_card(&self, project: &ProjectId, request: &CreateCardRequest) {
        self.mutate_and_resync(
            project,
            "Failed to create character",
            self.client.create_card(project, request),
        )
        .await;
    }

    /// Guarded: the card editor's save button double-fires on some browsers,
    /// and a duplicate save while one is in flight is dropped, not queued.
    pub async fn update_card(&self, project: &ProjectId, card_id: &str, request: &UpdateCardRequest) {
        let Some(_token) = self.guards.try_begin(ActionKind::SaveCard) else {
            return;
        };
        self.mutate_and_resync(
            project,
            "Failed to save character",
            self.client.update_card(project, card_id, request),
        )
        .await;
    }

    pub async fn delete_card(&self, project: &ProjectId, card_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete character",
            self.client.delete_card(project, card_id),
        )
        .await;
    }

    /// Move a card between groups - the only way card ownership changes.
    pub async fn move_card(&self, project: &ProjectId, card_id: &str, request: &MoveCardRequest) {
        self.mutate_and_resync(
            project,
            "Failed to move character",
            self.client.move_card(project, card_id, request),
        )
        .await;
    }

    pub async fn reorder_cards(&self, project: &ProjectId, group_id: &str, card_ids: &[String]) {
        self.mutate_and_resync(
            project,
            "Failed to reorder characters",
            self.client.reorder_cards(project, group_id, card_ids),
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Worldview
    // ------------------------------------------------------------------

    pub async fn update_worldview(&self, project: &ProjectId, content: &str) {
        self.mutate_and_resync(
            project,
            "Failed to save worldview",
            self.client.update_worldview(project, content),
        )
        .await;
    }

    pub async fn create_worldview_group(&self, project: &ProjectId, name: &str) {
        self.mutate_and_resync(
            project,
            "Failed to create worldview group",
            self.client.create_worldview_group(project, name),
        )
        .await;
    }

    pub async fn delete_worldview_group(&self, project: &ProjectId, group_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete worldview group",
            self.client.delete_worldview_group(project, group_id),
        )
        .await;
    }

    pub async fn create_worldview_card(
        &self,
        project: &ProjectId,
        group_id: &str,
        request: &CreateWorldviewCardRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to create worldview card",
            self.client.create_worldview_card(project, group_id, request),
        )
        .await;
    }

    pub async fn update_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &UpdateWorldviewCardRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to save worldview card",
            self.client.update_worldview_card(project, card_id, request),
        )
        .await;
    }

    pub async fn delete_worldview_card(&self, project: &ProjectId, card_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete worldview card",
            self.client.delete_worldview_card(project, card_id),
        )
        .await;
    }

    pub async fn move_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &MoveCardRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to move worldview card",
            self.client.move_worldview_card(project, card_id, request),
        )
        .await;
    }

    pub async fn reorder_worldview_cards(
        &self,
        project: &ProjectId,
        group_id: &str,
        card_ids: &[String],
    ) {
        self.mutate_and_resync(
            project,
            "Failed to reorder worldview cards",
            self.client.reorder_worldview_cards(project, group_id, card_ids),
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------

    pub async fn create_relationship(
        &self,
        project: &ProjectId,
        request: &CreateRelationshipRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to create relationship",
            self.client.create_relationship(project, request),
        )
        .await;
    }

    pub async fn update_relationship(
        &self,
        project: &ProjectId,
        relationship_id: &str,
        request: &UpdateRelationshipRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to save relationship",
            self.client.update_relationship(project, relationship_id, request),
        )
        .await;
    }

    pub async fn delete_relationship(&self, project: &ProjectId, relationship_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete relationship",
            self.client.delete_relationship(project, relationship_id),
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Scenarios & plot points
    // ------------------------------------------------------------------

    pub async fn update_scenario(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &UpdateScenarioRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to save scenario",
            self.client.update_scenario(project, scenario_id, request),
        )
        .await;
    }

    pub async fn create_plot_point(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &PlotPointRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to create plot point",
            self.client.create_plot_point(project, scenario_id, request),
        )
        .await;
    }

    pub async fn update_plot_point(
        &self,
        project: &ProjectId,
        plot_point_id: &str,
        request: &PlotPointRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to save plot point",
            self.client.update_plot_point(project, plot_point_id, request),
        )
        .await;
    }

    pub async fn delete_plot_point(&self, project: &ProjectId, plot_point_id: &str) {
        self.mutate_and_resync(
            project,
            "Failed to delete plot point",
            self.client.delete_plot_point(project, plot_point_id),
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Manuscript
    // ------------------------------------------------------------------

    pub async fn update_manuscript_block(
        &self,
        project: &ProjectId,
        block_id: &str,
        request: &UpdateManuscriptBlockRequest,
    ) {
        self.mutate_and_resync(
            project,
            "Failed to save manuscript block",
            self.client.update_manuscript_block(project, block_id, request),
        )
        .await;
    }

    pub async fn reorder_manuscript_blocks(&self, project: &ProjectId, block_ids: &[String]) {
        self.mutate_and_resync(
            project,
            "Failed to reorder manuscript blocks",
            self.client.reorder_manuscript_blocks(project, block_ids),
        )
        .await;
    }

    /// Replace the manuscript with blocks copied from the scenario's plot
    /// points. The server clears existing blocks first.
    pub async fn import_manuscript_from_plot_points(&self, project: &ProjectId) {
        self.mutate_and_resync(
            project,
            "Failed to import plot points into the manuscript",
            self.client.import_manuscript_from_plot_points(project),
        )
        .await;
    }

    pub async fn clear_manuscript(&self, project: &ProjectId) {
        self.mutate_and_resync(
            project,
            "Failed to clear the manuscript",
            self.client.clear_manuscript(project),
        )
        .await;
    }
}
