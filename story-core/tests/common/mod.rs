//! Shared test doubles for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use story_core::{CoreEvent, EventBus, ResourceClient, ResourceError, Store, Topic};
use story_types::{
    CreateCardRequest, CreateRelationshipRequest, CreateWorldviewCardRequest, MoveCardRequest,
    PlotPointRequest, Project, ProjectId, UpdateCardRequest, UpdateManuscriptBlockRequest,
    UpdateRelationshipRequest, UpdateScenarioRequest, UpdateWorldviewCardRequest,
};

/// Scriptable in-memory resource client.
///
/// - `list` is what `fetch_projects` serves.
/// - `details` is what `fetch_project_detail` serves, keyed by id.
/// - `failures` forces a named operation to reject (key = operation name).
/// - `calls` records every operation in invocation order.
/// - `delay` makes mutating calls hold at an await point, for interleaving
///   tests.
#[derive(Default)]
pub struct StubClient {
    pub list: Mutex<Vec<Project>>,
    pub details: Mutex<HashMap<ProjectId, Project>>,
    pub failures: Mutex<HashMap<String, ResourceError>>,
    pub calls: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detail(self, project: Project) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        self
    }

    pub fn with_list(self, projects: Vec<Project>) -> Self {
        *self.list.lock().unwrap() = projects;
        self
    }

    pub fn fail(self, operation: &str, error: ResourceError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(operation.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn operation(&self, name: &str) -> Result<(), ResourceError> {
        self.calls.lock().unwrap().push(name.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.lock().unwrap().get(name) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceClient for StubClient {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ResourceError> {
        self.operation("fetch_projects").await?;
        Ok(self.list.lock().unwrap().clone())
    }

    async fn fetch_project_detail(&self, id: &ProjectId) -> Result<Project, ResourceError> {
        self.operation(&format!("fetch_project_detail:{id}")).await?;
        if let Some(err) = self.failures.lock().unwrap().get("fetch_project_detail") {
            return Err(err.clone());
        }
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ResourceError::Message("Project not found".to_string()))
    }

    async fn create_project(&self, name: &str) -> Result<Project, ResourceError> {
        self.operation("create_project").await?;
        let mut project = Project::summary(ProjectId::from("project-server-1"), name, false);
        project.detail_loaded = true;
        Ok(project)
    }

    async fn rename_project(&self, _id: &ProjectId, _name: &str) -> Result<(), ResourceError> {
        self.operation("rename_project").await
    }

    async fn delete_project(&self, _id: &ProjectId) -> Result<(), ResourceError> {
        self.operation("delete_project").await
    }

    async fn create_group(&self, _project: &ProjectId, _name: &str) -> Result<(), ResourceError> {
        self.operation("create_group").await
    }

    async fn delete_group(&self, _project: &ProjectId, _group_id: &str) -> Result<(), ResourceError> {
        self.operation("delete_group").await
    }

    async fn create_card(
        &self,
        _project: &ProjectId,
        _request: &CreateCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("create_card").await
    }

    async fn update_card(
        &self,
        _project: &ProjectId,
        _card_id: &str,
        _request: &UpdateCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_card").await
    }

    async fn delete_card(&self, _project: &ProjectId, _card_id: &str) -> Result<(), ResourceError> {
        self.operation("delete_card").await
    }

    async fn move_card(
        &self,
        _project: &ProjectId,
        _card_id: &str,
        _request: &MoveCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("move_card").await
    }

    async fn reorder_cards(
        &self,
        _project: &ProjectId,
        _group_id: &str,
        _card_ids: &[String],
    ) -> Result<(), ResourceError> {
        self.operation("reorder_cards").await
    }

    async fn update_worldview(
        &self,
        _project: &ProjectId,
        _content: &str,
    ) -> Result<(), ResourceError> {
        self.operation("update_worldview").await
    }

    async fn create_worldview_group(
        &self,
        _project: &ProjectId,
        _name: &str,
    ) -> Result<(), ResourceError> {
        self.operation("create_worldview_group").await
    }

    async fn delete_worldview_group(
        &self,
        _project: &ProjectId,
        _group_id: &str,
    ) -> Result<(), ResourceError> {
        self.operation("delete_worldview_group").await
    }

    async fn create_worldview_card(
        &self,
        _project: &ProjectId,
        _group_id: &str,
        _request: &CreateWorldviewCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("create_worldview_card").await
    }

    async fn update_worldview_card(
        &self,
        _project: &ProjectId,
        _card_id: &str,
        _request: &UpdateWorldviewCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_worldview_card").await
    }

    async fn delete_worldview_card(
        &self,
        _project: &ProjectId,
        _card_id: &str,
    ) -> Result<(), ResourceError> {
        self.operation("delete_worldview_card").await
    }

    async fn move_worldview_card(
        &self,
        _project: &ProjectId,
        _card_id: &str,
        _request: &MoveCardRequest,
    ) -> Result<(), ResourceError> {
        self.operation("move_worldview_card").await
    }

    async fn reorder_worldview_cards(
        &self,
        _project: &ProjectId,
        _group_id: &str,
        _card_ids: &[String],
    ) -> Result<(), ResourceError> {
        self.operation("reorder_worldview_cards").await
    }

    async fn create_relationship(
        &self,
        _project: &ProjectId,
        _request: &CreateRelationshipRequest,
    ) -> Result<(), ResourceError> {
        self.operation("create_relationship").await
    }

    async fn update_relationship(
        &self,
        _project: &ProjectId,
        _relationship_id: &str,
        _request: &UpdateRelationshipRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_relationship").await
    }

    async fn delete_relationship(
        &self,
        _project: &ProjectId,
        _relationship_id: &str,
    ) -> Result<(), ResourceError> {
        self.operation("delete_relationship").await
    }

    async fn update_scenario(
        &self,
        _project: &ProjectId,
        _scenario_id: &str,
        _request: &UpdateScenarioRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_scenario").await
    }

    async fn create_plot_point(
        &self,
        _project: &ProjectId,
        _scenario_id: &str,
        _request: &PlotPointRequest,
    ) -> Result<(), ResourceError> {
        self.operation("create_plot_point").await
    }

    async fn update_plot_point(
        &self,
        _project: &ProjectId,
        _plot_point_id: &str,
        _request: &PlotPointRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_plot_point").await
    }

    async fn delete_plot_point(
        &self,
        _project: &ProjectId,
        _plot_point_id: &str,
    ) -> Result<(), ResourceError> {
        self.operation("delete_plot_point").await
    }

    async fn update_manuscript_block(
        &self,
        _project: &ProjectId,
        _block_id: &str,
        _request: &UpdateManuscriptBlockRequest,
    ) -> Result<(), ResourceError> {
        self.operation("update_manuscript_block").await
    }

    async fn reorder_manuscript_blocks(
        &self,
        _project: &ProjectId,
        _block_ids: &[String],
    ) -> Result<(), ResourceError> {
        self.operation("reorder_manuscript_blocks").await
    }

    async fn import_manuscript_from_plot_points(
        &self,
        _project: &ProjectId,
    ) -> Result<(), ResourceError> {
        self.operation("import_manuscript_from_plot_points").await
    }

    async fn clear_manuscript(&self, _project: &ProjectId) -> Result<(), ResourceError> {
        self.operation("clear_manuscript").await
    }
}

/// Collects every `error` event message published on the bus.
pub fn collect_errors(bus: &EventBus) -> Arc<Mutex<Vec<String>>> {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    bus.subscribe(Topic::Error, move |event| {
        if let CoreEvent::Error(message) = event {
            sink.lock().unwrap().push(message.clone());
        }
    });
    errors
}

/// Counts `state.changed` emissions.
pub fn count_state_changes(bus: &EventBus) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    bus.subscribe(Topic::StateChanged, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}

/// A store pre-seeded with summary projects.
pub fn seeded_store(bus: EventBus, projects: Vec<Project>) -> Store {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = Store::new(bus);
    store.patch(story_core::StatePatch::projects(
        projects.into_iter().map(Arc::new).collect(),
    ));
    store
}

pub fn detailed(id: &str, name: &str) -> Project {
    let mut project = Project::summary(ProjectId::from(id), name, false);
    project.detail_loaded = true;
    project
}
