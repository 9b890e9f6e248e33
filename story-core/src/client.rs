//! The async boundary to the backend.
//!
//! One operation per backend resource, each resolving to data or rejecting
//! with a [`ResourceError`] that carries a human-readable message. The core
//! never assumes anything about the transport behind this trait; tests stub
//! it out entirely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use story_types::{
    CreateCardRequest, CreateRelationshipRequest, CreateWorldviewCardRequest, MoveCardRequest,
    PlotPointRequest, Project, ProjectId, UpdateCardRequest, UpdateManuscriptBlockRequest,
    UpdateRelationshipRequest, UpdateScenarioRequest, UpdateWorldviewCardRequest,
};
use thiserror::Error;

/// Why a resource call rejected.
#[derive(Debug, Clone, Error)]
pub enum ResourceError {
    /// The server refused the operation; `message` is user-facing.
    #[error("{0}")]
    Message(String),
    /// The project requires a password and no valid credential was sent.
    #[error("authorization required")]
    AuthRequired,
    /// The request never completed (connection failure, timeout).
    #[error("request failed: {0}")]
    Http(String),
    /// The response arrived but could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ResourceError {
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ResourceError::AuthRequired)
    }
}

/// Opaque async operations against the backend, one per resource.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    // --- projects ---
    async fn fetch_projects(&self) -> Result<Vec<Project>, ResourceError>;
    async fn fetch_project_detail(&self, id: &ProjectId) -> Result<Project, ResourceError>;
    async fn create_project(&self, name: &str) -> Result<Project, ResourceError>;
    async fn rename_project(&self, id: &ProjectId, name: &str) -> Result<(), ResourceError>;
    async fn delete_project(&self, id: &ProjectId) -> Result<(), ResourceError>;

    // --- character groups & cards ---
    async fn create_group(&self, project: &ProjectId, name: &str) -> Result<(), ResourceError>;
    async fn delete_group(&self, project: &ProjectId, group_id: &str) -> Result<(), ResourceError>;
    async fn create_card(
        &self,
        project: &ProjectId,
        request: &CreateCardRequest,
    ) -> Result<(), ResourceError>;
    async fn update_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &UpdateCardRequest,
    ) -> Result<(), ResourceError>;
    async fn delete_card(&self, project: &ProjectId, card_id: &str) -> Result<(), ResourceError>;
    async fn move_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &MoveCardRequest,
    ) -> Result<(), ResourceError>;
    async fn reorder_cards(
        &self,
        project: &ProjectId,
        group_id: &str,
        card_ids: &[String],
    ) -> Result<(), ResourceError>;

    // --- worldview ---
    async fn update_worldview(&self, project: &ProjectId, content: &str)
        -> Result<(), ResourceError>;
    async fn create_worldview_group(
        &self,
        project: &ProjectId,
        name: &str,
    ) -> Result<(), ResourceError>;
    async fn delete_worldview_group(
        &self,
        project: &ProjectId,
        group_id: &str,
    ) -> Result<(), ResourceError>;
    async fn create_worldview_card(
        &self,
        project: &ProjectId,
        group_id: &str,
        request: &CreateWorldviewCardRequest,
    ) -> Result<(), ResourceError>;
    async fn update_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &UpdateWorldviewCardRequest,
    ) -> Result<(), ResourceError>;
    async fn delete_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
    ) -> Result<(), ResourceError>;
    async fn move_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &MoveCardRequest,
    ) -> Result<(), ResourceError>;
    async fn reorder_worldview_cards(
        &self,
        project: &ProjectId,
        group_id: &str,
        card_ids: &[String],
    ) -> Result<(), ResourceError>;

    // --- relationships ---
    async fn create_relationship(
        &self,
        project: &ProjectId,
        request: &CreateRelationshipRequest,
    ) -> Result<(), ResourceError>;
    async fn update_relationship(
        &self,
        project: &ProjectId,
        relationship_id: &str,
        request: &UpdateRelationshipRequest,
    ) -> Result<(), ResourceError>;
    async fn delete_relationship(
        &self,
        project: &ProjectId,
        relationship_id: &str,
    ) -> Result<(), ResourceError>;

    // --- scenarios & plot points ---
    async fn update_scenario(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &UpdateScenarioRequest,
    ) -> Result<(), ResourceError>;
    async fn create_plot_point(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &PlotPointRequest,
    ) -> Result<(), ResourceError>;
    async fn update_plot_point(
        &self,
        project: &ProjectId,
        plot_point_id: &str,
        request: &PlotPointRequest,
    ) -> Result<(), ResourceError>;
    async fn delete_plot_point(
        &self,
        project: &ProjectId,
        plot_point_id: &str,
    ) -> Result<(), ResourceError>;

    // --- manuscript ---
    async fn update_manuscript_block(
        &self,
        project: &ProjectId,
        block_id: &str,
        request: &UpdateManuscriptBlockRequest,
    ) -> Result<(), ResourceError>;
    async fn reorder_manuscript_blocks(
        &self,
        project: &ProjectId,
        block_ids: &[String],
    ) -> Result<(), ResourceError>;
    /// Replace the manuscript with blocks copied from the scenario's plot
    /// points.
    async fn import_manuscript_from_plot_points(
        &self,
        project: &ProjectId,
    ) -> Result<(), ResourceError>;
    async fn clear_manuscript(&self, project: &ProjectId) -> Result<(), ResourceError>;
}

/// Per-project credential cache consulted when building requests for
/// password-protected projects. An absent entry means "no credential";
/// it is never an error.
#[derive(Clone, Default)]
pub struct CredentialCache {
    inner: Arc<Mutex<HashMap<ProjectId, String>>>,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project: &ProjectId) -> Option<String> {
        self.inner
            .lock()
            .expect("credential cache lock poisoned")
            .get(project)
            .cloned()
    }

    pub fn set(&self, project: ProjectId, password: impl Into<String>) {
        self.inner
            .lock()
            .expect("credential cache lock poisoned")
            .insert(project, password.into());
    }

    /// Drop a credential the server rejected.
    pub fn clear(&self, project: &ProjectId) {
        self.inner
            .lock()
            .expect("credential cache lock poisoned")
            .remove(project);
    }
}
