//! reqwest implementation of [`ResourceClient`] against the backend's REST
//! surface (`/api/v1/projects/...`).
//!
//! Every request carries the configured timeout. Project-scoped requests
//! attach the cached password for that project (if any) as an
//! `X-Project-Password` header; 401/403 responses map to
//! [`ResourceError::AuthRequired`] so callers can distinguish "needs a
//! password" from ordinary failures.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use story_types::{
    CreateCardRequest, CreateRelationshipRequest, CreateWorldviewCardRequest, MoveCardRequest,
    PlotPointRequest, Project, ProjectId, UpdateCardRequest, UpdateManuscriptBlockRequest,
    UpdateRelationshipRequest, UpdateScenarioRequest, UpdateWorldviewCardRequest,
};

use crate::client::{CredentialCache, ResourceClient, ResourceError};
use crate::config::CoreConfig;

const PASSWORD_HEADER: &str = "X-Project-Password";

pub struct HttpResourceClient {
    http: reqwest::Client,
    api_base: String,
    credentials: CredentialCache,
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<Project>,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl HttpResourceClient {
    pub fn new(config: &CoreConfig, credentials: CredentialCache) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str, project: Option<&ProjectId>) -> RequestBuilder {
        let url = format!("{}/api/v1/projects{}", self.api_base, path);
        let mut builder = self.http.request(method, url);
        if let Some(project) = project {
            if let Some(password) = self.credentials.get(project) {
                builder = builder.header(PASSWORD_HEADER, password);
            }
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ResourceError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ResourceError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ResourceError::AuthRequired);
        }
        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(ResourceError::Message(
                detail.unwrap_or_else(|| format!("HTTP error: {status}")),
            ));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ResourceError> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| ResourceError::Decode(e.to_string()))
    }

    /// Send a request where only success matters; the body is discarded.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ResourceError> {
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ResourceError> {
        let response: ProjectsResponse = self
            .send_json(self.request(Method::GET, "", None))
            .await?;
        // The list endpoint serves full records; collapse them to summary
        // form so entries carry counts without pretending to be hydrated.
        Ok(response
            .projects
            .into_iter()
            .map(Project::into_summary)
            .collect())
    }

    async fn fetch_project_detail(&self, id: &ProjectId) -> Result<Project, ResourceError> {
        let mut project: Project = self
            .send_json(self.request(Method::GET, &format!("/{id}"), Some(id)))
            .await?;
        // The wire format has no detail flag; a detail fetch is detailed by
        // definition.
        project.detail_loaded = true;
        project.refresh_counts();
        Ok(project)
    }

    async fn create_project(&self, name: &str) -> Result<Project, ResourceError> {
        let body = serde_json::json!({ "name": name });
        let mut project: Project = self
            .send_json(self.request(Method::POST, "", None).json(&body))
            .await?;
        project.detail_loaded = true;
        project.refresh_counts();
        Ok(project)
    }

    async fn rename_project(&self, id: &ProjectId, name: &str) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "name": name });
        self.send_unit(self.request(Method::PUT, &format!("/{id}"), Some(id)).json(&body))
            .await
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), ResourceError> {
        self.send_unit(self.request(Method::DELETE, &format!("/{id}"), Some(id)))
            .await
    }

    async fn create_group(&self, project: &ProjectId, name: &str) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "name": name });
        self.send_unit(
            self.request(Method::POST, &format!("/{project}/groups"), Some(project))
                .json(&body),
        )
        .await
    }

    async fn delete_group(&self, project: &ProjectId, group_id: &str) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/groups/{group_id}"),
            Some(project),
        ))
        .await
    }

    async fn create_card(
        &self,
        project: &ProjectId,
        request: &CreateCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::POST,
                &format!("/{project}/groups/{}/cards", request.group_id),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn update_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &UpdateCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(Method::PUT, &format!("/{project}/cards/{card_id}"), Some(project))
                .json(request),
        )
        .await
    }

    async fn delete_card(&self, project: &ProjectId, card_id: &str) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/cards/{card_id}"),
            Some(project),
        ))
        .await
    }

    async fn move_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &MoveCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/cards/{card_id}/move"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn reorder_cards(
        &self,
        project: &ProjectId,
        group_id: &str,
        card_ids: &[String],
    ) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "card_ids": card_ids });
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/groups/{group_id}/cards/order"),
                Some(project),
            )
            .json(&body),
        )
        .await
    }

    async fn update_worldview(
        &self,
        project: &ProjectId,
        content: &str,
    ) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "content": content });
        self.send_unit(
            self.request(Method::PUT, &format!("/{project}/worldview"), Some(project))
                .json(&body),
        )
        .await
    }

    async fn create_worldview_group(
        &self,
        project: &ProjectId,
        name: &str,
    ) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "name": name });
        self.send_unit(
            self.request(
                Method::POST,
                &format!("/{project}/worldview_groups"),
                Some(project),
            )
            .json(&body),
        )
        .await
    }

    async fn delete_worldview_group(
        &self,
        project: &ProjectId,
        group_id: &str,
    ) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/worldview_groups/{group_id}"),
            Some(project),
        ))
        .await
    }

    async fn create_worldview_card(
        &self,
        project: &ProjectId,
        group_id: &str,
        request: &CreateWorldviewCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::POST,
                &format!("/{project}/worldview_groups/{group_id}/cards"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn update_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &UpdateWorldviewCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/worldview_cards/{card_id}/details"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn delete_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
    ) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/worldview_cards/{card_id}"),
            Some(project),
        ))
        .await
    }

    async fn move_worldview_card(
        &self,
        project: &ProjectId,
        card_id: &str,
        request: &MoveCardRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/worldview_cards/{card_id}/move"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn reorder_worldview_cards(
        &self,
        project: &ProjectId,
        group_id: &str,
        card_ids: &[String],
    ) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "card_ids": card_ids });
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/worldview_groups/{group_id}/cards/order"),
                Some(project),
            )
            .json(&body),
        )
        .await
    }

    async fn create_relationship(
        &self,
        project: &ProjectId,
        request: &CreateRelationshipRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::POST,
                &format!("/{project}/relationships"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn update_relationship(
        &self,
        project: &ProjectId,
        relationship_id: &str,
        request: &UpdateRelationshipRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/relationships/{relationship_id}"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn delete_relationship(
        &self,
        project: &ProjectId,
        relationship_id: &str,
    ) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/relationships/{relationship_id}"),
            Some(project),
        ))
        .await
    }

    async fn update_scenario(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &UpdateScenarioRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/scenarios/{scenario_id}"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn create_plot_point(
        &self,
        project: &ProjectId,
        scenario_id: &str,
        request: &PlotPointRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::POST,
                &format!("/{project}/scenarios/{scenario_id}/plot_points"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn update_plot_point(
        &self,
        project: &ProjectId,
        plot_point_id: &str,
        request: &PlotPointRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/scenarios/plot_points/{plot_point_id}"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn delete_plot_point(
        &self,
        project: &ProjectId,
        plot_point_id: &str,
    ) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/scenarios/plot_points/{plot_point_id}"),
            Some(project),
        ))
        .await
    }

    async fn update_manuscript_block(
        &self,
        project: &ProjectId,
        block_id: &str,
        request: &UpdateManuscriptBlockRequest,
    ) -> Result<(), ResourceError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/manuscript/blocks/{block_id}"),
                Some(project),
            )
            .json(request),
        )
        .await
    }

    async fn reorder_manuscript_blocks(
        &self,
        project: &ProjectId,
        block_ids: &[String],
    ) -> Result<(), ResourceError> {
        let body = serde_json::json!({ "block_ids": block_ids });
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/{project}/manuscript/blocks/order"),
                Some(project),
            )
            .json(&body),
        )
        .await
    }

    async fn import_manuscript_from_plot_points(
        &self,
        project: &ProjectId,
    ) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::POST,
            &format!("/{project}/manuscript/import"),
            Some(project),
        ))
        .await
    }

    async fn clear_manuscript(&self, project: &ProjectId) -> Result<(), ResourceError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/{project}/manuscript/blocks"),
            Some(project),
        ))
        .await
    }
}
