//! Background detail loader.
//!
//! After the initial summary list is stored, sequentially upgrade each entry
//! to detailed form, patching the store after every individual success so
//! views refresh as records arrive, never in one batch. Password-protected
//! projects without a cached credential are skipped; they stay in summary
//! form until the user authenticates and triggers a direct fetch. Failures
//! are logged and never surfaced as `error` events; the loop always moves on
//! to the next project.

use story_types::ProjectId;

use crate::client::{CredentialCache, ResourceClient, ResourceError};
use crate::store::Store;

/// Why a project was left in summary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Password-protected and no cached credential; auto-loading would
    /// require prompting the user.
    PasswordProtected,
    /// Already in detailed form (a direct fetch raced ahead of the loader).
    AlreadyLoaded,
}

/// Per-project result of one hydration pass.
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationOutcome {
    Loaded,
    Skipped(SkipReason),
    Failed(String),
}

/// Hydrate every summary project in list order, one sequential fetch at a
/// time. Returns the per-project report; the store is already patched for
/// each `Loaded` entry by the time this resolves.
pub async fn hydrate_all(
    store: &Store,
    client: &dyn ResourceClient,
    credentials: &CredentialCache,
) -> Vec<(ProjectId, HydrationOutcome)> {
    let projects = store.snapshot().projects;
    let mut report = Vec::with_capacity(projects.len());

    for project in projects {
        let id = project.id.clone();
        let outcome = hydrate_one(store, client, credentials, &project).await;
        match &outcome {
            HydrationOutcome::Loaded => {
                tracing::debug!(project = %id, "hydrated to detailed form");
            }
            HydrationOutcome::Skipped(reason) => {
                tracing::debug!(project = %id, ?reason, "hydration skipped");
            }
            HydrationOutcome::Failed(message) => {
                tracing::warn!(project = %id, %message, "hydration failed; continuing");
            }
        }
        report.push((id, outcome));
    }

    report
}

async fn hydrate_one(
    store: &Store,
    client: &dyn ResourceClient,
    credentials: &CredentialCache,
    project: &story_types::Project,
) -> HydrationOutcome {
    if project.detail_loaded {
        return HydrationOutcome::Skipped(SkipReason::AlreadyLoaded);
    }
    if project.password_protected && credentials.get(&project.id).is_none() {
        return HydrationOutcome::Skipped(SkipReason::PasswordProtected);
    }

    match client.fetch_project_detail(&project.id).await {
        Ok(detail) => {
            store.apply_project(detail);
            HydrationOutcome::Loaded
        }
        // A rejected credential is a skip, not a failure the user hears about.
        Err(ResourceError::AuthRequired) => {
            HydrationOutcome::Skipped(SkipReason::PasswordProtected)
        }
        Err(err) => HydrationOutcome::Failed(err.to_string()),
    }
}
