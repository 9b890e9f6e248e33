//! The single source of truth for loaded projects and UI-relevant flags.
//!
//! Every write funnels through [`Store::patch`], which shallow-merges the
//! given fields and then emits `Topic::StateChanged` exactly once,
//! synchronously, before returning. Snapshots are shallow: top-level fields
//! are copied, nested project records are `Arc`-shared, so a snapshot is
//! cheap and cannot mutate the store through its top-level fields.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use story_types::{Project, ProjectId};
use strum::EnumIter;

use crate::bus::{CoreEvent, EventBus, Topic};

// ============================================================================
// Loading flags
// ============================================================================

/// Entity families that can be AI-generated, each with its own loading flag.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
pub enum EntityKind {
    #[default]
    Character,
    Worldview,
    Relationship,
    Scenario,
    PlotPoint,
    Manuscript,
}

/// Named loading-state flags, one per concurrent background activity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
pub enum LoadingKey {
    ProjectList,
    ProjectDetail,
    Saving,
    Generating(EntityKind),
}

// ============================================================================
// Application state
// ============================================================================

/// The process-wide application state. Created once at startup with empty
/// collections and all flags false; replaced field-by-field for the process
/// lifetime, never destroyed.
///
/// Invariant: if `current_project` is set, a project with the same id exists
/// in `projects` with identical content. The [`Store`] helpers keep the two
/// in sync on every write that touches either.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub projects: Vec<Arc<Project>>,
    pub current_project: Option<Arc<Project>>,
    pub is_loading: bool,
    pub loading: BTreeMap<LoadingKey, bool>,
}

impl AppState {
    pub fn project(&self, id: &ProjectId) -> Option<&Arc<Project>> {
        self.projects.iter().find(|p| &p.id == id)
    }
}

/// A shallow merge-write. Fields left `None` keep their current value.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    pub projects: Option<Vec<Arc<Project>>>,
    pub current_project: Option<Option<Arc<Project>>>,
    pub is_loading: Option<bool>,
    pub loading: Option<BTreeMap<LoadingKey, bool>>,
}

impl StatePatch {
    pub fn projects(projects: Vec<Arc<Project>>) -> Self {
        Self {
            projects: Some(projects),
            ..Default::default()
        }
    }

    pub fn current_project(current: Option<Arc<Project>>) -> Self {
        Self {
            current_project: Some(current),
            ..Default::default()
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// Shared handle to the application state. Cheap to clone; consumers receive
/// a `Store` at construction time instead of importing a global.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<AppState>,
    bus: EventBus,
}

impl Store {
    pub fn new(bus: EventBus) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(AppState::default()),
                bus,
            }),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// A shallow copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.inner.state.lock().expect("store lock poisoned").clone()
    }

    /// Shallow-merge `patch` into the state, then emit `StateChanged` with
    /// the new full state. The only path by which state changes; subscribers
    /// run to completion before this returns.
    pub fn patch(&self, patch: StatePatch) {
        let snapshot = {
            let mut state = self.inner.state.lock().expect("store lock poisoned");
            if let Some(projects) = patch.projects {
                state.projects = projects;
            }
            if let Some(current) = patch.current_project {
                state.current_project = current;
            }
            if let Some(is_loading) = patch.is_loading {
                state.is_loading = is_loading;
            }
            if let Some(loading) = patch.loading {
                state.loading = loading;
            }
            state.clone()
        };

        self.inner
            .bus
            .emit(Topic::StateChanged, &CoreEvent::StateChanged(snapshot));
    }

    // ------------------------------------------------------------------
    // Loading flags (backed by patch)
    // ------------------------------------------------------------------

    pub fn set_loading(&self, key: LoadingKey, value: bool) {
        let mut loading = self.snapshot().loading;
        loading.insert(key, value);
        self.patch(StatePatch {
            loading: Some(loading),
            ..Default::default()
        });
    }

    pub fn is_loading(&self, key: LoadingKey) -> bool {
        self.snapshot().loading.get(&key).copied().unwrap_or(false)
    }

    pub fn is_any_loading(&self) -> bool {
        let state = self.snapshot();
        state.is_loading || state.loading.values().any(|v| *v)
    }

    // ------------------------------------------------------------------
    // Project helpers (all funnel through patch)
    // ------------------------------------------------------------------

    /// Replace (or append) the list entry with `project`'s id, and keep the
    /// focused project in sync when it has the same id. The authoritative
    /// write path after every successful mutation and each loader step.
    pub fn apply_project(&self, project: Project) {
        let project = Arc::new(project);
        let state = self.snapshot();

        let mut projects = state.projects;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = Arc::clone(&project),
            None => projects.push(Arc::clone(&project)),
        }

        let current = match &state.current_project {
            Some(current) if current.id == project.id => Some(Some(Arc::clone(&project))),
            _ => None,
        };

        self.patch(StatePatch {
            projects: Some(projects),
            current_project: current,
            ..Default::default()
        });
    }

    /// Remove a project from the list, clearing focus if it was focused.
    pub fn remove_project(&self, id: &ProjectId) {
        let state = self.snapshot();

        let mut projects = state.projects;
        projects.retain(|p| &p.id != id);

        let current = match &state.current_project {
            Some(current) if &current.id == id => Some(None),
            _ => None,
        };

        self.patch(StatePatch {
            projects: Some(projects),
            current_project: current,
            ..Default::default()
        });
    }

    /// Focus a project already present in the list.
    pub fn focus_project(&self, id: &ProjectId) {
        let state = self.snapshot();
        let current = state.project(id).cloned();
        if current.is_none() {
            tracing::warn!(project = %id, "focus requested for a project not in the list");
        }
        self.patch(StatePatch::current_project(current));
    }
}
