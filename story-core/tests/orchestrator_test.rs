//! Mutation orchestrator behavior against a scriptable resource client.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{collect_errors, count_state_changes, detailed, seeded_store, StubClient};
use story_core::{
    ActionGuards, CoreEvent, EventBus, LoadingKey, ProjectActions, ResourceError, Topic,
};
use story_types::{PlotPointRequest, Project, ProjectId, UpdateScenarioRequest};

fn actions_with(client: StubClient, projects: Vec<Project>) -> (ProjectActions, EventBus) {
    let bus = EventBus::new();
    let store = seeded_store(bus.clone(), projects);
    let actions = ProjectActions::new(store, Arc::new(client), ActionGuards::new());
    (actions, bus)
}

#[tokio::test]
async fn rename_applies_local_merge_without_refetch() {
    let p1 = Project::summary(ProjectId::from("p1"), "A", false);
    let (actions, bus) = actions_with(StubClient::new(), vec![p1]);
    let changes = count_state_changes(&bus);

    actions.rename_project(&ProjectId::from("p1"), "B").await;

    let state = actions.store().snapshot();
    assert_eq!(state.projects.len(), 1);
    assert_eq!(state.projects[0].name, "B");
    assert!(state.current_project.is_none());
    // One state change, emitted only after the async call resolved.
    assert_eq!(changes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rename_keeps_focused_copy_in_sync() {
    let p1 = Project::summary(ProjectId::from("p1"), "A", false);
    let (actions, _bus) = actions_with(StubClient::new(), vec![p1]);
    actions.store().focus_project(&ProjectId::from("p1"));

    actions.rename_project(&ProjectId::from("p1"), "B").await;

    let state = actions.store().snapshot();
    assert_eq!(state.current_project.unwrap().name, "B");
    assert_eq!(state.projects[0].name, "B");
}

#[tokio::test]
async fn failed_delete_group_emits_error_and_leaves_state_untouched() {
    let p1 = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().fail(
        "delete_group",
        ResourceError::Message("network down".to_string()),
    );
    let (actions, bus) = actions_with(client, vec![p1.clone()]);
    let errors = collect_errors(&bus);

    actions.delete_group(&ProjectId::from("p1"), "g1").await;

    let messages = errors.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("network down"), "got: {}", messages[0]);

    let state = actions.store().snapshot();
    assert_eq!(state.projects.len(), 1);
    assert_eq!(*state.projects[0], p1);
    assert!(!actions.store().is_any_loading());
}

#[tokio::test]
async fn successful_mutation_resyncs_from_authoritative_detail() {
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().with_detail(detailed("p1", "A"));
    let (actions, bus) = actions_with(client, vec![summary]);
    let errors = collect_errors(&bus);

    actions.create_group(&ProjectId::from("p1"), "Villains").await;

    assert!(errors.lock().unwrap().is_empty());
    let state = actions.store().snapshot();
    assert!(state.projects[0].detail_loaded, "list entry replaced by authoritative detail");
    assert!(!actions.store().is_loading(LoadingKey::Saving));
}

#[tokio::test]
async fn consistency_failure_keeps_stale_state_and_reports() {
    // The mutation succeeds but the authoritative re-fetch fails: flag
    // clears, an error fires, and the stale summary stays visible.
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().fail(
        "fetch_project_detail",
        ResourceError::Http("connection reset".to_string()),
    );
    let (actions, bus) = actions_with(client, vec![summary.clone()]);
    let errors = collect_errors(&bus);

    actions.create_group(&ProjectId::from("p1"), "Villains").await;

    let messages = errors.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("failed to refresh"), "got: {}", messages[0]);
    assert_eq!(*actions.store().snapshot().projects[0], summary);
    assert!(!actions.store().is_any_loading());
}

#[tokio::test]
async fn select_project_focuses_and_announces() {
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().with_detail(detailed("p1", "A"));
    let (actions, bus) = actions_with(client, vec![summary]);

    let loaded = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&loaded);
    bus.subscribe(Topic::ProjectLoaded, move |event| {
        if let CoreEvent::ProjectLoaded(id) = event {
            sink.lock().unwrap().push(id.clone());
        }
    });

    actions.select_project(&ProjectId::from("p1")).await;

    let state = actions.store().snapshot();
    let current = state.current_project.expect("project focused");
    assert!(current.detail_loaded);
    assert_eq!(*loaded.lock().unwrap(), vec![ProjectId::from("p1")]);
    assert!(!actions.store().is_loading(LoadingKey::ProjectDetail));
}

#[tokio::test]
async fn select_project_failure_clears_flag_and_keeps_focus_empty() {
    let summary = Project::summary(ProjectId::from("p9"), "Locked", true);
    let client = StubClient::new().fail("fetch_project_detail", ResourceError::AuthRequired);
    let (actions, bus) = actions_with(client, vec![summary]);
    let errors = collect_errors(&bus);

    actions.select_project(&ProjectId::from("p9")).await;

    assert_eq!(errors.lock().unwrap().len(), 1);
    assert!(actions.store().snapshot().current_project.is_none());
    assert!(!actions.store().is_loading(LoadingKey::ProjectDetail));
}

#[tokio::test]
async fn load_projects_replaces_list_and_announces() {
    let client = StubClient::new().with_list(vec![
        Project::summary(ProjectId::from("p1"), "A", false),
        Project::summary(ProjectId::from("p2"), "B", true),
    ]);
    let (actions, bus) = actions_with(client, vec![]);

    let announced = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = std::sync::Arc::clone(&announced);
    bus.subscribe(Topic::ProjectsLoaded, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    actions.load_projects().await;

    let state = actions.store().snapshot();
    assert_eq!(state.projects.len(), 2);
    assert!(!state.is_loading);
    assert!(!actions.store().is_loading(LoadingKey::ProjectList));
    assert_eq!(announced.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn create_project_replaces_placeholder_with_server_record() {
    let (actions, bus) = actions_with(StubClient::new(), vec![]);
    let errors = collect_errors(&bus);

    actions.create_project("New Saga").await;

    assert!(errors.lock().unwrap().is_empty());
    let state = actions.store().snapshot();
    assert_eq!(state.projects.len(), 1);
    assert_eq!(state.projects[0].id.as_str(), "project-server-1");
    assert_eq!(state.projects[0].name, "New Saga");
    assert!(!state.projects[0].id.as_str().starts_with("pending-"));
    assert_eq!(
        state.current_project.expect("new project focused").id.as_str(),
        "project-server-1"
    );
}

#[tokio::test]
async fn create_project_rolls_back_placeholder_on_failure() {
    let client = StubClient::new().fail(
        "create_project",
        ResourceError::Message("quota exceeded".to_string()),
    );
    let (actions, bus) = actions_with(client, vec![]);
    let errors = collect_errors(&bus);

    let placeholder_seen = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = std::sync::Arc::clone(&placeholder_seen);
    bus.subscribe(Topic::StateChanged, move |event| {
        if let CoreEvent::StateChanged(state) = event {
            if state.projects.iter().any(|p| p.id.as_str().starts_with("pending-")) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    actions.create_project("Doomed").await;

    // The optimistic placeholder was visible while the call was in flight...
    assert!(placeholder_seen.load(Ordering::SeqCst) >= 1);
    // ...and rolled back after the rejection.
    assert!(actions.store().snapshot().projects.is_empty());
    assert_eq!(errors.lock().unwrap().len(), 1);
    assert!(!actions.store().is_any_loading());
}

#[tokio::test]
async fn relationship_mutations_follow_the_same_resync_path() {
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().with_detail(detailed("p1", "A"));
    let (actions, _bus) = actions_with(client, vec![summary]);

    actions
        .delete_relationship(&ProjectId::from("p1"), "rel-1")
        .await;

    let state = actions.store().snapshot();
    assert!(state.projects[0].detail_loaded);
}

#[tokio::test]
async fn scenario_and_plot_point_mutations_follow_the_resync_path() {
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().with_detail(detailed("p1", "A"));
    let (actions, bus) = actions_with(client, vec![summary]);
    let errors = collect_errors(&bus);
    let id = ProjectId::from("p1");

    actions
        .update_scenario(
            &id,
            "scn-1",
            &UpdateScenarioRequest {
                title: "Act One".to_string(),
                summary: Some("The harbor burns.".to_string()),
                themes: None,
            },
        )
        .await;
    actions
        .create_plot_point(
            &id,
            "scn-1",
            &PlotPointRequest {
                title: "Inciting incident".to_string(),
                content: None,
            },
        )
        .await;

    assert!(errors.lock().unwrap().is_empty());
    let state = actions.store().snapshot();
    assert!(state.projects[0].detail_loaded);
    assert!(!actions.store().is_loading(LoadingKey::Saving));
}

#[tokio::test]
async fn manuscript_import_refetches_authoritative_detail() {
    let summary = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().with_detail(detailed("p1", "A"));
    let (actions, _bus) = actions_with(client, vec![summary]);

    actions
        .import_manuscript_from_plot_points(&ProjectId::from("p1"))
        .await;

    let state = actions.store().snapshot();
    assert!(state.projects[0].detail_loaded);
    assert!(!actions.store().is_loading(LoadingKey::Saving));
}

#[tokio::test]
async fn failed_manuscript_clear_emits_error_and_leaves_state_untouched() {
    let p1 = Project::summary(ProjectId::from("p1"), "A", false);
    let client = StubClient::new().fail(
        "clear_manuscript",
        ResourceError::Message("manuscript is locked".to_string()),
    );
    let (actions, bus) = actions_with(client, vec![p1.clone()]);
    let errors = collect_errors(&bus);

    actions.clear_manuscript(&ProjectId::from("p1")).await;

    let messages = errors.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("manuscript is locked"), "got: {}", messages[0]);
    assert_eq!(*actions.store().snapshot().projects[0], p1);
    assert!(!actions.store().is_any_loading());
}
