//! Domain model shared between the state core and its consumers
//!
//! These types mirror the backend's REST payloads one-to-one, so a detailed
//! project fetched from the server deserializes directly into [`Project`].
//! Serializable with serde for JSON over HTTP.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Client-generated placeholder id, used only for the optimistic
    /// create-project insert before the server assigns the real id.
    pub fn placeholder() -> Self {
        Self(format!("pending-{}", ulid::Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a character card
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub String);

impl CharacterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Characters
// ============================================================================

/// A character card. Belongs to exactly one group; ownership moves only via
/// the explicit move-card operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Card {
    pub id: CharacterId,
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub goal: Vec<String>,
    #[serde(default)]
    pub quote: Vec<String>,
    #[serde(default)]
    pub introduction_story: Option<String>,
    #[serde(default)]
    pub ordering: Option<i64>,
}

/// A named group of character cards, ordered by each card's `ordering`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: String,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

// ============================================================================
// Worldview
// ============================================================================

/// Free-text worldview for the whole project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Worldview {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldviewCard {
    pub id: String,
    pub group_id: String,
    pub title: String,
    pub content: String,
    pub ordering: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorldviewGroup {
    pub id: String,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub worldview_cards: Vec<WorldviewCard>,
}

// ============================================================================
// Relationships
// ============================================================================

/// A directed edge between two characters. (source, target) is not a unique
/// key: records sharing the pair are the successive phases of that pair's
/// evolution, ordered by `phase_order` (>= 1). (A -> B) and (B -> A) are
/// distinct logical relationships, not the same edge reversed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub project_id: ProjectId,
    pub source_character_id: CharacterId,
    pub target_character_id: CharacterId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_phase_order")]
    pub phase_order: i64,
}

fn default_phase_order() -> i64 {
    1
}

// ============================================================================
// Scenarios & Manuscript
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotPoint {
    pub id: String,
    pub scenario_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub scene_draft: Option<String>,
    pub ordering: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub plot_points: Vec<PlotPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManuscriptBlock {
    pub id: String,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub ordering: i64,
}

// ============================================================================
// Project
// ============================================================================

/// Entity counts shown on a summary-form project before its detail is
/// loaded. Derived client-side from the list payload; the wire format never
/// carries them, so they default to zero on deserialization.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectCounts {
    pub characters: usize,
    pub relationships: usize,
    pub worldview_cards: usize,
    pub scenarios: usize,
    pub manuscript_blocks: usize,
}

/// The aggregate root.
///
/// A project is either in *summary* form (id, name, flags only) or
/// *detailed* form (all nested collections populated). `detail_loaded`
/// states which form this value currently holds; consumers must check it
/// before touching the nested collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub password_protected: bool,
    #[serde(default)]
    pub detail_loaded: bool,
    #[serde(default)]
    pub counts: ProjectCounts,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub worldview: Worldview,
    #[serde(default)]
    pub worldview_groups: Vec<WorldviewGroup>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub manuscript_blocks: Vec<ManuscriptBlock>,
}

impl Project {
    /// A summary-form project as returned by the list endpoint.
    pub fn summary(id: ProjectId, name: impl Into<String>, password_protected: bool) -> Self {
        Self {
            id,
            name: name.into(),
            password_protected,
            detail_loaded: false,
            counts: ProjectCounts::default(),
            groups: Vec::new(),
            worldview: Worldview::default(),
            worldview_groups: Vec::new(),
            relationships: Vec::new(),
            scenarios: Vec::new(),
            manuscript_blocks: Vec::new(),
        }
    }

    /// Find a character card anywhere in the project's groups.
    pub fn find_card(&self, character_id: &CharacterId) -> Option<&Card> {
        self.groups
            .iter()
            .flat_map(|g| g.cards.iter())
            .find(|c| &c.id == character_id)
    }

    /// Recompute [`ProjectCounts`] from the nested collections. Meaningful
    /// only on a detailed record; a summary has nothing to count.
    pub fn refresh_counts(&mut self) {
        self.counts = ProjectCounts {
            characters: self.groups.iter().map(|g| g.cards.len()).sum(),
            relationships: self.relationships.len(),
            worldview_cards: self
                .worldview_groups
                .iter()
                .map(|g| g.worldview_cards.len())
                .sum(),
            scenarios: self.scenarios.len(),
            manuscript_blocks: self.manuscript_blocks.len(),
        };
    }

    /// Collapse a detailed record into summary form: counts are derived from
    /// the nested collections, then the collections are dropped.
    pub fn into_summary(mut self) -> Self {
        self.refresh_counts();
        self.detail_loaded = false;
        self.groups = Vec::new();
        self.worldview = Worldview::default();
        self.worldview_groups = Vec::new();
        self.relationships = Vec::new();
        self.scenarios = Vec::new();
        self.manuscript_blocks = Vec::new();
        self
    }
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateCardRequest {
    pub group_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial card update; `None` fields are left untouched by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateCardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abilities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction_story: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveCardRequest {
    pub source_group_id: String,
    pub target_group_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateWorldviewCardRequest {
    pub title: String,
    pub content: String,
}

/// Partial worldview-card update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateWorldviewCardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateRelationshipRequest {
    pub source_character_id: CharacterId,
    pub target_character_id: CharacterId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_phase_order")]
    pub phase_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateRelationshipRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_phase_order")]
    pub phase_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateScenarioRequest {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub themes: Option<Vec<String>>,
}

/// The backend takes the same body for creating and updating a plot point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotPointRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Partial manuscript-block update; `None` fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateManuscriptBlockRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
