//! The directed, multi-phase relationship model.
//!
//! (source, target) is not a unique key: all records sharing one ordered pair
//! are the successive phases of that pair's history. Grouping is a pure
//! function of the flat relationship list and is recomputed on every call;
//! nothing here is cached, because the list may change after any mutation.

use std::collections::BTreeMap;

use story_types::{CharacterId, Project, Relationship};

/// Placeholder name rendered when a relationship references a character that
/// is not among the project's loaded cards.
pub const UNKNOWN_CHARACTER: &str = "unknown";

/// A directed (source, target) pair. Direction is preserved: (A, B) and
/// (B, A) are different keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub source: CharacterId,
    pub target: CharacterId,
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// All phases of one directed pair, sorted ascending by phase order.
/// Derived, never persisted; rebuild it after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseGroup {
    phases: Vec<Relationship>,
}

impl PhaseGroup {
    pub fn phases(&self) -> &[Relationship] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// The phase at `index`, if in range.
    pub fn phase(&self, index: usize) -> Option<&Relationship> {
        self.phases.get(index)
    }

    /// Whether next/previous controls should be enabled. Wraparound within a
    /// single-element group is a no-op by definition.
    pub fn can_navigate(&self) -> bool {
        self.phases.len() > 1
    }

    /// Cyclic navigation: `direction` is +1 for next, -1 for previous.
    /// Stepping past the last phase wraps to the first and vice versa.
    pub fn step(&self, index: usize, direction: i64) -> usize {
        if self.phases.is_empty() {
            return 0;
        }
        let len = self.phases.len() as i64;
        (index as i64 + direction).rem_euclid(len) as usize
    }
}

/// Partition `relationships` by exact directed pair, each group sorted by
/// non-decreasing phase order (stable for ties). Every record lands in
/// exactly one group.
pub fn group_by_directed_pair(relationships: &[Relationship]) -> BTreeMap<PairKey, PhaseGroup> {
    let mut groups: BTreeMap<PairKey, Vec<Relationship>> = BTreeMap::new();
    for relationship in relationships {
        let key = PairKey {
            source: relationship.source_character_id.clone(),
            target: relationship.target_character_id.clone(),
        };
        groups.entry(key).or_default().push(relationship.clone());
    }

    groups
        .into_iter()
        .map(|(key, mut phases)| {
            phases.sort_by_key(|r| r.phase_order);
            (key, PhaseGroup { phases })
        })
        .collect()
}

/// Resolve a character id to a display name, falling back to the
/// [`UNKNOWN_CHARACTER`] placeholder for dangling references so one bad id
/// never blocks rendering the rest of the graph.
pub fn character_name<'a>(project: &'a Project, id: &CharacterId) -> &'a str {
    match project.find_card(id) {
        Some(card) => card.name.as_str(),
        None => {
            tracing::debug!(character = %id, project = %project.id, "dangling relationship reference");
            UNKNOWN_CHARACTER
        }
    }
}
