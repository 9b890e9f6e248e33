//! Per-action reentrancy guards.
//!
//! A single logical user action can arrive twice when two DOM events map to
//! the same handler (pointer-down and click on the same control). Each action
//! kind carries one boolean flag: the first caller takes it, the second call
//! while it is held is dropped as a no-op, never queued. The flag is released
//! when the returned token drops, success or failure alike.
//!
//! This is transient UI concurrency state, deliberately kept outside the
//! store and the event bus.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use strum::EnumIter;

/// The guarded user actions. One flag per kind; unrelated kinds never block
/// each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ActionKind {
    SelectProject,
    CreateProject,
    RenameProject,
    DeleteProject,
    SaveCard,
}

/// Shared guard flags. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct ActionGuards {
    held: Arc<Mutex<HashSet<ActionKind>>>,
}

impl ActionGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the flag for `kind`. Returns `None` when the action is already
    /// running; the caller must then drop the duplicate invocation.
    pub fn try_begin(&self, kind: ActionKind) -> Option<GuardToken> {
        let mut held = self.held.lock().expect("guard lock poisoned");
        if !held.insert(kind) {
            tracing::debug!(?kind, "duplicate invocation dropped by reentrancy guard");
            return None;
        }
        Some(GuardToken {
            held: Arc::clone(&self.held),
            kind,
        })
    }

    pub fn is_held(&self, kind: ActionKind) -> bool {
        self.held.lock().expect("guard lock poisoned").contains(&kind)
    }
}

/// Releases the action flag on drop, the `finally` of this layer.
pub struct GuardToken {
    held: Arc<Mutex<HashSet<ActionKind>>>,
    kind: ActionKind,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.held
            .lock()
            .expect("guard lock poisoned")
            .remove(&self.kind);
    }
}
