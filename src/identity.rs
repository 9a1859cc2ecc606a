//! Identity Allocator
//!
//! Collision-free workspace ids and display names. Callers pass a snapshot of
//! the existing population fetched right before registering a workspace;
//! two interleaved registrations can still race.

use std::collections::HashSet;
use std::sync::LazyLock;

use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;

use crate::domain::{DomainError, DomainResult, Workspace};

/// Length of a workspace id
pub const ID_LENGTH: usize = 4;

/// Name given to workspaces created without one
pub const DEFAULT_NAME: &str = "Untitled";

/// Attempts before giving up on finding a free id
pub const MAX_ID_ATTEMPTS: usize = 10_000;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{4}$").expect("valid id pattern"));

/// Ids and names currently registered
#[derive(Debug, Clone, Default)]
pub struct Identities {
    pub ids: HashSet<String>,
    pub names: HashSet<String>,
}

/// Whether `candidate` has the shape of a workspace id
pub fn is_workspace_id(candidate: &str) -> bool {
    ID_PATTERN.is_match(candidate)
}

/// Random alphanumeric id absent from `existing`
pub fn allocate_id(existing: &HashSet<String>) -> DomainResult<String> {
    let mut rng = rand::rng();

    for _ in 0..MAX_ID_ATTEMPTS {
        let id: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect();

        if !existing.contains(&id) {
            return Ok(id);
        }
    }

    Err(DomainError::IdSpaceExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}

/// `candidate` (or the default name when blank), suffixed with the smallest
/// number from 2 upward that makes it unique
pub fn allocate_name(candidate: &str, existing: &HashSet<String>) -> String {
    let base = if candidate.trim().is_empty() {
        DEFAULT_NAME
    } else {
        candidate
    };

    if !existing.contains(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{} {}", base, n))
        .find(|name| !existing.contains(name))
        .unwrap_or_else(|| base.to_string())
}

/// Give `workspace` an id and a name that are free in `snapshot`.
///
/// A well-formed incoming id is kept when it is not taken.
pub fn make_unique(workspace: &mut Workspace, snapshot: &Identities) -> DomainResult<()> {
    workspace.name = allocate_name(&workspace.name, &snapshot.names);

    if !is_workspace_id(&workspace.id) || snapshot.ids.contains(&workspace.id) {
        workspace.id = allocate_id(&snapshot.ids)?;
    }

    Ok(())
}

/// Lowercase, dash-separated form of `text` usable in a file name
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }

    slug.trim_end_matches('-').to_string()
}
