//! Trigger gate: decides whether a repository event starts a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{Error, Result};

/// Kind of repository event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A branch or tag was pushed
    Push,
    /// Someone started the pipeline by hand
    ManualDispatch,
}

impl EventKind {
    /// Parses an event name as reported by CI (`push`, `workflow_dispatch`).
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "push" => Ok(EventKind::Push),
            "workflow_dispatch" | "manual-dispatch" | "manual" => Ok(EventKind::ManualDispatch),
            other => Err(Error::Config(format!(
                "Unsupported event: {other}. Valid events: push, workflow_dispatch"
            ))),
        }
    }
}

/// A git reference that triggered a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "kebab-case")]
pub enum GitRef {
    /// `refs/heads/<name>`
    Branch(String),
    /// `refs/tags/<name>`
    Tag(String),
    /// Any other ref (pull requests, notes, ...)
    Other(String),
}

impl GitRef {
    /// Parses a full ref name. A bare name is taken as a branch.
    pub fn parse(full: &str) -> Self {
        if let Some(name) = full.strip_prefix("refs/heads/") {
            GitRef::Branch(name.to_string())
        } else if let Some(name) = full.strip_prefix("refs/tags/") {
            GitRef::Tag(name.to_string())
        } else if full.starts_with("refs/") {
            GitRef::Other(full.to_string())
        } else {
            GitRef::Branch(full.to_string())
        }
    }

    /// Tag name, when this is a tag ref.
    pub fn tag(&self) -> Option<&str> {
        match self {
            GitRef::Tag(name) => Some(name),
            _ => None,
        }
    }

    /// Version implied by a tag ref: the tag name without a leading `v`.
    pub fn tag_version(&self) -> Option<&str> {
        self.tag().map(|tag| tag.strip_prefix('v').unwrap_or(tag))
    }

    /// Short name without the `refs/...` prefix.
    pub fn short_name(&self) -> &str {
        match self {
            GitRef::Branch(name) | GitRef::Tag(name) | GitRef::Other(name) => name,
        }
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitRef::Branch(name) => write!(f, "refs/heads/{name}"),
            GitRef::Tag(name) => write!(f, "refs/tags/{name}"),
            GitRef::Other(full) => f.write_str(full),
        }
    }
}

/// A repository event presented to the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub kind: EventKind,
    pub git_ref: GitRef,
}

impl TriggerEvent {
    pub fn new(kind: EventKind, git_ref: &str) -> Self {
        Self {
            kind,
            git_ref: GitRef::parse(git_ref),
        }
    }
}

/// Which events start a run. Chosen once per deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerPolicy {
    /// Pushes to any of `branches`
    BranchPush { branches: Vec<String> },
    /// Pushes of tags matching a glob pattern
    TagPush { pattern: glob::Pattern },
    /// Manual dispatch only
    ManualDispatch,
}

impl TriggerPolicy {
    /// Tag-push policy for a glob such as `v*`.
    pub fn tag_push(pattern: &str) -> Result<Self> {
        Ok(TriggerPolicy::TagPush {
            pattern: glob::Pattern::new(pattern)?,
        })
    }

    fn label(&self) -> &'static str {
        match self {
            TriggerPolicy::BranchPush { .. } => "branch-push",
            TriggerPolicy::TagPush { .. } => "tag-push",
            TriggerPolicy::ManualDispatch => "manual-dispatch",
        }
    }
}

/// Outcome of the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerDecision {
    pub start: bool,
    pub git_ref: GitRef,
    pub reason: String,
}

/// Applies `policy` to `event`.
///
/// With `allow_manual_dispatch`, a manual dispatch starts a run regardless of
/// the policy. Refs other than branches and tags never start a run.
pub fn evaluate(
    policy: &TriggerPolicy,
    allow_manual_dispatch: bool,
    event: &TriggerEvent,
) -> TriggerDecision {
    let decide = |start: bool, reason: String| TriggerDecision {
        start,
        git_ref: event.git_ref.clone(),
        reason,
    };

    if let GitRef::Other(full) = &event.git_ref {
        return decide(false, format!("{full} is neither a branch nor a tag"));
    }

    match (event.kind, policy) {
        (EventKind::ManualDispatch, TriggerPolicy::ManualDispatch) => {
            decide(true, "manual dispatch".to_string())
        }
        (EventKind::ManualDispatch, _) if allow_manual_dispatch => decide(
            true,
            format!("manual dispatch accepted alongside {} policy", policy.label()),
        ),
        (EventKind::ManualDispatch, _) => decide(
            false,
            format!("manual dispatch not accepted by {} policy", policy.label()),
        ),
        (EventKind::Push, TriggerPolicy::ManualDispatch) => {
            decide(false, "pushes do not start runs under manual-dispatch policy".to_string())
        }
        (EventKind::Push, TriggerPolicy::BranchPush { branches }) => match &event.git_ref {
            GitRef::Branch(name) if branches.iter().any(|b| b == name) => {
                decide(true, format!("push to branch {name}"))
            }
            GitRef::Branch(name) => decide(false, format!("branch {name} is not watched")),
            other => decide(false, format!("{other} is not a branch push")),
        },
        (EventKind::Push, TriggerPolicy::TagPush { pattern }) => match &event.git_ref {
            GitRef::Tag(name) if pattern.matches(name) => {
                decide(true, format!("tag {name} matches {}", pattern.as_str()))
            }
            GitRef::Tag(name) => decide(
                false,
                format!("tag {name} does not match {}", pattern.as_str()),
            ),
            other => decide(false, format!("{other} is not a tag push")),
        },
    }
}
