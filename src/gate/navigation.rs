use serde::{Deserialize, Serialize};
use std::path::Path;

use super::capability::Capability;
use super::decision::AccessDecision;
use super::GateError;
use crate::types::WorkspaceId;

/// One link of the dashboard navigation. Targets are workspace-relative
/// (`/chat`, `/` for the dashboard home).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub name: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_capability: Option<Capability>,
    #[serde(default)]
    pub match_exact: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias_paths: Vec<String>,
    /// Disabled regardless of flags
    #[serde(default)]
    pub disabled: bool,
}

impl NavigationEntry {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            required_capability: None,
            match_exact: false,
            alias_paths: Vec::new(),
            disabled: false,
        }
    }

    pub fn requires(mut self, capability: &str) -> Self {
        self.required_capability = Some(Capability::named(capability));
        self
    }

    pub fn exact(mut self) -> Self {
        self.match_exact = true;
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_paths = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn always_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn is_enabled_by(&self, decision: &AccessDecision) -> bool {
        if self.disabled {
            return false;
        }
        match &self.required_capability {
            Some(capability) => decision.is_enabled(capability.as_str()),
            None => true,
        }
    }

    pub fn matches_path(&self, current_path: &str) -> bool {
        if self.match_exact {
            return current_path == self.target;
        }
        current_path.starts_with(&self.target)
            || self.alias_paths.iter().any(|alias| current_path.starts_with(alias.as_str()))
    }
}

/// Navigation entry annotated for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationItem<'a> {
    #[serde(flatten)]
    pub entry: &'a NavigationEntry,
    pub active: bool,
    pub enabled: bool,
}

/// Annotate every entry with its active/enabled state.
///
/// Order and length of `entries` are preserved; disabled entries are kept so
/// callers decide between dimming and hiding. When several entries match the
/// path only the first one is active.
pub fn filter_navigation<'a>(
    entries: &'a [NavigationEntry],
    decision: &AccessDecision,
    current_path: &str,
) -> Vec<NavigationItem<'a>> {
    let mut active_taken = false;
    entries
        .iter()
        .map(|entry| {
            let active = !active_taken && entry.matches_path(current_path);
            active_taken |= active;
            NavigationItem {
                entry,
                active,
                enabled: entry.is_enabled_by(decision),
            }
        })
        .collect()
}

/// Process-wide, read-only navigation table supplied at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: Vec<NavigationEntry>,
}

impl RouteTable {
    pub fn new(entries: Vec<NavigationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Capabilities the table depends on, in table order without repeats
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut keys: Vec<Capability> = Vec::new();
        for capability in self.entries.iter().filter_map(|e| e.required_capability.as_ref()) {
            if !keys.contains(capability) {
                keys.push(capability.clone());
            }
        }
        keys
    }

    pub fn from_json(raw: &str, origin: &str) -> Result<Self, GateError> {
        serde_json::from_str(raw).map_err(|source| GateError::RouteTableParse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GateError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| GateError::RouteTableIo {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&raw, &display)
    }

    /// The workspace dashboard tabs
    pub fn dashboard() -> Self {
        Self::new(vec![
            NavigationEntry::new("chat", "/chat").requires(Capability::ENABLE_CHAT),
            NavigationEntry::new("dashboard", "/").exact(),
            NavigationEntry::new("ai", "/ai").requires(Capability::ENABLE_AI),
            NavigationEntry::new("blackbox", "/blackbox").always_disabled(),
            NavigationEntry::new("calendar", "/calendar").requires(Capability::ENABLE_CALENDAR),
            NavigationEntry::new("projects", "/projects").requires(Capability::ENABLE_PROJECTS),
            NavigationEntry::new("documents", "/documents").requires(Capability::ENABLE_DOCS),
            NavigationEntry::new("drive", "/drive").requires(Capability::ENABLE_DRIVE),
            NavigationEntry::new("users", "/users").requires(Capability::ENABLE_USERS),
            NavigationEntry::new("inventory", "/inventory").requires(Capability::ENABLE_INVENTORY),
            NavigationEntry::new("healthcare", "/healthcare").requires(Capability::ENABLE_HEALTHCARE),
            NavigationEntry::new("finance", "/finance"),
            NavigationEntry::new("settings", "/settings").aliases([
                "/members",
                "/teams",
                "/secrets",
                "/infrastructure",
                "/migrations",
                "/activities",
            ]),
        ])
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::dashboard()
    }
}

/// Strip a leading `/{workspace}` segment so absolute dashboard paths match
/// the workspace-relative route table. The segment is compared as a UUID, so
/// its spelling (case, hyphens) does not matter.
pub fn workspace_relative_path<'a>(path: &'a str, workspace: &WorkspaceId) -> &'a str {
    let Some(trimmed) = path.strip_prefix('/') else {
        return path;
    };
    let (segment, rest) = match trimmed.find('/') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    match segment.parse::<WorkspaceId>() {
        Ok(id) if &id == workspace => {
            if rest.is_empty() {
                "/"
            } else {
                rest
            }
        }
        _ => path,
    }
}
