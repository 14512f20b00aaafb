use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use super::GateError;

/// Named feature flag stored as a workspace secret
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Capability(String);

impl Capability {
    pub const ENABLE_AI: &'static str = "ENABLE_AI";
    pub const ENABLE_CHAT: &'static str = "ENABLE_CHAT";
    pub const ENABLE_CALENDAR: &'static str = "ENABLE_CALENDAR";
    pub const ENABLE_USERS: &'static str = "ENABLE_USERS";
    pub const ENABLE_PROJECTS: &'static str = "ENABLE_PROJECTS";
    pub const ENABLE_DOCS: &'static str = "ENABLE_DOCS";
    pub const ENABLE_DRIVE: &'static str = "ENABLE_DRIVE";
    pub const ENABLE_INVENTORY: &'static str = "ENABLE_INVENTORY";
    pub const ENABLE_HEALTHCARE: &'static str = "ENABLE_HEALTHCARE";
    pub const ENABLE_AVATAR: &'static str = "ENABLE_AVATAR";
    pub const ENABLE_LOGO: &'static str = "ENABLE_LOGO";
    pub const PREVENT_WORKSPACE_DELETION: &'static str = "PREVENT_WORKSPACE_DELETION";

    /// Flags the dashboard knows how to act on. Other names still resolve,
    /// they are just reported as unknown.
    pub const KNOWN: &'static [&'static str] = &[
        Self::ENABLE_AI,
        Self::ENABLE_CHAT,
        Self::ENABLE_CALENDAR,
        Self::ENABLE_USERS,
        Self::ENABLE_PROJECTS,
        Self::ENABLE_DOCS,
        Self::ENABLE_DRIVE,
        Self::ENABLE_INVENTORY,
        Self::ENABLE_HEALTHCARE,
        Self::ENABLE_AVATAR,
        Self::ENABLE_LOGO,
        Self::PREVENT_WORKSPACE_DELETION,
    ];

    /// Build from a trusted constant
    pub fn named(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(&self.0.as_str())
    }
}

impl FromStr for Capability {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let valid = !name.is_empty()
            && name.len() <= 128
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(GateError::InvalidCapability(s.to_string()));
        }
        Ok(Self(name.to_string()))
    }
}

impl From<&str> for Capability {
    fn from(name: &str) -> Self {
        Capability::named(name)
    }
}

impl TryFrom<String> for Capability {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Capability {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The one flag normalization rule: trimmed, ASCII case-folded, equal to "true".
pub fn is_flag_enabled(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parse a comma separated key list as sent by query strings and the CLI
pub fn parse_capability_list(raw: &str) -> Result<Vec<Capability>, GateError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}
