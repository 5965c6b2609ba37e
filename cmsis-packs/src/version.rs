//! Pack version comparison and version references.
//!
//! Pack versions are semantic versions, but pack authors are not always
//! strict about it (`5.8`, `1.0.0-rc1`), so parsing is lenient and falls back
//! to plain string ordering when a version cannot be read.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

/// Parse a version, padding missing minor/patch components with zero.
pub fn parse_lenient(version: &str) -> Option<Version> {
    let version = version.trim().trim_start_matches('v');
    if version.is_empty() {
        return None;
    }
    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&format!("{}{}", parts.join("."), suffix)).ok()
}

/// Compare two version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (parse_lenient(a), parse_lenient(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// A version constraint as written after `@` in a pack or component reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum VersionReq {
    #[default]
    Any,
    /// `@1.2.3`
    Exact(String),
    /// `@>=1.2.3`
    AtLeast(String),
}

impl VersionReq {
    pub fn parse(req: &str) -> Self {
        let req = req.trim();
        if req.is_empty() {
            VersionReq::Any
        } else if let Some(min) = req.strip_prefix(">=") {
            VersionReq::AtLeast(min.trim().to_string())
        } else {
            VersionReq::Exact(req.to_string())
        }
    }

    pub fn matches(&self, version: &str) -> bool {
        match self {
            VersionReq::Any => true,
            VersionReq::Exact(v) => compare(version, v) == Ordering::Equal,
            VersionReq::AtLeast(v) => compare(version, v) != Ordering::Less,
        }
    }
}

impl fmt::Display for VersionReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionReq::Any => Ok(()),
            VersionReq::Exact(v) => write!(f, "{}", v),
            VersionReq::AtLeast(v) => write!(f, ">={}", v),
        }
    }
}
