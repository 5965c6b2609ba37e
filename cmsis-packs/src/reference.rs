//! References to packs, devices and components as written in project files.

use std::fmt;

use glob::Pattern;

use crate::error::{PackError, Result};
use crate::pack::{Component, Device, PackId, VENDOR_SEPARATOR};
use crate::version::VersionReq;

/// `Vendor::Name[@[>=]Version]`, where `Name` may contain `*` wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackRef {
    pub vendor: String,
    pub name: String,
    pub version: VersionReq,
}

impl PackRef {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        let invalid = || PackError::InvalidPackId(reference.to_string());
        let (vendor, rest) = reference
            .split_once(VENDOR_SEPARATOR)
            .ok_or_else(invalid)?;
        let (name, version) = match rest.split_once('@') {
            Some((name, version)) => (name, VersionReq::parse(version)),
            None => (rest, VersionReq::Any),
        };
        if vendor.is_empty() || name.is_empty() {
            return Err(invalid());
        }
        if name.contains('*') && Pattern::new(name).is_err() {
            return Err(invalid());
        }
        Ok(Self {
            vendor: vendor.to_string(),
            name: name.to_string(),
            version,
        })
    }

    pub fn matches(&self, id: &PackId) -> bool {
        if self.vendor != id.vendor || !self.version.matches(&id.version) {
            return false;
        }
        if self.name.contains('*') {
            Pattern::new(&self.name)
                .map(|p| p.matches(&id.name))
                .unwrap_or(false)
        } else {
            self.name == id.name
        }
    }
}

impl fmt::Display for PackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.vendor, VENDOR_SEPARATOR, self.name)?;
        if self.version != VersionReq::Any {
            write!(f, "@{}", self.version)?;
        }
        Ok(())
    }
}

/// `[Vendor::]Device[:Pname]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    pub vendor: Option<String>,
    pub name: String,
    pub processor: Option<String>,
}

impl DeviceRef {
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        let (vendor, rest) = match reference.split_once(VENDOR_SEPARATOR) {
            Some((vendor, rest)) => (Some(vendor.to_string()), rest),
            None => (None, reference),
        };
        let (name, processor) = match rest.split_once(':') {
            Some((name, pname)) => (name.to_string(), Some(pname.to_string())),
            None => (rest.to_string(), None),
        };
        Self {
            vendor,
            name,
            processor,
        }
    }

    /// A reference without `:Pname` selects any processor of the device.
    pub fn matches(&self, device: &Device) -> bool {
        if let Some(vendor) = &self.vendor {
            if vendor != &device.vendor {
                return false;
            }
        }
        if self.name != device.name {
            return false;
        }
        match &self.processor {
            Some(pname) => device.processor.as_deref() == Some(pname.as_str()),
            None => true,
        }
    }
}

/// `[Vendor::]Class[&Bundle]:Group[:Sub][&Variant][@[>=]Version]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRef {
    pub vendor: Option<String>,
    pub class: String,
    pub bundle: Option<String>,
    pub group: String,
    pub sub: Option<String>,
    pub variant: Option<String>,
    pub version: VersionReq,
}

impl ComponentRef {
    /// Returns `None` when the reference has no `Class:Group` part.
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let (body, version) = match reference.rsplit_once('@') {
            Some((body, version)) => (body, VersionReq::parse(version)),
            None => (reference, VersionReq::Any),
        };
        let (vendor, body) = match body.split_once(VENDOR_SEPARATOR) {
            Some((vendor, rest)) => (Some(vendor.to_string()), rest),
            None => (None, body),
        };

        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return None;
        }
        let (class, bundle) = split_suffix(parts[0]);
        let (last, variant) = split_suffix(parts[parts.len() - 1]);
        let (group, sub) = if parts.len() == 3 {
            (parts[1].to_string(), Some(last))
        } else {
            (last, None)
        };
        if class.is_empty() || group.is_empty() {
            return None;
        }

        Some(Self {
            vendor,
            class,
            bundle,
            group,
            sub,
            variant,
            version,
        })
    }

    pub fn matches(&self, component: &Component) -> bool {
        let optional_eq = |wanted: &Option<String>, actual: &Option<String>| match wanted {
            Some(w) => actual.as_deref() == Some(w.as_str()),
            None => true,
        };

        if let Some(vendor) = &self.vendor {
            if vendor != &component.vendor {
                return false;
            }
        }
        self.class == component.class
            && self.group == component.group
            && self.sub == component.sub
            && optional_eq(&self.bundle, &component.bundle)
            && optional_eq(&self.variant, &component.variant)
            && self.version.matches(&component.version)
    }
}

/// Split `Name&Suffix` into its parts.
fn split_suffix(part: &str) -> (String, Option<String>) {
    match part.split_once('&') {
        Some((name, suffix)) => (name.to_string(), Some(suffix.to_string())),
        None => (part.to_string(), None),
    }
}
