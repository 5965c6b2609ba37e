//! Installed pack types

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{PackError, Result};

/// Separator between vendor and the rest of an identifier.
pub const VENDOR_SEPARATOR: &str = "::";

/// Identity of an installed pack: vendor, name and concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackId {
    pub vendor: String,
    pub name: String,
    pub version: String,
}

impl PackId {
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse `Vendor::Name@Version`.
    pub fn parse(id: &str) -> Result<Self> {
        let invalid = || PackError::InvalidPackId(id.to_string());
        let (vendor, rest) = id.split_once(VENDOR_SEPARATOR).ok_or_else(invalid)?;
        let (name, version) = rest.split_once('@').ok_or_else(invalid)?;
        if vendor.is_empty() || name.is_empty() || version.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(vendor, name, version))
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}@{}",
            self.vendor, VENDOR_SEPARATOR, self.name, self.version
        )
    }
}

/// A selectable device: a device leaf or a variant, per processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// `Dvendor` without its numeric `:NN` suffix
    pub vendor: String,
    /// `Dvariant` for variants, `Dname` otherwise
    pub name: String,
    /// `Pname`, when the pack names the processor
    pub processor: Option<String>,
    /// Set when the device has more than one processor; only then is
    /// `Pname` part of the identifier.
    pub multicore: bool,
    /// `Dcore`, e.g. `Cortex-M4`
    pub core: Option<String>,
    pub family: String,
    pub pack: PackId,
}

impl Device {
    /// `Vendor::Name` or, for multi-processor devices, `Vendor::Name:Pname`.
    pub fn id(&self) -> String {
        match self.processor.as_ref().filter(|_| self.multicore) {
            Some(pname) => format!("{}{}{}:{}", self.vendor, VENDOR_SEPARATOR, self.name, pname),
            None => format!("{}{}{}", self.vendor, VENDOR_SEPARATOR, self.name),
        }
    }
}

/// A software component shipped by a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub vendor: String,
    pub class: String,
    pub bundle: Option<String>,
    pub group: String,
    pub sub: Option<String>,
    pub variant: Option<String>,
    pub version: String,
    pub pack: PackId,
}

impl Component {
    /// `Vendor::Class[&Bundle]:Group[:Sub][&Variant]@Version`.
    pub fn id(&self) -> String {
        let mut id = format!("{}{}{}", self.vendor, VENDOR_SEPARATOR, self.class);
        if let Some(bundle) = &self.bundle {
            id.push('&');
            id.push_str(bundle);
        }
        id.push(':');
        id.push_str(&self.group);
        if let Some(sub) = &self.sub {
            id.push(':');
            id.push_str(sub);
        }
        if let Some(variant) = &self.variant {
            id.push('&');
            id.push_str(variant);
        }
        if !self.version.is_empty() {
            id.push('@');
            id.push_str(&self.version);
        }
        id
    }
}

/// An installed pack and everything read from its description.
#[derive(Debug, Clone, Serialize)]
pub struct Pack {
    pub id: PackId,
    pub description: String,
    /// Location of the `.pdsc` file this pack was read from
    pub pdsc: PathBuf,
    pub devices: Vec<Device>,
    pub components: Vec<Component>,
}

impl Pack {
    /// Build an in-memory pack with no devices or components.
    pub fn new(id: PackId) -> Self {
        Self {
            id,
            description: String::new(),
            pdsc: PathBuf::new(),
            devices: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Add a single-core device, returning the pack for chaining.
    pub fn with_device(mut self, name: &str, core: &str) -> Self {
        self.devices.push(Device {
            vendor: self.id.vendor.clone(),
            name: name.to_string(),
            processor: None,
            multicore: false,
            core: Some(core.to_string()),
            family: String::new(),
            pack: self.id.clone(),
        });
        self
    }

    /// Add a component (`Class:Group[:Sub]`) at the pack version.
    pub fn with_component(mut self, class: &str, group: &str, sub: Option<&str>) -> Self {
        self.components.push(Component {
            vendor: self.id.vendor.clone(),
            class: class.to_string(),
            bundle: None,
            group: group.to_string(),
            sub: sub.map(str::to_string),
            variant: None,
            version: self.id.version.clone(),
            pack: self.id.clone(),
        });
        self
    }
}
