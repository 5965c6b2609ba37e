//! Pack description (`.pdsc`) parsing
//!
//! Only the parts needed for inventory queries and reference checks are read:
//! package identity, the device tree and the component list.

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{PackError, Result};
use crate::pack::{Component, Device, Pack, PackId};

/// Read and parse a `.pdsc` file.
///
/// `fallback_version` is used when the description has no `<releases>`,
/// which is the case for some locally developed packs.
pub fn read_pdsc(path: &Path, fallback_version: Option<&str>) -> Result<Pack> {
    let text = fs::read_to_string(path).map_err(|e| PackError::io(path, e))?;
    parse_pdsc(&text, path, fallback_version)
}

/// Parse `.pdsc` content. `path` is recorded on the pack and used in errors.
pub fn parse_pdsc(text: &str, path: &Path, fallback_version: Option<&str>) -> Result<Pack> {
    let doc = Document::parse(text).map_err(|source| PackError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    let package = doc.root_element();
    if !package.has_tag_name("package") {
        return Err(missing_element(path, "package"));
    }

    let vendor = child_text(package, "vendor").ok_or_else(|| missing_element(path, "vendor"))?;
    let name = child_text(package, "name").ok_or_else(|| missing_element(path, "name"))?;
    let version = child(package, "releases")
        .and_then(|releases| child(releases, "release"))
        .and_then(|release| release.attribute("version"))
        .or(fallback_version)
        .ok_or_else(|| missing_element(path, "releases"))?;

    let id = PackId::new(vendor, name, version.trim());
    let mut pack = Pack::new(id);
    pack.pdsc = path.to_path_buf();
    pack.description = child_text(package, "description")
        .unwrap_or_default()
        .to_string();

    if let Some(devices) = child(package, "devices") {
        for family in devices.children().filter(|n| n.has_tag_name("family")) {
            let vendor = family
                .attribute("Dvendor")
                .ok_or_else(|| missing_attribute(path, "family", "Dvendor"))?;
            let scope = DeviceScope {
                vendor: strip_vendor_code(vendor).to_string(),
                family: family.attribute("Dfamily").unwrap_or_default().to_string(),
                processors: Vec::new(),
            };
            collect_devices(family, scope, &pack.id, path, &mut pack.devices)?;
        }
    }

    if let Some(components) = child(package, "components") {
        collect_components(components, &pack.id, path, &mut pack.components)?;
    }

    Ok(pack)
}

#[derive(Debug, Clone)]
struct ProcessorScope {
    pname: Option<String>,
    core: Option<String>,
}

/// Attributes inherited from enclosing family/subFamily/device elements.
#[derive(Debug, Clone)]
struct DeviceScope {
    vendor: String,
    family: String,
    processors: Vec<ProcessorScope>,
}

impl DeviceScope {
    fn enter(&self, node: Node) -> Self {
        let mut scope = self.clone();
        if let Some(vendor) = node.attribute("Dvendor") {
            scope.vendor = strip_vendor_code(vendor).to_string();
        }
        for processor in node.children().filter(|n| n.has_tag_name("processor")) {
            let pname = processor.attribute("Pname").map(str::to_string);
            let core = processor.attribute("Dcore").map(str::to_string);
            match scope.processors.iter_mut().find(|p| p.pname == pname) {
                Some(existing) => {
                    if core.is_some() {
                        existing.core = core;
                    }
                }
                None => scope.processors.push(ProcessorScope { pname, core }),
            }
        }
        scope
    }

    fn emit(&self, name: &str, pack: &PackId, out: &mut Vec<Device>) {
        let multicore = self.processors.len() > 1;
        let device = |p: &ProcessorScope| Device {
            vendor: self.vendor.clone(),
            name: name.to_string(),
            processor: p.pname.clone(),
            multicore,
            core: p.core.clone(),
            family: self.family.clone(),
            pack: pack.clone(),
        };
        if self.processors.is_empty() {
            out.push(device(&ProcessorScope {
                pname: None,
                core: None,
            }));
        }
        out.extend(self.processors.iter().map(device));
    }
}

fn collect_devices(
    node: Node,
    parent: DeviceScope,
    pack: &PackId,
    path: &Path,
    out: &mut Vec<Device>,
) -> Result<()> {
    let scope = parent.enter(node);
    for item in node.children().filter(Node::is_element) {
        match item.tag_name().name() {
            "subFamily" => collect_devices(item, scope.clone(), pack, path, out)?,
            "device" => {
                let name = item
                    .attribute("Dname")
                    .ok_or_else(|| missing_attribute(path, "device", "Dname"))?;
                let device_scope = scope.enter(item);
                let variants: Vec<Node> = item
                    .children()
                    .filter(|n| n.has_tag_name("variant"))
                    .collect();
                if variants.is_empty() {
                    device_scope.emit(name, pack, out);
                }
                for variant in variants {
                    let variant_name = variant
                        .attribute("Dvariant")
                        .ok_or_else(|| missing_attribute(path, "variant", "Dvariant"))?;
                    device_scope.enter(variant).emit(variant_name, pack, out);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn collect_components(
    components: Node,
    pack: &PackId,
    path: &Path,
    out: &mut Vec<Component>,
) -> Result<()> {
    for item in components.children().filter(Node::is_element) {
        match item.tag_name().name() {
            "component" => out.push(read_component(item, None, pack, path)?),
            "bundle" => {
                for component in item.children().filter(|n| n.has_tag_name("component")) {
                    out.push(read_component(component, Some(item), pack, path)?);
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn read_component(node: Node, bundle: Option<Node>, pack: &PackId, path: &Path) -> Result<Component> {
    let inherited = |attr: &str| {
        node.attribute(attr)
            .or_else(|| bundle.and_then(|b| b.attribute(attr)))
    };
    let class = inherited("Cclass").ok_or_else(|| missing_attribute(path, "component", "Cclass"))?;
    let group = node
        .attribute("Cgroup")
        .ok_or_else(|| missing_attribute(path, "component", "Cgroup"))?;

    Ok(Component {
        vendor: inherited("Cvendor")
            .map(strip_vendor_code)
            .unwrap_or(pack.vendor.as_str())
            .to_string(),
        class: class.to_string(),
        bundle: bundle
            .and_then(|b| b.attribute("Cbundle"))
            .map(str::to_string),
        group: group.to_string(),
        sub: node.attribute("Csub").map(str::to_string),
        variant: node.attribute("Cvariant").map(str::to_string),
        version: inherited("Cversion")
            .unwrap_or(pack.version.as_str())
            .to_string(),
        pack: pack.clone(),
    })
}

/// `ARM:82` -> `ARM`
fn strip_vendor_code(vendor: &str) -> &str {
    vendor.split(':').next().unwrap_or(vendor)
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn missing_element(path: &Path, element: &str) -> PackError {
    PackError::MissingElement {
        path: path.to_path_buf(),
        element: element.to_string(),
    }
}

fn missing_attribute(path: &Path, element: &str, attribute: &str) -> PackError {
    PackError::MissingAttribute {
        path: path.to_path_buf(),
        element: element.to_string(),
        attribute: attribute.to_string(),
    }
}
