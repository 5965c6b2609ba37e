//! List command implementation

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::OutputFormat;
use crate::manager::Manager;

/// What to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Packs,
    Devices,
    Components,
}

impl Subject {
    fn key(self) -> &'static str {
        match self {
            Subject::Packs => "packs",
            Subject::Devices => "devices",
            Subject::Components => "components",
        }
    }

    fn query(self, manager: &Manager, filter: &str, project: Option<&Path>) -> Result<Vec<String>> {
        let worker = manager.worker();
        Ok(match (self, project) {
            (Subject::Packs, _) => worker.list_packs(filter),
            (Subject::Devices, None) => worker.list_devices(filter),
            (Subject::Devices, Some(project)) => worker.list_project_devices(project, filter)?,
            (Subject::Components, None) => worker.list_components(filter),
            (Subject::Components, Some(project)) => {
                worker.list_project_components(project, filter)?
            }
        })
    }
}

/// Run the list command.
pub fn run(
    manager: &Manager,
    subject: Option<Subject>,
    filter: &str,
    project: Option<&Path>,
    format: OutputFormat,
) -> Result<i32> {
    print!("{}", render(manager, subject, filter, project, format)?);
    Ok(0)
}

/// Render the listing.
///
/// Without a subject, packs and devices are listed in sections with a
/// header each; empty sections are left out. With a subject only the
/// identifiers are printed. A project limits devices and components to
/// the packs it selects.
pub fn render(
    manager: &Manager,
    subject: Option<Subject>,
    filter: &str,
    project: Option<&Path>,
    format: OutputFormat,
) -> Result<String> {
    let subjects = match subject {
        Some(subject) => vec![subject],
        None => vec![Subject::Packs, Subject::Devices],
    };
    let results = subjects
        .into_iter()
        .map(|s| s.query(manager, filter, project).map(|items| (s, items)))
        .collect::<Result<Vec<(Subject, Vec<String>)>>>()?;

    let mut out = String::new();
    match format {
        OutputFormat::Json => {
            let mut value = json!({ "architecture": filter.trim() });
            for (subject, items) in &results {
                value[subject.key()] = json!(items);
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        OutputFormat::Text if subject.is_some() => {
            for (_, items) in &results {
                for item in items {
                    writeln!(out, "{}", item)?;
                }
            }
        }
        OutputFormat::Text => {
            for (subject, items) in &results {
                if items.is_empty() {
                    continue;
                }
                writeln!(out)?;
                writeln!(out, "{}", header(*subject, filter))?;
                for item in items {
                    writeln!(out, "{}", item)?;
                }
            }
        }
    }
    Ok(out)
}

fn header(subject: Subject, filter: &str) -> String {
    let filter = filter.trim();
    if filter.is_empty() {
        format!("Installed {}:", subject.key())
    } else {
        format!("Installed '{}' {}:", filter, subject.key())
    }
}
