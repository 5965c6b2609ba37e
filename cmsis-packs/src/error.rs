use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while discovering or reading installed packs.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{}: <{element}> is missing required attribute '{attribute}'", path.display())]
    MissingAttribute {
        path: PathBuf,
        element: String,
        attribute: String,
    },

    #[error("{}: missing <{element}> element", path.display())]
    MissingElement { path: PathBuf, element: String },

    #[error("Invalid pack identifier '{0}'. Expected 'Vendor::Name[@Version]'")]
    InvalidPackId(String),
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PackError>;
