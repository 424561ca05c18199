use serde::Deserialize;

use crate::app::{GazetteError, Result};

/// Author fields expanded inline from the `author` reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Author {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAuthor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "_ref", default)]
    reference: Option<String>,
}

impl WireAuthor {
    /// A bare `_ref` means the projection never asked for expansion.
    pub(crate) fn into_author(self, doc_id: &str) -> Result<Author> {
        if let Some(reference) = self.reference {
            return Err(GazetteError::Query(format!(
                "document {}: author reference {} was not expanded",
                doc_id, reference
            )));
        }
        Ok(Author {
            name: self.name,
            email: self.email,
        })
    }
}

impl Author {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }
}
