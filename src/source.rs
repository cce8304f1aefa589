//
//  source.rs
//  Anchor
//
//  Created by hak (tharun)
//

use std::sync::Arc;

/// One input file: an opaque identifier plus its raw text.
///
/// The text is shared so units can be cloned cheaply across worker threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    id: String,
    text: Arc<str>,
    package: Option<String>,
}

impl SourceUnit {
    pub fn new(id: impl Into<String>, text: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            package: None,
        }
    }

    /// Attach a package/namespace hint. Informational only.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }
}
