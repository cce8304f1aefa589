//
//  config.rs
//  Anchor
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, RouteError};

/// Top-level extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Simple annotation names recognized as mapping annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_get")]
    pub get: Vec<String>,
    #[serde(default = "default_post")]
    pub post: Vec<String>,
    #[serde(default = "default_put")]
    pub put: Vec<String>,
    #[serde(default = "default_patch")]
    pub patch: Vec<String>,
    #[serde(default = "default_delete")]
    pub delete: Vec<String>,
    /// Generic mappings taking an optional verb list.
    #[serde(default = "default_generic")]
    pub generic: Vec<String>,
}

/// Controller stereotype settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Only classes carrying a stereotype contribute routes.
    #[serde(default)]
    pub require_stereotype: bool,
    #[serde(default = "default_stereotypes")]
    pub stereotypes: Vec<String>,
}

fn default_get() -> Vec<String> {
    vec!["GetMapping".to_string()]
}

fn default_post() -> Vec<String> {
    vec!["PostMapping".to_string()]
}

fn default_put() -> Vec<String> {
    vec!["PutMapping".to_string()]
}

fn default_patch() -> Vec<String> {
    vec!["PatchMapping".to_string()]
}

fn default_delete() -> Vec<String> {
    vec!["DeleteMapping".to_string()]
}

fn default_generic() -> Vec<String> {
    vec!["RequestMapping".to_string()]
}

fn default_stereotypes() -> Vec<String> {
    vec!["RestController".to_string(), "Controller".to_string()]
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            get: default_get(),
            post: default_post(),
            put: default_put(),
            patch: default_patch(),
            delete: default_delete(),
            generic: default_generic(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            require_stereotype: false,
            stereotypes: default_stereotypes(),
        }
    }
}

impl ExtractConfig {
    /// Load config from a TOML file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty names and names claimed by more than one list.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let lists = [
            ("mapping.get", &self.mapping.get),
            ("mapping.post", &self.mapping.post),
            ("mapping.put", &self.mapping.put),
            ("mapping.patch", &self.mapping.patch),
            ("mapping.delete", &self.mapping.delete),
            ("mapping.generic", &self.mapping.generic),
            ("controller.stereotypes", &self.controller.stereotypes),
        ];
        for (field, names) in lists {
            for name in names {
                if name.trim().is_empty() {
                    return Err(RouteError::InvalidConfig(format!(
                        "empty annotation name in {field}"
                    )));
                }
                if !seen.insert(name.as_str()) {
                    return Err(RouteError::InvalidConfig(format!(
                        "annotation `{name}` is listed more than once ({field})"
                    )));
                }
            }
        }
        Ok(())
    }
}
