//
//  error.rs
//  Anchor
//
//  Created by hak (tharun)
//

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the layers around route extraction.
///
/// Extraction itself never fails: malformed input ends up as a
/// [`Diagnostic`](crate::table::Diagnostic) in the route table. These
/// errors come from loading configuration, scanning source trees and
/// rendering output.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read source file {0}: {1}")]
    SourceRead(PathBuf, std::io::Error),

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RouteError>;
