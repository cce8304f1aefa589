//
//  mod.rs
//  Anchor
//
//  Created by hak (tharun)
//

pub mod ast;
pub mod lexer;
pub mod structure;

use std::collections::HashMap;

pub use ast::{
    AnnotationKind, AnnotationUse, ArgValue, Argument, ClassNode, MethodNode, ParsedUnit,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use structure::parse_unit;

use crate::config::ExtractConfig;
use crate::table::Verb;

/// Maps simple annotation names to their meaning for route extraction.
#[derive(Debug, Clone)]
pub struct AnnotationCatalog {
    kinds: HashMap<String, AnnotationKind>,
}

impl AnnotationCatalog {
    pub fn from_config(config: &ExtractConfig) -> Self {
        let mapping = &config.mapping;
        let verb_lists = [
            (Verb::Get, &mapping.get),
            (Verb::Post, &mapping.post),
            (Verb::Put, &mapping.put),
            (Verb::Patch, &mapping.patch),
            (Verb::Delete, &mapping.delete),
        ];

        let mut kinds = HashMap::new();
        for (verb, names) in verb_lists {
            for name in names {
                kinds.insert(name.clone(), AnnotationKind::Mapping(verb));
            }
        }
        for name in &mapping.generic {
            kinds.insert(name.clone(), AnnotationKind::GenericMapping);
        }
        for name in &config.controller.stereotypes {
            kinds.insert(name.clone(), AnnotationKind::Stereotype);
        }
        Self { kinds }
    }

    /// Classify by the last segment of a possibly qualified name.
    pub fn classify(&self, name: &str) -> AnnotationKind {
        self.kinds
            .get(ast::simple_name(name))
            .copied()
            .unwrap_or(AnnotationKind::Other)
    }
}

impl Default for AnnotationCatalog {
    fn default() -> Self {
        Self::from_config(&ExtractConfig::default())
    }
}
