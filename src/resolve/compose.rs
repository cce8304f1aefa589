//
//  compose.rs
//  Anchor
//
//  Created by hak (tharun)
//

use super::annotation::ResolvedBinding;
use crate::table::RouteCandidate;

/// Join a class-level base with a method-level fragment and normalize.
pub fn compose_path(base: &str, fragment: &str) -> String {
    normalize_path(&format!("{base}/{fragment}"))
}

/// Normalize a route path.
///
/// Repeated slashes collapse, a trailing slash is dropped, and exactly one
/// leading slash is ensured; the empty path becomes `/`. A closed `{...}`
/// parameter is an opaque segment copied verbatim, except that slash runs
/// inside it still collapse. An unclosed `{` is plain text.
pub fn normalize_path(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' => match closing_brace(&chars, i) {
                Some(end) => {
                    for &c in &chars[i..=end] {
                        if !(c == '/' && current.ends_with('/')) {
                            current.push(c);
                        }
                    }
                    i = end;
                }
                None => current.push('{'),
            },
            '/' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
        i += 1;
    }
    if !current.is_empty() {
        segments.push(current);
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Index of the `}` matching the `{` at `open`, if the path closes it.
fn closing_brace(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &c) in chars.iter().enumerate().skip(open) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Cartesian product of class bases × method paths × method verbs.
///
/// `ANY` expands to the five concrete verbs here, so candidates only ever
/// carry concrete verbs.
pub fn compose(bases: &[String], binding: &ResolvedBinding, handler: &str) -> Vec<RouteCandidate> {
    let mut candidates = Vec::with_capacity(bases.len() * binding.paths.len() * binding.verbs.len());
    for base in bases {
        for fragment in &binding.paths {
            let path = compose_path(base, fragment);
            for verb in &binding.verbs {
                for concrete in verb.expand() {
                    candidates.push(RouteCandidate {
                        verb: *concrete,
                        path: path.clone(),
                        handler: handler.to_string(),
                        source: binding.source.clone(),
                    });
                }
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{SourceRef, Verb};

    #[test]
    fn test_compose_path() {
        assert_eq!(compose_path("/api", "/items"), "/api/items");
        assert_eq!(compose_path("", ""), "/");
        assert_eq!(compose_path("/api/", "items/"), "/api/items");
        assert_eq!(compose_path("api", ""), "/api");
        assert_eq!(compose_path("/", "/"), "/");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("//a///b//"), "/a/b");
        assert_eq!(normalize_path("/items/{id}"), "/items/{id}");
        assert_eq!(normalize_path("/files/{path:.+/x}"), "/files/{path:.+/x}");
        assert_eq!(normalize_path("/a/{b}/"), "/a/{b}");
        assert_eq!(normalize_path(""), "/");
    }

    fn is_normalized(path: &str) -> bool {
        path.starts_with('/') && !path.contains("//") && (path == "/" || !path.ends_with('/'))
    }

    #[test]
    fn test_normalize_path_unbalanced_braces() {
        assert_eq!(normalize_path("/a{///b/"), "/a{/b");
        assert_eq!(normalize_path("/a{/{id}//"), "/a{/{id}");
        assert_eq!(normalize_path("/a}//b"), "/a}/b");
        assert_eq!(normalize_path("/{p://x}/"), "/{p:/x}");
        assert_eq!(normalize_path("/{a{b}/c}"), "/{a{b}/c}");
    }

    #[test]
    fn test_composed_paths_stay_normalized() {
        let bases = ["", "/", "/a{", "//v1//", "/{p://x}", "/x}"];
        let fragments = ["", "/", "//b/", "{id}//", "/{", "c//{d//e}//"];
        for base in bases {
            for fragment in fragments {
                let path = compose_path(base, fragment);
                assert!(is_normalized(&path), "{base:?} + {fragment:?} gave {path:?}");
            }
        }
    }

    #[test]
    fn test_compose_product() {
        let binding = ResolvedBinding {
            verbs: vec![Verb::Get, Verb::Post],
            paths: vec!["/a".into(), "/b".into()],
            source: SourceRef::unit("C.java", 1),
        };
        let bases = vec!["/v1".to_string(), "/v2".to_string()];
        let candidates = compose(&bases, &binding, "C.m");
        assert_eq!(candidates.len(), 8);
        assert!(candidates.iter().all(|c| c.handler == "C.m"));
        assert!(candidates
            .iter()
            .any(|c| c.verb == Verb::Post && c.path == "/v2/b"));
    }

    #[test]
    fn test_any_expands() {
        let binding = ResolvedBinding {
            verbs: vec![Verb::Any],
            paths: vec!["/x".into()],
            source: SourceRef::unit("C.java", 1),
        };
        let candidates = compose(&[String::new()], &binding, "C.m");
        let mut verbs: Vec<_> = candidates.iter().map(|c| c.verb).collect();
        verbs.sort();
        assert_eq!(
            verbs,
            vec![Verb::Delete, Verb::Get, Verb::Patch, Verb::Post, Verb::Put]
        );
        assert!(candidates.iter().all(|c| c.path == "/x"));
    }
}
