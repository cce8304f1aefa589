//
//  extract.rs
//  Anchor
//
//  Created by hak (tharun)
//

use rayon::prelude::*;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::parser::{parse_unit, AnnotationCatalog, ClassNode, MethodNode};
use crate::resolve::{compose, resolve_class_bases, resolve_method};
use crate::source::SourceUnit;
use crate::table::{RouteTable, RouteTableBuilder, UnitExtraction};

/// Runs the text → route table pipeline with a fixed configuration.
///
/// An `Extractor` holds no mutable state; one instance can serve any number
/// of concurrent extraction runs.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
    catalog: AnnotationCatalog,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        let catalog = AnnotationCatalog::from_config(&config);
        Self { config, catalog }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract routes from all units.
    ///
    /// Units are parsed and resolved in parallel; the merge is sequential
    /// and order-independent.
    pub fn extract(&self, units: &[SourceUnit]) -> RouteTable {
        let extractions: Vec<UnitExtraction> = units
            .par_iter()
            .map(|unit| self.extract_unit(unit))
            .collect();

        let mut builder = RouteTableBuilder::new();
        for extraction in extractions {
            builder.add_unit(extraction);
        }
        builder.build()
    }

    /// Parse and resolve a single unit without merging.
    pub fn extract_unit(&self, unit: &SourceUnit) -> UnitExtraction {
        let parsed = parse_unit(unit, &self.catalog);
        let mut extraction = UnitExtraction {
            unit: unit.id().to_string(),
            package: parsed.package,
            candidates: Vec::new(),
            diagnostics: parsed.diagnostics,
        };

        for class in &parsed.classes {
            if !self.accepts(class) {
                debug!(unit = unit.id(), class = %class.qualified_name, "skipping class without stereotype");
                continue;
            }
            self.extract_class(unit.id(), class, &mut extraction);
        }
        extraction
    }

    fn accepts(&self, class: &ClassNode) -> bool {
        !self.config.controller.require_stereotype || class.is_controller()
    }

    fn extract_class(&self, unit_id: &str, class: &ClassNode, out: &mut UnitExtraction) {
        let (bases, class_diagnostics) = resolve_class_bases(unit_id, class);
        out.diagnostics.extend(class_diagnostics);

        for method in &class.methods {
            let (bindings, method_diagnostics) = resolve_method(unit_id, class, method);
            out.diagnostics.extend(method_diagnostics);

            let handler = handler_ref(out.package.as_deref(), class, method);
            for binding in &bindings {
                out.candidates.extend(compose(&bases, binding, &handler));
            }
        }
    }
}

/// `package.Outer.Inner.method`, with the parameter types appended when the
/// method name is overloaded in its class.
fn handler_ref(package: Option<&str>, class: &ClassNode, method: &MethodNode) -> String {
    let mut handler = match package {
        Some(package) => format!("{package}.{}.{}", class.qualified_name, method.name),
        None => format!("{}.{}", class.qualified_name, method.name),
    };
    if class.is_overloaded(&method.name) {
        handler.push('(');
        handler.push_str(&method.params.join(","));
        handler.push(')');
    }
    handler
}

/// Extract with the default configuration.
pub fn extract(units: &[SourceUnit]) -> RouteTable {
    Extractor::default().extract(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Severity, Verb};

    const SAMPLE: &str = r#"
package fixtures.api;

import org.springframework.web.bind.annotation.*;

@RestController
@RequestMapping("/api")
public class SampleSpringController {

    @GetMapping("/status")
    public String status() {
        return "ok";
    }

    @PostMapping(path = "/items")
    public String createItem() {
        return "created";
    }

    @RequestMapping(value = {"/fallback", "/legacy"}, method = RequestMethod.PUT)
    public String fallback() {
        return "fallback";
    }

    @PatchMapping(path = "/items/{id}")
    public String updateItem() {
        return "updated";
    }
}
"#;

    fn unit(id: &str, text: &str) -> SourceUnit {
        SourceUnit::new(id, text)
    }

    fn signatures(table: &RouteTable) -> Vec<String> {
        table.routes().iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_sample_controller() {
        let table = extract(&[unit("SampleSpringController.java", SAMPLE)]);
        assert!(table.diagnostics().is_empty());
        assert_eq!(
            signatures(&table),
            vec![
                "PUT /api/fallback -> fixtures.api.SampleSpringController.fallback",
                "POST /api/items -> fixtures.api.SampleSpringController.createItem",
                "PATCH /api/items/{id} -> fixtures.api.SampleSpringController.updateItem",
                "PUT /api/legacy -> fixtures.api.SampleSpringController.fallback",
                "GET /api/status -> fixtures.api.SampleSpringController.status",
            ]
        );
        assert_eq!(
            table
                .routes_for("fixtures.api.SampleSpringController.fallback")
                .count(),
            2
        );

        let (routes, diagnostics) = table.into_parts();
        assert_eq!(routes.len(), 5);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_no_annotations_yields_nothing() {
        let table = extract(&[unit(
            "Plain.java",
            "public class Plain { private int n; public int next() { return ++n; } }",
        )]);
        assert!(table.is_empty());
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let units = vec![
            unit("A.java", SAMPLE),
            unit("B.java", "class B { @RequestMapping(\"/b\") void any() {} }"),
        ];
        let first = extract(&units);
        let second = extract(&units);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let reversed: Vec<_> = units.iter().rev().cloned().collect();
        assert_eq!(extract(&reversed), first);
    }

    #[test]
    fn test_root_path() {
        let table = extract(&[unit("R.java", "class R { @GetMapping void root() {} }")]);
        assert_eq!(signatures(&table), vec!["GET / -> R.root"]);
    }

    #[test]
    fn test_multi_path_alias() {
        let table = extract(&[unit(
            "F.java",
            r#"class F {
                @RequestMapping(value = {"/fallback", "/legacy"}, method = RequestMethod.PUT)
                void fallback() {}
            }"#,
        )]);
        assert_eq!(
            signatures(&table),
            vec!["PUT /fallback -> F.fallback", "PUT /legacy -> F.fallback"]
        );
    }

    #[test]
    fn test_wildcard_expansion() {
        let table = extract(&[unit("W.java", "class W { @RequestMapping(\"/w\") void w() {} }")]);
        assert_eq!(table.len(), 5);
        let mut verbs: Vec<Verb> = table.routes().iter().map(|r| r.verb).collect();
        verbs.dedup();
        assert_eq!(verbs.len(), 5);
        assert!(table.routes().iter().all(|r| r.path == "/w" && r.handler == "W.w"));
    }

    #[test]
    fn test_conflict_in_one_class() {
        let table = extract(&[unit(
            "S.java",
            r#"
@RestController
class S {
    @GetMapping("/status") String a() { return "a"; }
    @GetMapping("/status") String b() { return "b"; }
}
"#,
        )]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.diagnostics().len(), 1);
        assert_eq!(table.diagnostics()[0].severity, Severity::Error);
        assert!(table.diagnostics()[0].message.contains("GET /status"));
    }

    #[test]
    fn test_malformed_argument_does_not_abort() {
        let table = extract(&[unit(
            "M.java",
            r#"
class M {
    @GetMapping(value = "/ok") void ok() {}
    @GetMapping(method = RequestMethod.GET) void bad() {}
    @PostMapping(Paths.BASE + "/x") void unresolved() {}
}

class N {
    @DeleteMapping("/n") void n() {}
}
"#,
        )]);
        assert_eq!(
            signatures(&table),
            vec!["DELETE /n -> N.n", "GET /ok -> M.ok"]
        );
        let errors: Vec<_> = table.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|d| d.source_ref.ends_with("M.bad")));
        assert!(errors.iter().any(|d| d.source_ref.ends_with("M.unresolved")));
    }

    #[test]
    fn test_class_bases_multiply() {
        let table = extract(&[unit(
            "V.java",
            r#"
@RequestMapping({"/v1", "/v2/"})
class V {
    @GetMapping({"", "/list"}) void list() {}
}
"#,
        )]);
        assert_eq!(
            signatures(&table),
            vec![
                "GET /v1 -> V.list",
                "GET /v1/list -> V.list",
                "GET /v2 -> V.list",
                "GET /v2/list -> V.list",
            ]
        );
    }

    #[test]
    fn test_several_mappings_on_one_method() {
        let table = extract(&[unit(
            "X.java",
            r#"class X {
                @GetMapping("/x")
                @PostMapping("/x/new")
                void x() {}
            }"#,
        )]);
        assert_eq!(signatures(&table), vec!["GET /x -> X.x", "POST /x/new -> X.x"]);
    }

    #[test]
    fn test_required_stereotype() {
        let mut config = ExtractConfig::default();
        config.controller.require_stereotype = true;
        let extractor = Extractor::new(config);
        let table = extractor.extract(&[unit(
            "C.java",
            r#"
@RestController class Api { @GetMapping("/a") void a() {} }
class Helper { @GetMapping("/h") void h() {} }
"#,
        )]);
        assert_eq!(signatures(&table), vec!["GET /a -> Api.a"]);
    }

    #[test]
    fn test_unrecognized_annotation_warns() {
        let table = extract(&[unit(
            "U.java",
            "class U {\n @GetMapping(\"/u\n void u() {}\n @GetMapping(\"/v\") void v() {}\n}",
        )]);
        assert_eq!(signatures(&table), vec!["GET /v -> U.v"]);
        assert_eq!(table.diagnostics().len(), 1);
        assert_eq!(table.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_unclosed_brace_in_base_path() {
        let table = extract(&[unit(
            "P.java",
            r#"@RequestMapping("/a{") class P { @GetMapping("//b/") void m() {} }"#,
        )]);
        assert_eq!(signatures(&table), vec!["GET /a{/b -> P.m"]);
    }

    #[test]
    fn test_same_class_name_in_two_packages() {
        let source = |package: &str| {
            format!("package {package};\nclass Ctl {{ @GetMapping(\"/x\") void get() {{}} }}")
        };
        let table = extract(&[
            unit("com/b/Ctl.java", &source("com.b")),
            unit("com/a/Ctl.java", &source("com.a")),
        ]);
        assert_eq!(
            signatures(&table),
            vec!["GET /x -> com.a.Ctl.get", "GET /x -> com.b.Ctl.get"]
        );
        let errors: Vec<_> = table.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message,
            "conflicting handlers for GET /x: com.a.Ctl.get, com.b.Ctl.get"
        );
    }

    #[test]
    fn test_overloads_on_one_path_conflict() {
        let table = extract(&[unit(
            "O.java",
            r#"
class O {
    @GetMapping("/x") String get() { return "all"; }
    @GetMapping("/x") String get(@RequestParam("n") final int n) { return "one"; }
    @GetMapping("/y") String other(List<Map<String, Long>> xs, String... rest) { return ""; }
}
"#,
        )]);
        assert_eq!(
            signatures(&table),
            vec!["GET /x -> O.get()", "GET /x -> O.get(int)", "GET /y -> O.other"]
        );
        let errors: Vec<_> = table.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("O.get(), O.get(int)"));
    }

    #[test]
    fn test_same_class_declared_twice_is_reported() {
        let source = "class Ctl { @GetMapping(\"/x\") void get() {} }";
        let table = extract(&[unit("a/Ctl.java", source), unit("b/Ctl.java", source)]);
        assert_eq!(signatures(&table), vec!["GET /x -> Ctl.get"]);
        let errors: Vec<_> = table.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("a/Ctl.java, b/Ctl.java"));
    }

    #[test]
    fn test_nested_class_handler_is_qualified() {
        let table = extract(&[unit(
            "N.java",
            r#"class Outer { class Api { @GetMapping("/n") void n() {} } }"#,
        )]);
        assert_eq!(signatures(&table), vec!["GET /n -> Outer.Api.n"]);
    }

    #[test]
    fn test_unit_extraction_records_package() {
        let extractor = Extractor::default();
        let declared = extractor.extract_unit(&unit("A.java", SAMPLE));
        assert_eq!(declared.package.as_deref(), Some("fixtures.api"));

        let hinted = extractor.extract_unit(&unit("B.java", "class B {}").with_package("com.hint"));
        assert_eq!(hinted.package.as_deref(), Some("com.hint"));
    }
}
