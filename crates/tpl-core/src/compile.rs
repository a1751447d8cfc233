//! The semantic pipeline driver (spec.md §7 "Compilation pipeline"): runs
//! name resolution, type checking, and conformance over a set of
//! compilation units, aggregating diagnostics under a best-effort policy —
//! a failure in one pass doesn't stop the next pass from running over
//! whatever AST survived, but codegen (an external collaborator here, see
//! tpl-dom/tpl-runtime) must not proceed if any pass reported an error.

use crate::ast::CompilationUnit;
use crate::conformance::{check_conformance, RuleSet};
use crate::resolve::{resolve_unit, TemplateRegistry, VarBindings};
use crate::typecheck::{detect_data_all_cycles, TypeAnnotations, TypeChecker};
use crate::types::ProtoRegistry;
use std::collections::HashSet;
use tpl_shared::{Diagnostic, DiagnosticReporter};

/// Per-unit results of the semantic passes, keyed by position in the input
/// slice passed to [`check_units`].
pub struct UnitAnalysis {
    pub vars: VarBindings,
    pub types: TypeAnnotations,
}

/// Everything the semantic pipeline produced: per-unit analyses, the
/// whole-program template registry, and the aggregated diagnostics.
pub struct SemanticResult {
    pub registry: TemplateRegistry,
    pub units: Vec<UnitAnalysis>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SemanticResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == tpl_shared::Severity::Error)
    }
}

/// Runs resolve -> typecheck -> conformance over every unit in `units`.
/// `protos` supplies field types for proto-typed expressions; `conformance`
/// is the rule set to lint against, or `None` to skip conformance checking.
/// `allow_duplicate_templates` is the escape hatch for intentionally
/// shadowed fully-qualified names (spec.md §9 open question (a)).
pub fn check_units(
    units: &[CompilationUnit],
    protos: &ProtoRegistry,
    conformance: Option<&RuleSet>,
    allow_duplicate_templates: &HashSet<String>,
) -> SemanticResult {
    log::debug!("resolving template registry for {} unit(s)", units.len());
    let mut reporter = DiagnosticReporter::new();
    let registry = TemplateRegistry::build(units, allow_duplicate_templates, &mut reporter);

    let mut analyses = Vec::with_capacity(units.len());
    for unit in units {
        log::trace!(
            "name resolution + type checking: {:?}",
            unit.file.as_ref().map(ToString::to_string)
        );
        let vars = resolve_unit(unit, &registry, &mut reporter);
        let types = TypeChecker::new(&registry, &vars, protos, &mut reporter).check_unit(unit);
        analyses.push(UnitAnalysis { vars, types });
    }

    detect_data_all_cycles(units, &registry, &mut reporter);

    if let Some(rules) = conformance {
        log::debug!("running conformance checks over {} unit(s)", units.len());
        for unit in units {
            check_conformance(unit, rules, &mut reporter);
        }
    }

    SemanticResult {
        registry,
        units: analyses,
        diagnostics: reporter.into_diagnostics(),
    }
}
