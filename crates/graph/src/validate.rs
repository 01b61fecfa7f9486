use crate::types::{AbstractionKind, ClassifiedGraph, Severity, ValidationError, ValidationKind};
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::BTreeSet;

/// Result of the read-only structural validation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub has_cycles: bool,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// `true` when any entry has error severity
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Error)
    }

    pub fn of_kind(&self, kind: ValidationKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    fn push(&mut self, kind: ValidationKind, severity: Severity, message: String, ids: Vec<String>) {
        self.errors.push(ValidationError {
            kind,
            severity,
            message,
            node_ids: ids,
        });
    }
}

/// Check structural invariants of a built graph.
///
/// `duplicates` lists element ids the builder saw more than once; the graph
/// itself only keeps the last definition so they cannot be recovered from it.
pub fn validate(graph: &ClassifiedGraph, duplicates: &[String]) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_cycles(graph, &mut report);
    check_references(graph, &mut report);

    let distinct: BTreeSet<&String> = duplicates.iter().collect();
    for id in distinct {
        report.push(
            ValidationKind::DuplicateId,
            Severity::Warning,
            format!("duplicate element id '{id}'"),
            vec![id.clone()],
        );
    }

    for node in graph.nodes() {
        if node.kind == AbstractionKind::Component && node.parent_container_id.is_none() {
            log::warn!("Component '{}' has no parent container", node.id);
            report.push(
                ValidationKind::OrphanComponent,
                Severity::Warning,
                format!("component '{}' has no parent container", node.id),
                vec![node.id.clone()],
            );
        }
    }

    log::debug!(
        "Validation finished: {} entries, cycles: {}",
        report.errors.len(),
        report.has_cycles
    );
    report
}

/// One entry per strongly connected group of the child -> parent graph.
/// Self-parenting nodes count as a cycle of one.
fn check_cycles(graph: &ClassifiedGraph, report: &mut ValidationReport) {
    let mut parents: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (child, parent) in &graph.hierarchy().parent_child_map {
        parents.add_edge(child.as_str(), parent.as_str(), ());
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&parents)
        .into_iter()
        .filter(|scc| scc.len() > 1 || parents.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut ids: Vec<String> = scc.into_iter().map(str::to_string).collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();

    for ids in cycles {
        log::warn!("Containment cycle detected: {}", ids.join(" -> "));
        report.has_cycles = true;
        report.push(
            ValidationKind::Cycle,
            Severity::Error,
            format!("containment cycle between {}", ids.join(", ")),
            ids,
        );
    }
}

fn check_references(graph: &ClassifiedGraph, report: &mut ValidationReport) {
    for edge in graph.edges() {
        let missing: Vec<String> = [&edge.source, &edge.target]
            .into_iter()
            .filter(|id| !graph.contains_node(id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            report.push(
                ValidationKind::MissingReference,
                Severity::Error,
                format!("edge '{}' references missing node(s) {}", edge.id, missing.join(", ")),
                missing,
            );
        }
    }

    let mut dangling: Vec<(&String, &String)> = graph
        .hierarchy()
        .parent_child_map
        .iter()
        .filter(|(child, parent)| !graph.contains_node(child) || !graph.contains_node(parent))
        .collect();
    dangling.sort();
    for (child, parent) in dangling {
        report.push(
            ValidationKind::MissingReference,
            Severity::Error,
            format!("containment '{child}' -> '{parent}' references a missing node"),
            vec![child.clone(), parent.clone()],
        );
    }
}
