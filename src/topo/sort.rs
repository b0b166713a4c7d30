//! Deterministic topological ordering over parsed statements.
//!
//! A manual Kahn's-algorithm pass, the same shape as the producer/consumer
//! scheduling the teacher's `schema_loader::topological_sort` does for whole
//! files, generalized to statement-level `provides`/`requires` edges and a
//! richer tie-break key (phase, then pg_dump-style class priority, then
//! original source order) so the output is identical across runs on
//! identical input.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use crate::engine_error::DiagnosticWarning;
use crate::topo::ir::{ObjectRef, Phase, StatementClass, StatementNode};
use crate::topo::{AnalyzeResult, GraphEdge, GraphReport};

type TieBreakKey = (Phase, u8, String, usize, usize);

pub fn topo_sort(nodes: Vec<StatementNode>, diagnostics: &mut Vec<DiagnosticWarning>) -> AnalyzeResult {
    let n = nodes.len();

    let mut providers: BTreeMap<ObjectRef, Vec<usize>> = BTreeMap::new();
    for (i, node) in nodes.iter().enumerate() {
        for p in &node.provides {
            providers.entry(p.clone()).or_default().push(i);
        }
    }

    // A `file:` ref is deliberately provided by every statement in that
    // source (it backs the legacy whole-file `depends_on` sugar), so having
    // many providers for it is expected, not a conflict. Any other kind
    // with more than one producer is a genuine naming collision.
    for (object_ref, idxs) in &providers {
        if !object_ref.0.starts_with("file:") && idxs.len() > 1 {
            diagnostics.push(DiagnosticWarning::DuplicateProducer {
                reference: object_ref.0.clone(),
                statement_indices: idxs.clone(),
            });
        }
    }

    let mut edges: Vec<(usize, usize)> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        for req in &node.requires {
            match providers.get(req) {
                Some(idxs) => {
                    for &p in idxs {
                        if p != i {
                            edges.push((p, i));
                        }
                    }
                }
                None => {
                    diagnostics.push(DiagnosticWarning::UnresolvedDependency {
                        statement_index: i,
                        reference: req.0.clone(),
                    });
                }
            }
        }
    }
    edges.sort_unstable();
    edges.dedup();

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree: Vec<usize> = vec![0; n];
    for &(before, after) in &edges {
        adjacency[before].push(after);
        indegree[after] += 1;
    }

    let key = |i: usize| -> TieBreakKey {
        let node = &nodes[i];
        (
            node.phase,
            node.class.priority(),
            node.id.source_label.clone(),
            node.id.statement_index,
            i,
        )
    };

    let all_indices: Vec<usize> = (0..n).collect();
    let mut order = run_kahn_subset(&all_indices, &adjacency, indegree, &key);

    if order.len() < n {
        let visited: BTreeSet<usize> = order.iter().cloned().collect();
        let remaining: Vec<usize> = (0..n).filter(|i| !visited.contains(i)).collect();

        // Retry the remaining subgraph once, dropping any edge whose
        // target is an `AddConstraint` statement — a deferred ALTER TABLE
        // ... ADD CONSTRAINT is the one class of statement that is always
        // safe to apply after everything else, so breaking a cycle there
        // first is the least surprising choice.
        let remaining_set: BTreeSet<usize> = remaining.iter().cloned().collect();
        let mut indegree2 = vec![0usize; n];
        let mut adjacency2: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(before, after) in &edges {
            if !remaining_set.contains(&before) || !remaining_set.contains(&after) {
                continue;
            }
            if matches!(nodes[after].class, StatementClass::AddConstraint) {
                continue;
            }
            adjacency2[before].push(after);
            indegree2[after] += 1;
        }

        let recovered = run_kahn_subset(&remaining, &adjacency2, indegree2, &key);
        let recovered_set: BTreeSet<usize> = recovered.iter().cloned().collect();

        let still_stuck: Vec<usize> = remaining
            .iter()
            .cloned()
            .filter(|i| !recovered_set.contains(i))
            .collect();

        order.extend(recovered);

        if !still_stuck.is_empty() {
            diagnostics.push(DiagnosticWarning::CycleDetected {
                statement_indices: still_stuck.clone(),
            });
            // Best effort: still emit every statement so the caller gets a
            // complete (if not fully validated) order, deterministic by the
            // same tie-break key used elsewhere.
            let mut rest = still_stuck;
            rest.sort_by_key(|&i| key(i));
            order.extend(rest);
        }
    }

    let graph = GraphReport {
        edges: edges
            .iter()
            .map(|&(before, after)| GraphEdge {
                before: nodes[before].id.clone(),
                after: nodes[after].id.clone(),
            })
            .collect(),
    };

    let mut slots: Vec<Option<StatementNode>> = nodes.into_iter().map(Some).collect();
    let ordered = order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    AnalyzeResult {
        ordered,
        diagnostics: diagnostics.clone(),
        graph,
    }
}

fn run_kahn_subset(
    subset: &[usize],
    adjacency: &[Vec<usize>],
    mut indegree: Vec<usize>,
    key: &impl Fn(usize) -> TieBreakKey,
) -> Vec<usize> {
    let subset_set: BTreeSet<usize> = subset.iter().cloned().collect();
    let mut heap: BinaryHeap<Reverse<TieBreakKey>> = BinaryHeap::new();
    for &i in subset {
        if indegree[i] == 0 {
            heap.push(Reverse(key(i)));
        }
    }

    let mut visited = vec![false; indegree.len()];
    let mut order = Vec::with_capacity(subset.len());

    while let Some(Reverse(k)) = heap.pop() {
        let i = k.4;
        if visited[i] {
            continue;
        }
        visited[i] = true;
        order.push(i);
        for &next in &adjacency[i] {
            if !subset_set.contains(&next) {
                continue;
            }
            indegree[next] -= 1;
            if indegree[next] == 0 {
                heap.push(Reverse(key(next)));
            }
        }
    }

    order
}
