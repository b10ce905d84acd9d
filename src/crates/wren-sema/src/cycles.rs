// cycles.rs
//
// Rejects struct instances that contain themselves by value. Pointer,
// reference and slice fields break a cycle; native instances are opaque.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{SemanticError, TypeError};
use crate::type_kind::{StructIns, TypeKind};

/// `instances` must be sorted by key; cycles are reported once each, at the
/// declaration of their first member.
pub fn check_value_cycles(instances: &[Arc<StructIns>]) -> Vec<TypeError> {
    let index: FxHashMap<&str, usize> = instances
        .iter()
        .enumerate()
        .map(|(i, ins)| (ins.key.as_str(), i))
        .collect();

    let edges: Vec<Vec<usize>> = instances
        .iter()
        .map(|ins| {
            if ins.is_native() {
                return Vec::new();
            }
            let mut out = Vec::new();
            for field in ins.fields() {
                if let TypeKind::Struct(target) = &field.kind
                    && let Some(&i) = index.get(target.key.as_str())
                    && !out.contains(&i)
                {
                    out.push(i);
                }
            }
            out
        })
        .collect();

    let mut state = vec![0u8; instances.len()]; // 0 new, 1 on stack, 2 done
    let mut stack = Vec::new();
    let mut cycles = Vec::new();
    for node in 0..instances.len() {
        if state[node] == 0 {
            visit(node, &edges, &mut state, &mut stack, &mut cycles);
        }
    }

    let mut seen: FxHashSet<Vec<usize>> = FxHashSet::default();
    let mut errors = Vec::new();
    for mut cycle in cycles {
        let Some(lead) = cycle.iter().enumerate().min_by_key(|(_, n)| **n).map(|(i, _)| i) else {
            continue;
        };
        cycle.rotate_left(lead);
        let mut members = cycle.clone();
        members.sort_unstable();
        if !seen.insert(members) {
            continue;
        }

        let first = &instances[cycle[0]];
        let mut path: Vec<&str> = cycle.iter().map(|&n| instances[n].key.as_str()).collect();
        path.push(first.key.as_str());
        tracing::debug!(key = %first.key, "value cycle");
        errors.push(TypeError::new(
            SemanticError::IllegalCycle {
                name: first.key.clone(),
                path: path.join(" -> "),
                span: first.decl.span.into(),
            },
            first.decl.span,
            first.decl.file,
        ));
    }
    errors
}

fn visit(node: usize, edges: &[Vec<usize>], state: &mut [u8], stack: &mut Vec<usize>, cycles: &mut Vec<Vec<usize>>) {
    state[node] = 1;
    stack.push(node);
    for &next in &edges[node] {
        match state[next] {
            0 => visit(next, edges, state, stack, cycles),
            1 => {
                if let Some(pos) = stack.iter().position(|&n| n == next) {
                    cycles.push(stack[pos..].to_vec());
                }
            }
            _ => {}
        }
    }
    stack.pop();
    state[node] = 2;
}
