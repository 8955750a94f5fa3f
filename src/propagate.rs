//! Flag propagation along the dependency graph.
//!
//! For a unit X:
//!
//! - compiler flags = own `compile with` and `compile related with` flags,
//!   plus `compile related with` of every direct dependency, plus
//!   `compile all with` of every unit in X's link set;
//! - linker flags = `link with` of every unit in X's link set.
//!
//! Related flags travel one edge; closure flags travel the whole link set.

use crate::flags::FlagBuckets;
use crate::graph::DependencyGraph;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Merged, duplicate-free flags of one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitFlags {
    pub compiler: Vec<String>,
    pub linker: Vec<String>,
}

/// Collects tokens, keeping the first occurrence of each.
#[derive(Default)]
struct FlagSet {
    seen: HashSet<String>,
    tokens: Vec<String>,
}

impl FlagSet {
    fn extend<'a>(&mut self, tokens: impl IntoIterator<Item = &'a String>) {
        for token in tokens {
            if self.seen.insert(token.clone()) {
                self.tokens.push(token.clone());
            }
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

fn bucket_of<'a>(
    buckets: &'a BTreeMap<String, FlagBuckets>,
    empty: &'a FlagBuckets,
    unit: &str,
) -> &'a FlagBuckets {
    buckets.get(unit).unwrap_or(empty)
}

/// Compute merged flags for every unit in `graph`.
///
/// Units missing from `buckets` contribute nothing.
pub fn propagate(
    buckets: &BTreeMap<String, FlagBuckets>,
    graph: &DependencyGraph,
) -> BTreeMap<String, UnitFlags> {
    let empty = FlagBuckets::default();

    graph
        .units()
        .map(|unit| {
            let own = bucket_of(buckets, &empty, unit);
            let mut compiler = FlagSet::default();
            let mut linker = FlagSet::default();

            compiler.extend(&own.compile_self);
            compiler.extend(&own.compile_related);
            for dep in graph.direct(unit) {
                compiler.extend(&bucket_of(buckets, &empty, dep).compile_related);
            }
            if let Some(closure) = graph.link_set(unit) {
                for member in closure {
                    let b = bucket_of(buckets, &empty, member);
                    compiler.extend(&b.compile_all);
                    linker.extend(&b.link_all);
                }
            }

            (
                unit.clone(),
                UnitFlags {
                    compiler: compiler.into_vec(),
                    linker: linker.into_vec(),
                },
            )
        })
        .collect()
}
