use crate::graph::{Capacity, CapacityGraph, NodeIndex};
use log::{debug, trace};
use std::collections::VecDeque;

/// Net flow per ordered node pair. Always antisymmetric: `flow[u][v] == -flow[v][u]`.
pub type FlowMatrix = Vec<Vec<Capacity>>;

/// Outcome of a max-flow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowResult {
    pub total_flow: Capacity,
    pub flow: FlowMatrix,
}

impl FlowResult {
    fn empty(n: usize) -> Self {
        Self {
            total_flow: 0,
            flow: vec![vec![0; n]; n],
        }
    }
}

/// Computes a maximum flow from `source` to `sink` with Edmonds–Karp.
///
/// Augments along shortest (fewest-edge) paths found by breadth-first search
/// over a private residual copy of `graph`; `graph` itself is left untouched.
/// `source == sink` (or either endpoint out of range) yields zero flow.
pub fn max_flow(graph: &CapacityGraph, source: NodeIndex, sink: NodeIndex) -> FlowResult {
    let n = graph.num_nodes();
    let mut result = FlowResult::empty(n);
    if source == sink || source >= n || sink >= n {
        return result;
    }

    let mut residual = graph.clone();
    let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
    let mut augmentations = 0usize;

    while find_augmenting_path(&residual, source, sink, &mut parent) {
        let mut path_flow = Capacity::MAX;
        let mut v = sink;
        while let Some(u) = parent[v] {
            path_flow = path_flow.min(residual.edge(u, v));
            v = u;
        }

        let mut v = sink;
        while let Some(u) = parent[v] {
            result.flow[u][v] += path_flow;
            result.flow[v][u] -= path_flow;
            residual.set_edge(u, v, residual.edge(u, v) - path_flow);
            residual.set_edge(v, u, residual.edge(v, u) + path_flow);
            v = u;
        }

        result.total_flow += path_flow;
        augmentations += 1;
        trace!("augmentation {augmentations}: pushed {path_flow}");
    }

    debug!(
        "max flow {} -> {} = {} after {} augmentations",
        source, sink, result.total_flow, augmentations
    );
    result
}

/// Breadth-first search over edges with positive residual capacity. On
/// success `parent` holds the discovering predecessor of every node on the
/// path (`None` at the source).
fn find_augmenting_path(
    residual: &CapacityGraph,
    source: NodeIndex,
    sink: NodeIndex,
    parent: &mut [Option<NodeIndex>],
) -> bool {
    let n = residual.num_nodes();
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();

    parent.fill(None);
    visited[source] = true;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        for v in 0..n {
            if !visited[v] && residual.edge(u, v) > 0 {
                visited[v] = true;
                parent[v] = Some(u);
                if v == sink {
                    return true;
                }
                queue.push_back(v);
            }
        }
    }

    false
}

/// Nodes reachable from `source` in the residual network implied by `graph`
/// and `flow`, in discovery order. Together with its complement this is the
/// source side of a minimum cut once `flow` is maximal.
pub fn reachable_from_source(
    graph: &CapacityGraph,
    flow: &FlowMatrix,
    source: NodeIndex,
) -> Vec<NodeIndex> {
    let n = graph.num_nodes();
    if source >= n {
        return Vec::new();
    }

    let net_flow = |u: NodeIndex, v: NodeIndex| -> Capacity {
        flow.get(u).and_then(|row| row.get(v)).copied().unwrap_or(0)
    };

    let mut visited = vec![false; n];
    let mut reachable = vec![source];
    let mut queue = VecDeque::from([source]);
    visited[source] = true;

    while let Some(u) = queue.pop_front() {
        for v in 0..n {
            // net flow is negative when it runs v -> u, which opens u -> v
            if !visited[v] && graph.edge(u, v) - net_flow(u, v) > 0 {
                visited[v] = true;
                reachable.push(v);
                queue.push_back(v);
            }
        }
    }

    reachable
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn graph_from_edges(n: usize, edges: &[(usize, usize, Capacity)]) -> CapacityGraph {
        let mut g = CapacityGraph::new(n);
        for &(u, v, cap) in edges {
            g.set_edge(u, v, cap);
        }
        g
    }

    fn random_graph(rng: &mut ChaCha8Rng) -> CapacityGraph {
        let n = rng.gen_range(2..10);
        let mut g = CapacityGraph::new(n);
        for u in 0..n {
            for v in 0..n {
                if u != v && rng.gen_bool(0.35) {
                    g.set_edge(u, v, rng.gen_range(1..10));
                }
            }
        }
        g
    }

    fn cut_capacity(graph: &CapacityGraph, reachable: &[NodeIndex]) -> Capacity {
        let mut side = vec![false; graph.num_nodes()];
        for &u in reachable {
            side[u] = true;
        }
        graph
            .edges()
            .filter(|&(u, v, _)| side[u] && !side[v])
            .map(|(_, _, cap)| cap)
            .sum()
    }

    fn check_flow_invariants(graph: &CapacityGraph, source: NodeIndex, sink: NodeIndex) {
        let n = graph.num_nodes();
        let result = max_flow(graph, source, sink);

        for u in 0..n {
            for v in 0..n {
                assert_eq!(result.flow[u][v], -result.flow[v][u], "antisymmetry {u},{v}");
                assert!(result.flow[u][v] <= graph.edge(u, v), "capacity {u},{v}");
            }
        }

        for u in (0..n).filter(|&u| u != source && u != sink) {
            let out: Capacity = (0..n).map(|v| result.flow[u][v]).sum();
            let inc: Capacity = (0..n).map(|v| result.flow[v][u]).sum();
            assert_eq!(out, inc, "conservation at {u}");
        }

        let out_of_source: Capacity = (0..n).map(|v| result.flow[source][v]).sum();
        assert_eq!(out_of_source, result.total_flow);

        let reachable = reachable_from_source(graph, &result.flow, source);
        assert!(!reachable.contains(&sink));
        assert_eq!(cut_capacity(graph, &reachable), result.total_flow);
    }

    #[test]
    fn test_single_path() {
        let g = graph_from_edges(3, &[(0, 1, 10), (1, 2, 10)]);
        assert_eq!(max_flow(&g, 0, 2).total_flow, 10);
    }

    #[test]
    fn test_bottleneck_edge_limits_flow() {
        let g = graph_from_edges(4, &[(0, 1, 10), (1, 2, 5), (2, 3, 10)]);
        let result = max_flow(&g, 0, 3);
        assert_eq!(result.total_flow, 5);
        assert_eq!(result.flow[1][2], 5);
        assert_eq!(result.flow[2][1], -5);
    }

    #[test]
    fn test_parallel_paths() {
        let g = graph_from_edges(4, &[(0, 1, 10), (0, 2, 10), (1, 3, 10), (2, 3, 10)]);
        assert_eq!(max_flow(&g, 0, 3).total_flow, 20);
    }

    #[test]
    fn test_textbook_network() {
        let g = graph_from_edges(
            6,
            &[
                (0, 1, 16),
                (0, 2, 13),
                (1, 2, 10),
                (2, 1, 4),
                (1, 3, 12),
                (3, 2, 9),
                (2, 4, 14),
                (4, 3, 7),
                (3, 5, 20),
                (4, 5, 4),
            ],
        );
        assert_eq!(max_flow(&g, 0, 5).total_flow, 23);
        check_flow_invariants(&g, 0, 5);
    }

    #[test]
    fn test_disconnected_graph_has_no_flow() {
        let g = graph_from_edges(4, &[(0, 1, 10), (2, 3, 10)]);
        let result = max_flow(&g, 0, 3);
        assert_eq!(result.total_flow, 0);
        assert!(result.flow.iter().flatten().all(|&f| f == 0));
        assert_eq!(reachable_from_source(&g, &result.flow, 0), vec![0, 1]);
    }

    #[test]
    fn test_source_equals_sink() {
        let g = graph_from_edges(3, &[(0, 1, 10), (1, 0, 10)]);
        let result = max_flow(&g, 1, 1);
        assert_eq!(result.total_flow, 0);
        assert_eq!(result.flow, vec![vec![0; 3]; 3]);
    }

    #[test]
    fn test_out_of_range_endpoints() {
        let g = graph_from_edges(3, &[(0, 1, 10), (1, 2, 10)]);
        assert_eq!(max_flow(&g, 0, 7).total_flow, 0);
        assert!(reachable_from_source(&g, &FlowResult::empty(3).flow, 9).is_empty());
    }

    #[test]
    fn test_original_graph_untouched() {
        let g = graph_from_edges(3, &[(0, 1, 4), (1, 2, 3)]);
        let before = g.clone();
        max_flow(&g, 0, 2);
        assert_eq!(g, before);
    }

    #[test]
    fn test_min_cut_behind_saturated_sink_edge() {
        let g = graph_from_edges(3, &[(0, 1, 10), (1, 2, 5)]);
        let result = max_flow(&g, 0, 2);
        assert_eq!(result.total_flow, 5);
        let reachable = reachable_from_source(&g, &result.flow, 0);
        assert_eq!(reachable, vec![0, 1]);
    }

    #[test]
    fn test_min_cut_at_source_edge() {
        let g = graph_from_edges(3, &[(0, 1, 2), (1, 2, 10)]);
        let result = max_flow(&g, 0, 2);
        assert_eq!(result.total_flow, 2);
        let reachable = reachable_from_source(&g, &result.flow, 0);
        assert_eq!(reachable, vec![0]);
    }

    #[test]
    fn test_reachability_uses_reverse_residual() {
        // 0 -> 1 is saturated; 1 is only reachable back along 1 -> 2's flow
        let g = graph_from_edges(
            5,
            &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (0, 4, 5), (4, 2, 5)],
        );
        let result = max_flow(&g, 0, 3);
        assert_eq!(result.total_flow, 1);
        assert_eq!(result.flow[1][2], 1);
        let reachable = reachable_from_source(&g, &result.flow, 0);
        assert_eq!(reachable, vec![0, 4, 2, 1]);
    }

    #[test]
    fn test_random_graph_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let g = random_graph(&mut rng);
            let sink = g.num_nodes() - 1;
            check_flow_invariants(&g, 0, sink);
        }
    }
}
