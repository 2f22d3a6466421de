use std::fmt;

/// Node index inside a [`CapacityGraph`].
pub type NodeIndex = usize;

/// Capacity (and flow) value carried by an edge.
pub type Capacity = i64;

/// A directed capacity network over `n` nodes stored as a dense matrix.
///
/// Indices outside `[0, n)` are tolerated everywhere: reads return 0 and
/// writes are ignored. Breadth-first scans rely on this and never bounds-check
/// before probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityGraph {
    n: usize,
    capacity: Vec<Vec<Capacity>>,
}

impl CapacityGraph {
    /// Creates a graph with `n` nodes and no edges.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            capacity: vec![vec![0; n]; n],
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Sets the capacity of `u -> v`. Setting 0 is how an edge is removed.
    pub fn set_edge(&mut self, u: NodeIndex, v: NodeIndex, cap: Capacity) {
        if u < self.n && v < self.n {
            self.capacity[u][v] = cap;
        }
    }

    pub fn edge(&self, u: NodeIndex, v: NodeIndex) -> Capacity {
        if u < self.n && v < self.n {
            self.capacity[u][v]
        } else {
            0
        }
    }

    /// Iterates over every edge with non-zero capacity as `(u, v, cap)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, Capacity)> + '_ {
        self.capacity.iter().enumerate().flat_map(|(u, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cap)| **cap != 0)
                .map(move |(v, cap)| (u, v, *cap))
        })
    }
}

impl fmt::Display for CapacityGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CapacityGraph ({} nodes)", self.n)?;
        for (u, v, cap) in self.edges() {
            writeln!(f, "  {u} -> {v} [{cap}]")?;
        }
        Ok(())
    }
}
