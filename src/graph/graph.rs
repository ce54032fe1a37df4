/// An unweighted, undirected neighbor graph in compressed sparse row format.
///
/// `offsets[u]..offsets[u+1]` indexes into `edges` to give the sorted list of
/// nodes adjacent to node `u`. Adjacency is binary: spatial weights
/// downstream treat every link equally.
#[derive(Debug, Default, Clone)]
pub struct NeighborGraph {
    size: usize,
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl NeighborGraph {
    /// Construct a graph from undirected edge pairs over `num_nodes` nodes.
    /// Duplicate and self edges are discarded.
    pub fn from_edges(num_nodes: usize, pairs: &[(usize, usize)]) -> Self {
        let mut adjacency: Vec<Vec<u32>> = vec![Vec::new(); num_nodes];
        for &(u, v) in pairs {
            assert!(u < num_nodes && v < num_nodes, "edge ({u}, {v}) out of range");
            if u == v { continue; }
            adjacency[u].push(v as u32);
            adjacency[v].push(u as u32);
        }
        for list in adjacency.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            size: num_nodes,
            offsets: std::iter::once(0u32).chain(
                adjacency.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| { *acc += len; Some(*acc) })
            ).collect::<Vec<u32>>(),
            edges: adjacency.iter().flatten().copied().collect(),
        }
    }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.size }

    /// Get the number of undirected edges in the graph.
    #[inline] pub fn edge_count(&self) -> usize { self.edges.len() / 2 }

    /// Get the number of directed adjacency entries (twice the edge count).
    #[inline] pub fn link_count(&self) -> usize { self.edges.len() }

    /// Get the range of adjacency entries for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a given node, ascending.
    #[inline]
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }

    /// Check whether `other` is adjacent to `node` (binary search).
    pub fn contains(&self, node: usize, other: usize) -> bool {
        self.edges[self.range(node)].binary_search(&(other as u32)).is_ok()
    }

    /// Get the nodes with no neighbors at all.
    pub fn isolated_nodes(&self) -> Vec<usize> {
        (0..self.size).filter(|&n| self.degree(n) == 0).collect()
    }
}
