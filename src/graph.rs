//! Undirected, loop-free graph shared by every automaton in a batch.
//!
//! Vertices are indexed 0..n_vertices and carry unique names. Adjacency is
//! kept as sorted neighbor sets so that iteration order (and therefore every
//! simulation result) is deterministic.

use std::collections::{BTreeSet, HashMap};

use crate::error::{ConfigError, Result};

/// Adjacency arena for Life on a graph.
///
/// Built once, optionally mutated by the topology mutator, then only
/// borrowed immutably for the rest of its life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<BTreeSet<usize>>,
    vertex_names: Vec<String>,
    name_to_index: HashMap<String, usize>,
}

impl Graph {
    /// Build a graph from vertex names and index-pair edges.
    ///
    /// # Arguments
    /// * `vertex_names` - Unique name for each vertex, in index order
    /// * `edges` - Undirected edges as index pairs; duplicates collapse
    ///
    /// # Errors
    /// Duplicate names, self-loops, or out-of-range endpoints.
    pub fn from_edges(vertex_names: Vec<String>, edges: &[(usize, usize)]) -> Result<Self> {
        let n_vertices = vertex_names.len();
        let mut name_to_index = HashMap::with_capacity(n_vertices);
        for (idx, name) in vertex_names.iter().enumerate() {
            if name_to_index.insert(name.clone(), idx).is_some() {
                return Err(ConfigError::DuplicateVertex(name.clone()).into());
            }
        }

        let mut graph = Graph {
            adjacency: vec![BTreeSet::new(); n_vertices],
            vertex_names,
            name_to_index,
        };

        for &(u, v) in edges {
            for endpoint in [u, v] {
                if endpoint >= n_vertices {
                    return Err(ConfigError::UnknownVertex(format!("#{}", endpoint)).into());
                }
            }
            if u == v {
                return Err(ConfigError::SelfLoop(graph.vertex_names[u].clone()).into());
            }
            graph.add_edge(u, v);
        }

        Ok(graph)
    }

    /// Generate an n x n torus where every vertex touches its eight surrounding cells.
    ///
    /// Vertex `i + n*j` is named `"i_j"`. For n < 3 the wrapped neighborhoods
    /// overlap; duplicate neighbors collapse and self-loops are dropped.
    pub fn torus(n: usize) -> Self {
        let n_vertices = n * n;
        let mut vertex_names = vec![String::new(); n_vertices];
        let mut edges = Vec::with_capacity(n_vertices * 8);

        for i in 0..n {
            for j in 0..n {
                let index = i + n * j;
                vertex_names[index] = format!("{}_{}", i, j);

                let up = (j + 1) % n;
                let down = (n + j - 1) % n;
                let right = (i + 1) % n;
                let left = (n + i - 1) % n;
                for (x, y) in [
                    (i, up),
                    (i, down),
                    (right, j),
                    (left, j),
                    (right, up),
                    (left, down),
                    (right, down),
                    (left, up),
                ] {
                    let neighbor = x + n * y;
                    if neighbor != index {
                        edges.push((index, neighbor));
                    }
                }
            }
        }

        // Names are unique and every endpoint is in range, so this cannot fail.
        let mut graph = Graph {
            adjacency: vec![BTreeSet::new(); n_vertices],
            name_to_index: vertex_names
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), idx))
                .collect(),
            vertex_names,
        };
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Number of vertices.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn n_edges(&self) -> usize {
        self.adjacency.iter().map(|nbrs| nbrs.len()).sum::<usize>() / 2
    }

    /// Sorted neighbors of `vertex`.
    #[inline]
    pub fn neighbors(&self, vertex: usize) -> &BTreeSet<usize> {
        &self.adjacency[vertex]
    }

    /// Degree of `vertex`.
    #[inline]
    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency[vertex].len()
    }

    #[inline]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency[u].contains(&v)
    }

    /// Name of `vertex`.
    pub fn vertex_name(&self, vertex: usize) -> &str {
        &self.vertex_names[vertex]
    }

    pub fn vertex_names(&self) -> &[String] {
        &self.vertex_names
    }

    /// Look up a vertex index by name.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.name_to_index
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownVertex(name.to_string()).into())
    }

    /// Every undirected edge once, as (smaller, larger) index pairs in sorted order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, nbrs)| nbrs.range(u + 1..).map(move |&v| (u, v)))
            .collect()
    }

    /// Insert the undirected edge u-v. Returns false if it was already present.
    ///
    /// Callers guarantee u != v.
    pub(crate) fn add_edge(&mut self, u: usize, v: usize) -> bool {
        debug_assert_ne!(u, v, "self-loops are not allowed");
        let inserted = self.adjacency[u].insert(v);
        self.adjacency[v].insert(u);
        inserted
    }

    /// Remove the undirected edge u-v. Returns false if it was absent.
    pub(crate) fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        let removed = self.adjacency[u].remove(&v);
        self.adjacency[v].remove(&u);
        removed
    }

    /// Check that adjacency is symmetric and loop-free.
    pub fn is_consistent(&self) -> bool {
        self.adjacency.iter().enumerate().all(|(u, nbrs)| {
            !nbrs.contains(&u) && nbrs.iter().all(|&v| self.adjacency[v].contains(&u))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("v{}", i)).collect()
    }

    #[test]
    fn test_graph_creation() {
        let graph = Graph::from_edges(names(4), &[(0, 1), (1, 2), (2, 3), (1, 0)]).unwrap();

        assert_eq!(graph.n_vertices(), 4);
        assert_eq!(graph.n_edges(), 3);
        assert!(graph.has_edge(1, 0));
        assert!(graph.has_edge(0, 1));
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.edges(), vec![(0, 1), (1, 2), (2, 3)]);
        assert!(graph.is_consistent());
    }

    #[test]
    fn test_rejects_self_loop() {
        let err = Graph::from_edges(names(2), &[(1, 1)]).unwrap_err();
        assert!(err.to_string().contains("self-loop"));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = Graph::from_edges(vec!["a".into(), "a".into()], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_endpoint() {
        assert!(Graph::from_edges(names(2), &[(0, 5)]).is_err());
    }

    #[test]
    fn test_torus_is_eight_regular() {
        let torus = Graph::torus(5);
        assert_eq!(torus.n_vertices(), 25);
        assert!((0..25).all(|v| torus.degree(v) == 8));
        assert_eq!(torus.n_edges(), 100);
        assert!(torus.is_consistent());
        assert_eq!(torus.index_of("2_3").unwrap(), 2 + 5 * 3);
    }

    #[test]
    fn test_small_torus_is_complete() {
        // On a 3x3 torus the eight surrounding cells are all the other vertices.
        let torus = Graph::torus(3);
        assert!((0..9).all(|v| torus.degree(v) == 8));
        assert_eq!(torus.n_edges(), 36);
    }

    #[test]
    fn test_degenerate_torus_drops_loops() {
        let torus = Graph::torus(1);
        assert_eq!(torus.degree(0), 0);

        let torus = Graph::torus(2);
        assert!(torus.is_consistent());
        assert!((0..4).all(|v| torus.degree(v) == 3));
    }

    #[test]
    fn test_edge_mutation() {
        let mut graph = Graph::from_edges(names(3), &[(0, 1)]).unwrap();
        assert!(graph.add_edge(1, 2));
        assert!(!graph.add_edge(2, 1));
        assert!(graph.remove_edge(0, 1));
        assert!(!graph.remove_edge(1, 0));
        assert_eq!(graph.edges(), vec![(1, 2)]);
        assert!(graph.is_consistent());
    }
}
