//! JSON graph descriptions.
//!
//! A description lists named vertices, each optionally flagged live, and
//! undirected edges between names:
//!
//! ```json
//! {
//!   "vertices": [{ "name": "a", "state": true }, { "name": "b" }],
//!   "edges": [{ "s": "a", "t": "b" }]
//! }
//! ```
//!
//! Unrecognized members (a graph `name`, a `size`, stored results) are ignored.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::graph::Graph;
use crate::life::state::LiveSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub name: String,
    /// Initial liveness; absent means dead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub s: String,
    pub t: String,
}

/// Serialized form of a graph plus its initial live set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    pub vertices: Vec<VertexRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphDescription {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Describe `graph` with `state` as the per-vertex live flags.
    pub fn from_graph(graph: &Graph, state: &LiveSet) -> Self {
        let vertices = graph
            .vertex_names()
            .iter()
            .enumerate()
            .map(|(idx, name)| VertexRecord {
                name: name.clone(),
                state: Some(state.contains(idx)),
            })
            .collect();
        let edges = graph
            .edges()
            .into_iter()
            .map(|(u, v)| EdgeRecord {
                s: graph.vertex_name(u).to_string(),
                t: graph.vertex_name(v).to_string(),
            })
            .collect();
        Self { vertices, edges }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the graph and its initial live set.
    ///
    /// # Errors
    /// An empty vertex list, duplicate vertex names, an edge naming an
    /// unknown vertex, or a self-loop. Duplicate edges collapse silently.
    pub fn resolve(&self) -> Result<(Graph, LiveSet)> {
        if self.vertices.is_empty() {
            return Err(ConfigError::EmptyGraph.into());
        }

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(self.vertices.len());
        for (idx, vertex) in self.vertices.iter().enumerate() {
            if index.insert(vertex.name.as_str(), idx).is_some() {
                return Err(ConfigError::DuplicateVertex(vertex.name.clone()).into());
            }
        }

        let lookup = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownVertex(name.to_string()))
        };
        let edges = self
            .edges
            .iter()
            .map(|edge| Ok((lookup(&edge.s)?, lookup(&edge.t)?)))
            .collect::<std::result::Result<Vec<_>, ConfigError>>()?;

        let names = self.vertices.iter().map(|v| v.name.clone()).collect();
        let graph = Graph::from_edges(names, &edges)?;

        let live = LiveSet::from_indices(
            self.vertices.len(),
            self.vertices
                .iter()
                .enumerate()
                .filter(|(_, v)| v.state == Some(true))
                .map(|(idx, _)| idx),
        );
        Ok((graph, live))
    }
}
