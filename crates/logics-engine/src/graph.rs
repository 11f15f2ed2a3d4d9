//! Reference graph
//!
//! Nodes are doc refs; an edge A → B exists when B's ref token appears in A's
//! text. Tokens naming no loaded document become no edge and are kept as the
//! source's unresolved refs instead. Node indices follow the lexicographic
//! order of refs, so every listing is deterministic.

use logics_model::Document;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Directed graph of document references
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<String>,
    edges: DiGraphMap<usize, ()>,
    unresolved: BTreeMap<usize, BTreeSet<String>>,
}

#[derive(Serialize)]
struct GraphExport<'a> {
    nodes: &'a [String],
    edges: BTreeMap<&'a str, Vec<&'a str>>,
}

impl Graph {
    /// Build the graph from loaded documents
    #[must_use]
    pub fn build(docs: &[Document]) -> Self {
        let mut nodes: Vec<String> = docs.iter().map(|d| d.doc_ref().to_string()).collect();
        nodes.sort();
        nodes.dedup();

        let mut edges = DiGraphMap::new();
        let mut unresolved: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
        for index in 0..nodes.len() {
            edges.add_node(index);
        }
        for doc in docs {
            let Ok(from) = nodes.binary_search_by(|n| n.as_str().cmp(doc.doc_ref().as_str())) else {
                continue;
            };
            for token in doc.outgoing_refs() {
                match nodes.binary_search(&token) {
                    Ok(to) => {
                        edges.add_edge(from, to, ());
                    }
                    Err(_) => {
                        unresolved.entry(from).or_default().insert(token);
                    }
                }
            }
        }
        debug!(
            nodes = nodes.len(),
            edges = edges.edge_count(),
            unresolved = unresolved.values().map(BTreeSet::len).sum::<usize>(),
            "built reference graph"
        );
        Self {
            nodes,
            edges,
            unresolved,
        }
    }

    fn index(&self, doc_ref: &str) -> Option<usize> {
        self.nodes.binary_search_by(|n| n.as_str().cmp(doc_ref)).ok()
    }

    fn neighbors(&self, doc_ref: &str, direction: Direction) -> Vec<&str> {
        let Some(index) = self.index(doc_ref) else {
            return Vec::new();
        };
        let mut found: Vec<usize> = self.edges.neighbors_directed(index, direction).collect();
        found.sort_unstable();
        found.into_iter().map(|i| self.nodes[i].as_str()).collect()
    }

    /// Refs of every node, sorted
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Whether `doc_ref` is a node
    #[inline]
    #[must_use]
    pub fn contains(&self, doc_ref: &str) -> bool {
        self.index(doc_ref).is_some()
    }

    /// Refs mentioned by `doc_ref`, sorted
    #[must_use]
    pub fn outgoing(&self, doc_ref: &str) -> Vec<&str> {
        self.neighbors(doc_ref, Direction::Outgoing)
    }

    /// Refs mentioning `doc_ref`, sorted
    #[must_use]
    pub fn incoming(&self, doc_ref: &str) -> Vec<&str> {
        self.neighbors(doc_ref, Direction::Incoming)
    }

    /// Ref tokens in `doc_ref`'s text naming no node, sorted
    #[must_use]
    pub fn unresolved(&self, doc_ref: &str) -> Vec<&str> {
        self.index(doc_ref)
            .and_then(|index| self.unresolved.get(&index))
            .map(|tokens| tokens.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total unresolved tokens across all documents
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.values().map(BTreeSet::len).sum()
    }

    /// Every edge, sorted by source then target
    #[must_use]
    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut all: Vec<(usize, usize)> = self.edges.all_edges().map(|(a, b, _)| (a, b)).collect();
        all.sort_unstable();
        all.into_iter()
            .map(|(a, b)| (self.nodes[a].as_str(), self.nodes[b].as_str()))
            .collect()
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    /// JSON export: `{"nodes": [...], "edges": {"ref": ["target", ...]}}`
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let edges = self
            .nodes
            .iter()
            .map(|n| (n.as_str(), self.outgoing(n)))
            .collect();
        serde_json::to_string_pretty(&GraphExport {
            nodes: &self.nodes,
            edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(path: &str, text: &str) -> Document {
        Document::from_text(path, text)
    }

    fn sample() -> Vec<Document> {
        vec![
            doc("logics/tasks/task_002_login.md", "## task_002_login - Login\nFrom item_001_login and req_000_login.\nAlso spec_009_ghost.\n"),
            doc("logics/request/req_000_login.md", "## req_000_login - Login\n"),
            doc("logics/backlog/item_001_login.md", "## item_001_login - Login\nSee req_000_login, item_001_login.\n"),
        ]
    }

    #[test]
    fn edges_only_to_known_nodes() {
        let graph = Graph::build(&sample());
        assert_eq!(graph.nodes(), ["item_001_login", "req_000_login", "task_002_login"]);
        assert_eq!(graph.outgoing("task_002_login"), vec!["item_001_login", "req_000_login"]);
        assert_eq!(graph.incoming("req_000_login"), vec!["item_001_login", "task_002_login"]);
        assert!(graph.outgoing("req_000_login").is_empty());
        assert!(!graph.contains("spec_009_ghost"));
        for (_, to) in graph.edges() {
            assert!(graph.contains(to));
        }
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn unknown_tokens_are_kept_as_unresolved() {
        let graph = Graph::build(&sample());
        assert_eq!(graph.unresolved("task_002_login"), vec!["spec_009_ghost"]);
        assert!(graph.unresolved("item_001_login").is_empty());
        assert!(graph.unresolved("spec_009_ghost").is_empty());
        assert_eq!(graph.unresolved_count(), 1);
    }

    #[test]
    fn no_self_edges() {
        let graph = Graph::build(&sample());
        assert!(!graph.outgoing("item_001_login").contains(&"item_001_login"));
    }

    #[test]
    fn json_export_is_sorted() {
        let graph = Graph::build(&sample());
        let value: serde_json::Value = serde_json::from_str(&graph.to_json().unwrap()).unwrap();
        assert_eq!(value["nodes"][0], "item_001_login");
        assert_eq!(value["edges"]["task_002_login"][1], "req_000_login");
        assert_eq!(value["edges"]["req_000_login"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn unknown_queries_are_empty() {
        let graph = Graph::build(&[]);
        assert_eq!(graph.node_count(), 0);
        assert!(graph.incoming("req_000_x").is_empty());
    }
}
