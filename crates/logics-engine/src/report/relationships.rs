//! `RELATIONSHIPS.md`: per-document outgoing and incoming references

use super::{doc_link, finish, sorted_by_ref};
use crate::graph::Graph;
use logics_model::Document;

fn listing(refs: &[&str]) -> String {
    if refs.is_empty() {
        "_none_".to_string()
    } else {
        refs.join(", ")
    }
}

/// Render the relationship report for `docs` and the graph built from them
#[must_use]
pub fn render_relationships(docs: &[Document], graph: &Graph) -> String {
    let sorted = sorted_by_ref(docs);
    let unresolved: Vec<(&Document, Vec<&str>)> = sorted
        .iter()
        .map(|doc| (*doc, graph.unresolved(doc.doc_ref().as_str())))
        .filter(|(_, tokens)| !tokens.is_empty())
        .collect();
    let unresolved_count: usize = unresolved.iter().map(|(_, tokens)| tokens.len()).sum();

    let mut lines = vec![
        "# Logics Relationships".to_string(),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Docs scanned: {}", docs.len()),
        format!("- Links: {}", graph.edge_count()),
        format!("- Unresolved references: {unresolved_count}"),
        String::new(),
        "## By document".to_string(),
        String::new(),
    ];
    for doc in &sorted {
        let doc_ref = doc.doc_ref().as_str();
        lines.push(format!("### {} - {}", doc_link(doc), doc.title()));
        lines.push(String::new());
        lines.push(format!("- Outgoing: {}", listing(&graph.outgoing(doc_ref))));
        lines.push(format!("- Incoming: {}", listing(&graph.incoming(doc_ref))));
        lines.push(String::new());
    }

    if !unresolved.is_empty() {
        lines.push("## Unresolved references".to_string());
        lines.push(String::new());
        for (doc, tokens) in unresolved {
            lines.push(format!("- {}: {}", doc_link(doc), tokens.join(", ")));
        }
        lines.push(String::new());
    }
    finish(lines)
}
