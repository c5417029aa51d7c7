//! Export — render projections and panels for presentation layers.
//!
//! JSON is the shape a tree or member-page widget consumes directly.
//! Graphviz DOT is for offline rendering and debugging:
//!
//! ```text
//! FamilyTree → write_tree_dot() → dot -Tsvg > tree.svg
//! GraphStore → export_family_dot() → the whole graph, every edge
//! ```

use std::io::Write;

use crate::aggregate::RelationshipPanel;
use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

/// Write a tree as `{ "nodes": [...], "edges": [...] }`.
pub fn write_tree_json(tree: &FamilyTree, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *writer, tree)?;
    Ok(())
}

pub fn write_panel_json(panel: &RelationshipPanel, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer(&mut *writer, panel)?;
    Ok(())
}

/// Write a tree as a Graphviz digraph. The root is drawn bold.
pub fn write_tree_dot(tree: &FamilyTree, writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "digraph family {{")?;
    writeln!(writer, "  node [shape=box];")?;
    for (i, node) in tree.nodes.iter().enumerate() {
        let style = if i == 0 { ", style=bold" } else { "" };
        writeln!(writer, "  m{} [label=\"{}\"{}];", node.id.0, escape(&node.label), style)?;
    }
    for edge in &tree.edges {
        writeln!(writer, "  m{} -> m{} [label=\"{}\"];", edge.from.0, edge.to.0, edge.label)?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

/// Dump every member and relationship in the store as a Graphviz digraph.
pub async fn export_family_dot<S>(store: &S, writer: &mut dyn Write) -> Result<()>
where
    S: GraphStore + ?Sized,
{
    let members = store.all_members().await?;
    let relationships = store.all_relationships().await?;

    writeln!(writer, "// kinship-graph DOT export")?;
    writeln!(writer, "// Members: {}", members.len())?;
    writeln!(writer, "// Relationships: {}", relationships.len())?;
    writeln!(writer, "digraph family {{")?;
    writeln!(writer, "  node [shape=box];")?;

    for member in &members {
        let deceased = if member.is_alive { "" } else { ", style=dashed" };
        writeln!(
            writer,
            "  m{} [label=\"{}\"{}];",
            member.id.0,
            escape(&member.display_name()),
            deceased
        )?;
    }

    for rel in &relationships {
        writeln!(
            writer,
            "  m{} -> m{} [label=\"{}\"];",
            rel.member1_id.0, rel.member2_id.0, rel.relationship_type
        )?;
    }

    writeln!(writer, "}}")?;
    Ok(())
}

/// Escape a string for a double-quoted DOT label.
fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> FamilyTree {
        FamilyTree {
            nodes: vec![
                TreeNode { id: MemberId(1), label: "John \"Jack\" Doe".into(), photo_url: None },
                TreeNode { id: MemberId(2), label: "Mary".into(), photo_url: Some("/p/2.jpg".into()) },
            ],
            edges: vec![TreeEdge { from: MemberId(1), to: MemberId(2), label: RelationshipType::Father }],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn test_tree_dot() {
        let mut out = Vec::new();
        write_tree_dot(&sample_tree(), &mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.starts_with("digraph family {"));
        assert!(dot.contains(r#"m1 [label="John \"Jack\" Doe", style=bold];"#));
        assert!(dot.contains(r#"m1 -> m2 [label="father"];"#));
    }

    #[test]
    fn test_tree_json_shape() {
        let mut out = Vec::new();
        write_tree_json(&sample_tree(), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["nodes"][1]["photo_url"], "/p/2.jpg");
        assert_eq!(json["edges"][0]["from"], 1);
        assert_eq!(json["edges"][0]["label"], "father");
    }
}
