//! Tree projection output: display-safe nodes and labeled edges.

use serde::{Deserialize, Serialize};

use super::{Member, MemberId, RelationshipType};

/// A member as drawn in a tree view. Never carries the full member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: MemberId,
    pub label: String,
    pub photo_url: Option<String>,
}

impl From<&Member> for TreeNode {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            label: member.display_name(),
            photo_url: member.photo_url.clone(),
        }
    }
}

/// An edge as drawn in a tree view. `label` is the relationship type as
/// seen from `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEdge {
    pub from: MemberId,
    pub to: MemberId,
    pub label: RelationshipType,
}

/// A bounded projection of the family graph around one root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyTree {
    /// Nodes in breadth-first discovery order; the root comes first.
    pub nodes: Vec<TreeNode>,
    pub edges: Vec<TreeEdge>,
}

impl FamilyTree {
    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: MemberId) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.node(id).is_some()
    }
}
