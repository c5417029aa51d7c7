//! Merge a subject's two parent edges into a single "parents" entry.

use serde::{Deserialize, Serialize};

use crate::model::{EdgeSide, MemberId, RelationshipType};
use super::{PanelEntry, RelationshipView};

/// One parent inside a combined [`ParentsUnit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: MemberId,
    pub name: String,
    pub photo_url: Option<String>,
    /// The stored type, seen from the subject (`son` or `daughter`).
    pub relationship_type: RelationshipType,
    /// The parent's relation to the subject (`father`, `mother`, ...).
    pub label: RelationshipType,
}

impl From<&RelationshipView> for ParentRef {
    fn from(view: &RelationshipView) -> Self {
        Self {
            id: view.counterpart.id,
            name: view.counterpart.name.clone(),
            photo_url: view.counterpart.photo_url.clone(),
            relationship_type: view.relationship_type,
            label: view.label,
        }
    }
}

/// Synthetic display unit standing in for the subject's parent edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentsUnit {
    /// Parent names joined with " & ".
    pub name: String,
    pub parents: Vec<ParentRef>,
}

impl ParentsUnit {
    pub fn from_views(views: &[&RelationshipView]) -> Self {
        let parents: Vec<ParentRef> = views.iter().map(|v| ParentRef::from(*v)).collect();
        let name = parents.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(" & ");
        Self { name, parents }
    }
}

/// Decides whether a set of qualifying parent edges becomes one unit.
pub trait ParentCombination: Send + Sync {
    /// Build the combined unit from every qualifying view, or `None` to
    /// leave the views untouched.
    fn combine(&self, parents: &[&RelationshipView]) -> Option<ParentsUnit>;
}

/// Combine only when exactly two parent edges exist. One known parent, or
/// three and more from duplicate data entry, are left as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactlyTwoParents;

impl ParentCombination for ExactlyTwoParents {
    fn combine(&self, parents: &[&RelationshipView]) -> Option<ParentsUnit> {
        (parents.len() == 2).then(|| ParentsUnit::from_views(parents))
    }
}

/// Combine whenever at least one parent edge exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtLeastOneParent;

impl ParentCombination for AtLeastOneParent {
    fn combine(&self, parents: &[&RelationshipView]) -> Option<ParentsUnit> {
        (!parents.is_empty()).then(|| ParentsUnit::from_views(parents))
    }
}

/// An outgoing `son`/`daughter` edge: the subject is the child and the
/// counter-party a parent.
pub fn is_parent_edge(view: &RelationshipView) -> bool {
    view.direction == EdgeSide::Outgoing
        && matches!(view.relationship_type, RelationshipType::Son | RelationshipType::Daughter)
}

/// Replace the qualifying parent edges with one [`PanelEntry::Parents`]
/// when `policy` agrees. The unit takes the position of the first parent
/// edge; everything else keeps its relative order.
pub fn combine_parent_relationships(
    views: Vec<RelationshipView>,
    policy: &dyn ParentCombination,
) -> Vec<PanelEntry> {
    let qualifying: Vec<&RelationshipView> = views.iter().filter(|v| is_parent_edge(v)).collect();
    let Some(unit) = policy.combine(&qualifying) else {
        return views.into_iter().map(PanelEntry::Relationship).collect();
    };

    let mut unit = Some(unit);
    let mut out = Vec::with_capacity(views.len());
    for view in views {
        if is_parent_edge(&view) {
            if let Some(unit) = unit.take() {
                out.push(PanelEntry::Parents(unit));
            }
        } else {
            out.push(PanelEntry::Relationship(view));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{named_view, view};

    #[test]
    fn two_parents_become_one_unit() {
        let views = vec![
            named_view(1, 10, "John", RelationshipType::Daughter, EdgeSide::Outgoing),
            view(2, 12, RelationshipType::Brother, EdgeSide::Incoming),
            named_view(3, 11, "Mary", RelationshipType::Son, EdgeSide::Outgoing),
        ];
        let out = combine_parent_relationships(views, &ExactlyTwoParents);
        assert_eq!(out.len(), 2);

        let PanelEntry::Parents(unit) = &out[0] else {
            panic!("expected parents unit first, got {:?}", out[0]);
        };
        assert_eq!(unit.name, "John & Mary");
        let ids: Vec<MemberId> = unit.parents.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![MemberId(10), MemberId(11)]);
        assert!(matches!(out[1], PanelEntry::Relationship(ref v) if v.counterpart.id == MemberId(12)));
    }

    #[test]
    fn single_parent_is_left_alone() {
        let views = vec![view(1, 10, RelationshipType::Son, EdgeSide::Outgoing)];
        let out = combine_parent_relationships(views.clone(), &ExactlyTwoParents);
        assert_eq!(out, vec![PanelEntry::Relationship(views[0].clone())]);
    }

    #[test]
    fn three_parents_are_left_alone() {
        let views = vec![
            view(1, 10, RelationshipType::Son, EdgeSide::Outgoing),
            view(2, 11, RelationshipType::Son, EdgeSide::Outgoing),
            view(3, 12, RelationshipType::Son, EdgeSide::Outgoing),
        ];
        let out = combine_parent_relationships(views, &ExactlyTwoParents);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|e| matches!(e, PanelEntry::Relationship(_))));
    }

    #[test]
    fn incoming_child_edges_do_not_qualify() {
        // Incoming `son` means the counter-party is the subject's son.
        let views = vec![
            view(1, 10, RelationshipType::Son, EdgeSide::Incoming),
            view(2, 11, RelationshipType::Daughter, EdgeSide::Incoming),
        ];
        let out = combine_parent_relationships(views, &ExactlyTwoParents);
        assert!(out.iter().all(|e| matches!(e, PanelEntry::Relationship(_))));
    }

    #[test]
    fn lenient_policy_wraps_a_single_parent() {
        let views = vec![named_view(1, 10, "John", RelationshipType::Son, EdgeSide::Outgoing)];
        let out = combine_parent_relationships(views, &AtLeastOneParent);
        let PanelEntry::Parents(unit) = &out[0] else {
            panic!("expected parents unit");
        };
        assert_eq!(unit.name, "John");
        assert_eq!(unit.parents.len(), 1);
    }
}
