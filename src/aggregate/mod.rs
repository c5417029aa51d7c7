//! # Relationship Aggregation
//!
//! Turns a subject's raw incident edges into the canonical relationship
//! panel shown on a member page:
//!
//! ```text
//! raw views ─▶ process_relationships ─▶ combine_parent_relationships
//!           ─▶ sort_relationships_by_priority ─▶ group_relationships_by_category
//! ```
//!
//! Everything here is pure: no store access, no locks. The facade in the
//! crate root builds the input views from the store.

pub mod category;
pub mod dedup;
pub mod parents;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{EdgeSide, MemberId, MemberSummary, RelId, Relationship, RelationshipType};
use crate::reciprocal::{GenderPolicy, reciprocal_with};

pub use category::{
    CategorizedRelationships, Category, EntryKind, UNRANKED, category_of,
    group_relationships_by_category, priority_of, sort_relationships_by_priority,
};
pub use dedup::process_relationships;
pub use parents::{
    AtLeastOneParent, ExactlyTwoParents, ParentCombination, ParentRef, ParentsUnit,
    combine_parent_relationships,
};

/// One stored edge as seen from a subject member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipView {
    pub relationship_id: RelId,
    /// The type as stored (member1's relation to member2).
    pub relationship_type: RelationshipType,
    /// `Outgoing` when the subject is member1.
    pub direction: EdgeSide,
    /// The counter-party's relation to the subject.
    pub label: RelationshipType,
    pub counterpart: MemberSummary,
    pub created_at: DateTime<Utc>,
}

impl RelationshipView {
    /// Derive the view of `rel` for `subject`. `None` if the edge does not
    /// touch the subject or `counterpart` is not its other end.
    pub fn derive(
        subject: MemberId,
        rel: &Relationship,
        counterpart: MemberSummary,
        policy: GenderPolicy,
    ) -> Option<Self> {
        if rel.other_member(subject)? != counterpart.id {
            return None;
        }
        let direction = rel.direction_from(subject)?;
        let label = match direction {
            EdgeSide::Incoming => rel.relationship_type,
            EdgeSide::Outgoing => reciprocal_with(rel.relationship_type, counterpart.gender, policy),
        };
        Some(Self {
            relationship_id: rel.id,
            relationship_type: rel.relationship_type,
            direction,
            label,
            counterpart,
            created_at: rel.created_at,
        })
    }
}

/// An entry in a relationship panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelEntry {
    Relationship(RelationshipView),
    Parents(ParentsUnit),
}

impl PanelEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            PanelEntry::Relationship(v) => EntryKind::Label(v.label),
            PanelEntry::Parents(_) => EntryKind::Parents,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PanelEntry::Relationship(v) => &v.counterpart.name,
            PanelEntry::Parents(u) => &u.name,
        }
    }

    pub fn relationship_id(&self) -> Option<RelId> {
        match self {
            PanelEntry::Relationship(v) => Some(v.relationship_id),
            PanelEntry::Parents(_) => None,
        }
    }

    /// Members this entry refers to.
    pub fn member_ids(&self) -> Vec<MemberId> {
        match self {
            PanelEntry::Relationship(v) => vec![v.counterpart.id],
            PanelEntry::Parents(u) => u.parents.iter().map(|p| p.id).collect(),
        }
    }
}

/// The canonical relationship view for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipPanel {
    pub subject: MemberId,
    /// All entries in priority order.
    pub entries: Vec<PanelEntry>,
    pub categories: CategorizedRelationships,
}

/// Runs the four aggregation steps with a pluggable parent policy.
#[derive(Clone)]
pub struct RelationshipAggregator {
    combiner: Arc<dyn ParentCombination>,
}

impl RelationshipAggregator {
    pub fn new(combiner: Arc<dyn ParentCombination>) -> Self {
        Self { combiner }
    }

    pub fn aggregate(&self, subject: MemberId, views: &[RelationshipView]) -> RelationshipPanel {
        let unique = process_relationships(views);
        let mut entries = combine_parent_relationships(unique, self.combiner.as_ref());
        sort_relationships_by_priority(&mut entries);
        let categories = group_relationships_by_category(&entries);
        RelationshipPanel { subject, entries, categories }
    }
}

impl Default for RelationshipAggregator {
    fn default() -> Self {
        Self::new(Arc::new(ExactlyTwoParents))
    }
}

impl std::fmt::Debug for RelationshipAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationshipAggregator").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::model::Gender;

    pub fn named_view(
        rel: u64,
        other: u64,
        name: &str,
        rel_type: RelationshipType,
        direction: EdgeSide,
    ) -> RelationshipView {
        RelationshipView {
            relationship_id: RelId(rel),
            relationship_type: rel_type,
            direction,
            label: match direction {
                EdgeSide::Incoming => rel_type,
                EdgeSide::Outgoing => crate::reciprocal::reciprocal(rel_type, Gender::Male),
            },
            counterpart: MemberSummary {
                id: MemberId(other),
                name: name.to_string(),
                gender: Gender::Male,
                photo_url: None,
            },
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
        }
    }

    pub fn view(rel: u64, other: u64, rel_type: RelationshipType, direction: EdgeSide) -> RelationshipView {
        named_view(rel, other, &format!("member-{other}"), rel_type, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::{named_view, view};
    use crate::model::Gender;
    use pretty_assertions::assert_eq;

    #[test]
    fn derive_labels_outgoing_edges_with_the_reciprocal() {
        let rel = Relationship::new(RelId(1), MemberId(1), MemberId(2), RelationshipType::Daughter);
        let mum = MemberSummary {
            id: MemberId(2),
            name: "Mary".into(),
            gender: Gender::Female,
            photo_url: None,
        };
        let v = RelationshipView::derive(MemberId(1), &rel, mum.clone(), GenderPolicy::Legacy).unwrap();
        assert_eq!(v.direction, EdgeSide::Outgoing);
        assert_eq!(v.label, RelationshipType::Mother);

        let child = MemberSummary { id: MemberId(1), ..mum };
        let v = RelationshipView::derive(MemberId(2), &rel, child, GenderPolicy::Legacy).unwrap();
        assert_eq!(v.direction, EdgeSide::Incoming);
        assert_eq!(v.label, RelationshipType::Daughter);
    }

    #[test]
    fn derive_rejects_unrelated_counterpart() {
        let rel = Relationship::new(RelId(1), MemberId(1), MemberId(2), RelationshipType::Father);
        let stranger = MemberSummary {
            id: MemberId(9),
            name: "X".into(),
            gender: Gender::Unknown,
            photo_url: None,
        };
        assert!(RelationshipView::derive(MemberId(1), &rel, stranger.clone(), GenderPolicy::Legacy).is_none());
        assert!(RelationshipView::derive(MemberId(3), &rel, stranger, GenderPolicy::Legacy).is_none());
    }

    #[test]
    fn full_pipeline_orders_and_groups() {
        let views = vec![
            view(1, 20, RelationshipType::Cousin, EdgeSide::Incoming),
            named_view(2, 10, "John", RelationshipType::Son, EdgeSide::Outgoing),
            view(3, 30, RelationshipType::Wife, EdgeSide::Incoming),
            named_view(4, 11, "Mary", RelationshipType::Son, EdgeSide::Outgoing),
            // Explicit reciprocal row for John: merged away
            view(5, 10, RelationshipType::Father, EdgeSide::Incoming),
        ];

        let panel = RelationshipAggregator::default().aggregate(MemberId(1), &views);

        let names: Vec<&str> = panel.entries.iter().map(PanelEntry::display_name).collect();
        assert_eq!(names, vec!["John & Mary", "member-30", "member-20"]);
        assert_eq!(panel.categories.parents.len(), 1);
        assert_eq!(panel.categories.spouses.len(), 1);
        assert_eq!(panel.categories.extended.len(), 1);
        assert_eq!(panel.categories.len(), panel.entries.len());
    }
}
