//! Display categories and priority ranks.
//!
//! Both tables are exhaustive matches over [`EntryKind`], so a new
//! relationship type cannot be added without deciding where it shows up.

use serde::{Deserialize, Serialize};

use crate::model::RelationshipType;
use super::PanelEntry;

/// What an entry is, for categorization and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A combined parents unit.
    Parents,
    /// A single related member, keyed by their relation to the subject.
    Label(RelationshipType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Parents,
    Spouses,
    Children,
    Siblings,
    /// Grandparents and grandchildren.
    Grandparents,
    Extended,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Parents,
        Category::Spouses,
        Category::Children,
        Category::Siblings,
        Category::Grandparents,
        Category::Extended,
        Category::Other,
    ];
}

pub const UNRANKED: u32 = 999;

pub fn category_of(kind: EntryKind) -> Category {
    use crate::model::RelationshipType as T;
    match kind {
        EntryKind::Parents | EntryKind::Label(T::Father | T::Mother) => Category::Parents,
        EntryKind::Label(T::Husband | T::Wife) => Category::Spouses,
        EntryKind::Label(T::Son | T::Daughter) => Category::Children,
        EntryKind::Label(T::Brother | T::Sister) => Category::Siblings,
        EntryKind::Label(T::Grandfather | T::Grandmother | T::Grandson | T::Granddaughter) => {
            Category::Grandparents
        }
        EntryKind::Label(T::Uncle | T::Aunt | T::Nephew | T::Niece | T::Cousin) => Category::Extended,
        EntryKind::Label(T::Other) => Category::Other,
    }
}

/// Display rank; lower sorts first.
pub fn priority_of(kind: EntryKind) -> u32 {
    use crate::model::RelationshipType as T;
    match kind {
        EntryKind::Parents => 1,
        EntryKind::Label(t) => match t {
            T::Father => 2,
            T::Mother => 3,
            T::Husband => 4,
            T::Wife => 5,
            T::Son => 6,
            T::Daughter => 7,
            T::Brother => 8,
            T::Sister => 9,
            T::Grandfather => 10,
            T::Grandmother => 11,
            T::Grandson => 12,
            T::Granddaughter => 13,
            T::Uncle => 14,
            T::Aunt => 15,
            T::Nephew => 16,
            T::Niece => 17,
            T::Cousin => 18,
            T::Other => UNRANKED,
        },
    }
}

/// Entries partitioned into display buckets. Every entry lands in exactly
/// one bucket; relative order inside a bucket follows the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedRelationships {
    pub parents: Vec<PanelEntry>,
    pub spouses: Vec<PanelEntry>,
    pub children: Vec<PanelEntry>,
    pub siblings: Vec<PanelEntry>,
    pub grandparents: Vec<PanelEntry>,
    pub extended: Vec<PanelEntry>,
    pub other: Vec<PanelEntry>,
}

impl CategorizedRelationships {
    pub fn bucket(&self, category: Category) -> &[PanelEntry] {
        match category {
            Category::Parents => &self.parents,
            Category::Spouses => &self.spouses,
            Category::Children => &self.children,
            Category::Siblings => &self.siblings,
            Category::Grandparents => &self.grandparents,
            Category::Extended => &self.extended,
            Category::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<PanelEntry> {
        match category {
            Category::Parents => &mut self.parents,
            Category::Spouses => &mut self.spouses,
            Category::Children => &mut self.children,
            Category::Siblings => &mut self.siblings,
            Category::Grandparents => &mut self.grandparents,
            Category::Extended => &mut self.extended,
            Category::Other => &mut self.other,
        }
    }

    /// Non-empty buckets in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[PanelEntry])> {
        Category::ALL
            .into_iter()
            .map(move |c| (c, self.bucket(c)))
            .filter(|(_, entries)| !entries.is_empty())
    }

    /// Total entries across all buckets.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.bucket(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_relationships_by_category(entries: &[PanelEntry]) -> CategorizedRelationships {
    let mut grouped = CategorizedRelationships::default();
    for entry in entries {
        grouped.bucket_mut(category_of(entry.kind())).push(entry.clone());
    }
    grouped
}

/// Stable sort by [`priority_of`]; equal ranks keep their input order.
pub fn sort_relationships_by_priority(entries: &mut [PanelEntry]) {
    entries.sort_by_key(|e| priority_of(e.kind()));
}
