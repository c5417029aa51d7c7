//! Relationship (directed, typed edge) between two members.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MemberId;
use crate::{Error, Result};

/// Opaque relationship identifier. Ids are assigned in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelId(pub u64);

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Edge filter for adjacency queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Which end of a stored edge a subject member sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSide {
    /// The subject is member1.
    Outgoing,
    /// The subject is member2.
    Incoming,
}

impl From<EdgeSide> for Direction {
    fn from(side: EdgeSide) -> Self {
        match side {
            EdgeSide::Outgoing => Direction::Outgoing,
            EdgeSide::Incoming => Direction::Incoming,
        }
    }
}

/// Closed set of relationship types. The type describes member1's relation
/// *to* member2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Father,
    Mother,
    Son,
    Daughter,
    Brother,
    Sister,
    Husband,
    Wife,
    Grandfather,
    Grandmother,
    Grandson,
    Granddaughter,
    Uncle,
    Aunt,
    Nephew,
    Niece,
    Cousin,
    Other,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 18] = [
        RelationshipType::Father,
        RelationshipType::Mother,
        RelationshipType::Son,
        RelationshipType::Daughter,
        RelationshipType::Brother,
        RelationshipType::Sister,
        RelationshipType::Husband,
        RelationshipType::Wife,
        RelationshipType::Grandfather,
        RelationshipType::Grandmother,
        RelationshipType::Grandson,
        RelationshipType::Granddaughter,
        RelationshipType::Uncle,
        RelationshipType::Aunt,
        RelationshipType::Nephew,
        RelationshipType::Niece,
        RelationshipType::Cousin,
        RelationshipType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Father => "father",
            RelationshipType::Mother => "mother",
            RelationshipType::Son => "son",
            RelationshipType::Daughter => "daughter",
            RelationshipType::Brother => "brother",
            RelationshipType::Sister => "sister",
            RelationshipType::Husband => "husband",
            RelationshipType::Wife => "wife",
            RelationshipType::Grandfather => "grandfather",
            RelationshipType::Grandmother => "grandmother",
            RelationshipType::Grandson => "grandson",
            RelationshipType::Granddaughter => "granddaughter",
            RelationshipType::Uncle => "uncle",
            RelationshipType::Aunt => "aunt",
            RelationshipType::Nephew => "nephew",
            RelationshipType::Niece => "niece",
            RelationshipType::Cousin => "cousin",
            RelationshipType::Other => "other",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        RelationshipType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::InvalidType { kind: "relationship", value: s.to_string() })
    }
}

/// A stored relationship edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelId,
    pub member1_id: MemberId,
    pub member2_id: MemberId,
    pub relationship_type: RelationshipType,
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    pub fn new(
        id: RelId,
        member1_id: MemberId,
        member2_id: MemberId,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            id,
            member1_id,
            member2_id,
            relationship_type,
            created_at: Utc::now(),
        }
    }

    /// The "other" end of the relationship from the given member.
    pub fn other_member(&self, from: MemberId) -> Option<MemberId> {
        if from == self.member1_id { Some(self.member2_id) }
        else if from == self.member2_id { Some(self.member1_id) }
        else { None }
    }

    /// `Outgoing` when `subject` is member1, `Incoming` when member2.
    pub fn direction_from(&self, subject: MemberId) -> Option<EdgeSide> {
        if subject == self.member1_id { Some(EdgeSide::Outgoing) }
        else if subject == self.member2_id { Some(EdgeSide::Incoming) }
        else { None }
    }

    pub fn involves(&self, member: MemberId) -> bool {
        self.member1_id == member || self.member2_id == member
    }
}

/// A relationship as listed for a caller, with its direction relative to
/// the member the listing was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    #[serde(flatten)]
    pub relationship: Relationship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<EdgeSide>,
}
