//! # Family Graph Model
//!
//! Clean DTOs for members, relationship edges, unions and tree projections.
//! These types cross every boundary: storage ↔ aggregation ↔ projection ↔ caller.
//!
//! Pure data: no I/O, no locks, no async.

pub mod member;
pub mod relationship;
pub mod union;
pub mod tree;

pub use member::{Gender, Member, MemberId, MemberPatch, MemberSummary, NewMember};
pub use relationship::{Direction, EdgeSide, RelId, Relationship, RelationshipRecord, RelationshipType};
pub use union::{NewUnion, Union, UnionId, UnionPatch, UnionType};
pub use tree::{FamilyTree, TreeEdge, TreeNode};

/// Deserialize a clearable patch field: a missing key stays `None` (keep)
/// via `#[serde(default)]`, an explicit `null` becomes `Some(None)` (clear).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}
