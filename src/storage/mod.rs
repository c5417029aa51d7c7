//! # Graph Store Trait
//!
//! This is THE contract between the relationship engine and any storage
//! engine. Aggregation and tree projection only ever read through it.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryStore;

/// The universal storage contract for members, relationship edges and unions.
///
/// Structural invariants are enforced on write: no self-relationships, no
/// edges to unknown members. Reciprocal edges are never generated; callers
/// that want both directions physically stored write two independent edges.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    // ========================================================================
    // Member CRUD
    // ========================================================================

    /// Create a member. Fails with `Validation` on malformed fields.
    async fn create_member(&self, member: NewMember) -> Result<Member>;

    /// Get a member by ID. Returns None if not found.
    async fn get_member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Apply a partial update. `UnknownMember` if absent.
    async fn update_member(&self, id: MemberId, patch: MemberPatch) -> Result<Member>;

    /// Delete a member. Returns true if it existed.
    /// Fails with `ConstraintViolation` while relationships or unions still
    /// reference the member.
    async fn delete_member(&self, id: MemberId) -> Result<bool>;

    /// Delete a member together with every relationship and union touching it.
    ///
    /// Default: delete incident edges one by one, then the member.
    async fn detach_delete_member(&self, id: MemberId) -> Result<bool> {
        for rel in self.list_edges_for_member(id).await? {
            match self.delete_relationship(rel.id).await {
                Ok(()) | Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        for union in self.unions_for_member(id).await? {
            match self.delete_union(union.id).await {
                Ok(()) | Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.delete_member(id).await
    }

    /// All members in id order.
    async fn all_members(&self) -> Result<Vec<Member>>;

    async fn member_count(&self) -> Result<u64>;

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    /// Create a relationship: `member1` is `rel_type` of `member2`.
    ///
    /// Fails with `SelfRelationship` when the ids are equal and
    /// `UnknownMember` when either does not resolve.
    async fn create_relationship(
        &self,
        member1: MemberId,
        member2: MemberId,
        rel_type: RelationshipType,
    ) -> Result<Relationship>;

    /// Get a relationship by ID.
    async fn get_relationship(&self, id: RelId) -> Result<Option<Relationship>>;

    /// Delete a relationship. `NotFound` if absent.
    async fn delete_relationship(&self, id: RelId) -> Result<()>;

    /// Replace the type of a stored edge. The correction is a new logical
    /// fact: the old record is removed and a new one with a fresh id and
    /// timestamp takes its place.
    async fn correct_relationship_type(
        &self,
        id: RelId,
        rel_type: RelationshipType,
    ) -> Result<Relationship>;

    /// All relationships in id (creation) order.
    async fn all_relationships(&self) -> Result<Vec<Relationship>>;

    async fn relationship_count(&self) -> Result<u64>;

    /// The id the next created relationship will receive. Every edge that
    /// existed when this was read has a strictly smaller id.
    async fn watermark(&self) -> Result<RelId>;

    // ========================================================================
    // Adjacency
    // ========================================================================

    /// Relationships of a member, filtered by direction and type, in
    /// insertion order.
    async fn edges_for_member(
        &self,
        member: MemberId,
        dir: Direction,
        rel_type: Option<RelationshipType>,
    ) -> Result<Vec<Relationship>>;

    /// Every stored edge with the member at either end, unfiltered.
    /// Logically redundant edges are returned as stored.
    async fn list_edges_for_member(&self, member: MemberId) -> Result<Vec<Relationship>> {
        self.edges_for_member(member, Direction::Both, None).await
    }

    // ========================================================================
    // Union CRUD
    // ========================================================================

    /// Create a union. Both partner ids are existence-checked when present.
    async fn create_union(&self, union: NewUnion) -> Result<Union>;

    async fn get_union(&self, id: UnionId) -> Result<Option<Union>>;

    /// Apply a partial update. `NotFound` if absent.
    async fn update_union(&self, id: UnionId, patch: UnionPatch) -> Result<Union>;

    /// Delete a union. `NotFound` if absent.
    async fn delete_union(&self, id: UnionId) -> Result<()>;

    /// Unions a member takes part in, in id order.
    async fn unions_for_member(&self, member: MemberId) -> Result<Vec<Union>>;
}
