//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! It uses hash maps protected by one `RwLock` per collection.
//!
//! ## Locking
//!
//! Locks are always taken in the order members → relationships →
//! adjacency → unions → union index, and never held across an `.await`.
//! Relationship and union creation hold the members read lock while they
//! insert, so a concurrent member delete cannot leave a dangling edge.
//!
//! ## Limitations
//!
//! - **No persistence**: everything lives in process memory.
//! - **No multi-edge transactions**: each write is atomic on its own; two
//!   writes that belong together (an edge and its explicit reciprocal) are
//!   independent and neither is rolled back if the other fails.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::model::*;
use crate::{Error, Result};
use super::GraphStore;

/// Most members have a handful of direct relatives.
type EdgeList = SmallVec<[RelId; 8]>;
type UnionList = SmallVec<[UnionId; 2]>;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory family graph storage.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    members: RwLock<HashMap<MemberId, Member>>,
    relationships: RwLock<HashMap<RelId, Relationship>>,
    /// member_id → relationship ids touching it, in insertion order.
    /// Undirected: each edge is listed under both endpoints.
    adjacency: RwLock<HashMap<MemberId, EdgeList>>,
    unions: RwLock<HashMap<UnionId, Union>>,
    /// member_id → union ids the member takes part in
    union_index: RwLock<HashMap<MemberId, UnionList>>,
    next_member_id: AtomicU64,
    next_rel_id: AtomicU64,
    next_union_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                members: RwLock::new(HashMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                unions: RwLock::new(HashMap::new()),
                union_index: RwLock::new(HashMap::new()),
                next_member_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
                next_union_id: AtomicU64::new(1),
            }),
        }
    }

    fn insert_relationship(
        &self,
        member1: MemberId,
        member2: MemberId,
        rel_type: RelationshipType,
    ) -> Relationship {
        let id = RelId(self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed));
        let rel = Relationship::new(id, member1, member2, rel_type);

        self.inner.relationships.write().insert(id, rel.clone());

        let mut adj = self.inner.adjacency.write();
        adj.entry(member1).or_default().push(id);
        adj.entry(member2).or_default().push(id);

        rel
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

#[async_trait]
impl GraphStore for MemoryStore {
    // ========================================================================
    // Member CRUD
    // ========================================================================

    async fn create_member(&self, member: NewMember) -> Result<Member> {
        member.validate()?;
        let id = MemberId(self.inner.next_member_id.fetch_add(1, Ordering::Relaxed));
        let member = member.into_member(id, Utc::now());
        self.inner.members.write().insert(id, member.clone());
        debug!(member = %id, "member created");
        Ok(member)
    }

    async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.inner.members.read().get(&id).cloned())
    }

    async fn update_member(&self, id: MemberId, patch: MemberPatch) -> Result<Member> {
        let mut members = self.inner.members.write();
        let current = members.get(&id).ok_or(Error::UnknownMember(id))?;
        let next = patch.apply(current, Utc::now())?;
        members.insert(id, next.clone());
        Ok(next)
    }

    async fn delete_member(&self, id: MemberId) -> Result<bool> {
        let mut members = self.inner.members.write();
        if !members.contains_key(&id) {
            return Ok(false);
        }

        // Connected members cannot be removed without detaching first
        let edges = self.inner.adjacency.read().get(&id).map_or(0, |l| l.len());
        let unions = self.inner.union_index.read().get(&id).map_or(0, |l| l.len());
        if edges > 0 || unions > 0 {
            warn!(member = %id, edges, unions, "refusing to delete connected member");
            return Err(Error::ConstraintViolation(format!(
                "Cannot delete member {id} with {edges} relationships and {unions} unions. Detach first."
            )));
        }

        members.remove(&id);
        self.inner.adjacency.write().remove(&id);
        self.inner.union_index.write().remove(&id);
        info!(member = %id, "member deleted");
        Ok(true)
    }

    /// Atomic override: every lock is held for the whole detach.
    async fn detach_delete_member(&self, id: MemberId) -> Result<bool> {
        let mut members = self.inner.members.write();
        if !members.contains_key(&id) {
            return Ok(false);
        }
        let mut rels = self.inner.relationships.write();
        let mut adj = self.inner.adjacency.write();
        let mut unions = self.inner.unions.write();
        let mut union_index = self.inner.union_index.write();

        let edge_ids = adj.remove(&id).unwrap_or_default();
        for rid in &edge_ids {
            if let Some(rel) = rels.remove(rid) {
                if let Some(other) = rel.other_member(id) {
                    if let Some(list) = adj.get_mut(&other) {
                        list.retain(|r| r != rid);
                    }
                }
            }
        }

        let union_ids = union_index.remove(&id).unwrap_or_default();
        for uid in &union_ids {
            if let Some(union) = unions.remove(uid) {
                if let Some(partner) = union.partner_of(id) {
                    if let Some(list) = union_index.get_mut(&partner) {
                        list.retain(|u| u != uid);
                    }
                }
            }
        }

        members.remove(&id);
        info!(
            member = %id,
            relationships = edge_ids.len(),
            unions = union_ids.len(),
            "member detached and deleted"
        );
        Ok(true)
    }

    async fn all_members(&self) -> Result<Vec<Member>> {
        let mut all: Vec<Member> = self.inner.members.read().values().cloned().collect();
        all.sort_by_key(|m| m.id);
        Ok(all)
    }

    async fn member_count(&self) -> Result<u64> {
        Ok(self.inner.members.read().len() as u64)
    }

    // ========================================================================
    // Relationship CRUD
    // ========================================================================

    async fn create_relationship(
        &self,
        member1: MemberId,
        member2: MemberId,
        rel_type: RelationshipType,
    ) -> Result<Relationship> {
        if member1 == member2 {
            return Err(Error::SelfRelationship(member1));
        }

        // Held until the edge is indexed
        let members = self.inner.members.read();
        for id in [member1, member2] {
            if !members.contains_key(&id) {
                return Err(Error::UnknownMember(id));
            }
        }

        let rel = self.insert_relationship(member1, member2, rel_type);
        drop(members);

        info!(rel = %rel.id, from = %member1, to = %member2, rel_type = %rel_type, "relationship created");
        Ok(rel)
    }

    async fn get_relationship(&self, id: RelId) -> Result<Option<Relationship>> {
        Ok(self.inner.relationships.read().get(&id).cloned())
    }

    async fn delete_relationship(&self, id: RelId) -> Result<()> {
        let removed = self.inner.relationships.write().remove(&id);
        let rel = removed.ok_or_else(|| Error::NotFound(format!("Relationship {id}")))?;

        let mut adj = self.inner.adjacency.write();
        for member in [rel.member1_id, rel.member2_id] {
            if let Some(list) = adj.get_mut(&member) {
                list.retain(|rid| *rid != id);
            }
        }
        info!(rel = %id, "relationship deleted");
        Ok(())
    }

    async fn correct_relationship_type(
        &self,
        id: RelId,
        rel_type: RelationshipType,
    ) -> Result<Relationship> {
        let members = self.inner.members.read();
        let old = self.inner.relationships.write().remove(&id)
            .ok_or_else(|| Error::NotFound(format!("Relationship {id}")))?;
        {
            let mut adj = self.inner.adjacency.write();
            for member in [old.member1_id, old.member2_id] {
                if let Some(list) = adj.get_mut(&member) {
                    list.retain(|rid| *rid != id);
                }
            }
        }
        let rel = self.insert_relationship(old.member1_id, old.member2_id, rel_type);
        drop(members);

        info!(old = %id, new = %rel.id, from = %old.relationship_type, to = %rel_type, "relationship type corrected");
        Ok(rel)
    }

    async fn all_relationships(&self) -> Result<Vec<Relationship>> {
        let mut all: Vec<Relationship> = self.inner.relationships.read().values().cloned().collect();
        all.sort_by_key(|r| r.id);
        Ok(all)
    }

    async fn relationship_count(&self) -> Result<u64> {
        Ok(self.inner.relationships.read().len() as u64)
    }

    async fn watermark(&self) -> Result<RelId> {
        Ok(RelId(self.inner.next_rel_id.load(Ordering::Relaxed)))
    }

    // ========================================================================
    // Adjacency
    // ========================================================================

    async fn edges_for_member(
        &self,
        member: MemberId,
        dir: Direction,
        rel_type: Option<RelationshipType>,
    ) -> Result<Vec<Relationship>> {
        let rels = self.inner.relationships.read();
        let adj = self.inner.adjacency.read();

        let Some(rel_ids) = adj.get(&member) else {
            return Ok(Vec::new());
        };

        let result = rel_ids
            .iter()
            .filter_map(|rid| rels.get(rid))
            .filter(|rel| match dir {
                Direction::Outgoing => rel.member1_id == member,
                Direction::Incoming => rel.member2_id == member,
                Direction::Both => true,
            })
            .filter(|rel| rel_type.is_none_or(|t| rel.relationship_type == t))
            .cloned()
            .collect();

        Ok(result)
    }

    // ========================================================================
    // Union CRUD
    // ========================================================================

    async fn create_union(&self, union: NewUnion) -> Result<Union> {
        union.validate()?;

        let members = self.inner.members.read();
        let partners = std::iter::once(union.partner1_id).chain(union.partner2_id);
        for id in partners {
            if !members.contains_key(&id) {
                return Err(Error::UnknownMember(id));
            }
        }

        let id = UnionId(self.inner.next_union_id.fetch_add(1, Ordering::Relaxed));
        let record = Union {
            id,
            partner1_id: union.partner1_id,
            partner2_id: union.partner2_id,
            union_type: union.union_type,
            is_primary: union.is_primary,
            start_date: union.start_date,
            end_date: union.end_date,
            created_at: Utc::now(),
        };

        self.inner.unions.write().insert(id, record.clone());
        {
            let mut idx = self.inner.union_index.write();
            idx.entry(record.partner1_id).or_default().push(id);
            if let Some(p2) = record.partner2_id {
                idx.entry(p2).or_default().push(id);
            }
        }
        drop(members);

        info!(union = %id, partner1 = %record.partner1_id, "union created");
        Ok(record)
    }

    async fn get_union(&self, id: UnionId) -> Result<Option<Union>> {
        Ok(self.inner.unions.read().get(&id).cloned())
    }

    async fn update_union(&self, id: UnionId, patch: UnionPatch) -> Result<Union> {
        let members = self.inner.members.read();
        let mut unions = self.inner.unions.write();
        let current = unions.get(&id).ok_or_else(|| Error::NotFound(format!("Union {id}")))?;
        let next = patch.apply(current)?;

        if let Some(p2) = next.partner2_id {
            if !members.contains_key(&p2) {
                return Err(Error::UnknownMember(p2));
            }
        }

        if next.partner2_id != current.partner2_id {
            let mut idx = self.inner.union_index.write();
            if let Some(old) = current.partner2_id {
                if let Some(list) = idx.get_mut(&old) {
                    list.retain(|u| *u != id);
                }
            }
            if let Some(new) = next.partner2_id {
                idx.entry(new).or_default().push(id);
            }
        }

        unions.insert(id, next.clone());
        Ok(next)
    }

    async fn delete_union(&self, id: UnionId) -> Result<()> {
        let removed = self.inner.unions.write().remove(&id);
        let union = removed.ok_or_else(|| Error::NotFound(format!("Union {id}")))?;

        let mut idx = self.inner.union_index.write();
        let partners = std::iter::once(union.partner1_id).chain(union.partner2_id);
        for member in partners {
            if let Some(list) = idx.get_mut(&member) {
                list.retain(|u| *u != id);
            }
        }
        info!(union = %id, "union deleted");
        Ok(())
    }

    async fn unions_for_member(&self, member: MemberId) -> Result<Vec<Union>> {
        let unions = self.inner.unions.read();
        let idx = self.inner.union_index.read();
        let mut result: Vec<Union> = idx
            .get(&member)
            .map(|ids| ids.iter().filter_map(|id| unions.get(id).cloned()).collect())
            .unwrap_or_default();
        result.sort_by_key(|u| u.id);
        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================
