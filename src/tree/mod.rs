//! # Tree Projection
//!
//! Bounded breadth-first walk from a root member, producing the node/edge
//! view a family-tree widget draws.
//!
//! The walk treats every stored edge as undirected for reachability and
//! keeps the stored direction only as the edge label. A visited set makes
//! each member appear once, however many paths lead to it, and guarantees
//! termination on cyclic data (couples, remarriages into a sibling line).
//!
//! Edges created after the walk starts are ignored: the store watermark is
//! read once up front and any edge id at or above it is skipped.

use std::collections::VecDeque;

use hashbrown::HashSet;
use tracing::debug;

use crate::model::*;
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Project the subgraph within `max_depth` hops of `root`.
///
/// Fails with `UnknownMember` if `root` does not exist. A `max_depth` of
/// zero yields the root alone.
pub async fn project_tree<S>(store: &S, root: MemberId, max_depth: usize) -> Result<FamilyTree>
where
    S: GraphStore + ?Sized,
{
    let root_member = store.get_member(root).await?.ok_or(Error::UnknownMember(root))?;
    let watermark = store.watermark().await?;

    let mut tree = FamilyTree::default();
    tree.nodes.push(TreeNode::from(&root_member));

    let mut visited: HashSet<MemberId> = HashSet::new();
    visited.insert(root);
    let mut recorded: HashSet<TreeEdge> = HashSet::new();
    let mut queue: VecDeque<(MemberId, usize)> = VecDeque::from([(root, 0)]);

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }

        let edges = store.list_edges_for_member(current).await?;
        for rel in edges.iter().filter(|r| r.id < watermark) {
            let Some(next) = rel.other_member(current) else {
                continue;
            };

            if !visited.contains(&next) {
                // Deleted since the adjacency read
                let Some(member) = store.get_member(next).await? else {
                    debug!(member = %next, rel = %rel.id, "skipping edge to missing member");
                    continue;
                };
                visited.insert(next);
                tree.nodes.push(TreeNode::from(&member));
                queue.push_back((next, depth + 1));
            }

            let edge = TreeEdge {
                from: rel.member1_id,
                to: rel.member2_id,
                label: rel.relationship_type,
            };
            if recorded.insert(edge) {
                tree.edges.push(edge);
            }
        }
    }

    debug!(
        root = %root,
        max_depth,
        nodes = tree.nodes.len(),
        edges = tree.edges.len(),
        "tree projected"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    async fn person(db: &MemoryStore, name: &str) -> MemberId {
        db.create_member(NewMember::new(name)).await.unwrap().id
    }

    #[tokio::test]
    async fn test_unknown_root() {
        let db = MemoryStore::new();
        let err = project_tree(&db, MemberId(5), 3).await.unwrap_err();
        assert!(matches!(err, Error::UnknownMember(MemberId(5))));
    }

    #[tokio::test]
    async fn test_isolated_root() {
        let db = MemoryStore::new();
        let a = person(&db, "Ada").await;
        let tree = project_tree(&db, a, 3).await.unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].id, a);
        assert_eq!(tree.nodes[0].label, "Ada");
        assert!(tree.edges.is_empty());
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let db = MemoryStore::new();
        let a = person(&db, "A").await;
        let b = person(&db, "B").await;
        let c = person(&db, "C").await;
        let d = person(&db, "D").await;
        db.create_relationship(a, b, RelationshipType::Father).await.unwrap();
        db.create_relationship(b, c, RelationshipType::Father).await.unwrap();
        db.create_relationship(c, d, RelationshipType::Father).await.unwrap();

        let tree = project_tree(&db, a, 2).await.unwrap();
        let ids: Vec<MemberId> = tree.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(tree.edges.len(), 2);

        let tree = project_tree(&db, a, 0).await.unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.edges.is_empty());
    }

    #[tokio::test]
    async fn test_walks_against_stored_direction() {
        let db = MemoryStore::new();
        let child = person(&db, "Child").await;
        let parent = person(&db, "Parent").await;
        db.create_relationship(parent, child, RelationshipType::Mother).await.unwrap();

        let tree = project_tree(&db, child, 1).await.unwrap();
        assert!(tree.contains(parent));
        assert_eq!(
            tree.edges,
            vec![TreeEdge { from: parent, to: child, label: RelationshipType::Mother }]
        );
    }

    /// Creates one extra edge the first time the projector asks for a
    /// member's adjacency, simulating a concurrent writer.
    struct RacingStore {
        inner: MemoryStore,
        pair: (MemberId, MemberId),
        fired: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl GraphStore for RacingStore {
        async fn create_member(&self, m: NewMember) -> Result<Member> { self.inner.create_member(m).await }
        async fn get_member(&self, id: MemberId) -> Result<Option<Member>> { self.inner.get_member(id).await }
        async fn update_member(&self, id: MemberId, p: MemberPatch) -> Result<Member> { self.inner.update_member(id, p).await }
        async fn delete_member(&self, id: MemberId) -> Result<bool> { self.inner.delete_member(id).await }
        async fn all_members(&self) -> Result<Vec<Member>> { self.inner.all_members().await }
        async fn member_count(&self) -> Result<u64> { self.inner.member_count().await }
        async fn create_relationship(&self, a: MemberId, b: MemberId, t: RelationshipType) -> Result<Relationship> {
            self.inner.create_relationship(a, b, t).await
        }
        async fn get_relationship(&self, id: RelId) -> Result<Option<Relationship>> { self.inner.get_relationship(id).await }
        async fn delete_relationship(&self, id: RelId) -> Result<()> { self.inner.delete_relationship(id).await }
        async fn correct_relationship_type(&self, id: RelId, t: RelationshipType) -> Result<Relationship> {
            self.inner.correct_relationship_type(id, t).await
        }
        async fn all_relationships(&self) -> Result<Vec<Relationship>> { self.inner.all_relationships().await }
        async fn relationship_count(&self) -> Result<u64> { self.inner.relationship_count().await }
        async fn watermark(&self) -> Result<RelId> { self.inner.watermark().await }
        async fn edges_for_member(
            &self,
            member: MemberId,
            dir: Direction,
            rel_type: Option<RelationshipType>,
        ) -> Result<Vec<Relationship>> {
            if !self.fired.swap(true, std::sync::atomic::Ordering::SeqCst) {
                let (a, b) = self.pair;
                self.inner.create_relationship(a, b, RelationshipType::Brother).await?;
            }
            self.inner.edges_for_member(member, dir, rel_type).await
        }
        async fn create_union(&self, u: NewUnion) -> Result<Union> { self.inner.create_union(u).await }
        async fn get_union(&self, id: UnionId) -> Result<Option<Union>> { self.inner.get_union(id).await }
        async fn update_union(&self, id: UnionId, p: UnionPatch) -> Result<Union> { self.inner.update_union(id, p).await }
        async fn delete_union(&self, id: UnionId) -> Result<()> { self.inner.delete_union(id).await }
        async fn unions_for_member(&self, m: MemberId) -> Result<Vec<Union>> { self.inner.unions_for_member(m).await }
    }

    #[tokio::test]
    async fn test_ignores_edges_created_mid_walk() {
        let inner = MemoryStore::new();
        let a = person(&inner, "A").await;
        let b = person(&inner, "B").await;
        let c = person(&inner, "C").await;
        inner.create_relationship(a, b, RelationshipType::Brother).await.unwrap();

        let store = RacingStore { inner, pair: (a, c), fired: Default::default() };
        let tree = project_tree(&store, a, 3).await.unwrap();

        assert!(!tree.contains(c));
        assert_eq!(tree.edges.len(), 1);
        // The racing edge did land in the store
        assert_eq!(store.relationship_count().await.unwrap(), 2);
    }
}
