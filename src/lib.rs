//! # kinship-graph — Family Relationship Graph Engine
//!
//! Records members and the typed relationships between them, and answers
//! two questions: what is a member's canonical, de-duplicated relationship
//! panel, and what bounded subgraph should be drawn as their family tree.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the engine and storage
//! 2. **One row per fact**: reciprocals are derived at read time, never stored
//! 3. **Pure pipelines**: aggregation is a pure function over views
//! 4. **Direction-agnostic walks**: tree projection reads edges as undirected
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kinship_graph::{FamilyGraph, Gender, GraphStore, NewMember};
//!
//! # async fn example() -> kinship_graph::Result<()> {
//! let graph = FamilyGraph::open_memory();
//!
//! let john = graph.store().create_member(NewMember::new("John").with_gender(Gender::Male)).await?;
//! let ada = graph.store().create_member(NewMember::new("Ada").with_gender(Gender::Female)).await?;
//! graph.create_relationship(john.id, ada.id, "father").await?;
//!
//! let panel = graph.relationship_panel(ada.id).await?;
//! let tree = graph.tree(john.id, None).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod reciprocal;
pub mod aggregate;
pub mod tree;
pub mod config;
pub mod export;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    Direction, EdgeSide, FamilyTree, Gender, Member, MemberId, MemberPatch, MemberSummary, NewMember,
    NewUnion, RelId, Relationship, RelationshipRecord, RelationshipType, TreeEdge, TreeNode,
    Union, UnionId, UnionPatch, UnionType,
};
pub use storage::{GraphStore, MemoryStore};
pub use reciprocal::{GenderPolicy, reciprocal, reciprocal_with};
pub use aggregate::{PanelEntry, RelationshipAggregator, RelationshipPanel, RelationshipView};
pub use tree::project_tree;
pub use config::EngineConfig;

use tracing::debug;

// ============================================================================
// Top-level FamilyGraph handle
// ============================================================================

/// The primary entry point. A `FamilyGraph` wraps a store and exposes the
/// operations a presentation layer calls.
pub struct FamilyGraph<S: GraphStore> {
    store: S,
    config: EngineConfig,
    aggregator: RelationshipAggregator,
}

impl<S: GraphStore> FamilyGraph<S> {
    /// Create a FamilyGraph over the given store with default config.
    pub fn with_store(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        let aggregator = RelationshipAggregator::new(config.parent_combination.combiner());
        Self { store, config, aggregator }
    }

    /// Access the underlying store (member CRUD, raw edge reads).
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Create `member1 -[rel_type]-> member2` from an untyped type name.
    ///
    /// Fails with `InvalidType` before touching the store when the name is
    /// outside the closed set.
    pub async fn create_relationship(
        &self,
        member1: MemberId,
        member2: MemberId,
        rel_type: &str,
    ) -> Result<Relationship> {
        let rel_type: RelationshipType = rel_type.parse()?;
        self.store.create_relationship(member1, member2, rel_type).await
    }

    pub async fn delete_relationship(&self, id: RelId) -> Result<()> {
        self.store.delete_relationship(id).await
    }

    /// List relationships. With a member, only edges touching it are
    /// returned and each carries its direction relative to that member.
    pub async fn list_relationships(&self, member: Option<MemberId>) -> Result<Vec<RelationshipRecord>> {
        let Some(member) = member else {
            let all = self.store.all_relationships().await?;
            return Ok(all
                .into_iter()
                .map(|relationship| RelationshipRecord { relationship, direction: None })
                .collect());
        };

        self.require_member(member).await?;
        let edges = self.store.list_edges_for_member(member).await?;
        Ok(edges
            .into_iter()
            .map(|relationship| {
                let direction = relationship.direction_from(member);
                RelationshipRecord { relationship, direction }
            })
            .collect())
    }

    /// Every edge touching `member`, as seen from `member`, in store order.
    ///
    /// Only edges that existed when the read started are included; an edge
    /// whose counter-party vanished mid-read is skipped.
    pub async fn relationship_views(&self, member: MemberId) -> Result<Vec<RelationshipView>> {
        self.require_member(member).await?;
        let watermark = self.store.watermark().await?;
        let edges = self.store.list_edges_for_member(member).await?;

        let mut views = Vec::with_capacity(edges.len());
        for rel in edges.iter().filter(|r| r.id < watermark) {
            let Some(other) = rel.other_member(member) else { continue };
            let Some(counterpart) = self.store.get_member(other).await? else {
                debug!(member = %member, other = %other, "counter-party missing, skipping edge");
                continue;
            };
            if let Some(view) =
                RelationshipView::derive(member, rel, counterpart.summary(), self.config.gender_policy)
            {
                views.push(view);
            }
        }
        Ok(views)
    }

    /// The canonical relationship panel for a member page.
    pub async fn relationship_panel(&self, member: MemberId) -> Result<RelationshipPanel> {
        let views = self.relationship_views(member).await?;
        let panel = self.aggregator.aggregate(member, &views);
        debug!(member = %member, raw = views.len(), entries = panel.entries.len(), "panel aggregated");
        Ok(panel)
    }

    /// The label `other` holds toward `member`, read from the edge that
    /// survives de-duplication. `None` when they are not directly related.
    pub async fn relation_between(&self, member: MemberId, other: MemberId) -> Result<Option<RelationshipType>> {
        let views = self.relationship_views(member).await?;
        Ok(aggregate::process_relationships(&views)
            .into_iter()
            .find(|v| v.counterpart.id == other)
            .map(|v| v.label))
    }

    // ========================================================================
    // Tree
    // ========================================================================

    /// Project the family tree around `root`. `depth` defaults to the
    /// configured default and is clamped to the configured maximum.
    pub async fn tree(&self, root: MemberId, depth: Option<usize>) -> Result<FamilyTree> {
        let resolved = self.config.tree_depth(depth);
        if let Some(requested) = depth.filter(|d| *d > resolved) {
            tracing::warn!(requested, clamped = resolved, "tree depth clamped");
        }
        tree::project_tree(&self.store, root, resolved).await
    }

    // ========================================================================
    // Unions
    // ========================================================================

    /// Create a union from an untyped union type name; a blank name records
    /// no type.
    pub async fn create_union(
        &self,
        partner1: MemberId,
        partner2: Option<MemberId>,
        union_type: &str,
        is_primary: bool,
    ) -> Result<Union> {
        let mut union = NewUnion::new(partner1);
        union.partner2_id = partner2;
        union.union_type = UnionType::parse_optional(union_type)?;
        union.is_primary = is_primary;
        self.store.create_union(union).await
    }

    pub async fn delete_union(&self, id: UnionId) -> Result<()> {
        self.store.delete_union(id).await
    }

    pub async fn unions_for(&self, member: MemberId) -> Result<Vec<Union>> {
        self.require_member(member).await?;
        self.store.unions_for_member(member).await
    }

    async fn require_member(&self, member: MemberId) -> Result<()> {
        match self.store.get_member(member).await? {
            Some(_) => Ok(()),
            None => Err(Error::UnknownMember(member)),
        }
    }
}

/// In-memory family graph for testing and embedding.
impl FamilyGraph<MemoryStore> {
    pub fn open_memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Member {0} cannot be related to themselves")]
    SelfRelationship(MemberId),

    #[error("Unknown member: {0}")]
    UnknownMember(MemberId),

    #[error("Invalid {kind} type: {value:?}")]
    InvalidType { kind: &'static str, value: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
