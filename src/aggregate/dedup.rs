//! Collapse a subject's raw edges to one view per related member.

use hashbrown::HashMap;

use crate::model::{EdgeSide, MemberId};
use super::RelationshipView;

/// De-duplicate by counter-party.
///
/// Within each counter-party group the first outgoing view wins; when the
/// group has none, the first incoming view does. Groups come out in the
/// order their counter-party first appears in `views`, so the result is only
/// as stable as the input order.
pub fn process_relationships(views: &[RelationshipView]) -> Vec<RelationshipView> {
    let mut slots: HashMap<MemberId, usize> = HashMap::with_capacity(views.len());
    let mut kept: Vec<&RelationshipView> = Vec::with_capacity(views.len());

    for view in views {
        match slots.get(&view.counterpart.id) {
            None => {
                slots.insert(view.counterpart.id, kept.len());
                kept.push(view);
            }
            Some(&slot) => {
                let current = kept[slot];
                if current.direction != EdgeSide::Outgoing && view.direction == EdgeSide::Outgoing {
                    kept[slot] = view;
                }
            }
        }
    }

    kept.into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::view;
    use crate::model::{RelId, RelationshipType};
    use proptest::prelude::*;

    #[test]
    fn keeps_one_view_per_counterpart() {
        let views = vec![
            view(1, 10, RelationshipType::Father, EdgeSide::Incoming),
            view(2, 10, RelationshipType::Daughter, EdgeSide::Outgoing),
            view(3, 11, RelationshipType::Brother, EdgeSide::Incoming),
            view(4, 10, RelationshipType::Daughter, EdgeSide::Outgoing),
        ];
        let out = process_relationships(&views);
        let ids: Vec<RelId> = out.iter().map(|v| v.relationship_id).collect();
        assert_eq!(ids, vec![RelId(2), RelId(3)]);
    }

    #[test]
    fn first_incoming_wins_without_outgoing() {
        let views = vec![
            view(1, 10, RelationshipType::Father, EdgeSide::Incoming),
            view(2, 10, RelationshipType::Uncle, EdgeSide::Incoming),
        ];
        let out = process_relationships(&views);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].relationship_id, RelId(1));
    }

    #[test]
    fn empty_input() {
        assert!(process_relationships(&[]).is_empty());
    }

    fn arb_views() -> impl Strategy<Value = Vec<RelationshipView>> {
        prop::collection::vec((0u64..5, any::<bool>(), 0..RelationshipType::ALL.len()), 0..24)
            .prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, (other, outgoing, t))| {
                        let dir = if outgoing { EdgeSide::Outgoing } else { EdgeSide::Incoming };
                        view(i as u64 + 1, 100 + other, RelationshipType::ALL[t], dir)
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent(views in arb_views()) {
            let once = process_relationships(&views);
            let twice = process_relationships(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn one_entry_per_counterpart(views in arb_views()) {
            let out = process_relationships(&views);
            let mut seen = std::collections::HashSet::new();
            for v in &out {
                prop_assert!(seen.insert(v.counterpart.id));
            }
            let distinct: std::collections::HashSet<_> = views.iter().map(|v| v.counterpart.id).collect();
            prop_assert_eq!(seen.len(), distinct.len());
        }
    }
}
