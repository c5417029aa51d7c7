//! Reciprocal relationship types.
//!
//! A stored edge `(A, t, B)` says "A is `t` of B". The implied fact from B's
//! side is `(B, reciprocal(t, gender(B)), A)`. Only one direction is ever
//! stored, so every reader that needs B's view derives it here.
//!
//! Each type maps to a pair of candidates: one used when the other party
//! is male, one otherwise. Spousal types are gender-independent
//! (`husband` ↔ `wife`) and `cousin`/`other` map to themselves.

use serde::{Deserialize, Serialize};

use crate::model::{Gender, RelationshipType};

/// How genders other than `Male`/`Female` pick a reciprocal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderPolicy {
    /// Every gender that is not `Male` takes the female branch, including
    /// `Other` and `Unknown`. Matches how existing records were labeled.
    #[default]
    Legacy,
    /// `Other`/`Unknown` resolve gendered reciprocals to `other` instead of
    /// guessing.
    Neutral,
}

/// `(male, female)` candidates for the reciprocal of `rel_type`.
const fn branches(rel_type: RelationshipType) -> (RelationshipType, RelationshipType) {
    use crate::model::RelationshipType::*;
    match rel_type {
        Father | Mother => (Son, Daughter),
        Son | Daughter => (Father, Mother),
        Brother | Sister => (Brother, Sister),
        Husband => (Wife, Wife),
        Wife => (Husband, Husband),
        Grandfather | Grandmother => (Grandson, Granddaughter),
        Grandson | Granddaughter => (Grandfather, Grandmother),
        Uncle | Aunt => (Nephew, Niece),
        Nephew | Niece => (Uncle, Aunt),
        Cousin => (Cousin, Cousin),
        Other => (Other, Other),
    }
}

/// The type `other_gender`'s holder has toward the first member of an edge
/// of `rel_type`, under the legacy gender policy.
///
/// ```
/// use kinship_graph::model::{Gender, RelationshipType};
/// use kinship_graph::reciprocal::reciprocal;
///
/// assert_eq!(reciprocal(RelationshipType::Father, Gender::Male), RelationshipType::Son);
/// assert_eq!(reciprocal(RelationshipType::Father, Gender::Female), RelationshipType::Daughter);
/// ```
pub fn reciprocal(rel_type: RelationshipType, other_gender: Gender) -> RelationshipType {
    reciprocal_with(rel_type, other_gender, GenderPolicy::Legacy)
}

/// [`reciprocal`] with an explicit [`GenderPolicy`].
pub fn reciprocal_with(
    rel_type: RelationshipType,
    other_gender: Gender,
    policy: GenderPolicy,
) -> RelationshipType {
    let (male, female) = branches(rel_type);
    match (other_gender, policy) {
        (Gender::Male, _) => male,
        (Gender::Female, _) => female,
        (Gender::Other | Gender::Unknown, GenderPolicy::Legacy) => female,
        (Gender::Other | Gender::Unknown, GenderPolicy::Neutral) => {
            if male == female { male } else { RelationshipType::Other }
        }
    }
}

/// String-facing reciprocal: labels outside the known set come back
/// unchanged so a caller can always render something.
pub fn reciprocal_label(label: &str, other_gender: Gender, policy: GenderPolicy) -> String {
    match label.parse::<RelationshipType>() {
        Ok(t) => reciprocal_with(t, other_gender, policy).as_str().to_string(),
        Err(_) => label.to_string(),
    }
}
