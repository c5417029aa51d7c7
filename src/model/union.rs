//! Union (marriage or partnership) between two members.
//!
//! Unions are independent of parent/child relationship edges: a couple can
//! be recorded as a union without any `husband`/`wife` edge and vice versa.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::MemberId;
use crate::{Error, Result};

/// Opaque union identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnionId(pub u64);

impl fmt::Display for UnionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnionType {
    Marriage,
    Partnership,
    Other,
}

impl UnionType {
    pub fn as_str(self) -> &'static str {
        match self {
            UnionType::Marriage => "marriage",
            UnionType::Partnership => "partnership",
            UnionType::Other => "other",
        }
    }

    /// Parse an optional union type; blank input means "no type recorded".
    pub fn parse_optional(s: &str) -> Result<Option<UnionType>> {
        if s.trim().is_empty() { Ok(None) } else { s.parse().map(Some) }
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marriage" => Ok(UnionType::Marriage),
            "partnership" => Ok(UnionType::Partnership),
            "other" => Ok(UnionType::Other),
            _ => Err(Error::InvalidType { kind: "union", value: s.to_string() }),
        }
    }
}

/// A stored union. `partner2_id` is optional for incomplete records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub id: UnionId,
    pub partner1_id: MemberId,
    pub partner2_id: Option<MemberId>,
    pub union_type: Option<UnionType>,
    pub is_primary: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Union {
    pub fn involves(&self, member: MemberId) -> bool {
        self.partner1_id == member || self.partner2_id == Some(member)
    }

    /// The other partner, if recorded.
    pub fn partner_of(&self, member: MemberId) -> Option<MemberId> {
        if member == self.partner1_id { self.partner2_id }
        else if Some(member) == self.partner2_id { Some(self.partner1_id) }
        else { None }
    }
}

/// Fields for creating a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUnion {
    pub partner1_id: MemberId,
    #[serde(default)]
    pub partner2_id: Option<MemberId>,
    #[serde(default)]
    pub union_type: Option<UnionType>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl NewUnion {
    pub fn new(partner1_id: MemberId) -> Self {
        Self {
            partner1_id,
            partner2_id: None,
            union_type: None,
            is_primary: false,
            start_date: None,
            end_date: None,
        }
    }

    pub fn with_partner(mut self, partner2_id: MemberId) -> Self {
        self.partner2_id = Some(partner2_id);
        self
    }

    pub fn with_type(mut self, union_type: UnionType) -> Self {
        self.union_type = Some(union_type);
        self
    }

    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.partner2_id == Some(self.partner1_id) {
            return Err(Error::SelfRelationship(self.partner1_id));
        }
        validate_dates(self.start_date, self.end_date)
    }
}

/// Partial update of a union. Partner ids of an existing union can only be
/// filled in (`partner2_id`), never swapped for partner1. Over JSON, a
/// missing key keeps a field and an explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub partner2_id: Option<Option<MemberId>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub union_type: Option<Option<UnionType>>,
    pub is_primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub end_date: Option<Option<NaiveDate>>,
}

impl UnionPatch {
    pub fn apply(&self, union: &Union) -> Result<Union> {
        let mut next = union.clone();
        if let Some(p2) = self.partner2_id {
            next.partner2_id = p2;
        }
        if let Some(t) = self.union_type {
            next.union_type = t;
        }
        if let Some(primary) = self.is_primary {
            next.is_primary = primary;
        }
        if let Some(start) = self.start_date {
            next.start_date = start;
        }
        if let Some(end) = self.end_date {
            next.end_date = end;
        }
        if next.partner2_id == Some(next.partner1_id) {
            return Err(Error::SelfRelationship(next.partner1_id));
        }
        validate_dates(next.start_date, next.end_date)?;
        Ok(next)
    }
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => {
            Err(Error::Validation(format!("union end date {e} precedes start date {s}")))
        }
        _ => Ok(()),
    }
}
