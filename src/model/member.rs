//! Member (person) in the family graph.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Opaque member identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recorded gender of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "unknown" => Ok(Gender::Unknown),
            _ => Err(Error::InvalidType { kind: "gender", value: s.to_string() }),
        }
    }
}

/// A person recorded in the family graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: Gender,
    pub is_alive: bool,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// First name, followed by the last name when one is recorded.
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }

    pub fn summary(&self) -> MemberSummary {
        MemberSummary {
            id: self.id,
            name: self.display_name(),
            gender: self.gender,
            photo_url: self.photo_url.clone(),
        }
    }
}

/// The display-safe slice of a member carried by derived views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: MemberId,
    pub name: String,
    pub gender: Gender,
    pub photo_url: Option<String>,
}

// ============================================================================
// Write payloads
// ============================================================================

/// Fields for creating a member. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default = "default_alive")]
    pub is_alive: bool,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

fn default_alive() -> bool {
    true
}

impl NewMember {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: None,
            gender: Gender::Unknown,
            is_alive: true,
            birth_date: None,
            death_date: None,
            photo_url: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    /// Records a death date and marks the member as deceased.
    pub fn with_death_date(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self.is_alive = false;
        self
    }

    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.first_name, self.is_alive, self.birth_date, self.death_date)
    }

    pub(crate) fn into_member(self, id: MemberId, now: DateTime<Utc>) -> Member {
        Member {
            id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name,
            gender: self.gender,
            is_alive: self.is_alive,
            birth_date: self.birth_date,
            death_date: self.death_date,
            photo_url: self.photo_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a member. `None` leaves a field untouched; the nested
/// `Option` on clearable fields distinguishes "clear" from "keep". Over JSON,
/// a missing key keeps and an explicit `null` clears.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub last_name: Option<Option<String>>,
    pub gender: Option<Gender>,
    pub is_alive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub death_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "super::double_option")]
    pub photo_url: Option<Option<String>>,
}

impl MemberPatch {
    /// Apply onto a copy of `member`, validating the result before returning it.
    pub fn apply(&self, member: &Member, now: DateTime<Utc>) -> Result<Member> {
        let mut next = member.clone();
        if let Some(first) = &self.first_name {
            next.first_name = first.trim().to_string();
        }
        if let Some(last) = &self.last_name {
            next.last_name = last.clone();
        }
        if let Some(gender) = self.gender {
            next.gender = gender;
        }
        if let Some(alive) = self.is_alive {
            next.is_alive = alive;
        }
        if let Some(birth) = self.birth_date {
            next.birth_date = birth;
        }
        if let Some(death) = self.death_date {
            next.death_date = death;
        }
        if let Some(photo) = &self.photo_url {
            next.photo_url = photo.clone();
        }
        validate_fields(&next.first_name, next.is_alive, next.birth_date, next.death_date)?;
        next.updated_at = now;
        Ok(next)
    }
}

fn validate_fields(
    first_name: &str,
    is_alive: bool,
    birth: Option<NaiveDate>,
    death: Option<NaiveDate>,
) -> Result<()> {
    if first_name.trim().is_empty() {
        return Err(Error::Validation("first name must not be blank".into()));
    }
    if let (Some(birth), Some(death)) = (birth, death) {
        if death < birth {
            return Err(Error::Validation(format!(
                "death date {death} precedes birth date {birth}"
            )));
        }
    }
    if is_alive && death.is_some() {
        return Err(Error::Validation("a member with a death date cannot be alive".into()));
    }
    Ok(())
}
