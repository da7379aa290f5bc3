use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// MysfitId
// ---------------------------------------------------------------------------

/// A validated mysfit identifier: a UUID, kept in lowercase hyphenated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MysfitId(Uuid);

impl MysfitId {
    /// Parse and validate an identifier.
    pub fn new(s: impl AsRef<str>) -> Result<Self, MysfitIdError> {
        let s = s.as_ref().trim();

        if s.is_empty() {
            return Err(MysfitIdError::Empty);
        }

        let uuid = Uuid::parse_str(s).map_err(|_| MysfitIdError::Malformed(s.to_string()))?;
        Ok(Self(uuid))
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl TryFrom<String> for MysfitId {
    type Error = MysfitIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for MysfitId {
    type Err = MysfitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<MysfitId> for String {
    fn from(id: MysfitId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for MysfitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Errors that can occur when validating a mysfit id.
#[derive(Debug, Clone, Error)]
pub enum MysfitIdError {
    #[error("mysfit id must not be empty")]
    Empty,

    #[error("mysfit id {0:?} is not a valid UUID")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Mysfit
// ---------------------------------------------------------------------------

/// A mysfit as stored in DynamoDB (PascalCase attribute names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mysfit {
    /// Partition key (validated as a MysfitId at API boundaries).
    pub mysfit_id: String,
    pub name: String,
    pub species: String,
    pub age: u32,
    pub description: String,

    /// Partition key of `GoodEvilIndex`.
    pub good_evil: String,

    /// Partition key of `LawChaosIndex`.
    pub law_chaos: String,

    pub thumb_image_uri: String,
    pub profile_image_uri: String,

    #[serde(default)]
    pub likes: u64,

    #[serde(default)]
    pub adopted: bool,
}

impl Mysfit {
    /// The value of this mysfit's attribute on the given axis.
    pub fn alignment(&self, axis: AlignmentAxis) -> &str {
        match axis {
            AlignmentAxis::GoodEvil => &self.good_evil,
            AlignmentAxis::LawChaos => &self.law_chaos,
        }
    }
}

/// A mysfit as exchanged over HTTP (camelCase field names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MysfitProfile {
    pub mysfit_id: String,
    pub name: String,
    pub species: String,
    pub age: u32,
    pub description: String,
    pub good_evil: String,
    pub law_chaos: String,
    pub thumb_image_uri: String,
    pub profile_image_uri: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub adopted: bool,
}

impl From<Mysfit> for MysfitProfile {
    fn from(m: Mysfit) -> Self {
        Self {
            mysfit_id: m.mysfit_id,
            name: m.name,
            species: m.species,
            age: m.age,
            description: m.description,
            good_evil: m.good_evil,
            law_chaos: m.law_chaos,
            thumb_image_uri: m.thumb_image_uri,
            profile_image_uri: m.profile_image_uri,
            likes: m.likes,
            adopted: m.adopted,
        }
    }
}

impl From<MysfitProfile> for Mysfit {
    fn from(p: MysfitProfile) -> Self {
        Self {
            mysfit_id: p.mysfit_id,
            name: p.name,
            species: p.species,
            age: p.age,
            description: p.description,
            good_evil: p.good_evil,
            law_chaos: p.law_chaos,
            thumb_image_uri: p.thumb_image_uri,
            profile_image_uri: p.profile_image_uri,
            likes: p.likes,
            adopted: p.adopted,
        }
    }
}

// ---------------------------------------------------------------------------
// Alignment filters
// ---------------------------------------------------------------------------

/// One of the two categorical axes a mysfit can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentAxis {
    GoodEvil,
    LawChaos,
}

impl AlignmentAxis {
    /// DynamoDB attribute holding this axis.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::GoodEvil => "GoodEvil",
            Self::LawChaos => "LawChaos",
        }
    }

    /// Global secondary index partitioned on this axis.
    pub fn index_name(self) -> &'static str {
        match self {
            Self::GoodEvil => "GoodEvilIndex",
            Self::LawChaos => "LawChaosIndex",
        }
    }
}

impl FromStr for AlignmentAxis {
    type Err = UnknownAxis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GoodEvil") {
            Ok(Self::GoodEvil)
        } else if s.eq_ignore_ascii_case("LawChaos") {
            Ok(Self::LawChaos)
        } else {
            Err(UnknownAxis(s.to_string()))
        }
    }
}

impl fmt::Display for AlignmentAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown filter {0:?}: expected GoodEvil or LawChaos")]
pub struct UnknownAxis(pub String);

/// Exact-match filter on one alignment axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentFilter {
    pub axis: AlignmentAxis,
    pub value: String,
}

impl AlignmentFilter {
    pub fn new(axis: AlignmentAxis, value: impl Into<String>) -> Self {
        Self {
            axis,
            value: value.into(),
        }
    }

    pub fn matches(&self, mysfit: &Mysfit) -> bool {
        mysfit.alignment(self.axis) == self.value
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A customer question stored in the questions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Question {
    pub question_id: String,
    pub question_text: String,
    pub user_email_address: String,

    /// Unix epoch seconds of submission.
    pub submitted_at: i64,
}

// ---------------------------------------------------------------------------
// Clickstream
// ---------------------------------------------------------------------------

/// A profile click as reported by the website.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub mysfit_id: String,
    pub user_id: String,
}

/// A click joined with the clicked mysfit's attributes, ready for analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedClick {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "mysfitId")]
    pub mysfit_id: String,
    pub goodevil: String,
    pub lawchaos: String,
    pub species: String,
}

impl EnrichedClick {
    pub fn new(click: &ClickEvent, mysfit: &MysfitProfile) -> Self {
        Self {
            user_id: click.user_id.clone(),
            mysfit_id: mysfit.mysfit_id.clone(),
            goodevil: mysfit.good_evil.clone(),
            lawchaos: mysfit.law_chaos.clone(),
            species: mysfit.species.clone(),
        }
    }
}
