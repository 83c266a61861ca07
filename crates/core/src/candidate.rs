//! Candidate records and the payloads used to create and patch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A submitted registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Assigned once at creation, never changes
    pub id: String,
    pub name: String,
    pub email: String,
    /// E.164 phone number (`+<country><subscriber>`)
    pub phone: String,
    pub age: u32,
    /// Country display name
    pub country: String,
    /// ISO 3166-1 alpha-2 code
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hobbies: Option<String>,
    /// Free-text motivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    /// Inline photo as a base64 data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
    /// Immutable after creation
    pub created_at: DateTime<Utc>,
    /// Stamped on every mutation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Builds a fresh record from validated input.
    #[must_use]
    pub fn from_new(id: String, input: NewCandidate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            age: input.age,
            country: input.country,
            country_code: input.country_code,
            hobbies: input.hobbies,
            why: input.why,
            image_data_url: input.image_data_url,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// Merges `patch` into this record and stamps `updated_at`.
    ///
    /// `id` and `created_at` are never touched.
    pub fn apply(&mut self, patch: CandidatePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
        if let Some(country_code) = patch.country_code {
            self.country_code = country_code;
        }
        if let Some(hobbies) = patch.hobbies {
            self.hobbies = hobbies;
        }
        if let Some(why) = patch.why {
            self.why = why;
        }
        if let Some(image_data_url) = patch.image_data_url {
            self.image_data_url = image_data_url;
        }
        self.updated_at = Some(now);
    }

    /// Display form of the name, see [`normalize_name`].
    #[must_use]
    pub fn display_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Candidate fields supplied by the caller at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: u32,
    pub country: String,
    pub country_code: String,
    #[serde(default)]
    pub hobbies: Option<String>,
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub image_data_url: Option<String>,
}

/// Partial update. `None` leaves a field as is; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u32>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub hobbies: Option<Option<String>>,
    pub why: Option<Option<String>>,
    pub image_data_url: Option<Option<String>>,
}

impl From<NewCandidate> for CandidatePatch {
    /// A full overwrite of every mutable field, used when a form is resubmitted.
    fn from(input: NewCandidate) -> Self {
        Self {
            name: Some(input.name),
            email: Some(input.email),
            phone: Some(input.phone),
            age: Some(input.age),
            country: Some(input.country),
            country_code: Some(input.country_code),
            hobbies: Some(input.hobbies),
            why: Some(input.why),
            image_data_url: Some(input.image_data_url),
        }
    }
}

/// Photo payload stored apart from the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    /// Id of the owning candidate
    pub id: String,
    pub photo_base64: String,
}

impl PhotoRecord {
    #[must_use]
    pub const fn new(id: String, photo_base64: String) -> Self {
        Self { id, photo_base64 }
    }
}

/// Parses the persisted candidate list.
///
/// # Errors
/// Returns `Serialization` when `raw` is not a JSON array of candidates.
pub fn decode_candidates(raw: &str) -> Result<Vec<Candidate>> {
    Ok(serde_json::from_str(raw)?)
}

/// Serializes the full candidate list for persistence.
///
/// # Errors
/// Returns `Serialization` if a record cannot be encoded.
pub fn encode_candidates(list: &[Candidate]) -> Result<String> {
    Ok(serde_json::to_string(list)?)
}

/// Title-cases a name: every space-separated word gets an upper-case first
/// letter, the rest is lower-cased. Runs of spaces are preserved.
#[must_use]
pub fn normalize_name(value: &str) -> String {
    value
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
