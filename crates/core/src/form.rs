//! Registration form state and the draft snapshot persisted from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, NewCandidate};
use crate::constants::{MAX_AGE, MAX_TEXTAREA_LENGTH, MIN_AGE};
use crate::error::CoreError;
use crate::validation::{FieldRule, ValidationErrors, is_valid_email, validate_phone};

/// Raw values of the registration form, as typed.
///
/// `id` is empty for a new registration and holds the candidate id while
/// an edit session is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub age: String,
    pub country: String,
    pub country_code: String,
    pub hobbies: String,
    pub why: String,
    pub image_data_url: String,
}

impl FormSnapshot {
    /// Form pre-filled from a stored candidate.
    #[must_use]
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            age: candidate.age.to_string(),
            country: candidate.country.clone(),
            country_code: candidate.country_code.clone(),
            hobbies: candidate.hobbies.clone().unwrap_or_default(),
            why: candidate.why.clone().unwrap_or_default(),
            image_data_url: candidate.image_data_url.clone().unwrap_or_default(),
        }
    }

    /// Sets a field by its camelCase name.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an unknown field name.
    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> crate::Result<()> {
        let slot = match field {
            "id" => &mut self.id,
            "name" => &mut self.name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "age" => &mut self.age,
            "country" => &mut self.country,
            "countryCode" => &mut self.country_code,
            "hobbies" => &mut self.hobbies,
            "why" => &mut self.why,
            "imageDataUrl" => &mut self.image_data_url,
            other => return Err(CoreError::InvalidInput(format!("unknown form field: {other}"))),
        };
        *slot = value.into();
        Ok(())
    }

    /// True when at least one field holds non-whitespace text.
    #[must_use]
    pub fn has_content(&self) -> bool {
        [
            &self.id,
            &self.name,
            &self.email,
            &self.phone,
            &self.age,
            &self.country,
            &self.country_code,
            &self.hobbies,
            &self.why,
            &self.image_data_url,
        ]
        .iter()
        .any(|v| !v.trim().is_empty())
    }

    /// Id of the candidate being edited, if any.
    #[must_use]
    pub fn editing_id(&self) -> Option<&str> {
        let id = self.id.trim();
        (!id.is_empty()).then_some(id)
    }

    /// Checks every field rule and converts the form into creation input.
    ///
    /// # Errors
    /// Returns every failed rule, at most one per field.
    pub fn validate(&self) -> Result<NewCandidate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push("name", FieldRule::Required);
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push("email", FieldRule::Required);
        } else if !is_valid_email(email) {
            errors.push("email", FieldRule::Email);
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push("phone", FieldRule::Required);
        } else if let Err(rule) = validate_phone(phone) {
            errors.push("phone", rule);
        }

        let age = match self.age.trim() {
            "" => {
                errors.push("age", FieldRule::Required);
                None
            },
            raw => match raw.parse::<i64>() {
                Ok(n) if n < MIN_AGE => {
                    errors.push("age", FieldRule::Min { min: MIN_AGE });
                    None
                },
                Ok(n) if n > MAX_AGE => {
                    errors.push("age", FieldRule::Max { max: MAX_AGE });
                    None
                },
                Ok(n) => u32::try_from(n).ok(),
                Err(_) => {
                    errors.push("age", FieldRule::Number);
                    None
                },
            },
        };

        for (field, value) in [("hobbies", &self.hobbies), ("why", &self.why)] {
            if value.chars().count() > MAX_TEXTAREA_LENGTH {
                errors.push(field, FieldRule::MaxLength { max: MAX_TEXTAREA_LENGTH });
            }
        }

        match age {
            Some(age) if errors.is_empty() => Ok(NewCandidate {
                name: name.to_owned(),
                email: email.to_owned(),
                phone: phone.to_owned(),
                age,
                country: self.country.trim().to_owned(),
                country_code: self.country_code.trim().to_uppercase(),
                hobbies: non_empty(&self.hobbies),
                why: non_empty(&self.why),
                image_data_url: non_empty(&self.image_data_url),
            }),
            _ => Err(errors),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// The single persisted snapshot of unsubmitted form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(flatten)]
    pub form: FormSnapshot,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormSnapshot {
        FormSnapshot {
            name: "ana maria".to_owned(),
            email: "a@b.com".to_owned(),
            phone: "+40712345678".to_owned(),
            age: "30".to_owned(),
            country: "Romania".to_owned(),
            country_code: "ro".to_owned(),
            ..FormSnapshot::default()
        }
    }

    #[test]
    fn test_has_content_ignores_whitespace() {
        assert!(!FormSnapshot::default().has_content());
        let form = FormSnapshot { hobbies: "   ".to_owned(), ..FormSnapshot::default() };
        assert!(!form.has_content());
        let form = FormSnapshot { name: "a".to_owned(), ..FormSnapshot::default() };
        assert!(form.has_content());
    }

    #[test]
    fn test_validate_ok() {
        let input = filled().validate().unwrap();
        assert_eq!(input.age, 30);
        assert_eq!(input.country_code, "RO");
        assert!(input.hobbies.is_none());
    }

    #[test]
    fn test_validate_reports_each_field() {
        let form = FormSnapshot {
            email: "nope".to_owned(),
            phone: "0712345678".to_owned(),
            age: "12".to_owned(),
            why: "x".repeat(MAX_TEXTAREA_LENGTH + 1),
            ..FormSnapshot::default()
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("name").map(|e| e.rule), Some(FieldRule::Required));
        assert_eq!(errors.get("email").map(|e| e.rule), Some(FieldRule::Email));
        assert_eq!(errors.get("phone").map(|e| e.rule), Some(FieldRule::Phone));
        assert_eq!(errors.get("age").map(|e| e.rule), Some(FieldRule::Min { min: MIN_AGE }));
        assert_eq!(
            errors.get("why").map(|e| e.rule),
            Some(FieldRule::MaxLength { max: MAX_TEXTAREA_LENGTH })
        );
        assert!(errors.get("hobbies").is_none());
    }

    #[test]
    fn test_validate_age_not_a_number() {
        let form = FormSnapshot { age: "thirty".to_owned(), ..filled() };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("age").map(|e| e.rule), Some(FieldRule::Number));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_age_upper_bound() {
        let form = FormSnapshot { age: "101".to_owned(), ..filled() };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("age").map(|e| e.rule), Some(FieldRule::Max { max: MAX_AGE }));
    }

    #[test]
    fn test_set_field() {
        let mut form = FormSnapshot::default();
        form.set_field("countryCode", "RO").unwrap();
        assert_eq!(form.country_code, "RO");
        assert!(matches!(form.set_field("nickname", "x"), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_draft_json_is_flat() {
        let draft = Draft { form: filled(), updated_at: Utc::now() };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["name"], "ana maria");
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("form").is_none());

        let back: Draft = serde_json::from_value(json).unwrap();
        assert_eq!(back, draft);
    }

    #[test]
    fn test_draft_tolerates_missing_fields() {
        let draft: Draft =
            serde_json::from_str(r#"{"name":"ana","updatedAt":"2026-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(draft.form.name, "ana");
        assert!(draft.form.email.is_empty());
    }
}
