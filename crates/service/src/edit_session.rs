//! Time-limited edit tokens.
//!
//! A token is the key `edit_<candidate id>` holding its RFC 3339 expiry.
//! Whoever holds a live token may reopen that candidate in the form.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use regdesk_core::Candidate;
use regdesk_core::constants::EDIT_TOKEN_PREFIX;
use regdesk_storage::KeyValueStore;

use crate::ServiceError;
use crate::candidate_repository::CandidateRepository;

/// A live token found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub candidate_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Key for the token of `candidate_id`.
#[must_use]
pub fn token_key(candidate_id: &str) -> String {
    format!("{EDIT_TOKEN_PREFIX}{candidate_id}")
}

pub struct EditSessionManager {
    kv: Arc<dyn KeyValueStore>,
}

impl EditSessionManager {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Writes a token for `candidate_id` expiring `ttl` from now.
    pub fn issue_token(
        &self,
        candidate_id: &str,
        ttl: Duration,
    ) -> Result<DateTime<Utc>, ServiceError> {
        self.issue_token_at(candidate_id, ttl, Utc::now())
    }

    /// Fails with [`ServiceError::InvalidInput`] when `now + ttl` is out of range.
    pub fn issue_token_at(
        &self,
        candidate_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ServiceError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            ServiceError::InvalidInput(format!("edit token lifetime {ttl} is out of range"))
        })?;
        self.kv.set(&token_key(candidate_id), &expires_at.to_rfc3339())?;
        tracing::debug!(candidate_id, %expires_at, "Edit token issued");
        Ok(expires_at)
    }

    pub fn find_active_session(&self) -> Result<Option<EditSession>, ServiceError> {
        self.find_active_session_at(Utc::now())
    }

    /// Scans every token, deleting expired ones, and returns the one that
    /// expires last.
    ///
    /// Tokens whose value is not a timestamp are skipped and left in place.
    /// On equal expiry the first key in sorted order wins.
    pub fn find_active_session_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<EditSession>, ServiceError> {
        let mut best: Option<EditSession> = None;

        for key in self.kv.keys_with_prefix(EDIT_TOKEN_PREFIX)? {
            let Some(raw) = self.kv.get(&key)? else {
                continue;
            };
            let expires_at = match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(ts) => ts.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!(key, error = %e, "Skipping edit token with unparsable expiry");
                    continue;
                },
            };
            if now > expires_at {
                self.kv.remove(&key)?;
                tracing::debug!(key, %expires_at, "Expired edit token removed");
                continue;
            }

            let candidate_id = key.strip_prefix(EDIT_TOKEN_PREFIX).unwrap_or(&key).to_owned();
            if best.as_ref().is_none_or(|b| expires_at > b.expires_at) {
                best = Some(EditSession { candidate_id, expires_at });
            }
        }

        Ok(best)
    }

    pub fn resolve_active_session(
        &self,
        repo: &CandidateRepository,
    ) -> Result<Option<Candidate>, ServiceError> {
        self.resolve_active_session_at(repo, Utc::now())
    }

    /// Active session joined with its candidate.
    ///
    /// A token whose candidate no longer exists is revoked and yields `None`.
    pub fn resolve_active_session_at(
        &self,
        repo: &CandidateRepository,
        now: DateTime<Utc>,
    ) -> Result<Option<Candidate>, ServiceError> {
        let Some(session) = self.find_active_session_at(now)? else {
            return Ok(None);
        };
        match repo.get_by_id(&session.candidate_id) {
            Some(candidate) => {
                tracing::info!(id = %candidate.id, expires_at = %session.expires_at, "Resuming edit session");
                Ok(Some(candidate))
            },
            None => {
                tracing::warn!(
                    candidate_id = %session.candidate_id,
                    "Edit token points to a missing candidate, revoking"
                );
                self.revoke(&session.candidate_id)?;
                Ok(None)
            },
        }
    }

    pub fn revoke(&self, candidate_id: &str) -> Result<(), ServiceError> {
        self.kv.remove(&token_key(candidate_id))?;
        Ok(())
    }

    /// Removes every token. Returns how many were removed.
    pub fn clear_all_sessions(&self) -> Result<usize, ServiceError> {
        let keys = self.kv.keys_with_prefix(EDIT_TOKEN_PREFIX)?;
        for key in &keys {
            self.kv.remove(key)?;
        }
        if !keys.is_empty() {
            tracing::debug!(count = keys.len(), "Edit tokens cleared");
        }
        Ok(keys.len())
    }
}
