//! Shared constants for regdesk.
//!
//! Storage keys, form limits and timing defaults used across crates.

/// Key-value key holding the JSON array of candidates.
pub const CANDIDATES_KEY: &str = "regdesk_candidates";

/// Key-value key of the visit counter.
pub const VISITS_KEY: &str = "regdesk_visits";

/// Key-value key of the registration counter.
pub const REGISTRATIONS_KEY: &str = "regdesk_registrations";

/// Key-value key of the single registration draft.
pub const DRAFT_KEY: &str = "regdesk_registration_draft";

/// Prefix of edit-token keys; the candidate id follows.
pub const EDIT_TOKEN_PREFIX: &str = "edit_";

/// Youngest accepted registrant.
pub const MIN_AGE: i64 = 18;

/// Oldest accepted registrant.
pub const MAX_AGE: i64 = 100;

/// Character limit for the hobbies and motivation fields.
pub const MAX_TEXTAREA_LENGTH: usize = 250;

/// Edit-token lifetime issued on registration: 3 days.
pub const DEFAULT_EDIT_TTL_HOURS: i64 = 72;

/// Longest accepted edit-token lifetime: 10 years.
pub const MAX_EDIT_TTL_HOURS: i64 = 24 * 365 * 10;

/// Quiet period before a draft is autosaved.
pub const DEFAULT_DRAFT_DEBOUNCE_MS: u64 = 1000;

/// `SQLite` connection pool size.
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;
