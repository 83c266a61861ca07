//! Service layer for regdesk
//!
//! Owns the candidate list, edit tokens, the form draft, counters and
//! photos, and exposes the registration form controller and dashboard
//! projections built on them.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod candidate_repository;
mod counters;
mod draft;
mod edit_session;
mod error;
mod photo;
mod registration;
pub mod subject;
pub mod views;

pub use candidate_repository::CandidateRepository;
pub use counters::CountersService;
pub use draft::{DraftAutosave, DraftStore};
pub use edit_session::{EditSession, EditSessionManager, token_key};
pub use error::ServiceError;
pub use photo::{PhotoAttachment, PhotoService, mime_for_path, read_data_uri};
pub use registration::{PhotoPersist, RegistrationDesk, RegistrationFlow, SubmitOutcome};
