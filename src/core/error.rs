//! # Domain Errors
//!
//! The expert system has very few ways to fail. Inference itself is total:
//! "no pest identified" is an empty result, and the degenerate certainty
//! factor combination is resolved inside [`combine`](crate::inference::certainty::combine)
//! instead of being reported.
//!
//! | Variant | Raised by | Effect on state |
//! |---------|-----------|-----------------|
//! | `UnknownSymptom` | [`SessionState::set_symptom`](crate::core::SessionState::set_symptom) | none |
//! | `InvalidObservation` | CLI / form parsing of `name=cf` pairs | none |
//! | `InvalidKnowledgeBase` | [`KnowledgeBase::validate`](crate::core::KnowledgeBase::validate) | load aborted |
//! | `FactParse` | [`Fact::from_str`](crate::facts::Fact) | none |
//!
//! Confidences outside `[0.0, 1.0]` are **not** an error: they are clamped.

use thiserror::Error;

/// Errors surfaced by the knowledge base, the session and the fact codec.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpertError {
    /// The symptom name is not part of the knowledge base.
    #[error("unknown symptom `{0}`")]
    UnknownSymptom(String),

    /// A textual observation (`name=cf`) could not be understood.
    #[error("invalid observation `{input}`: {reason}")]
    InvalidObservation { input: String, reason: String },

    /// A loaded knowledge base breaks one of its structural invariants.
    #[error("invalid knowledge base: {0}")]
    InvalidKnowledgeBase(String),

    /// A fact did not match any of the supported templates.
    #[error("cannot parse fact `{input}`: {reason}")]
    FactParse { input: String, reason: String },
}

/// Shorthand used across the domain modules.
pub type ExpertResult<T> = Result<T, ExpertError>;
