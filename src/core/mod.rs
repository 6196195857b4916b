//! # Core Module: Domain Types of the Expert System
//!
//! Everything the inference engine reads or writes lives here:
//!
//! - [`Symptom`], [`Presence`], [`Observation`]: observable field signs and what a session believes about them
//! - [`Pest`], [`ControlCategory`], [`ControlRecommendation`]: pest descriptions and the IPM catalog
//! - [`Rule`]: "all these symptoms ⇒ this pest, with this prior confidence"
//! - [`KnowledgeBase`]: the immutable bundle of all catalogs, shared by every consultation
//! - [`SessionState`]: the one mutable record, owned by a single consultation
//! - [`ExpertError`]: the small error taxonomy
//!
//! ## Mutability at a Glance
//!
//! ```text
//! Arc<KnowledgeBase> (read-only, shared) ──┬──> consultation A: SessionState (owned)
//!                                          ├──> consultation B: SessionState (owned)
//!                                          └──> consultation C: SessionState (owned)
//! ```

pub mod catalog;
pub mod error;
pub mod knowledge_base;
pub mod pest;
pub mod rule;
pub mod session;
pub mod symptom;

pub use error::{ExpertError, ExpertResult};
pub use knowledge_base::KnowledgeBase;
pub use pest::{ControlCategory, ControlRecommendation, Pest};
pub use rule::Rule;
pub use session::SessionState;
pub use symptom::{Observation, Presence, Symptom};
