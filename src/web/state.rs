//! # Web Application State
//!
//! Everything a handler needs, shared by every request:
//!
//! ```text
//! AppState (Clone, cheap)
//!  ├── kb: Arc<KnowledgeBase>    read-only, never locked
//!  └── settings: Arc<Settings>   default confidence for form input
//! ```
//!
//! There is no per-user state on the server. Each request builds its own
//! [`Consultation`](crate::consultation::Consultation) over the shared base
//! and drops it once the response is rendered.

use std::sync::Arc;

use crate::config::Settings;
use crate::core::KnowledgeBase;

/// Shared Axum application state.
#[derive(Clone)]
pub struct AppState {
    pub kb: Arc<KnowledgeBase>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(kb: Arc<KnowledgeBase>, settings: Settings) -> Self {
        Self {
            kb,
            settings: Arc::new(settings),
        }
    }
}
