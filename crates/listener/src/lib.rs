//! SkillMaster HTTP surface.
//!
//! Exposes the analysis pipeline over a small JSON API:
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | [`api::health`] |
//! | `POST /api/analyze` | [`api::analyze`] |
//!
//! ## Architectural Layer
//!
//! **Inbound infrastructure.** Request decoding, status-code mapping, and
//! transport concerns (CORS, request tracing, disconnect handling) live here.
//! The pipeline itself is driven through [`nodes::PipelineExecutor`]; no
//! domain rule is implemented in this crate.

pub mod api;
pub mod error;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, serve};
pub use state::AppState;
