//! PashuSuchak prediction relay daemon.
//!
//! Accepts cattle images over HTTP, relays them to the detection and breed
//! classification services, and explains uncertain results with help from
//! a text-generation service and a small breed knowledge base.

pub mod clients;
pub mod config;
pub mod explainer;
pub mod orchestrator;
pub mod prompts;
pub mod routes;
pub mod scratch;
pub mod server;

pub use config::Config;
pub use orchestrator::{PredictionOrchestrator, Services};
pub use server::{build_router, AppState};
