//! State module for tracking per-seed crawl progress
//!
//! # Components
//!
//! - `SeedState`: The lifecycle states a seed moves through (exploring, scraping, persisted, etc.)
//! - `SeedRun`: Tracks one seed's current state and enforces legal transitions

mod seed_run;
mod seed_state;

// Re-export main types
pub use seed_run::{SeedRun, TransitionError};
pub use seed_state::SeedState;
