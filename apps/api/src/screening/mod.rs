// Candidate screening pipeline: weights → scoring client → normalizer, driven
// per job by a session state machine held in the registry.
// All scoring calls go through scoring_client; nothing here talks HTTP directly.

pub mod error;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod registry;
pub mod session;
pub mod weights;
