//! HTTP read surface over the refresh coordinator's published state.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
