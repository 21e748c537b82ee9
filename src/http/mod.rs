//! HTTP API server for the browser client
//!
//! - GET /api/connection-details - Issue a participant token for a room
//! - POST /api/notify-bot - Start/stop translation for a participant
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
