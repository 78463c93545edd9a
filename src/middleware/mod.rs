// ABOUTME: HTTP middleware for request tracking, authentication, and authorization
// ABOUTME: Provides bearer auth, admin/owner guards, CORS, and per-route request metrics

pub mod admin_guard;
pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication middleware
pub use auth::AuthMiddleware;

// Authorization guards
pub use admin_guard::{require_admin, require_owner};

// CORS configuration
pub use cors::setup_cors;

// Request tracking
pub use tracing::{create_request_span, track_requests};
