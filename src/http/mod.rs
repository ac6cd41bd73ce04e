// HTTP surface of the proxy.
// Exposes the router constructor and shared handler state.

pub mod handler;

pub use handler::{AppState, create_router};
