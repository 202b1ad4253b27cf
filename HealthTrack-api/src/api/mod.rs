pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::create_app as create_application;
pub use state::AppState;
