pub mod config;
pub mod entities;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

pub use routes::create_routes;
pub use state::AppState;
