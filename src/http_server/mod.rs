pub mod app;
mod error;
pub mod extract;
pub mod routes;
pub mod schema;
pub mod state;
