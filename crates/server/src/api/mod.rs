pub mod events;
pub mod handlers;
pub mod routes;
pub mod runs;

pub use routes::create_router;
