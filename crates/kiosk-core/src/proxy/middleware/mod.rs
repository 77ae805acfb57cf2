// Middleware module - layers shared by every route

pub mod cors;

pub use cors::cors_layer;
