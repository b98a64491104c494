pub mod routes;
pub mod security;
