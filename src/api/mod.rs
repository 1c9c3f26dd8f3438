pub mod entrypoints;
pub mod routes;
