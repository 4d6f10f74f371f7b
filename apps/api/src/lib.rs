pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod essays;
pub mod extract;
pub mod feedback;
pub mod llm_client;
pub mod models;
pub mod ocr;
pub mod reference;
pub mod routes;
pub mod state;
