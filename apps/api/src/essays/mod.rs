// Essay history: persistence of analyses, per-user rolling statistics,
// and the signed-in read endpoints.

pub mod handlers;
pub mod repository;
