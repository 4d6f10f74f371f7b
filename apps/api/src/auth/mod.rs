// Accounts and sessions: argon2 password hashes, HS256 session tokens carried
// in an HttpOnly cookie (or a Bearer header), and the `AuthUser` extractor.

pub mod accounts;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod session;

pub use extractors::AuthUser;
