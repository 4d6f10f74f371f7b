pub mod essay;
pub mod user;
