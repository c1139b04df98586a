pub mod profile;
pub mod template;
pub mod user;
