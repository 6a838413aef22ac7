pub mod community;
pub mod guru;
pub mod user_auth;
