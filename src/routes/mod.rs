pub mod auth_routes;
pub mod community;
pub mod guru_routes;
pub mod user_routes;
