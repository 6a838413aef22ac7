pub mod community_routes;
pub mod reply_routes;
pub mod thread_routes;
