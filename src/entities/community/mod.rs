pub mod community_entity;
pub mod membership_entity;
pub mod reply_entity;
pub mod thread_entity;
