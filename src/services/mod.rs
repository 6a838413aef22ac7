pub mod auth_service;
pub mod reply_cards;
