use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::middleware::utils::db_utils::ViewFieldSelector;

/// One reply as fetched for rendering. `reply_to_username` is not stored;
/// the card builder fills it in from the direct parent when that parent is
/// part of the fetched set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplyView {
    pub id: Thing,
    pub username: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_reply: Option<Thing>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_username: Option<String>,
}

impl ViewFieldSelector for ReplyView {
    fn get_select_query_fields() -> String {
        "id, created_by.username as username, content, parent_reply, created_at".to_string()
    }
}
