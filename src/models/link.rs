use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_TAG_LEN: usize = 50;

/// A persisted bookmark. Tags live in a JSON column so their order (and any
/// duplicates the caller sent) survive storage verbatim.
#[derive(Debug, Clone, FromRow)]
pub struct Link {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Json<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// The projection of a link returned to clients. The owner id stays internal.
#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl From<Link> for LinkView {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.url,
            title: link.title,
            description: link.description,
            tags: link.tags.0,
            created_at: link.created_at,
        }
    }
}

/// Trim and lower-case tags, dropping entries that are empty after the trim.
/// Order is preserved and duplicates are kept as sent.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
