//! Request and response types for the blog API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Login / registration credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Posts
// ─────────────────────────────────────────────────────────────────────────────

/// A blog post as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    #[serde(alias = "ownerId")]
    pub owner_id: i64,
    pub title: String,
    /// Rendered HTML body.
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, alias = "createdOn", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

/// Tags arrive either as bare names or as `{name, id}` rows.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Name(String),
    Row { name: String },
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<TagRepr>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|t| match t {
            TagRepr::Name(name) | TagRepr::Row { name } => name,
        })
        .collect())
}

/// Body for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePostRequest {
    pub title: String,
    /// Markdown source; the backend renders it.
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

impl CreatePostRequest {
    pub fn new(owner_id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            owner_id,
            created_on: None,
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Query parameters for listing a user's posts.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ListPostsQuery {
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListPostsQuery {
    fn default() -> Self {
        Self {
            limit: 25,
            offset: 0,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub current_page: i64,
    #[serde(default)]
    pub num_pages: i64,
    #[serde(default)]
    pub page_size: i64,
}

impl<T> Page<T> {
    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page + 1 < self.num_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_accepts_both_tag_shapes() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": 1,
            "owner_id": 0,
            "title": "Ruby is okay",
            "content": "<h1>Ruby is okay</h1>",
            "tags": ["ruby", {"name": "opinion", "id": 3}]
        }))
        .unwrap();
        assert_eq!(post.tags, vec!["ruby", "opinion"]);
        assert!(post.created_on.is_none());
    }

    #[test]
    fn test_post_accepts_camel_case_fields() {
        let post: Post = serde_json::from_value(serde_json::json!({
            "id": 2,
            "ownerId": 7,
            "title": "t",
            "content": "c",
            "createdOn": "2017-03-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(post.owner_id, 7);
        assert!(post.tags.is_empty());
        assert!(post.created_on.is_some());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("martin", "martin4817");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("martin"));
        assert!(!debug.contains("4817"));
    }

    #[test]
    fn test_page_has_next() {
        let page: Page<Post> = Page {
            data: vec![],
            current_page: 0,
            num_pages: 2,
            page_size: 25,
        };
        assert!(page.has_next());
        assert!(!Page::<Post> { current_page: 1, ..page }.has_next());
    }
}
