//! Blog content loaded from markdown files.
//!
//! This module loads markdown files from the `content/blog` directory at
//! startup, parses frontmatter metadata, and renders markdown to HTML.
//! Draft posts are loaded but never listed or served.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Average adult reading speed used for the reading-time estimate.
const WORDS_PER_MINUTE: u32 = 200;

/// Errors from content loading.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Metadata for blog posts.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered blog post with metadata and HTML content.
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub content_html: String,
    pub reading_time_minutes: u32,
}

/// Content store that holds all loaded posts in memory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load all blog posts from `content_dir/blog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the blog directory exists but cannot be read.
    /// Individual files that fail to parse are logged and skipped.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("blog");
        let mut posts = Vec::new();

        if !dir.exists() {
            tracing::warn!("Blog directory does not exist: {:?}", dir);
            return Ok(Self {
                posts: Arc::new(posts),
            });
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_post(&path) {
                    Ok(post) => {
                        tracing::info!("Loaded post: {}", post.slug);
                        posts.push(post);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        // Newest first
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        Ok(Self {
            posts: Arc::new(posts),
        })
    }

    /// Build a store directly from posts (used by tests).
    #[must_use]
    pub fn from_posts(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));
        Self {
            posts: Arc::new(posts),
        }
    }

    /// Load a single post from a markdown file.
    fn load_post(path: &Path) -> Result<Post, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        let matter = Matter::<YAML>::new();
        let parsed: ParsedEntity<PostMeta> = matter
            .parse(&content)
            .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
        let meta = parsed
            .data
            .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

        let reading_time_minutes = reading_time(&parsed.content);
        let content_html = render_markdown(&parsed.content);

        Ok(Post {
            slug,
            meta,
            content_html,
            reading_time_minutes,
        })
    }

    /// All published posts, newest first.
    pub fn published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| !post.meta.draft)
    }

    /// Look up a post by slug. Draft posts resolve to `None`.
    #[must_use]
    pub fn post(&self, slug: &str) -> Option<&Post> {
        self.posts
            .iter()
            .find(|post| post.slug == slug && !post.meta.draft)
    }

    /// The `count` most recent published posts, optionally excluding one
    /// slug (used for the "recent posts" sidebar on a post page).
    #[must_use]
    pub fn recent_posts(&self, count: usize, exclude_slug: Option<&str>) -> Vec<&Post> {
        self.published_posts()
            .filter(|post| exclude_slug != Some(post.slug.as_str()))
            .take(count)
            .collect()
    }
}

/// Render markdown to HTML.
fn render_markdown(markdown: &str) -> String {
    markdown_to_html(markdown, &Options::default())
}

/// Estimate reading time in whole minutes, never below one.
fn reading_time(markdown: &str) -> u32 {
    let words = u32::try_from(markdown.split_whitespace().count()).unwrap_or(u32::MAX);
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_basic() {
        let html = render_markdown("# Hello\n\nSome *emphasis*.");
        assert!(html.contains("<h1>"));
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_reading_time_never_below_one_minute() {
        assert_eq!(reading_time("short"), 1);
        assert_eq!(reading_time(""), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = "word ".repeat(401);
        assert_eq!(reading_time(&text), 3);
    }

    #[test]
    fn test_store_hides_drafts_and_sorts_newest_first() {
        let post = |slug: &str, date: &str, draft: bool| Post {
            slug: slug.to_string(),
            meta: PostMeta {
                title: slug.to_string(),
                description: None,
                author: None,
                published_at: date.parse().expect("valid date"),
                cover: None,
                tags: Vec::new(),
                draft,
            },
            content_html: String::new(),
            reading_time_minutes: 1,
        };

        let store = ContentStore::from_posts(vec![
            post("older", "2025-01-10", false),
            post("newer", "2025-05-01", false),
            post("hidden", "2025-06-01", true),
        ]);

        let slugs: Vec<&str> = store.published_posts().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["newer", "older"]);

        assert!(store.post("newer").is_some());
        assert!(store.post("hidden").is_none());

        let recent = store.recent_posts(5, Some("newer"));
        assert_eq!(recent.len(), 1);
        assert_eq!(recent.first().map(|p| p.slug.as_str()), Some("older"));
    }
}
