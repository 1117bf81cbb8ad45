//! Content records mirrored from the Directus backend.
//!
//! Records are immutable once fetched; a refresh replaces them wholesale. HTML fields
//! (`bio`, `content`) arrive pre-rendered from the CMS and are emitted unescaped.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub image: Option<Image>,
    #[serde(deserialize_with = "null_as_default")]
    pub disclaimer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Image {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Candidate {
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub short_bio: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bio: String,
    pub image: Option<Image>,
}

impl Candidate {
    /// Text before the first space of the candidate's name.
    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Priority {
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct News {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    pub article: Option<ArticleRef>,
}

impl News {
    /// Internal article path for article-backed items, the external link otherwise.
    pub fn href(&self) -> String {
        match self.article.as_ref() {
            Some(article)
                if self.content_type.eq_ignore_ascii_case("article")
                    && !article.slug.is_empty() =>
            {
                format!("/articles/{}", article.slug)
            }
            _ => self.link.clone(),
        }
    }

    pub fn is_external(&self) -> bool {
        !self.href().starts_with('/')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArticleRef {
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Article {
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
}

/// Everything the home page shows, fetched in one query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HomeContent {
    #[serde(deserialize_with = "null_as_default")]
    pub configuration: Configuration,
    #[serde(deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
    #[serde(deserialize_with = "null_as_default")]
    pub priorities: Vec<Priority>,
    #[serde(deserialize_with = "null_as_default")]
    pub news: Vec<News>,
}

/// Directus sends `null` for unset fields; treat it like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn news(content_type: &str, slug: Option<&str>, link: &str) -> News {
        News {
            title: "Headline".to_string(),
            content_type: content_type.to_string(),
            source: "Gazette".to_string(),
            link: link.to_string(),
            article: slug.map(|slug| ArticleRef {
                slug: slug.to_string(),
            }),
        }
    }

    #[test]
    fn first_name_takes_text_before_first_space() {
        let candidate = Candidate {
            name: "Ada Lovelace King".to_string(),
            ..Default::default()
        };
        assert_eq!(candidate.first_name(), "Ada");

        let mononym = Candidate {
            name: "Cher".to_string(),
            ..Default::default()
        };
        assert_eq!(mononym.first_name(), "Cher");
    }

    #[test]
    fn article_news_links_internally() {
        let item = news("article", Some("town-hall"), "");
        assert_eq!(item.href(), "/articles/town-hall");
        assert!(!item.is_external());
    }

    #[test]
    fn link_news_uses_external_url() {
        let item = news("link", None, "https://example.com/story");
        assert_eq!(item.href(), "https://example.com/story");
        assert!(item.is_external());
    }

    #[test]
    fn article_news_without_slug_falls_back_to_link() {
        let item = news("article", Some(""), "https://example.com/fallback");
        assert_eq!(item.href(), "https://example.com/fallback");
    }

    #[test]
    fn deserializes_null_image_and_missing_fields() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"slug":"ada","name":"Ada Lovelace","image":null}"#)
                .expect("candidate json");
        assert_eq!(candidate.image, None);
        assert_eq!(candidate.short_bio, "");
    }

    #[test]
    fn null_text_fields_become_empty() {
        let item: News = serde_json::from_str(
            r#"{"title":"Rally","content_type":"link","link":null,"source":null,"article":null}"#,
        )
        .expect("news json");
        assert_eq!(item.link, "");
        assert_eq!(item.source, "");
        assert_eq!(item.article, None);
    }
}
