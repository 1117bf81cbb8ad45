use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::application::repos::{ContentRepo, FetchError};
use crate::domain::entities::{Article, Candidate, Configuration, HomeContent, News, Priority};

use super::BackendClient;

const HOME_QUERY: &str = r#"
{
    configuration {
        title
        description
        image {
            id
        }
    }
    candidates {
        slug
        name
        short_bio
        image {
            id
        }
    }
    priorities {
        slug
        title
    }
    news {
        content_type
        article {
            slug
        }
        title
        link
        source
    }
}
"#;

const CANDIDATES_QUERY: &str = r#"
{
    candidates {
        slug
        name
        bio
        image {
            id
        }
    }
}
"#;

const PRIORITIES_QUERY: &str = r#"
{
    priorities {
        slug
        title
        content
    }
}
"#;

const NEWS_QUERY: &str = r#"
{
    news {
        content_type
        article {
            slug
        }
        title
        link
        source
    }
}
"#;

const DISCLAIMER_QUERY: &str = r#"
{
    configuration {
        disclaimer
    }
}
"#;

const ARTICLE_BY_SLUG_QUERY: &str = r#"
query getArticleBySlug($slug: String) {
    articles(filter: { slug: { _eq: $slug } }, limit: 1) {
        slug
        title
        description
        content
    }
}
"#;

#[derive(Deserialize)]
struct CandidatesData {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct PrioritiesData {
    #[serde(default)]
    priorities: Vec<Priority>,
}

#[derive(Deserialize)]
struct NewsData {
    #[serde(default)]
    news: Vec<News>,
}

#[derive(Deserialize)]
struct ConfigurationData {
    #[serde(default)]
    configuration: Option<Configuration>,
}

#[derive(Deserialize)]
struct ArticlesData {
    #[serde(default)]
    articles: Vec<Article>,
}

#[async_trait]
impl ContentRepo for BackendClient {
    async fn home(&self) -> Result<HomeContent, FetchError> {
        self.query(HOME_QUERY, None).await
    }

    async fn candidates(&self) -> Result<Vec<Candidate>, FetchError> {
        let data: CandidatesData = self.query(CANDIDATES_QUERY, None).await?;
        Ok(data.candidates)
    }

    async fn priorities(&self) -> Result<Vec<Priority>, FetchError> {
        let data: PrioritiesData = self.query(PRIORITIES_QUERY, None).await?;
        Ok(data.priorities)
    }

    async fn news(&self) -> Result<Vec<News>, FetchError> {
        let data: NewsData = self.query(NEWS_QUERY, None).await?;
        Ok(data.news)
    }

    async fn disclaimer(&self) -> Result<String, FetchError> {
        let data: ConfigurationData = self.query(DISCLAIMER_QUERY, None).await?;
        Ok(data
            .configuration
            .map(|configuration| configuration.disclaimer)
            .unwrap_or_default())
    }

    async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>, FetchError> {
        let data: ArticlesData = self
            .query(ARTICLE_BY_SLUG_QUERY, Some(json!({ "slug": slug })))
            .await?;
        Ok(data.articles.into_iter().next())
    }
}
