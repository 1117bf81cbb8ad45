//! Page resolution on top of the memoized content cache.

use std::sync::Arc;

use tracing::warn;

use crate::application::repos::{ContentRepo, FetchError};
use crate::cache::{CacheConfig, KeyedMemoizer, Memoizer};
use crate::domain::entities::{Article, Candidate, HomeContent, News, Priority};

/// A routable page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Home,
    Candidates,
    Priorities,
    News,
    Article(String),
}

impl Page {
    pub fn name(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Candidates => "candidates",
            Page::Priorities => "priorities",
            Page::News => "news",
            Page::Article(_) => "article",
        }
    }
}

/// Content backing a resolved page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageData {
    Home(HomeContent),
    Candidates(Vec<Candidate>),
    Priorities(Vec<Priority>),
    News(Vec<News>),
    Article(Article),
}

pub struct SiteService {
    home: Memoizer<HomeContent, FetchError>,
    candidates: Memoizer<Vec<Candidate>, FetchError>,
    priorities: Memoizer<Vec<Priority>, FetchError>,
    news: Memoizer<Vec<News>, FetchError>,
    disclaimer: Memoizer<String, FetchError>,
    articles: KeyedMemoizer<Option<Article>, FetchError>,
}

impl SiteService {
    pub fn new(repo: Arc<dyn ContentRepo>, config: &CacheConfig) -> Self {
        let ttl = config.ttl();

        let home = {
            let repo = repo.clone();
            Memoizer::from_fn("home", ttl, move || {
                let repo = repo.clone();
                async move { repo.home().await }
            })
        };
        let candidates = {
            let repo = repo.clone();
            Memoizer::from_fn("candidates", ttl, move || {
                let repo = repo.clone();
                async move { repo.candidates().await }
            })
        };
        let priorities = {
            let repo = repo.clone();
            Memoizer::from_fn("priorities", ttl, move || {
                let repo = repo.clone();
                async move { repo.priorities().await }
            })
        };
        let news = {
            let repo = repo.clone();
            Memoizer::from_fn("news", ttl, move || {
                let repo = repo.clone();
                async move { repo.news().await }
            })
        };
        let disclaimer = {
            let repo = repo.clone();
            Memoizer::from_fn("disclaimer", ttl, move || {
                let repo = repo.clone();
                async move { repo.disclaimer().await }
            })
        };
        let articles = KeyedMemoizer::from_fn(
            "article",
            ttl,
            config.article_capacity,
            config.article_idle(),
            move |slug: String| {
                let repo = repo.clone();
                async move { repo.article_by_slug(&slug).await }
            },
        );

        Self {
            home,
            candidates,
            priorities,
            news,
            disclaimer,
            articles,
        }
    }

    /// Resolve `page` through its memoizer.
    ///
    /// `Ok(None)` means the page has no content (an unknown article slug).
    pub async fn resolve(&self, page: &Page) -> Result<Option<PageData>, FetchError> {
        let data = match page {
            Page::Home => PageData::Home(self.home.get().await?),
            Page::Candidates => PageData::Candidates(self.candidates.get().await?),
            Page::Priorities => PageData::Priorities(self.priorities.get().await?),
            Page::News => PageData::News(self.news.get().await?),
            Page::Article(slug) => {
                if slug.is_empty() {
                    return Ok(None);
                }
                match self.articles.get(slug).await? {
                    Some(article) => PageData::Article(article),
                    None => return Ok(None),
                }
            }
        };
        Ok(Some(data))
    }

    /// Footer disclaimer. Failures render as an empty string.
    pub async fn disclaimer(&self) -> String {
        match self.disclaimer.get().await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "disclaimer unavailable; rendering empty footer");
                String::new()
            }
        }
    }

    /// Drop article memoizers idle past the configured timeout.
    pub fn sweep_articles(&self) -> usize {
        self.articles.sweep_idle()
    }

    pub fn resident_articles(&self) -> usize {
        self.articles.len()
    }
}
