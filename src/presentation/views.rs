use crate::application::error::{ErrorReport, HttpError};
use crate::domain::entities::{Article, Candidate, HomeContent, Image, News, Priority};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "failed to parse template",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let chrome = chrome.with_title("Page Not Found");
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(NotFoundTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// `{base}/assets/{id}` for a backend-hosted file.
pub fn asset_url(base: &str, id: &str) -> String {
    format!("{}/assets/{}", base.trim_end_matches('/'), id)
}

fn image_url(base: &str, image: Option<&Image>) -> Option<String> {
    image
        .filter(|image| !image.id.is_empty())
        .map(|image| asset_url(base, &image.id))
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

impl NavigationView {
    pub fn primary() -> Self {
        let entries = [
            ("Home", "/"),
            ("Candidates", "/candidates"),
            ("Priorities", "/priorities"),
            ("News", "/news"),
        ]
        .into_iter()
        .map(|(label, href)| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
        })
        .collect();

        Self { entries }
    }
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub disclaimer: String,
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

/// Shared page frame: navigation, meta tags and the disclaimer footer.
#[derive(Clone)]
pub struct LayoutChrome {
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn new(disclaimer: String) -> Self {
        Self {
            navigation: NavigationView::primary(),
            footer: FooterView { disclaimer },
            meta: PageMetaView {
                title: String::new(),
                description: String::new(),
            },
        }
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            meta: PageMetaView {
                title: title.into(),
                ..self.meta
            },
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            meta: PageMetaView {
                description: description.into(),
                ..self.meta
            },
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct CandidateCard {
    pub slug: String,
    pub name: String,
    pub first_name: String,
    pub short_bio: String,
    pub bio_html: String,
    pub image_url: Option<String>,
}

impl CandidateCard {
    pub fn from_candidate(candidate: &Candidate, assets: &str) -> Self {
        Self {
            slug: candidate.slug.clone(),
            name: candidate.name.clone(),
            first_name: candidate.first_name().to_string(),
            short_bio: candidate.short_bio.clone(),
            bio_html: candidate.bio.clone(),
            image_url: image_url(assets, candidate.image.as_ref()),
        }
    }
}

#[derive(Clone)]
pub struct PriorityView {
    pub slug: String,
    pub title: String,
    pub content_html: String,
}

impl From<&Priority> for PriorityView {
    fn from(priority: &Priority) -> Self {
        Self {
            slug: priority.slug.clone(),
            title: priority.title.clone(),
            content_html: priority.content.clone(),
        }
    }
}

#[derive(Clone)]
pub struct NewsItemView {
    pub title: String,
    pub source: String,
    pub href: String,
    pub is_external: bool,
}

impl From<&News> for NewsItemView {
    fn from(news: &News) -> Self {
        Self {
            title: news.title.clone(),
            source: news.source.clone(),
            href: news.href(),
            is_external: news.is_external(),
        }
    }
}

pub struct HomeView {
    pub title: String,
    pub description: String,
    pub hero_image_url: Option<String>,
    pub candidates: Vec<CandidateCard>,
    pub priorities: Vec<PriorityView>,
    pub news: Vec<NewsItemView>,
}

impl HomeView {
    pub fn from_content(content: &HomeContent, assets: &str) -> Self {
        Self {
            title: content.configuration.title.clone(),
            description: content.configuration.description.clone(),
            hero_image_url: image_url(assets, content.configuration.image.as_ref()),
            candidates: content
                .candidates
                .iter()
                .map(|candidate| CandidateCard::from_candidate(candidate, assets))
                .collect(),
            priorities: content.priorities.iter().map(PriorityView::from).collect(),
            news: content.news.iter().map(NewsItemView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeView>,
}

pub struct CandidatesView {
    pub candidates: Vec<CandidateCard>,
}

#[derive(Template)]
#[template(path = "candidates.html")]
pub struct CandidatesTemplate {
    pub view: LayoutContext<CandidatesView>,
}

pub struct PrioritiesView {
    pub priorities: Vec<PriorityView>,
}

#[derive(Template)]
#[template(path = "priorities.html")]
pub struct PrioritiesTemplate {
    pub view: LayoutContext<PrioritiesView>,
}

pub struct NewsView {
    pub news: Vec<NewsItemView>,
}

#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsTemplate {
    pub view: LayoutContext<NewsView>,
}

pub struct ArticleView {
    pub title: String,
    pub description: String,
    pub content_html: String,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            description: article.description.clone(),
            content_html: article.content.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: ErrorAction,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            primary_action: ErrorAction::home(),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub view: LayoutContext<ErrorPageView>,
}
