use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    handler::Handler,
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use tracing::instrument;

use crate::{
    application::{
        error::HttpError,
        site::{Page, PageData, SiteService},
    },
    infra::assets::serve_static,
    presentation::views::{
        ArticleTemplate, ArticleView, CandidateCard, CandidatesTemplate, CandidatesView,
        HomeTemplate, HomeView, LayoutChrome, LayoutContext, NewsItemView, NewsTemplate,
        NewsView, PrioritiesTemplate, PrioritiesView, PriorityView, render_not_found_response,
        render_template_response,
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub site: Arc<SiteService>,
    /// Backend base URL that asset links are built from.
    pub assets_base: Arc<str>,
}

impl HttpState {
    pub fn new(site: Arc<SiteService>, assets_base: impl Into<Arc<str>>) -> Self {
        Self {
            site,
            assets_base: assets_base.into(),
        }
    }

    async fn chrome(&self) -> LayoutChrome {
        LayoutChrome::new(self.site.disclaimer().await)
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get_only(home))
        .route("/candidates", get_only(candidates))
        .route("/priorities", get_only(priorities))
        .route("/news", get_only(news))
        .route("/articles/{slug}", get_only(article))
        .route("/static/{*path}", get_only(serve_static))
        .fallback(not_found)
        .method_not_allowed_fallback(unsupported_method)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// GET route whose HEAD requests get the 405 response instead of axum's implicit GET.
fn get_only<H, T>(handler: H) -> MethodRouter<HttpState>
where
    H: Handler<T, HttpState>,
    T: 'static,
{
    get(handler).head(unsupported_method)
}

async fn home(State(state): State<HttpState>) -> Response {
    render_page(&state, Page::Home).await
}

async fn candidates(State(state): State<HttpState>) -> Response {
    render_page(&state, Page::Candidates).await
}

async fn priorities(State(state): State<HttpState>) -> Response {
    render_page(&state, Page::Priorities).await
}

async fn news(State(state): State<HttpState>) -> Response {
    render_page(&state, Page::News).await
}

async fn article(State(state): State<HttpState>, Path(slug): Path<String>) -> Response {
    render_page(&state, Page::Article(slug)).await
}

async fn not_found(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome().await)
}

async fn unsupported_method(method: Method) -> Response {
    HttpError::new(
        "infra::http::public::unsupported_method",
        StatusCode::METHOD_NOT_ALLOWED,
        "unsupported method",
        format!("method {method} is not supported"),
    )
    .into_response()
}

#[instrument(skip_all, fields(page = page.name()))]
async fn render_page(state: &HttpState, page: Page) -> Response {
    let data = match state.site.resolve(&page).await {
        Ok(data) => data,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let chrome = state.chrome().await;
    match data {
        Some(data) => render_page_data(data, chrome, &state.assets_base),
        None => render_not_found_response(chrome),
    }
}

fn render_page_data(data: PageData, chrome: LayoutChrome, assets: &str) -> Response {
    match data {
        PageData::Home(content) => {
            let chrome = chrome
                .with_title(content.configuration.title.clone())
                .with_description(content.configuration.description.clone());
            let view = LayoutContext::new(chrome, HomeView::from_content(&content, assets));
            render_template_response(HomeTemplate { view }, StatusCode::OK)
        }
        PageData::Candidates(candidates) => {
            let content = CandidatesView {
                candidates: candidates
                    .iter()
                    .map(|candidate| CandidateCard::from_candidate(candidate, assets))
                    .collect(),
            };
            let view = LayoutContext::new(chrome.with_title("Candidates"), content);
            render_template_response(CandidatesTemplate { view }, StatusCode::OK)
        }
        PageData::Priorities(priorities) => {
            let content = PrioritiesView {
                priorities: priorities.iter().map(PriorityView::from).collect(),
            };
            let view = LayoutContext::new(chrome.with_title("Priorities"), content);
            render_template_response(PrioritiesTemplate { view }, StatusCode::OK)
        }
        PageData::News(items) => {
            let content = NewsView {
                news: items.iter().map(NewsItemView::from).collect(),
            };
            let view = LayoutContext::new(chrome.with_title("News"), content);
            render_template_response(NewsTemplate { view }, StatusCode::OK)
        }
        PageData::Article(article) => {
            let chrome = chrome
                .with_title(article.title.clone())
                .with_description(article.description.clone());
            let view = LayoutContext::new(chrome, ArticleView::from(&article));
            render_template_response(ArticleTemplate { view }, StatusCode::OK)
        }
    }
}
