// Stract is an open source web search engine.
// Copyright (C) 2023 Stract ApS
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Route handlers (§6). Thin: percent-decode, call into the registry/core,
//! and either hand back a raw blob with its MIME type or render a template.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use super::error::AppError;
use super::fragments;
use super::AppState;
use crate::registry::LoadedArchive;
use crate::templates;

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let catalog = state.registry.catalog();

    let mut body = String::from("<h1>Available archives</h1>");
    if catalog.is_empty() {
        body.push_str("<p>No archives found.</p>");
    } else {
        body.push_str("<ul>");
        for entry in catalog {
            body.push_str(&format!(
                "<li><a href=\"/{name}/\">{name}</a> ({size})</li>",
                name = entry.name,
                size = entry.human_size,
            ));
        }
        body.push_str("</ul>");
    }

    render_page(&state, "zim_list", "ZIM archives", "", &body)
}

#[derive(serde::Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `/<segments...>` — dispatches every non-root path. Segment 0 decides
/// routing: a known archive name routes within that archive; otherwise the
/// path is treated as `/<ns>/<url>` resolved via the `Referer` header.
pub async fn catchall(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let is_known_archive = state
        .registry
        .catalog()
        .iter()
        .any(|e| e.name == segments[0]);

    if is_known_archive {
        let archive_name = segments[0];
        let rest = &segments[1..];
        return serve_within_archive(&state, archive_name, rest, params).await;
    }

    resolve_via_referer(&state, &segments, &headers).await
}

async fn serve_within_archive(
    state: &Arc<AppState>,
    archive_name: &str,
    rest: &[&str],
    params: SearchParams,
) -> Result<Response, AppError> {
    let loaded = state.registry.get(archive_name)?;

    if let Some(query) = params.q {
        return render_search(state, &loaded, archive_name, &query);
    }

    if rest.is_empty() {
        let article = loaded.archive.get_main_page()?;
        return article_response(state, article);
    }

    let (namespace, url) = split_namespace_and_url(rest);
    match loaded.archive.get_article_by_url(namespace, &url)? {
        Some(article) => article_response(state, article),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

async fn resolve_via_referer(
    state: &Arc<AppState>,
    segments: &[&str],
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    if segments.first().map(|s| s.chars().count()) != Some(1) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let namespace = segments[0].chars().next().unwrap();
    let url = segments[1..].join("/");

    let Some(archive_name) = archive_name_from_referer(headers, state) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let loaded = state.registry.get(&archive_name)?;
    match loaded.archive.get_article_by_url(namespace, &url)? {
        Some(article) => article_response(state, article),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

fn archive_name_from_referer(headers: &HeaderMap, state: &Arc<AppState>) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let path = referer.split("://").nth(1).unwrap_or(referer);
    let path = path.splitn(2, '/').nth(1)?;
    let first_segment = path.split('/').find(|s| !s.is_empty())?;
    state
        .registry
        .catalog()
        .iter()
        .find(|e| e.name == first_segment)
        .map(|e| e.name.clone())
}

/// `ns` is a single-character first segment; anything longer is treated as
/// the start of an `A`-namespace URL.
fn split_namespace_and_url(rest: &[&str]) -> (char, String) {
    if rest[0].chars().count() == 1 {
        (rest[0].chars().next().unwrap(), rest[1..].join("/"))
    } else {
        ('A', rest.join("/"))
    }
}

/// Article (namespace `A`) `text/html` responses are rendered through the
/// page template, with `<head>`/`<body>`/`<title>` extracted from the
/// article's own markup. Every other resource (images, stylesheets, other
/// namespaces) is served as a raw blob with its stored MIME type.
fn article_response(state: &Arc<AppState>, article: zim::Article) -> Result<Response, AppError> {
    if article.mimetype.starts_with("text/html") {
        let html = String::from_utf8_lossy(&article.data);
        let fragments = fragments::extract(&html);
        let title = fragments.title.unwrap_or_else(|| article.title.clone());
        return render_page(state, "browse", &title, &fragments.head, &fragments.body);
    }

    let mime = article.mimetype.parse().unwrap_or(mime_guess_fallback());
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .body(axum::body::Body::from(article.data))
        .unwrap())
}

fn mime_guess_fallback() -> axum::http::HeaderValue {
    axum::http::HeaderValue::from_static("application/octet-stream")
}

fn render_search(
    state: &Arc<AppState>,
    loaded: &LoadedArchive,
    archive_name: &str,
    query: &str,
) -> Result<Response, AppError> {
    let terms: Vec<String> = urlencoding::decode(query)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| query.to_string())
        .split('+')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let candidate_indices = loaded.title_index.search(&terms)?;

    let mut titles = Vec::with_capacity(candidate_indices.len());
    let mut entries = Vec::with_capacity(candidate_indices.len());
    for idx in &candidate_indices {
        let entry = loaded.archive.read_entry(*idx)?;
        titles.push(entry.title().to_lowercase());
        entries.push(entry);
    }

    let order = state.bm25.rank(&terms, &titles);

    let mut body = String::new();
    if order.is_empty() {
        body.push_str(&format!(
            "<p>No results for <i>{}</i> in {}.</p>",
            terms.join(" "),
            archive_name
        ));
    } else {
        body.push_str("<ol>");
        for i in order {
            body.push_str(&format!(
                "<li><a href=\"/{archive}/{url}\">{title}</a></li>",
                archive = archive_name,
                url = entries[i].url(),
                title = entries[i].title(),
            ));
        }
        body.push_str("</ol>");
    }

    let title = format!("Search: {}", terms.join(" "));
    render_page(state, "search", &title, "", &body)
}

/// Renders the shared page template with the given `location`/`title`/
/// `head`/`body` context (§9: one template, `location`-keyed rendering).
fn render_page(
    state: &Arc<AppState>,
    location: &str,
    title: &str,
    head: &str,
    body: &str,
) -> Result<Response, AppError> {
    let template = state
        .templates
        .get_template(templates::PAGE)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let rendered = template
        .render(minijinja::context! { location, title, head, body })
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Html(rendered).into_response())
}
