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

//! axum router and shared state (§4.14). Grounded on `crates/core/src/api/mod.rs`'s
//! `Router`/`State`/`with_state` shape, generalized from stract's search API to
//! this server's archive/search routes.

pub mod error;
mod fragments;
mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use minijinja::Environment;
use tower_http::trace::TraceLayer;

use crate::registry::ArchiveRegistry;
use zim_fts::Bm25;

pub struct AppState {
    pub registry: ArchiveRegistry,
    pub templates: Environment<'static>,
    pub bm25: Bm25,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/*path", get(routes::catchall))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
