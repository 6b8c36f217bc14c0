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

//! Maps core error kinds to HTTP status codes per §7. Handlers return
//! `Result<impl IntoResponse, AppError>`, following the teacher's
//! `Result<impl IntoResponse, StatusCode>` handler shape (`crates/core/src/api/search.rs`)
//! generalized to carry enough context to log before responding.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::registry;

pub enum AppError {
    NotFound,
    /// Archive-corruption errors that don't take the whole archive down.
    Degraded(String),
    /// Fatal for the whole archive: format errors, index build failures.
    Unavailable(String),
    Internal(String),
}

impl From<zim::Error> for AppError {
    fn from(err: zim::Error) -> Self {
        match err {
            zim::Error::EntryNotFound | zim::Error::RedirectLoop { .. } => {
                tracing::warn!(%err, "lookup failed");
                AppError::NotFound
            }
            zim::Error::DecompressionFailed { .. } | zim::Error::BlobOutOfRange { .. } => {
                tracing::warn!(%err, "archive corruption on read, archive remains loaded");
                AppError::Degraded(err.to_string())
            }
            zim::Error::InvalidMagic | zim::Error::TruncatedArchive | zim::Error::UnsupportedCompression(_) => {
                tracing::error!(%err, "fatal archive format error");
                AppError::Unavailable(err.to_string())
            }
            other => {
                tracing::error!(err = %other, "unexpected zim error");
                AppError::Internal(other.to_string())
            }
        }
    }
}

impl From<zim_fts::Error> for AppError {
    fn from(err: zim_fts::Error) -> Self {
        tracing::warn!(%err, "search unavailable for this archive");
        AppError::Unavailable(err.to_string())
    }
}

impl From<registry::Error> for AppError {
    fn from(err: registry::Error) -> Self {
        match err {
            registry::Error::UnknownArchive(_) => AppError::NotFound,
            registry::Error::LoadFailed { .. } => {
                tracing::error!(%err, "archive load failed");
                AppError::Unavailable(err.to_string())
            }
            registry::Error::IndexFailed { .. } => {
                tracing::error!(%err, "title index load/build failed");
                AppError::Unavailable(err.to_string())
            }
            registry::Error::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Degraded(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
