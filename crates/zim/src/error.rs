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

//! Error kinds for the ZIM reader.
//!
//! Mirrors the error enum shape used throughout the teacher codebase
//! (`thiserror`-derived, one variant per failure mode), extended with the
//! full set of kinds the archive/cluster/resolver/index layers need.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of bytes while parsing the archive")]
    TruncatedArchive,

    #[error("invalid magic number")]
    InvalidMagic,

    #[error("unsupported cluster compression type {0}")]
    UnsupportedCompression(u8),

    #[error("failed to decompress cluster at offset {offset}: {source}")]
    DecompressionFailed {
        offset: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("blob {blob} out of range for cluster {cluster} ({count} blobs)")]
    BlobOutOfRange {
        cluster: u32,
        blob: u32,
        count: u32,
    },

    #[error("redirect chain exceeded depth cap or contains a cycle (start index {start})")]
    RedirectLoop { start: u32 },

    #[error("entry not found")]
    EntryNotFound,

    #[error("mime id {0} out of range")]
    MimeIdOutOfRange(u16),
}

pub type Result<T> = std::result::Result<T, Error>;
