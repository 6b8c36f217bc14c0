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

//! Directory entry records (article / redirect tagged union).
//!
//! Grounded on `crates/zimba/src/lib.rs`'s `DirEntry::from_bytes`, split into
//! a plain struct-of-fields enum and given the entry index the spec requires
//! callers to be able to recover from a lookup.

use crate::decode::{read_zero_terminated, u16_at, u32_at};
use crate::error::Result;

pub const REDIRECT_MIME_ID: u16 = 0xFFFF;

#[derive(Debug, Clone)]
pub enum Entry {
    Article {
        index: u32,
        mime_id: u16,
        namespace: char,
        revision: u32,
        cluster_number: u32,
        blob_number: u32,
        url: String,
        title: String,
    },
    Redirect {
        index: u32,
        namespace: char,
        revision: u32,
        redirect_index: u32,
        url: String,
        title: String,
    },
}

impl Entry {
    pub fn index(&self) -> u32 {
        match self {
            Entry::Article { index, .. } | Entry::Redirect { index, .. } => *index,
        }
    }

    pub fn namespace(&self) -> char {
        match self {
            Entry::Article { namespace, .. } | Entry::Redirect { namespace, .. } => *namespace,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Entry::Article { url, .. } | Entry::Redirect { url, .. } => url,
        }
    }

    /// Effective title: an empty stored title means "same as URL".
    pub fn title(&self) -> &str {
        let (title, url) = match self {
            Entry::Article { title, url, .. } | Entry::Redirect { title, url, .. } => {
                (title.as_str(), url.as_str())
            }
        };
        if title.is_empty() {
            url
        } else {
            title
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Entry::Redirect { .. })
    }

    /// The byte-ordered sort key this entry occupies in the URL pointer
    /// table: `namespace + "/" + url`.
    pub fn sort_key(&self) -> String {
        format!("{}/{}", self.namespace(), self.url())
    }

    pub(crate) fn from_bytes(bytes: &[u8], index: u32) -> Result<Self> {
        let mime_id = u16_at(bytes, 0)?;
        let namespace = bytes.get(3).copied().unwrap_or(0) as char;
        let revision = u32_at(bytes, 4)?;

        if mime_id == REDIRECT_MIME_ID {
            let redirect_index = u32_at(bytes, 8)?;
            let url = read_zero_terminated(&bytes[12..])?;
            let title = read_zero_terminated(&bytes[12 + url.len() + 1..])?;
            return Ok(Entry::Redirect {
                index,
                namespace,
                revision,
                redirect_index,
                url,
                title,
            });
        }

        let cluster_number = u32_at(bytes, 8)?;
        let blob_number = u32_at(bytes, 12)?;
        let url = read_zero_terminated(&bytes[16..])?;
        let title = read_zero_terminated(&bytes[16 + url.len() + 1..])?;
        Ok(Entry::Article {
            index,
            mime_id,
            namespace,
            revision,
            cluster_number,
            blob_number,
            url,
            title,
        })
    }
}
