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

//! URL pointer table: `entry_count` absolute byte offsets into the archive,
//! sorted by `namespace + "/" + url`. Grounded on `crates/zimba/src/lib.rs`'s
//! `UrlPointerList`, plus the binary search the distilled spec requires
//! (zimba itself only exposes indexed access, not a search).

use crate::decode::u64_at;
use crate::error::Result;

#[derive(Debug)]
pub struct UrlPointerTable(Vec<u64>);

impl UrlPointerTable {
    pub fn from_bytes(bytes: &[u8], entry_count: u32) -> Result<Self> {
        let mut pointers = Vec::with_capacity(entry_count as usize);
        for i in 0..entry_count as usize {
            pointers.push(u64_at(bytes, i * 8)?);
        }
        Ok(Self(pointers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn offset(&self, index: u32) -> Option<u64> {
        self.0.get(index as usize).copied()
    }
}

/// Binary search helper: given a function that reads the sort key for an
/// entry index, finds the index whose key equals `target`. Generic over the
/// key lookup so tests can exercise it without a full archive.
///
/// `key_at` errors (a corrupt probe entry) propagate rather than being read
/// as "not found" — a format error partway through the search is fatal for
/// the archive, not a miss.
pub fn binary_search_by_key<F>(len: usize, target: &str, mut key_at: F) -> Result<Option<u32>>
where
    F: FnMut(u32) -> Result<String>,
{
    let mut lo = 0i64;
    let mut hi = len as i64 - 1;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let key = key_at(mid as u32)?;
        match key.as_str().cmp(target) {
            std::cmp::Ordering::Equal => return Ok(Some(mid as u32)),
            std::cmp::Ordering::Less => lo = mid + 1,
            std::cmp::Ordering::Greater => hi = mid - 1,
        }
    }

    Ok(None)
}
