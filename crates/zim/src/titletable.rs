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

//! Title pointer table: `entry_count` u32 indices into the URL pointer
//! table. Parsed for completeness (per the spec's Open Question) but no
//! lookup path is built against it — title search goes through `zim-fts`
//! instead. Grounded on `crates/zimba/src/lib.rs`'s `TitlePointerList`.

use crate::decode::u32_at;
use crate::error::Result;

#[derive(Debug)]
pub struct TitlePointerTable(Vec<u32>);

impl TitlePointerTable {
    pub fn from_bytes(bytes: &[u8], entry_count: u32) -> Result<Self> {
        let mut pointers = Vec::with_capacity(entry_count as usize);
        for i in 0..entry_count as usize {
            pointers.push(u32_at(bytes, i * 4)?);
        }
        Ok(Self(pointers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
