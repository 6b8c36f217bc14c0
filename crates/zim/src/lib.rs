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

//! ZIM file reader: binary decoder, directory index, cluster decompression.
//! https://wiki.openzim.org/wiki/ZIM_file_format

mod archive;
mod cluster;
mod decode;
mod dirent;
mod error;
mod header;
mod mime;
mod resolver;
#[cfg(test)]
mod testutil;
mod titletable;
mod urltable;

pub use archive::{DirEntryIterator, ZimArchive};
pub use cluster::{ClusterCache, DecodedCluster, DEFAULT_CACHE_CAPACITY};
pub use dirent::Entry;
pub use error::{Error, Result};
pub use resolver::{Article, MAX_REDIRECT_DEPTH};
