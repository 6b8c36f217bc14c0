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

//! Default values for `ServerConfig` fields a TOML file may omit.
//! Mirrors the teacher's `crates/core/src/config/defaults.rs` layout: one
//! zero-sized struct per config struct, one method per defaulted field.

use std::net::IpAddr;

pub struct Server;

impl Server {
    pub fn bind() -> IpAddr {
        IpAddr::from([127, 0, 0, 1])
    }

    pub fn port() -> u16 {
        8080
    }

    pub fn cluster_cache_capacity() -> usize {
        zim::DEFAULT_CACHE_CAPACITY
    }

    pub fn bm25_k1() -> f64 {
        1.2
    }

    pub fn bm25_b() -> f64 {
        0.75
    }
}
