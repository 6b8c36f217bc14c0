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

//! Runtime configuration: an optional TOML file layered under CLI flags.
//!
//! Follows the teacher's `crates/core/src/config` convention of a plain
//! `serde::Deserialize` struct with a sibling `defaults` module supplying
//! `#[serde(default = "...")]` values for fields a config file may omit.

pub mod defaults;

use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerConfig {
    pub archive_dir: PathBuf,
    pub index_dir: PathBuf,
    /// Path to the single page template file (not a directory).
    pub template_path: PathBuf,

    #[serde(default = "defaults::Server::bind")]
    pub bind: IpAddr,

    #[serde(default = "defaults::Server::port")]
    pub port: u16,

    #[serde(default = "defaults::Server::cluster_cache_capacity")]
    pub cluster_cache_capacity: usize,

    #[serde(default = "defaults::Server::bm25_k1")]
    pub bm25_k1: f64,

    #[serde(default = "defaults::Server::bm25_b")]
    pub bm25_b: f64,
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}
