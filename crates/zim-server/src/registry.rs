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

//! Archive registry: catalogs `.zim` files in a directory and loads each
//! archive (plus its title index) lazily, exactly once, on first reference.
//!
//! Grounded on §4.10/§5: a `DashMap`-backed map of `Arc<OnceCell<...>>`
//! slots, the same single-flight idiom `crates/zim`'s `ClusterCache` uses
//! for cluster decompression, applied here at the whole-archive level.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;

use zim::ZimArchive;
use zim_fts::TitleIndex;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("archive '{0}' is not known to this server")]
    UnknownArchive(String),

    #[error("failed to load archive '{name}': {source}")]
    LoadFailed { name: String, source: zim::Error },

    #[error("failed to load or build title index for '{name}': {source}")]
    IndexFailed { name: String, source: zim_fts::Error },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One catalogued archive: known from the directory scan, not necessarily
/// loaded yet.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub name: String,
    pub path: PathBuf,
    pub human_size: String,
}

pub struct LoadedArchive {
    pub archive: ZimArchive,
    pub title_index: TitleIndex,
}

type Slot = Arc<OnceCell<Arc<LoadedArchive>>>;

pub struct ArchiveRegistry {
    archive_dir: PathBuf,
    index_dir: PathBuf,
    cluster_cache_capacity: usize,
    catalog: Vec<CatalogEntry>,
    loaded: DashMap<String, Slot>,
}

impl ArchiveRegistry {
    pub fn scan(archive_dir: &Path, index_dir: &Path, cluster_cache_capacity: usize) -> Result<Self> {
        let mut catalog = Vec::new();
        for entry in std::fs::read_dir(archive_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("zim") {
                continue;
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let human_size = human_readable_size(entry.metadata()?.len());
            catalog.push(CatalogEntry {
                name,
                path,
                human_size,
            });
        }
        catalog.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(count = catalog.len(), dir = %archive_dir.display(), "catalogued archives");

        Ok(Self {
            archive_dir: archive_dir.to_path_buf(),
            index_dir: index_dir.to_path_buf(),
            cluster_cache_capacity,
            catalog,
            loaded: DashMap::new(),
        })
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|e| e.name == name)
    }

    /// Loads (or returns the already-loaded) archive and title index for
    /// `name`. Concurrent callers racing on the same unloaded name share one
    /// load via the slot's `OnceCell`.
    pub fn get(&self, name: &str) -> Result<Arc<LoadedArchive>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::UnknownArchive(name.to_string()))?
            .clone();

        let slot = self
            .loaded
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        slot.get_or_try_init(|| self.load(&entry)).map(Arc::clone)
    }

    fn load(&self, entry: &CatalogEntry) -> Result<Arc<LoadedArchive>> {
        tracing::info!(archive = %entry.name, "loading archive");
        let archive = ZimArchive::open_with_cache_capacity(&entry.path, self.cluster_cache_capacity)
            .map_err(|source| Error::LoadFailed {
                name: entry.name.clone(),
                source,
            })?;

        let index_path = self.index_dir.join(&entry.name);
        let title_index = TitleIndex::open_or_build(&archive, &index_path).map_err(|source| {
            Error::IndexFailed {
                name: entry.name.clone(),
                source,
            }
        })?;

        Ok(Arc::new(LoadedArchive {
            archive,
            title_index,
        }))
    }

    /// Eagerly loads every catalogued archive; used by the `reindex`
    /// subcommand so index builds happen up front rather than on first hit.
    pub fn load_all(&self) -> Vec<(String, Result<Arc<LoadedArchive>>)> {
        self.catalog
            .iter()
            .map(|entry| (entry.name.clone(), self.get(&entry.name)))
            .collect()
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }
}

fn human_readable_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
