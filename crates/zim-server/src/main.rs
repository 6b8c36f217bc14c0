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

//! CLI entrypoint (§4.13): `serve` starts the HTTP server, `reindex` builds
//! title search indices without serving. Grounded on `crates/core/src/main.rs`'s
//! `clap::Parser`/`Subcommand` dispatch and `tracing_subscriber` setup.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use zim_server::config::{self, ServerConfig};
use zim_server::registry::ArchiveRegistry;
use zim_server::{http, templates};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load archives from the archive directory and serve them over HTTP.
    Serve {
        #[clap(long)]
        archive_dir: Option<PathBuf>,
        #[clap(long)]
        index_dir: Option<PathBuf>,
        #[clap(long)]
        template: Option<PathBuf>,
        #[clap(long)]
        bind: Option<IpAddr>,
        #[clap(long)]
        port: Option<u16>,
        #[clap(long)]
        config: Option<PathBuf>,
    },

    /// Eagerly build (or rebuild) title search indices without serving.
    Reindex {
        #[clap(long)]
        archive_dir: PathBuf,
        #[clap(long)]
        index_dir: PathBuf,
        /// Reindex only this archive; all archives if omitted.
        #[clap(long)]
        archive: Option<String>,
    },
}

fn load_toml_config(path: &std::path::Path) -> Result<ServerConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: '{}'", path.display()))?;
    ServerConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to parse config: '{}'", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive("zim_server=info".parse().unwrap())
                .from_env_lossy(),
        )
        .without_time()
        .with_target(false)
        .finish()
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Serve {
            archive_dir,
            index_dir,
            template,
            bind,
            port,
            config,
        } => {
            let base = config
                .as_deref()
                .map(load_toml_config)
                .transpose()?;

            let archive_dir = archive_dir
                .or_else(|| base.as_ref().map(|c| c.archive_dir.clone()))
                .context("--archive-dir is required (flag or config file)")?;
            let index_dir = index_dir
                .or_else(|| base.as_ref().map(|c| c.index_dir.clone()))
                .context("--index-dir is required (flag or config file)")?;
            let template_path = template
                .or_else(|| base.as_ref().map(|c| c.template_path.clone()))
                .context("--template is required (flag or config file)")?;
            let bind = bind
                .or_else(|| base.as_ref().map(|c| c.bind))
                .unwrap_or_else(config::defaults::Server::bind);
            let port = port
                .or_else(|| base.as_ref().map(|c| c.port))
                .unwrap_or_else(config::defaults::Server::port);
            let cluster_cache_capacity = base
                .as_ref()
                .map(|c| c.cluster_cache_capacity)
                .unwrap_or_else(config::defaults::Server::cluster_cache_capacity);
            let (bm25_k1, bm25_b) = base
                .as_ref()
                .map(|c| (c.bm25_k1, c.bm25_b))
                .unwrap_or_else(|| {
                    (
                        config::defaults::Server::bm25_k1(),
                        config::defaults::Server::bm25_b(),
                    )
                });

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(serve(
                    archive_dir,
                    index_dir,
                    template_path,
                    bind,
                    port,
                    cluster_cache_capacity,
                    bm25_k1,
                    bm25_b,
                ))
        }
        Commands::Reindex {
            archive_dir,
            index_dir,
            archive,
        } => reindex(archive_dir, index_dir, archive),
    }
}

#[allow(clippy::too_many_arguments)]
async fn serve(
    archive_dir: PathBuf,
    index_dir: PathBuf,
    template_path: PathBuf,
    bind: IpAddr,
    port: u16,
    cluster_cache_capacity: usize,
    bm25_k1: f64,
    bm25_b: f64,
) -> Result<()> {
    let registry = ArchiveRegistry::scan(&archive_dir, &index_dir, cluster_cache_capacity)?;
    let templates = templates::load(&template_path)?;

    let state = std::sync::Arc::new(http::AppState {
        registry,
        templates,
        bm25: zim_fts::Bm25::new(bm25_k1, bm25_b),
    });

    let app = http::router(state);
    let addr = SocketAddr::new(bind, port);
    tracing::info!("zim-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn reindex(archive_dir: PathBuf, index_dir: PathBuf, archive: Option<String>) -> Result<()> {
    let registry = ArchiveRegistry::scan(&archive_dir, &index_dir, zim::DEFAULT_CACHE_CAPACITY)?;

    let results = match archive {
        Some(name) => vec![(name.clone(), registry.get(&name).map_err(Into::into))],
        None => registry
            .load_all()
            .into_iter()
            .map(|(name, result)| (name, result.map_err(anyhow::Error::from)))
            .collect(),
    };

    for (name, result) in results {
        match result {
            Ok(_) => tracing::info!(archive = %name, "index ready"),
            Err(err) => tracing::error!(archive = %name, %err, "reindex failed"),
        }
    }

    Ok(())
}
