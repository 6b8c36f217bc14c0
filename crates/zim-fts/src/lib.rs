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

//! Persistent full-text title index over a ZIM archive's directory (§4.8),
//! plus the BM25 reranker (§4.9) used to order search results.
//!
//! Grounded on the teacher's own `crates/tantivy` fork: we depend on the
//! published `tantivy` crate directly rather than vendoring that fork (see
//! DESIGN.md) and use its `TextOptions`/`Stemmer` tokenizer API to build a
//! `content=''`-style index (postings only, no stored text).

pub mod bm25;

pub use bm25::Bm25;

use std::path::Path;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, RegexQuery};
use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, STORED};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, Stemmer, TextAnalyzer};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

const TOKENIZER_NAME: &str = "zim_title_stem";
const SEARCH_LIMIT: usize = 10_000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to build title index: {0}")]
    IndexBuildFailed(#[source] tantivy::TantivyError),

    #[error("title index is corrupt or unreadable: {0}")]
    IndexCorrupt(#[source] tantivy::TantivyError),

    #[error(transparent)]
    Zim(#[from] zim::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn stemming_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(Stemmer::new(tantivy::tokenizer::Language::English))
        .build()
}

fn build_schema() -> (Schema, tantivy::schema::Field, tantivy::schema::Field) {
    let mut builder = Schema::builder();
    let doc_id = builder.add_u64_field("doc_id", FAST | STORED);

    // No STORED flag: this is the `content=''` contract from §3 — titles are
    // queryable but the index never reproduces them; the results path
    // re-fetches titles from the archive itself.
    let text_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER_NAME)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let title = builder.add_text_field("title", text_options);

    (builder.build(), doc_id, title)
}

pub struct TitleIndex {
    index: Index,
    reader: IndexReader,
    doc_id_field: tantivy::schema::Field,
    title_field: tantivy::schema::Field,
}

impl TitleIndex {
    /// §4.8: build the index once if `index_path` doesn't exist yet (an
    /// expensive, logged, one-time operation), then open a read-only handle.
    /// Callers (the archive registry) are responsible for ensuring only one
    /// build runs concurrently per archive.
    pub fn open_or_build(archive: &zim::ZimArchive, index_path: &Path) -> Result<Self> {
        if !index_path.join("meta.json").exists() {
            Self::build(archive, index_path)?;
        }
        Self::open(index_path)
    }

    fn build(archive: &zim::ZimArchive, index_path: &Path) -> Result<()> {
        std::fs::create_dir_all(index_path)?;
        let (schema, doc_id_field, title_field) = build_schema();
        let index = Index::create_in_dir(index_path, schema).map_err(Error::IndexBuildFailed)?;
        index
            .tokenizers()
            .register(TOKENIZER_NAME, stemming_analyzer());

        let mut writer: IndexWriter = index
            .writer(64 * 1024 * 1024)
            .map_err(Error::IndexBuildFailed)?;

        let started = std::time::Instant::now();
        let mut count = 0u64;
        for entry in archive.article_entries() {
            let (_, title, entry_index) = entry?;
            writer
                .add_document(doc!(
                    doc_id_field => entry_index as u64,
                    title_field => title,
                ))
                .map_err(Error::IndexBuildFailed)?;

            count += 1;
            if count % 50_000 == 0 {
                tracing::info!(indexed = count, elapsed = ?started.elapsed(), "building title index");
            }
        }

        writer.commit().map_err(Error::IndexBuildFailed)?;
        tracing::info!(
            indexed = count,
            elapsed = ?started.elapsed(),
            "title index build complete"
        );
        Ok(())
    }

    fn open(index_path: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_path).map_err(Error::IndexCorrupt)?;
        index
            .tokenizers()
            .register(TOKENIZER_NAME, stemming_analyzer());

        let schema = index.schema();
        let doc_id_field = schema
            .get_field("doc_id")
            .map_err(|e| Error::IndexCorrupt(e.into()))?;
        let title_field = schema
            .get_field("title")
            .map_err(|e| Error::IndexCorrupt(e.into()))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .map_err(Error::IndexCorrupt)?;

        Ok(Self {
            index,
            reader,
            doc_id_field,
            title_field,
        })
    }

    /// §4.8: matches any document whose title contains every term as a
    /// prefix. Each term becomes a `RegexQuery` anchored over the term
    /// dictionary (`term.*`), AND-combined across terms.
    pub fn search(&self, terms: &[String]) -> Result<Vec<u32>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let analyzer = stemming_analyzer();

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for term in terms {
            let mut stream = analyzer.token_stream(term);
            let mut stemmed = String::new();
            stream.process(&mut |token| {
                if stemmed.is_empty() {
                    stemmed = token.text.clone();
                }
            });
            if stemmed.is_empty() {
                continue;
            }

            let pattern = format!("{}.*", regex_escape(&stemmed));
            let regex_query = RegexQuery::from_pattern(&pattern, self.title_field)
                .map_err(Error::IndexCorrupt)?;
            clauses.push((Occur::Must, Box::new(regex_query)));
        }

        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let query = BooleanQuery::new(clauses);
        let hits = searcher
            .search(&query, &TopDocs::with_limit(SEARCH_LIMIT))
            .map_err(Error::IndexCorrupt)?;

        let mut result = Vec::with_capacity(hits.len());
        for (_score, address) in hits {
            let retrieved: TantivyDocument =
                searcher.doc(address).map_err(Error::IndexCorrupt)?;
            if let Some(value) = retrieved.get_first(self.doc_id_field) {
                if let Some(id) = value.as_u64() {
                    result.push(id as u32);
                }
            }
        }
        Ok(result)
    }

    /// Exposed for callers that want to double check a specific entry index
    /// is present without running a full search (used by tests).
    pub fn contains(&self, entry_index: u32) -> Result<bool> {
        let searcher = self.reader.searcher();
        let term = Term::from_field_u64(self.doc_id_field, entry_index as u64);
        let query = tantivy::query::TermQuery::new(term, IndexRecordOption::Basic);
        let hits = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(Error::IndexCorrupt)?;
        Ok(!hits.is_empty())
    }
}

fn regex_escape(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
