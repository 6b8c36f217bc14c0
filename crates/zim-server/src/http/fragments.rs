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

//! HTML fragment extraction for article pages (§9: HTML parsing by regex is
//! this collaborator's problem, not the reader crate's). Pulls `<head>`,
//! `<body>` and `<title>` out of an article's own markup so it can be
//! dropped into the shared page template instead of served standalone.
//!
//! Regex idiom (`once_cell::sync::Lazy<Regex>`) follows
//! `crates/core/src/widgets/calculator.rs`/`thesaurus.rs`.

use once_cell::sync::Lazy;
use regex::Regex;

static HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<head[^>]*>(.*?)</head>").unwrap());
static BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap());
static TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

#[derive(Debug, Default)]
pub struct Fragments {
    pub head: String,
    pub body: String,
    pub title: Option<String>,
}

/// Extracts head/body/title fragments from an article's raw HTML. Missing
/// sections default to empty; a missing `<body>` falls back to the whole
/// document so malformed articles still render something.
pub fn extract(html: &str) -> Fragments {
    let capture = |re: &Regex| re.captures(html).map(|c| c[1].trim().to_string());

    Fragments {
        head: capture(&HEAD).unwrap_or_default(),
        body: capture(&BODY).unwrap_or_else(|| html.to_string()),
        title: capture(&TITLE),
    }
}
