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

//! Template rendering: a single `.html` file at `--template`, loaded once at
//! startup and reused for every page (listing, article, search, not-found).
//! Matches the original tool's one-`Template`-per-server contract rather than
//! a directory of per-page templates.

use std::path::Path;

use anyhow::Context;
use minijinja::Environment;

/// Name the one template is registered under.
pub const PAGE: &str = "page";

pub fn load(template_path: &Path) -> anyhow::Result<Environment<'static>> {
    let source = std::fs::read_to_string(template_path).with_context(|| {
        format!(
            "failed to read template file '{}'",
            template_path.display()
        )
    })?;

    let mut env = Environment::new();
    // Force the template to parse now rather than at first request, so a
    // malformed template fails the server at startup.
    env.add_template_owned(PAGE, source)?;
    Ok(env)
}
