//! The `---`-delimited metadata block prepended to generated articles.
//!
//! The block always has the exact shape
//!
//! ```text
//! ---
//! title: <title>
//! cover: <cover>
//! ---
//!
//! <body>
//! ```

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

const DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub cover: String,
}

impl FrontMatter {
    /// Picks a cover at random. An empty list yields an empty cover.
    pub fn with_random_cover(title: impl Into<String>, covers: &[String]) -> Self {
        let cover = covers
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_default();
        Self { title: title.into(), cover }
    }

    pub fn render(&self) -> String {
        format!(
            "{DELIMITER}\ntitle: {}\ncover: {}\n{DELIMITER}\n",
            single_line(&self.title),
            single_line(&self.cover)
        )
    }
}

/// Prepends the block to `body`. Any block already present is replaced.
pub fn prepend(body: &str, front_matter: &FrontMatter) -> String {
    format!("{}\n{}", front_matter.render(), strip(body))
}

/// Returns the body without a leading block, trimmed.
pub fn strip(content: &str) -> &str {
    match split(content) {
        Some((_, body)) => body.trim(),
        None => content.trim(),
    }
}

/// Reads `title` and `cover` back out of a leading block.
pub fn parse(content: &str) -> Option<FrontMatter> {
    let (block, _) = split(content)?;
    let mut title = None;
    let mut cover = None;
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "title" => title = Some(value.trim().to_string()),
            "cover" => cover = Some(value.trim().to_string()),
            _ => {}
        }
    }
    Some(FrontMatter {
        title: title?,
        cover: cover.unwrap_or_default(),
    })
}

/// First markdown heading of `body`, used as the article title.
pub fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Splits `content` into (block lines, rest). The block must open on the
/// very first line.
fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(DELIMITER)?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ").trim().to_string()
}
