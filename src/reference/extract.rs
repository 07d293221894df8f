//! Reference Extractor: one pattern per markup syntax.
//!
//! Each syntax is scanned independently over the whole text and the
//! results are concatenated. Overlapping matches across syntaxes are
//! reported by each syntax.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::Reference;
use crate::vault_path;

/// `![alt](<path.ext>)`, `![alt](path.ext "title")` or `![alt](http(s)://...)`.
/// Alt text never spans a `]` or a line break.
static BRACKET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"!\[([^\]\n]*?)\]\(<([^<>\n]+\.\w+)>\)|!\[([^\]\n]*?)\]\((\S+?\.\w+)(?:\s+"[^"]*")?\)|!\[([^\]\n]*?)\]\((https?://.*?)\)"#,
    )
    .expect("bracket pattern is valid")
});

/// `![[target]]` or `![[target|display]]`.
static WIKI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[(.*?)(\s*?\|.*?)?\]\]").expect("wiki pattern is valid"));

/// `<img ... src="target" ...>` with either quote style.
static HTML_IMG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["'][^>]*/?>"#).expect("html pattern is valid")
});

/// Label used when no name can be derived from an `<img>` source.
const DEFAULT_HTML_NAME: &str = "image";

/// Extracts `![alt](target)` references.
#[must_use]
pub fn extract_bracket(text: &str) -> Vec<Reference> {
    BRACKET
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1).or_else(|| caps.get(3)).or_else(|| caps.get(5))?;
            let path = caps.get(2).or_else(|| caps.get(4)).or_else(|| caps.get(6))?;
            Some(Reference::new(&caps[0], path.as_str(), name.as_str()))
        })
        .filter(|r| !r.path.is_empty())
        .collect()
}

/// Extracts `![[target|display]]` references. The name is the target's
/// file stem followed by the display suffix verbatim.
#[must_use]
pub fn extract_wiki(text: &str) -> Vec<Reference> {
    WIKI.captures_iter(text)
        .filter_map(|caps| {
            let path = caps.get(1)?.as_str();
            if path.is_empty() {
                return None;
            }
            let suffix = caps.get(2).map_or("", |m| m.as_str());
            let name = format!("{}{suffix}", vault_path::file_stem(path));
            Some(Reference::new(&caps[0], path, name))
        })
        .collect()
}

/// Extracts `<img src="...">` references.
#[must_use]
pub fn extract_html(text: &str) -> Vec<Reference> {
    HTML_IMG
        .captures_iter(text)
        .filter_map(|caps| {
            let src = caps.get(1)?.as_str();
            Some(Reference::new(&caps[0], src, html_name(src)))
        })
        .collect()
}

/// Extracts references of all three syntaxes: bracket, then wiki, then HTML.
#[must_use]
pub fn extract_all(text: &str) -> Vec<Reference> {
    let mut refs = extract_bracket(text);
    refs.extend(extract_wiki(text));
    refs.extend(extract_html(text));
    refs
}

type NameStrategy = fn(&str, Option<&Url>) -> Option<String>;

/// Tried in order; the first strategy that applies decides the name, even
/// when it is empty (a source ending in `/`).
const HTML_NAME_STRATEGIES: &[NameStrategy] = &[url_file_segment, url_path_tail, raw_last_segment];

fn html_name(src: &str) -> String {
    let parsed = Url::parse(src).ok();
    HTML_NAME_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(src, parsed.as_ref()))
        .unwrap_or_else(|| DEFAULT_HTML_NAME.to_string())
}

/// Last path segment of a parsed URL, when it looks like a file name.
fn url_file_segment(_src: &str, url: Option<&Url>) -> Option<String> {
    let segment = url?.path().rsplit('/').next()?;
    segment.contains('.').then(|| segment.to_string())
}

/// Whole URL path without its leading `/`.
fn url_path_tail(_src: &str, url: Option<&Url>) -> Option<String> {
    let path = url?.path();
    (path != "/").then(|| path.trim_start_matches('/').to_string())
}

/// Text after the last `/` of an unparsable source, query removed.
fn raw_last_segment(src: &str, url: Option<&Url>) -> Option<String> {
    if url.is_some() || !src.contains('/') {
        return None;
    }
    let last = src.rsplit('/').next()?;
    last.split('?').next().map(str::to_string)
}
