//! Vault-relative path arithmetic.
//!
//! Vault paths use `/` separators and never start with one. These helpers
//! work on plain strings so the core never touches host path syntax.

/// Normalizes a path: `\` becomes `/`, empty and `.` segments are dropped
/// and `..` pops the previous segment (clamped at the vault root).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    push_segments(Vec::new(), &path.replace('\\', "/")).join("/")
}

/// Resolves `relative` against the vault folder `dir`.
#[must_use]
pub fn join_relative(dir: &str, relative: &str) -> String {
    let base: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    push_segments(base, &relative.replace('\\', "/")).join("/")
}

fn push_segments<'a>(mut segments: Vec<&'a str>, path: &'a str) -> Vec<&'a str> {
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(part),
        }
    }
    segments
}

/// Folder containing `path`, or `""` for files at the vault root.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Last segment of `path`.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// File name without its extension. Dot-files keep their full name.
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) if i > 0 => &name[..i],
        _ => name,
    }
}

/// Lower-cased extension of the last segment, without the dot.
#[must_use]
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(i) if i > 0 && i + 1 < name.len() => Some(name[i + 1..].to_ascii_lowercase()),
        _ => None,
    }
}

/// Path from folder `from_dir` to the vault path `to`, using `..` where needed.
#[must_use]
pub fn relative_path(from_dir: &str, to: &str) -> String {
    let from = normalize_path(from_dir);
    let to = normalize_path(to);
    let from: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<&str> = vec![".."; from.len() - common];
    parts.extend_from_slice(&to[common..]);
    parts.join("/")
}

/// Percent-encodes each segment of a path, keeping the separators.
#[must_use]
pub fn encode_path(path: &str) -> String {
    path.split('/').map(|segment| urlencoding::encode(segment).into_owned()).collect::<Vec<_>>().join("/")
}

/// Percent-decodes a path, returning it unchanged when it is not valid
/// percent-encoded UTF-8.
#[must_use]
pub fn decode_path(path: &str) -> String {
    urlencoding::decode(path).map_or_else(|_| path.to_string(), std::borrow::Cow::into_owned)
}
