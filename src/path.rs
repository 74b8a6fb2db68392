//! Route template helpers: joining prefix and suffix templates, extracting
//! `:name` variables and converting to the `{name}` document syntax.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static PATH_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":\w+").expect("path variable pattern is valid"));

/// Join a record-level prefix template with a method-level suffix template.
///
/// Legacy-compatible and intentionally asymmetric: when the prefix does not
/// end in `/`, a suffix that does not start with `/` loses its first
/// character (`join_paths("/a", "xb") == "/ab"`). One trailing `/` is
/// stripped from the result, so `join_paths("/", "/")` is empty.
///
/// ```
/// use metaroute::path::join_paths;
///
/// assert_eq!(join_paths("", ""), "/");
/// assert_eq!(join_paths("/a", "/b"), "/a/b");
/// assert_eq!(join_paths("/a/", "/b"), "/a/b");
/// ```
#[must_use]
pub fn join_paths(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() && suffix.is_empty() {
        return "/".to_string();
    }
    if prefix.is_empty() {
        return suffix.to_string();
    }
    if suffix.is_empty() {
        return prefix.to_string();
    }

    let mut joined = String::with_capacity(prefix.len() + suffix.len() + 1);
    if !prefix.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(prefix);
    if prefix.ends_with('/') {
        joined.push_str(suffix.strip_prefix('/').unwrap_or(suffix));
    } else if suffix.starts_with('/') {
        joined.push_str(suffix);
    } else {
        let mut rest = suffix.chars();
        rest.next();
        joined.push_str(rest.as_str());
    }

    if joined.ends_with('/') {
        joined.pop();
    }
    joined
}

/// `:name` tokens of a template, in order, without the leading colon.
#[must_use]
pub fn path_variables(template: &str) -> Vec<String> {
    PATH_VARIABLE
        .find_iter(template)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}

/// Rewrite `:name` tokens to the document's `{name}` syntax.
#[must_use]
pub fn to_oas_path(template: &str) -> String {
    PATH_VARIABLE
        .replace_all(template, |caps: &regex::Captures<'_>| {
            format!("{{{}}}", &caps[0][1..])
        })
        .into_owned()
}

/// Compile a `:name` template into an anchored matcher. Each variable
/// matches one non-empty segment; the returned names follow capture order.
#[must_use]
pub fn template_to_regex(template: &str) -> (Regex, Vec<String>) {
    let mut pattern = String::from("^");
    let mut names = Vec::new();
    let mut last = 0;
    for m in PATH_VARIABLE.find_iter(template) {
        pattern.push_str(&regex::escape(&template[last..m.start()]));
        pattern.push_str("([^/]+)");
        names.push(m.as_str()[1..].to_string());
        last = m.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');

    #[allow(clippy::expect_used)]
    let regex = Regex::new(&pattern).expect("escaped template is a valid regex");
    (regex, names)
}
