//! Annotation vocabulary and resolver.
//!
//! Reads verbs, route templates and the documentation group tag out of the
//! raw annotations of a record and its methods. Nothing here fails: a method
//! without verbs or routes is simply not exposed.

use crate::model::{Annotation, MethodDescriptor, RecordDescriptor};

/// Route template. Usable on a record (prefix) and/or a method (suffix).
/// Path variables are written `:name`, e.g. `/api/v1/sms/:id`.
pub const ANNOTATION_ROUTE: &str = "http.Route";

/// HTTP verb of a method. Repeatable.
pub const ANNOTATION_METHOD: &str = "http.Method";

/// Binds the method parameter named by `value` to the query string.
/// The optional `alias` attribute names the query key (e.g. `page-size`).
pub const ANNOTATION_QUERY_PARAM: &str = "http.QueryParam";

/// Binds the method parameter named by `value` to a request header.
/// The optional `alias` attribute names the header (e.g. `accept-language`).
pub const ANNOTATION_HEADER_PARAM: &str = "http.HeaderParam";

/// Marks a record as a controller; `value` is its documentation group tag.
pub const ANNOTATION_STEREOTYPE_CONTROLLER: &str = "stereotype.Controller";

/// Name of the attribute carrying a query/header alias.
pub const ATTRIBUTE_ALIAS: &str = "alias";

fn non_empty_values(annotations: &[Annotation], name: &str) -> Vec<String> {
    annotations
        .iter()
        .filter(|a| a.name == name)
        .map(Annotation::value)
        .filter(|v| !v.is_empty())
        .collect()
}

/// All verb values, in declaration order.
#[must_use]
pub fn http_verbs(annotations: &[Annotation]) -> Vec<String> {
    non_empty_values(annotations, ANNOTATION_METHOD)
}

/// All route template values, in declaration order.
#[must_use]
pub fn route_templates(annotations: &[Annotation]) -> Vec<String> {
    non_empty_values(annotations, ANNOTATION_ROUTE)
}

#[must_use]
pub fn is_controller(record: &RecordDescriptor) -> bool {
    record
        .find_annotations(ANNOTATION_STEREOTYPE_CONTROLLER)
        .next()
        .is_some()
}

/// Group tag from the first stereotype annotation, if any and non-empty.
#[must_use]
pub fn group_tag(record: &RecordDescriptor) -> Option<String> {
    record
        .find_annotations(ANNOTATION_STEREOTYPE_CONTROLLER)
        .next()
        .map(Annotation::value)
        .filter(|v| !v.is_empty())
}

/// Every (prefix, suffix) combination of a method, prefix-major.
///
/// A method without suffixes is mounted at each prefix. A record without a
/// prefix exposes nothing, whatever routes its methods declare.
#[must_use]
pub fn route_pairs(record: &RecordDescriptor, method: &MethodDescriptor) -> Vec<(String, String)> {
    let prefixes = route_templates(&record.annotations);
    if prefixes.is_empty() {
        return Vec::new();
    }
    let mut suffixes = route_templates(&method.annotations);
    if suffixes.is_empty() {
        suffixes.push(String::new());
    }

    prefixes
        .iter()
        .flat_map(|p| suffixes.iter().map(move |s| (p.clone(), s.clone())))
        .collect()
}
