//! Query string construction for collection finds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

/// Options for a collection find.
///
/// `filter` is always sent as `q` (an empty object when unset). Other
/// fields are omitted from the query string when unset; `limit` and
/// `offset` are passed through without clamping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Predicate object, e.g. `{"age": {"$gt": 30}}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Ordering spec, e.g. `[{"sortBy": "age", "direction": "desc"}]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
    /// Ask only for the number of matches.
    #[serde(default)]
    pub count_only: bool,
    /// Relation inclusion spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Value>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn include(mut self, include: Value) -> Self {
        self.include = Some(include);
        self
    }

    pub fn count_only(mut self) -> Self {
        self.count_only = true;
        self
    }
}

/// Encode `options` as a form-urlencoded query string (without `?`).
pub fn build_query_string(options: &QueryOptions) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    let filter = options
        .filter
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| "{}".to_string());
    query.append_pair("q", &filter);

    if let Some(limit) = options.limit {
        query.append_pair("limit", &limit.to_string());
    }
    if let Some(offset) = options.offset {
        query.append_pair("offset", &offset.to_string());
    }
    if let Some(sort) = &options.sort {
        query.append_pair("sort", &sort.to_string());
    }
    if options.count_only {
        query.append_pair("count", "1");
    }
    if let Some(include) = &options.include {
        query.append_pair("include", &include.to_string());
    }

    query.finish()
}

/// Encode arbitrary pairs; empty input gives an empty string.
pub(crate) fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Prefix a non-empty query string with `?`.
pub(crate) fn with_question_mark(query: String) -> String {
    if query.is_empty() {
        query
    } else {
        format!("?{}", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn parse(query: &str) -> HashMap<String, String> {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(build_query_string(&QueryOptions::default()), "q=%7B%7D");
    }

    #[test]
    fn test_count_only() {
        let query = build_query_string(&QueryOptions::new().count_only());
        let pairs = parse(&query);
        assert_eq!(pairs.get("count").map(String::as_str), Some("1"));
        assert_eq!(pairs.get("q").map(String::as_str), Some("{}"));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_all_options_present_once() {
        let options = QueryOptions::new()
            .filter(json!({"name": "John Doe"}))
            .limit(0)
            .offset(20)
            .sort(json!([{"sortBy": "age", "direction": "desc"}]))
            .include(json!({"friends": {}}));
        let query = build_query_string(&options);

        for key in ["q=", "limit=", "offset=", "sort=", "include="] {
            assert_eq!(query.matches(key).count(), 1, "{key} in {query}");
        }
        assert!(!query.contains("count="));

        let pairs = parse(&query);
        assert_eq!(pairs["limit"], "0");
        assert_eq!(pairs["offset"], "20");
        let sort: Value = serde_json::from_str(&pairs["sort"]).unwrap();
        assert_eq!(sort, json!([{"sortBy": "age", "direction": "desc"}]));
    }

    #[test]
    fn test_filter_round_trips() {
        let filter = json!({
            "age": {"$gt": 30},
            "likes": {"$in": ["pizza & coke", "100%"]},
            "address": {"city": "Springfield?"}
        });
        let query = build_query_string(&QueryOptions::new().filter(filter.clone()));
        assert!(!query.contains(' '));
        assert!(!query.contains('&'));

        let decoded: Value = serde_json::from_str(&parse(&query)["q"]).unwrap();
        assert_eq!(decoded, filter);
    }

    #[test]
    fn test_encode_pairs() {
        let none: Vec<(&str, &str)> = Vec::new();
        assert_eq!(with_question_mark(encode_pairs(none)), "");
        assert_eq!(
            with_question_mark(encode_pairs([("variant", "thumb nail")])),
            "?variant=thumb+nail"
        );
    }
}
