use once_cell::sync::Lazy;
use regex::Regex;

static QUERY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<css>.*?)(?:::(?:text|attr\(\s*(?P<attr>[^)\s]+)\s*\)))?\s*$")
        .expect("Invalid field query regex")
});

/// What to read from the element a field query matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Text,
    Attr(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQuery {
    pub css: String,
    pub target: QueryTarget,
}

/// Split a field query such as `span.price::text` or `a.more::attr(href)`
/// into its CSS part and the value to read. A bare CSS selector reads text.
pub fn parse_field_query(query: &str) -> FieldQuery {
    let query = query.trim();
    match QUERY_REGEX.captures(query) {
        Some(caps) => {
            let css = caps.name("css").map_or("", |m| m.as_str()).trim().to_string();
            let target = match caps.name("attr") {
                Some(attr) => QueryTarget::Attr(attr.as_str().to_string()),
                None => QueryTarget::Text,
            };
            FieldQuery { css, target }
        }
        None => FieldQuery {
            css: query.to_string(),
            target: QueryTarget::Text,
        },
    }
}
