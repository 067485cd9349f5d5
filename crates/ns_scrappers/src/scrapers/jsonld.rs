use lazy_static::lazy_static;
use scraper::{Html, Selector};
use serde_json::Value;

lazy_static! {
    static ref LD_JSON: Selector = Selector::parse("script[type='application/ld+json']").unwrap();
}

/// Collects the JSON-LD objects of a page, flattening top-level arrays and
/// `@graph` containers.
fn ld_objects(document: &Html) -> Vec<Value> {
    let mut objects = Vec::new();
    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let Ok(json) = serde_json::from_str::<Value>(raw.trim()) else {
            continue;
        };
        let candidates = match json {
            Value::Array(items) => items,
            other => vec![other],
        };
        for candidate in candidates {
            if let Some(Value::Array(graph)) = candidate.get("@graph") {
                objects.extend(graph.iter().cloned());
            }
            objects.push(candidate);
        }
    }
    objects
}

fn first_string(document: &Html, key: &str) -> Option<String> {
    ld_objects(document)
        .iter()
        .filter_map(|obj| obj.get(key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

/// `datePublished` from the page's JSON-LD metadata.
pub fn extract_date_published(document: &Html) -> Option<String> {
    first_string(document, "datePublished")
}

/// `headline` from the page's JSON-LD metadata.
pub fn extract_headline(document: &Html) -> Option<String> {
    first_string(document, "headline")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_published_from_plain_object() {
        let html = r#"<script type="application/ld+json">
            {"@type": "NewsArticle", "headline": "Rates held", "datePublished": "2024-11-07T09:15:00.000Z"}
        </script>"#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_date_published(&document).as_deref(),
            Some("2024-11-07T09:15:00.000Z")
        );
        assert_eq!(extract_headline(&document).as_deref(), Some("Rates held"));
    }

    #[test]
    fn test_date_published_from_graph() {
        let html = r#"<script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
                {"@type": "WebPage"},
                {"@type": "ReportageNewsArticle", "datePublished": "2024-12-02"}
            ]}
        </script>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_date_published(&document).as_deref(), Some("2024-12-02"));
    }

    #[test]
    fn test_invalid_json_is_ignored() {
        let html = r#"<script type="application/ld+json">{not json</script>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_date_published(&document), None);
    }
}
