//! Post extraction from mirror profile pages
//!
//! Mirror instances vary in markup across deployments and over time, so
//! extraction runs an ordered chain of strategies: precise structural
//! matches first, heuristic scans last. Each strategy is a pure function
//! producing a partial result; the chain fills only fields still missing
//! and stops as soon as both the post id and the text are known.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::trace;

/// Newest post recovered from a profile page, possibly partial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPost {
    pub post_id: Option<String>,
    pub text: Option<String>,
}

impl ExtractedPost {
    pub fn is_complete(&self) -> bool {
        self.post_id.is_some() && self.text.is_some()
    }

    /// Adopt fields from a later strategy without overwriting earlier finds
    fn fill_from(&mut self, other: ExtractedPost) {
        if self.post_id.is_none() {
            self.post_id = other.post_id;
        }
        if self.text.is_none() {
            self.text = other.text;
        }
    }
}

type Strategy = fn(&Html) -> ExtractedPost;

/// Ordered fallback chain, most precise first
const STRATEGIES: &[(&str, Strategy)] = &[
    ("timeline-item", timeline_item),
    ("list-item", list_item),
    ("status-link", status_link),
    ("content-class-scan", content_class_scan),
];

pub struct PostExtractor;

impl PostExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the newest post from raw profile page markup
    ///
    /// Returns a partial result when no strategy resolves a field; the
    /// caller decides whether that is an error.
    pub fn extract(&self, markup: &str, account: &str) -> ExtractedPost {
        let doc = Html::parse_document(markup);
        let mut result = ExtractedPost::default();

        for (name, strategy) in STRATEGIES {
            result.fill_from(strategy(&doc));
            if result.is_complete() {
                trace!("Extraction for {} resolved by strategy {}", account, name);
                break;
            }
        }

        result
    }
}

impl Default for PostExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strategy 1: first timeline item with a native `data-id` attribute
fn timeline_item(doc: &Html) -> ExtractedPost {
    let mut found = ExtractedPost::default();

    if let Some(item) = doc.select(&sel("div.timeline-item")).next() {
        found.post_id = item
            .value()
            .attr("data-id")
            .and_then(|id| non_empty(id.to_string()));
        if let Some(content) = item.select(&sel("div.tweet-content")).next() {
            found.text = non_empty(visible_text(content));
        }
    }

    found
}

/// Strategy 2: first item inside a broader list/timeline container, with
/// a secondary set of attribute and class names
fn list_item(doc: &Html) -> ExtractedPost {
    let mut found = ExtractedPost::default();

    let container = doc
        .select(&sel("div.tweet-list"))
        .next()
        .or_else(|| doc.select(&sel("div.timeline")).next());

    let Some(container) = container else {
        return found;
    };

    let first = container
        .select(&sel("div.tweet"))
        .next()
        .or_else(|| container.select(&sel("div.timeline-item")).next());

    let Some(first) = first else {
        return found;
    };

    found.post_id = first
        .value()
        .attr("data-id")
        .or_else(|| first.value().attr("data-item-id"))
        .and_then(|id| non_empty(id.to_string()));

    let content = first
        .select(&sel("div.tweet-content"))
        .next()
        .or_else(|| first.select(&sel("div.tweet-body")).next());

    if let Some(content) = content {
        found.text = non_empty(visible_text(content));
    }

    found
}

/// Strategy 3: scan hyperlinks for a `/status/<digits>` target
fn status_link(doc: &Html) -> ExtractedPost {
    let mut found = ExtractedPost::default();

    for link in doc.select(&sel("a[href]")) {
        let href = link.value().attr("href").unwrap_or("");
        let Some(idx) = href.rfind("/status/") else {
            continue;
        };
        let tail = &href[idx + "/status/".len()..];
        let candidate = tail.split(['/', '?']).next().unwrap_or("");
        if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit()) {
            found.post_id = Some(candidate.to_string());
            break;
        }
    }

    found
}

/// Strategy 4: any div whose class list mentions both "tweet" and
/// "content", case-insensitive, in any order
fn content_class_scan(doc: &Html) -> ExtractedPost {
    let mut found = ExtractedPost::default();

    for el in doc.select(&sel("div")) {
        let class = el.value().attr("class").unwrap_or("").to_lowercase();
        if class.contains("tweet") && class.contains("content") {
            found.text = non_empty(visible_text(el));
            break;
        }
    }

    found
}

/// Visible text of an element with link decorations removed
///
/// Each text chunk is whitespace-stripped and chunks are concatenated
/// without a separator, mirroring how the mirror front-ends lay out
/// tweet content.
fn visible_text(root: ElementRef) -> String {
    let mut out = String::new();
    collect_text(root, &mut out);
    out
}

fn collect_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text.trim()),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if is_link_decoration(child_el) {
                        continue;
                    }
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Anchor/span elements tagged as link decorations carry no post text
fn is_link_decoration(el: ElementRef) -> bool {
    let name = el.value().name();
    if name != "a" && name != "span" {
        return false;
    }
    el.value().classes().any(|c| c == "tweet-link")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(markup: &str) -> ExtractedPost {
        PostExtractor::new().extract(markup, "alice")
    }

    #[test]
    fn test_timeline_item_with_data_id() {
        let markup = r#"
            <html><body>
              <div class="timeline-item" data-id="1234567890">
                <div class="tweet-content">Hello from the timeline</div>
              </div>
            </body></html>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("1234567890"));
        assert_eq!(post.text.as_deref(), Some("Hello from the timeline"));
    }

    #[test]
    fn test_link_decorations_are_stripped() {
        let markup = r#"
            <div class="timeline-item" data-id="42">
              <div class="tweet-content">
                Check this out
                <a class="tweet-link" href="/x/status/42">x.com/link</a>
                <span class="tweet-link">decoration</span>
                <b>really</b>
              </div>
            </div>
        "#;

        let post = extract(markup);
        assert_eq!(post.text.as_deref(), Some("Check this outreally"));
    }

    #[test]
    fn test_plain_span_text_is_kept() {
        let markup = r#"
            <div class="timeline-item" data-id="42">
              <div class="tweet-content"><span>kept</span></div>
            </div>
        "#;

        let post = extract(markup);
        assert_eq!(post.text.as_deref(), Some("kept"));
    }

    #[test]
    fn test_list_item_fallback_with_secondary_names() {
        let markup = r#"
            <div class="tweet-list">
              <div class="tweet" data-item-id="777">
                <div class="tweet-body">Body text here</div>
              </div>
            </div>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("777"));
        assert_eq!(post.text.as_deref(), Some("Body text here"));
    }

    #[test]
    fn test_timeline_container_fallback() {
        let markup = r#"
            <div class="timeline">
              <div class="timeline-item" data-id="888">
                <div class="tweet-content">Inside the timeline</div>
              </div>
            </div>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("888"));
        assert_eq!(post.text.as_deref(), Some("Inside the timeline"));
    }

    #[test]
    fn test_status_link_fallback() {
        // No timeline structure at all, just a bare status link
        let markup = r#"
            <body>
              <a href="/alice/status/12345">permalink</a>
              <div class="tweet-content">Orphan text</div>
            </body>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("12345"));
        assert_eq!(post.text.as_deref(), Some("Orphan text"));
    }

    #[test]
    fn test_status_link_strips_trailing_path_and_query() {
        let markup = r#"<a href="/alice/status/9001?s=20#m">link</a>
                        <div class="tweet-content">t</div>"#;
        assert_eq!(extract(markup).post_id.as_deref(), Some("9001"));

        let markup = r#"<a href="/alice/status/9002/photo/1">link</a>
                        <div class="tweet-content">t</div>"#;
        assert_eq!(extract(markup).post_id.as_deref(), Some("9002"));
    }

    #[test]
    fn test_status_link_rejects_non_digit_id() {
        let markup = r#"<a href="/alice/status/abc123">link</a>"#;

        let post = extract(markup);
        assert_eq!(post.post_id, None);
        assert!(!post.is_complete());
    }

    #[test]
    fn test_status_link_skips_non_digit_then_accepts_digits() {
        let markup = r#"
            <a href="/alice/status/not-an-id">bad</a>
            <a href="/alice/status/31337">good</a>
        "#;

        assert_eq!(extract(markup).post_id.as_deref(), Some("31337"));
    }

    #[test]
    fn test_content_class_scan_fallback() {
        let markup = r#"
            <a href="/alice/status/55">link</a>
            <div class="TweetText-Content">Heuristic text</div>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("55"));
        assert_eq!(post.text.as_deref(), Some("Heuristic text"));
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let post = extract("<html><body><p>nothing here</p></body></html>");
        assert_eq!(post, ExtractedPost::default());
        assert!(!post.is_complete());
    }

    #[test]
    fn test_earlier_strategy_wins() {
        // Strategy 1 resolves both fields; the status link must not override
        let markup = r#"
            <div class="timeline-item" data-id="111">
              <div class="tweet-content">first</div>
            </div>
            <a href="/alice/status/999">other</a>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("111"));
    }

    #[test]
    fn test_empty_attribute_treated_as_missing() {
        let markup = r#"
            <div class="timeline-item" data-id="">
              <div class="tweet-content">text</div>
            </div>
            <a href="/alice/status/321">link</a>
        "#;

        let post = extract(markup);
        assert_eq!(post.post_id.as_deref(), Some("321"));
        assert_eq!(post.text.as_deref(), Some("text"));
    }
}
