//! Defensive input sanitization.
//!
//! Pattern-based XSS detection and cleaning, HTML escaping, and URL
//! sanitization for untrusted form input. Detection ([`Sanitizer::detect_xss`])
//! and cleaning ([`Sanitizer::clean_xss`]) are two independently invoked
//! operations over the same fixed pattern set; they are not guaranteed to
//! agree on every edge case, and that divergence is part of the contract.
//!
//! Every function here is total over strings: malformed input is cleaned or
//! passed through, never an error.
//!
//! ## Security Scope
//!
//! Regex cannot fully parse HTML. The pattern set is a best-effort
//! pre-filter for obvious injection shapes, not a security boundary; genuine
//! XSS defense belongs server-side or in context-aware output encoding.
//!
//! The patterns cover:
//!
//! - Script tags (`<script>`, with and without content)
//! - Inline event handlers (`onerror=`, `onload=`, any `on*=` attribute)
//! - `javascript:` URL schemes
//! - Iframe tags
//! - `eval(` and CSS `expression(` calls
//!
//! # Example
//!
//! ```
//! use formguard::sanitizer::Sanitizer;
//!
//! let sanitizer = Sanitizer::new();
//!
//! assert!(sanitizer.detect_xss("<img onerror=alert(1)>"));
//! assert_eq!(
//!     sanitizer.clean_xss("<script>alert(1)</script>hello"),
//!     "hello"
//! );
//! assert_eq!(sanitizer.sanitize_url("javascript:alert(1)"), None);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

// =============================================================================
// PATTERNS
// =============================================================================

/// Script-tag block including its content. Cleaning removes the whole block
/// so the payload never survives as text.
const SCRIPT_BLOCK_PATTERN: &str = r"(?is)<\s*script\b[^>]*>.*?<\s*/\s*script\s*>";

/// Any script tag, opening or closing, with or without a matching pair.
/// Detection only; cleaning handles complete blocks.
const SCRIPT_TAG_PATTERN: &str = r"(?i)<\s*/?\s*script\b[^>]*>";

/// Inline event-handler attribute: `on*=` followed by a quoted or bare value.
const EVENT_HANDLER_PATTERN: &str = r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#;

/// `javascript:` URL scheme, with optional whitespace before the colon.
const JAVASCRIPT_URL_PATTERN: &str = r"(?i)javascript\s*:";

/// Opening iframe tag.
const IFRAME_PATTERN: &str = r"(?i)<\s*iframe\b";

/// `eval(` call.
const EVAL_PATTERN: &str = r"(?i)\beval\s*\(";

/// CSS `expression(` call (legacy IE dynamic properties).
const EXPRESSION_PATTERN: &str = r"(?i)\bexpression\s*\(";

/// An entity already produced by [`escape_html`]. Escaping leaves these
/// untouched so re-escaping sanitized output never double-encodes.
const ESCAPED_ENTITY_PATTERN: &str = r"&(?:amp|lt|gt|quot|#39);";

static ESCAPED_ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(ESCAPED_ENTITY_PATTERN).expect("invalid entity pattern"));

// =============================================================================
// HTML ESCAPING
// =============================================================================

/// Replace the five HTML-significant characters (`& < > " '`) with their
/// entity equivalents.
///
/// Entity-aware: an `&` that already begins one of the five produced entities
/// is left alone, which makes the function idempotent over its own output.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    let mut last = 0;
    for m in ESCAPED_ENTITY_REGEX.find_iter(text) {
        escape_chunk(&mut escaped, &text[last..m.start()]);
        escaped.push_str(m.as_str());
        last = m.end();
    }
    escape_chunk(&mut escaped, &text[last..]);
    escaped
}

fn escape_chunk(out: &mut String, chunk: &str) {
    for c in chunk.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

// =============================================================================
// COMPILED PATTERNS
// =============================================================================

/// The XSS pattern set, compiled once per sanitizer.
#[derive(Debug, Clone)]
struct XssPatterns {
    script_block: Regex,
    script_tag: Regex,
    event_handler: Regex,
    javascript_url: Regex,
    iframe: Regex,
    eval_call: Regex,
    expression_call: Regex,
}

impl Default for XssPatterns {
    fn default() -> Self {
        Self {
            script_block: Regex::new(SCRIPT_BLOCK_PATTERN).expect("invalid script block pattern"),
            script_tag: Regex::new(SCRIPT_TAG_PATTERN).expect("invalid script tag pattern"),
            event_handler: Regex::new(EVENT_HANDLER_PATTERN)
                .expect("invalid event handler pattern"),
            javascript_url: Regex::new(JAVASCRIPT_URL_PATTERN)
                .expect("invalid javascript url pattern"),
            iframe: Regex::new(IFRAME_PATTERN).expect("invalid iframe pattern"),
            eval_call: Regex::new(EVAL_PATTERN).expect("invalid eval pattern"),
            expression_call: Regex::new(EXPRESSION_PATTERN).expect("invalid expression pattern"),
        }
    }
}

// =============================================================================
// SANITIZER
// =============================================================================

/// Stateless sanitization engine over the fixed XSS pattern set.
///
/// Construction compiles the patterns; the value is cheap to clone and safe
/// to share, holding no mutable state.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    patterns: XssPatterns,
}

impl Sanitizer {
    /// Create a sanitizer with the fixed pattern set compiled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any XSS pattern matches the input.
    ///
    /// A cheap pre-filter, not a guarantee: a `false` here does not certify
    /// the input safe for unescaped rendering.
    pub fn detect_xss(&self, input: &str) -> bool {
        self.patterns.script_tag.is_match(input)
            || self.patterns.event_handler.is_match(input)
            || self.patterns.javascript_url.is_match(input)
            || self.patterns.iframe.is_match(input)
            || self.patterns.eval_call.is_match(input)
            || self.patterns.expression_call.is_match(input)
    }

    /// Names of the patterns that match the input, for audit logging.
    pub fn detected_patterns(&self, input: &str) -> Vec<&'static str> {
        let checks: [(&Regex, &'static str); 6] = [
            (&self.patterns.script_tag, "script_tag"),
            (&self.patterns.event_handler, "event_handler"),
            (&self.patterns.javascript_url, "javascript_url"),
            (&self.patterns.iframe, "iframe_tag"),
            (&self.patterns.eval_call, "eval_call"),
            (&self.patterns.expression_call, "expression_call"),
        ];
        checks
            .into_iter()
            .filter(|(regex, _)| regex.is_match(input))
            .map(|(_, name)| name)
            .collect()
    }

    /// Destructively clean the input.
    ///
    /// Applies, in order: removal of script-tag blocks including content,
    /// removal of inline event-handler attributes, removal of `javascript:`
    /// URL schemes, then HTML escaping of whatever remains. Escaping first
    /// would prevent the removal patterns from matching, so the order is
    /// load-bearing.
    pub fn clean_xss(&self, input: &str) -> String {
        let stripped = self.patterns.script_block.replace_all(input, "");
        let stripped = self.patterns.event_handler.replace_all(&stripped, "");
        let stripped = self.patterns.javascript_url.replace_all(&stripped, "");

        if stripped.len() != input.len() {
            debug!(
                removed = input.len() - stripped.len(),
                "stripped xss patterns from input"
            );
        }

        escape_html(&stripped)
    }

    /// Trim surrounding whitespace and HTML-escape the value.
    ///
    /// The standard treatment for user text headed into rendered markup.
    pub fn sanitize_input(&self, input: &str) -> String {
        escape_html(input.trim())
    }

    /// Parse the string as an absolute URL and return its canonical text if
    /// the scheme is `http` or `https`; `None` otherwise.
    ///
    /// Parse failures are converted to `None`, never propagated.
    pub fn sanitize_url(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url.trim()).ok()?;
        match parsed.scheme() {
            "http" | "https" => Some(parsed.to_string()),
            scheme => {
                debug!(scheme, "rejected url with disallowed scheme");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x" title='y'>&</a>"#),
            "&lt;a href=&quot;x&quot; title=&#39;y&#39;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_escape_html_plain_text_unchanged() {
        assert_eq!(escape_html("hello world"), "hello world");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_escape_html_idempotent() {
        let once = escape_html("<b>&\"'</b>");
        let twice = escape_html(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_escape_html_preserves_existing_entities() {
        assert_eq!(escape_html("&lt;script&gt;"), "&lt;script&gt;");
        assert_eq!(escape_html("&amp;"), "&amp;");
    }

    #[test]
    fn test_escape_html_unknown_entity_is_escaped() {
        // Only the five entities this module produces are protected.
        assert_eq!(escape_html("&nbsp;"), "&amp;nbsp;");
    }

    #[test]
    fn test_detect_xss_script_tag() {
        let s = Sanitizer::new();
        assert!(s.detect_xss("<script>alert(1)</script>"));
        assert!(s.detect_xss("<SCRIPT src='x.js'>"));
        assert!(s.detect_xss("</script>"));
    }

    #[test]
    fn test_detect_xss_event_handler() {
        let s = Sanitizer::new();
        assert!(s.detect_xss("<img onerror=alert(1)>"));
        assert!(s.detect_xss(r#"<div onclick="steal()">"#));
    }

    #[test]
    fn test_detect_xss_javascript_url() {
        let s = Sanitizer::new();
        assert!(s.detect_xss("<a href='javascript:alert(1)'>x</a>"));
        assert!(s.detect_xss("JaVaScRiPt : alert(1)"));
    }

    #[test]
    fn test_detect_xss_iframe() {
        let s = Sanitizer::new();
        assert!(s.detect_xss("<iframe src='https://evil.example'></iframe>"));
    }

    #[test]
    fn test_detect_xss_eval_and_expression() {
        let s = Sanitizer::new();
        assert!(s.detect_xss("eval(payload)"));
        assert!(s.detect_xss("width: expression(alert(1))"));
    }

    #[test]
    fn test_detect_xss_clean_input() {
        let s = Sanitizer::new();
        assert!(!s.detect_xss("hello world"));
        assert!(!s.detect_xss("the evaluation went well"));
        assert!(!s.detect_xss("contact me at user@example.com"));
    }

    #[test]
    fn test_detected_patterns() {
        let s = Sanitizer::new();
        let found = s.detected_patterns("<script>eval(x)</script>");
        assert!(found.contains(&"script_tag"));
        assert!(found.contains(&"eval_call"));
        assert!(s.detected_patterns("plain").is_empty());
    }

    #[test]
    fn test_clean_xss_removes_script_block() {
        let s = Sanitizer::new();
        assert_eq!(s.clean_xss("<script>alert(1)</script>hello"), "hello");
    }

    #[test]
    fn test_clean_xss_removes_multiline_script_block() {
        let s = Sanitizer::new();
        let input = "before<script>\nsteal();\n</script>after";
        assert_eq!(s.clean_xss(input), "beforeafter");
    }

    #[test]
    fn test_clean_xss_removes_event_handler() {
        let s = Sanitizer::new();
        let cleaned = s.clean_xss(r#"<img src="x.png" onerror="alert(1)">"#);
        assert!(!cleaned.contains("onerror"));
        assert!(!cleaned.contains("alert"));
    }

    #[test]
    fn test_clean_xss_removes_javascript_scheme() {
        let s = Sanitizer::new();
        let cleaned = s.clean_xss("<a href='javascript:alert(1)'>go</a>");
        assert!(!cleaned.to_lowercase().contains("javascript:"));
        assert!(cleaned.contains("go"));
    }

    #[test]
    fn test_clean_xss_escapes_remainder() {
        let s = Sanitizer::new();
        assert_eq!(s.clean_xss("<b>bold</b>"), "&lt;b&gt;bold&lt;/b&gt;");
    }

    #[test]
    fn test_clean_xss_orphan_script_tag_is_escaped_not_removed() {
        // No closing tag, so the block pattern cannot match; the tag is
        // neutralized by escaping instead.
        let s = Sanitizer::new();
        let cleaned = s.clean_xss("<script>alert(1)");
        assert!(!cleaned.contains('<'));
        assert!(cleaned.starts_with("&lt;script&gt;"));
    }

    #[test]
    fn test_clean_xss_output_reescapes_idempotently() {
        let s = Sanitizer::new();
        let cleaned = s.clean_xss("<script>x</script>5 > 3 & 2 < 4");
        assert_eq!(escape_html(&cleaned), cleaned);
    }

    #[test]
    fn test_clean_xss_plain_text_passthrough() {
        let s = Sanitizer::new();
        assert_eq!(s.clean_xss("hello"), "hello");
    }

    #[test]
    fn test_sanitize_input_trims_and_escapes() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize_input("  <b>hi</b>  "), "&lt;b&gt;hi&lt;/b&gt;");
        assert_eq!(s.sanitize_input("   "), "");
    }

    #[test]
    fn test_sanitize_url_https() {
        let s = Sanitizer::new();
        assert_eq!(
            s.sanitize_url("https://example.com"),
            Some("https://example.com/".to_string())
        );
    }

    #[test]
    fn test_sanitize_url_http() {
        let s = Sanitizer::new();
        assert_eq!(
            s.sanitize_url("http://example.com/path?q=1"),
            Some("http://example.com/path?q=1".to_string())
        );
    }

    #[test]
    fn test_sanitize_url_rejects_javascript_scheme() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize_url("javascript:alert(1)"), None);
    }

    #[test]
    fn test_sanitize_url_rejects_other_schemes() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize_url("ftp://example.com"), None);
        assert_eq!(s.sanitize_url("data:text/html,<script>x</script>"), None);
    }

    #[test]
    fn test_sanitize_url_malformed_returns_none() {
        let s = Sanitizer::new();
        assert_eq!(s.sanitize_url("not a url"), None);
        assert_eq!(s.sanitize_url(""), None);
    }

    #[test]
    fn test_detect_and_clean_may_disagree() {
        // Iframes are detected but cleaning only escapes them; the two
        // operations share patterns without sharing behavior.
        let s = Sanitizer::new();
        let input = "<iframe src='x'></iframe>";
        assert!(s.detect_xss(input));
        let cleaned = s.clean_xss(input);
        assert!(cleaned.contains("iframe"));
        assert!(!cleaned.contains('<'));
    }
}
