use lazy_static::lazy_static;
use regex::Regex;

/// Upper bound, in characters, on any sanitized string.
pub const MAX_SANITIZED_CHARS: usize = 1000;

lazy_static! {
    /// `<script ...>` through the first closing tag, across lines.
    static ref SCRIPT_BLOCK: Regex =
        Regex::new(r"(?is)<script\b.*?</script>").expect("script pattern compiles");

    /// `<iframe ...>` through the first closing tag, across lines.
    static ref IFRAME_BLOCK: Regex =
        Regex::new(r"(?is)<iframe\b.*?</iframe>").expect("iframe pattern compiles");

    static ref JAVASCRIPT_SCHEME: Regex =
        Regex::new(r"(?i)javascript:").expect("scheme pattern compiles");

    /// Inline event handler attributes such as `onclick=` or `ONLOAD =`.
    static ref EVENT_HANDLER: Regex =
        Regex::new(r"(?i)on[a-z0-9_]+\s*=").expect("event handler pattern compiles");
}

/// Pattern-based defense-in-depth cleanup of untrusted text.
///
/// Removes script and iframe blocks, `javascript:` schemes and inline event
/// handler attributes until none remain, trims, then truncates to
/// [`MAX_SANITIZED_CHARS`]. The output is a fixed point: sanitizing it again
/// returns it unchanged. This is not an HTML sanitizer; it only removes the
/// listed patterns.
pub fn sanitize_string(input: &str) -> String {
    let mut cleaned = input.trim().to_string();
    // Removing one match can splice a new one together, e.g. `javajavascript:script:`.
    loop {
        let stripped = strip_patterns(&cleaned);
        if stripped == cleaned {
            break;
        }
        cleaned = stripped;
    }

    let trimmed = cleaned.trim();
    match trimmed.char_indices().nth(MAX_SANITIZED_CHARS) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

fn strip_patterns(text: &str) -> String {
    let cleaned = SCRIPT_BLOCK.replace_all(text, "");
    let cleaned = IFRAME_BLOCK.replace_all(&cleaned, "");
    let cleaned = JAVASCRIPT_SCHEME.replace_all(&cleaned, "");
    EVENT_HANDLER.replace_all(&cleaned, "").into_owned()
}
