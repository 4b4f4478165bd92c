use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on the request content the NLU API accepts. At four bytes per char
/// this also keeps requests under the API's 600 KiB body limit.
pub const MAX_CONTENT_CHARS: usize = 50_000;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// Turns a section's raw markup into plain text suitable for the NLU API: tags are
/// dropped, common entities decoded, whitespace runs collapsed, and the result is cut
/// to the API's size limits.
pub fn plain_text(unsafe_markup: &str) -> String {
    let without_code = SCRIPT_OR_STYLE.replace_all(unsafe_markup, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    let decoded = decode_entities(&without_tags);
    let collapsed = SPACE.replace_all(&decoded, " ");
    truncate_content(collapsed.trim())
}

/// Collapses whitespace and applies the size limits without touching markup.
pub fn raw_text(content: &str) -> String {
    let collapsed = SPACE.replace_all(content, " ");
    truncate_content(collapsed.trim())
}

pub fn truncate_content(text: &str) -> String {
    match text.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
