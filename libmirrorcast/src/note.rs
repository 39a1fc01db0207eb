//! Note formatting for the relay network

/// Render an extracted post as a Nostr note body
///
/// Pure template: attribution line, block-quoted post text, canonical
/// source URL. The text is passed through untouched; any stripping
/// already happened during extraction.
pub fn format_note(account: &str, text: &str, post_id: &str) -> String {
    let source_url = format!("https://x.com/{}/status/{}", account, post_id);

    format!(
        "Quote from @{} on X:\n\n> {}\n\nSource:\n{}",
        account, text, source_url
    )
}
