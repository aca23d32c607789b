pub fn strip_bot_mentions(input: &str, bot_id: u64) -> String {
    let mention = format!("<@{}>", bot_id);
    let mention_nick = format!("<@!{}>", bot_id);

    input
        .replace(&mention, "")
        .replace(&mention_nick, "")
        .trim()
        .to_string()
}

/// Sent instead of a blank reply, which Discord rejects.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "(empty response)";

/// Split `text` into chunks of at most `max_chars` characters, preferring to
/// break after a newline when one is reasonably close to the limit. Empty
/// text yields no chunks.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        // Byte offset just past `max_chars` characters, or the end.
        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        let cut = if limit < rest.len() {
            rest[..limit]
                .rfind('\n')
                .map(|pos| pos + 1)
                .filter(|&pos| pos > limit / 2)
                .unwrap_or(limit)
        } else {
            limit
        };

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
    chunks
}

/// Chunks ready to post: never empty, and never a whitespace-only message.
pub fn reply_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![EMPTY_REPLY_PLACEHOLDER.to_string()];
    }
    split_message(text, max_chars)
}
