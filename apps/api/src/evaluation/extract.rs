//! Pulls a JSON object out of free-form model output.
//!
//! Models often wrap their answer in prose or markdown fences. Rather than
//! enforcing a format we take the first balanced `{...}` span and let the
//! caller try to parse it.

/// Returns the first balanced `{...}` span in `text`, or `None` if there is
/// no opening brace or it is never closed.
///
/// Braces inside JSON string literals (including escaped quotes) do not count
/// toward nesting.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return Some(&text[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}
