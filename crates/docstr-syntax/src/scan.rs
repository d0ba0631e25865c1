//! Quote- and bracket-aware scanning shared by the dialect and field grammars.

/// Byte offsets of the characters accepted by `hit` that sit outside quotes
/// and brackets. `None` when the text has unbalanced quotes or brackets.
pub(crate) fn top_level(text: &str, mut hit: impl FnMut(usize, char) -> bool) -> Option<Vec<usize>> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut hits = Vec::new();

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
            }
            _ if depth == 0 && hit(i, c) => hits.push(i),
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        None
    } else {
        Some(hits)
    }
}

/// Split on every top-level occurrence of `sep`.
pub(crate) fn split_top_level(text: &str, sep: char) -> Option<Vec<&str>> {
    let hits = top_level(text, |_, c| c == sep)?;
    let mut parts = Vec::with_capacity(hits.len() + 1);
    let mut start = 0;
    for pos in hits {
        parts.push(&text[start..pos]);
        start = pos + sep.len_utf8();
    }
    parts.push(&text[start..]);
    Some(parts)
}

/// Position of the first top-level assignment `=`, skipping comparison
/// operators such as `==`, `<=`, `>=` and `!=`.
pub(crate) fn assignment_position(text: &str) -> Option<Option<usize>> {
    let bytes = text.as_bytes();
    let hits = top_level(text, |i, c| {
        if c != '=' {
            return false;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        next != b'=' && !matches!(prev, b'=' | b'<' | b'>' | b'!')
    })?;
    Some(hits.first().copied())
}

/// Position of the first top-level `:` followed by whitespace or the end of
/// the text. Unbalanced text yields `None`.
pub(crate) fn colon_position(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    top_level(text, |i, c| {
        c == ':' && bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace())
    })?
    .first()
    .copied()
}
