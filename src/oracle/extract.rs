//! Recovering structure from free-form model replies.
//!
//! Models prepend prose, wrap answers in fences and echo file paths. These
//! helpers are pure and independent of any transport.

use once_cell::sync::Lazy;
use regex::Regex;

/// `// filepath: x`, `// File path: x`, `//FilePath:x`
static FILEPATH_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*//\s*file\s*path\s*:").expect("file path comment pattern is valid")
});

/// Balanced `{...}` slice starting at the first `{`, if it closes
pub fn first_json_object(text: &str) -> Option<&str> {
    balanced_from(text, text.find('{')?, b'{', b'}')
}

/// Balanced `[...]` slice starting at the first `[`, if it closes
pub fn first_json_array(text: &str) -> Option<&str> {
    balanced_from(text, text.find('[')?, b'[', b']')
}

/// Every balanced `{...}` candidate in order of its opening brace.
///
/// Used when the first candidate is not valid JSON, e.g. a brace in prose
/// before the real payload.
pub fn json_object_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_from(text, start, b'{', b'}'))
}

/// Scan from `start` (which must hold `open`) to the matching `close`.
///
/// Braces inside string literals do not count, and escapes inside strings
/// are honoured.
fn balanced_from(text: &str, start: usize, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip fence lines and `// filepath:` preambles from generated source.
///
/// Fence lines (with or without a language tag) are removed wherever they
/// appear. Other lines keep their whitespace. A non-empty result ends with
/// exactly one newline.
pub fn sanitize_code(raw: &str) -> String {
    let kept: Vec<&str> = raw
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("```") && !FILEPATH_COMMENT.is_match(line)
        })
        .collect();

    let start = kept.iter().position(|l| !l.trim().is_empty());
    let end = kept.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => {
            let mut out = kept[start..=end].join("\n");
            out.push('\n');
            out
        }
        _ => String::new(),
    }
}
