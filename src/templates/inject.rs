//! Injection markers: the single line in a template replaced by an oracle fragment

/// Marker lines recognised in rendered templates
pub const MARKERS: [&str; 2] = ["// [IA_GENERATED_CODE]", "# [IA_GENERATED_CODE]"];

pub fn has_marker(text: &str) -> bool {
    text.lines().any(|line| MARKERS.contains(&line.trim()))
}

/// Replace the first marker line with `fragment`, indented like the marker.
///
/// Without a marker the text is returned unchanged and the fragment is
/// discarded. An empty fragment removes the marker line.
pub fn inject(rendered: &str, fragment: &str) -> String {
    let mut out = String::with_capacity(rendered.len() + fragment.len());
    let mut injected = false;

    for line in rendered.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if !injected && MARKERS.contains(&content.trim()) {
            injected = true;
            let indent = &content[..content.len() - content.trim_start().len()];
            for fragment_line in fragment.lines() {
                if !fragment_line.is_empty() {
                    out.push_str(indent);
                }
                out.push_str(fragment_line);
                out.push('\n');
            }
            continue;
        }
        out.push_str(line);
    }
    out
}
