//! Multiline text helpers shared by the `Display` impls.

/// Prefixes every line of `text` with `depth` levels of two-space indent.
pub(crate) fn indent(text: &str, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    let mut out = String::with_capacity(text.len() + pad.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&pad);
        out.push_str(line);
    }
    out
}

/// Renders `items` as a bracketed, comma separated, indented list.
pub(crate) fn list(items: &[String]) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    format!("[\n{}\n]", indent(&items.join(",\n"), 1))
}

/// Renders a `&name{ field: value, .. }` block, one field per line.
pub(crate) fn block(name: &str, fields: &[(&str, String)]) -> String {
    let fields: Vec<String> = fields
        .iter()
        .map(|(key, value)| indent(&format!("{key}: {value}"), 1))
        .collect();
    format!("&{name}{{\n{}\n}}", fields.join(",\n"))
}
