//! Initial-letter avatar used whenever an organizer has no usable image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Build an SVG data URI showing the first letter of `name` (or `U`).
pub fn initial_avatar(name: &str) -> String {
    let initial = name
        .trim()
        .chars()
        .next()
        .map(escape_xml)
        .unwrap_or_else(|| "U".to_string());

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96"><rect width="100%" height="100%" rx="48" fill="#e5e7eb"/><text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" font-family="system-ui, -apple-system, 'Segoe UI', Roboto, 'Helvetica Neue', Arial" font-size="44" fill="#6b7280">{initial}</text></svg>"##
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}

/// Whether a stored avatar reference is unusable: missing, blank, or the
/// stringified remains of an absent value.
pub fn needs_fallback(url: Option<&str>) -> bool {
    match url {
        None => true,
        Some(u) => {
            let u = u.trim();
            u.is_empty() || u.contains("undefined") || u.contains("null")
        }
    }
}

fn escape_xml(c: char) -> String {
    match c {
        '<' => "&lt;".into(),
        '>' => "&gt;".into(),
        '&' => "&amp;".into(),
        '"' => "&quot;".into(),
        '\'' => "&apos;".into(),
        other => other.to_string(),
    }
}
