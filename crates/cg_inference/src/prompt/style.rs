use lazy_static::lazy_static;

/// Style used when the requested one is blank or unknown.
pub const DEFAULT_STYLE: &str = "科普+故事开场";

const STYLE_MAPPING_RAW: &str = include_str!("../../templates/style_mapping.md");

lazy_static! {
    static ref STYLE_MAPPING: Vec<(String, String)> = parse_style_mapping(STYLE_MAPPING_RAW);
}

/// Splits the mapping document on `## ` headings. Separator lines (`---`)
/// are dropped and sections with an empty body are skipped.
fn parse_style_mapping(raw: &str) -> Vec<(String, String)> {
    fn flush(entries: &mut Vec<(String, String)>, title: &str, body: &[&str]) {
        let content = body.join("\n").trim().to_string();
        if !title.is_empty() && !content.is_empty() {
            entries.push((title.to_string(), content));
        }
    }

    let mut entries = Vec::new();
    let mut current: Option<(&str, Vec<&str>)> = None;
    for line in raw.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            if let Some((title, body)) = current.take() {
                flush(&mut entries, title, &body);
            }
            current = Some((title.trim(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            if line.trim() != "---" {
                body.push(line);
            }
        }
    }
    if let Some((title, body)) = current {
        flush(&mut entries, title, &body);
    }
    entries
}

fn lookup(style: &str) -> Option<&'static str> {
    STYLE_MAPPING
        .iter()
        .find(|(name, _)| name == style)
        .map(|(_, constraint)| constraint.as_str())
}

/// Constraint block for `style`, falling back to the default style's block.
pub fn style_constraint(style: &str) -> &'static str {
    let key = match style.trim() {
        "" => DEFAULT_STYLE,
        key => key,
    };
    lookup(key).or_else(|| lookup(DEFAULT_STYLE)).unwrap_or("")
}

/// All known style names, in document order.
pub fn styles() -> Vec<&'static str> {
    STYLE_MAPPING.iter().map(|(name, _)| name.as_str()).collect()
}

pub fn is_known_style(style: &str) -> bool {
    lookup(style.trim()).is_some()
}
