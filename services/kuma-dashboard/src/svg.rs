//! Status extraction from rendered SVG badges

use std::sync::OnceLock;

use regex::Regex;

use crate::monitor::Status;

fn aria_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"aria-label="Status: ([^"]+)""#).expect("aria-label pattern is valid")
    })
}

fn text_element_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r">([^<]+)</text>").expect("text element pattern is valid"))
}

/// Read the status encoded in an SVG badge.
///
/// The accessible label wins when present. Older badge renderers omit it, in
/// which case the last `<text>` element decides. Anything else is `Error`.
pub fn parse_status_from_svg(svg: &str) -> Status {
    if let Some(captures) = aria_label_pattern().captures(svg) {
        return match captures[1].to_lowercase().as_str() {
            "up" => Status::Up,
            "down" => Status::Down,
            _ => Status::Error,
        };
    }

    if let Some(last_text) = text_element_pattern().find_iter(svg).last() {
        let text = last_text.as_str();
        if text.contains("Up") {
            return Status::Up;
        }
        if text.contains("Down") {
            return Status::Down;
        }
    }

    Status::Error
}
