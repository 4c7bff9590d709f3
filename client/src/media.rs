//! Inline media markup assembly.
//!
//! Notes may embed images, videos and links as inline HTML. The markup is
//! assembled client-side and stored opaquely; nothing downstream parses or
//! sanitizes it. YouTube URLs become embed iframes; any other video URL
//! falls back to a plain `<video>` tag.

use std::sync::LazyLock;

use regex::Regex;

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
        .expect("hardcoded pattern")
});

/// Extracts the video id from a YouTube watch, short or embed URL.
pub fn youtube_embed_id(url: &str) -> Option<&str> {
    YOUTUBE_ID
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

pub fn image_markup(url: &str) -> String {
    format!(r#"<img src="{url}" alt="Image">"#)
}

pub fn video_markup(url: &str) -> String {
    match youtube_embed_id(url) {
        Some(id) => format!(
            r#"<iframe width="100%" style="aspect-ratio: 16/9;" src="https://www.youtube.com/embed/{id}" frameborder="0" allowfullscreen></iframe>"#
        ),
        None => format!(r#"<video src="{url}" controls style="width: 100%;"></video>"#),
    }
}

pub fn link_markup(url: &str, text: Option<&str>) -> String {
    let label = match text {
        Some(text) if !text.is_empty() => text,
        _ => url,
    };
    format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{label}</a>"#)
}

/// Appends a markup snippet to existing note content, separated by a blank
/// line when there already is content.
pub fn append_markup(content: &str, markup: &str) -> String {
    if content.is_empty() {
        markup.to_string()
    } else {
        format!("{content}\n\n{markup}")
    }
}
