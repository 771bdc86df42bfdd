//! Content-type inference from client naming conventions.

/// MIME type for stories and character sheets.
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

/// MIME type for canvases and generated illustrations.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// How a saved payload is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Hand-drawn canvas, sent as base64 PNG
    Canvas,

    /// Character sheet. Stored exactly like a story for now, but kept
    /// separate so the two can diverge.
    Character,

    /// Plain story text
    Story,
}

impl ContentKind {
    /// File extension appended to the sanitized name.
    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::Canvas => ".png",
            ContentKind::Character | ContentKind::Story => ".txt",
        }
    }

    /// MIME type stored with the object.
    pub fn content_type(&self) -> &'static str {
        match self {
            ContentKind::Canvas => PNG_CONTENT_TYPE,
            ContentKind::Character | ContentKind::Story => TEXT_CONTENT_TYPE,
        }
    }

    /// Whether the client payload is base64-encoded binary.
    pub fn is_binary(&self) -> bool {
        matches!(self, ContentKind::Canvas)
    }
}

/// Classify a payload from its name and the optional canvas hint.
///
/// First match wins: the canvas flag or a case-insensitive `"canvas"` in the
/// name selects [`ContentKind::Canvas`], then `"character"` selects
/// [`ContentKind::Character`], and everything else (including the empty
/// string) is a [`ContentKind::Story`].
pub fn resolve_content_type(name: &str, is_canvas: bool) -> ContentKind {
    let lowered = name.to_lowercase();

    if is_canvas || lowered.contains("canvas") {
        ContentKind::Canvas
    } else if lowered.contains("character") {
        ContentKind::Character
    } else {
        ContentKind::Story
    }
}
