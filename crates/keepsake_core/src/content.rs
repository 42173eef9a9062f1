//! # Story Content
//!
//! Static text and gallery records. The engine treats all of it as opaque:
//! only the letter body is read, to drive the typewriter. Everything else is
//! carried through to the renderer untouched.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KeepsakeError, KeepsakeResult};

/// Heading shown on the welcome scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleContent {
    /// Title while the pointer is elsewhere.
    pub resting: String,
    /// Title while the pointer rests on it.
    pub hovered: String,
    /// Line under the title.
    pub subtitle: String,
}

impl Default for TitleContent {
    fn default() -> Self {
        Self {
            resting: "My Dearest 💕".to_owned(),
            hovered: "My Everything ❤️".to_owned(),
            subtitle: "Something special is waiting for you...".to_owned(),
        }
    }
}

/// The long-form letter and its sign-off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterContent {
    /// Text revealed by the typewriter.
    pub body: String,
    /// Closing line shown with the signature.
    pub closing: String,
    /// Signer name.
    pub signer: String,
    /// Date line under the signature.
    pub date: String,
    /// Line shown under the card once the signature is visible.
    pub forever_line: String,
}

impl Default for LetterContent {
    fn default() -> Self {
        Self {
            body: "To the one who holds my heart,\n\n\
                   Your love is my greatest gift. You see me, stand by me, and make every \
                   moment special. I promise to love you more each day.\n\n\
                   Always yours. 💖"
                .to_owned(),
            closing: "With all my love,".to_owned(),
            signer: "Your Name 💕".to_owned(),
            date: "Valentine's Day 2026".to_owned(),
            forever_line: "Forever & Always 💞".to_owned(),
        }
    }
}

/// One card in the memory gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    /// Stable id.
    pub id: u32,
    /// Card title.
    pub title: String,
    /// Free-form date label.
    pub date: String,
    /// Caption under the title.
    pub caption: String,
    /// Glyph shown when there is no image.
    pub icon: String,
    /// Optional image reference, resolved by the renderer.
    #[serde(default)]
    pub image: Option<String>,
}

/// Everything the story displays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryContent {
    /// Welcome heading.
    pub title: TitleContent,
    /// The letter.
    pub letter: LetterContent,
    /// Gallery cards in display order.
    pub gallery: Vec<GalleryEntry>,
    /// Paragraphs of the closing promise.
    pub promise: Vec<String>,
}

impl StoryContent {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Parse`] on malformed TOML.
    pub fn from_toml_str(source: &str) -> KeepsakeResult<Self> {
        toml::from_str(source).map_err(|source| KeepsakeError::Parse {
            what: "story content",
            source,
        })
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`KeepsakeError::Io`] or [`KeepsakeError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> KeepsakeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| KeepsakeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Replaces the letter body.
    #[must_use]
    pub fn with_letter_body(mut self, body: impl Into<String>) -> Self {
        self.letter.body = body.into();
        self
    }

    /// Letter body as a shared string for the typewriter.
    #[must_use]
    pub fn letter_source(&self) -> Arc<str> {
        Arc::from(self.letter.body.as_str())
    }
}
