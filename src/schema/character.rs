use serde::{Deserialize, Serialize};

use super::conversation::LoadError;

/// Newtype wrapper for portrait/sound asset handles. Resolution of a
/// handle to an actual asset is the host's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

/// The emotional pose a character speaks a block with. Doubles as the
/// index into a character's portrait and sound tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Default,
    Happy,
    Sad,
    Angry,
    Thinking,
}

impl Emotion {
    /// Every variant, in ordinal order. Portrait/sound tables are
    /// parallel arrays over this ordering.
    pub const ALL: [Emotion; 5] = [
        Self::Default,
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Thinking,
    ];

    /// Position in [`Emotion::ALL`].
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Default => 0,
            Self::Happy => 1,
            Self::Sad => 2,
            Self::Angry => 3,
            Self::Thinking => 4,
        }
    }

    /// Case-insensitive parse, as used by the `<emotion=...>` directive.
    pub fn parse(s: &str) -> Option<Emotion> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "happy" => Some(Self::Happy),
            "sad" => Some(Self::Sad),
            "angry" => Some(Self::Angry),
            "thinking" => Some(Self::Thinking),
            _ => None,
        }
    }
}

/// A speaking character: display name, name color, and per-emotion
/// portrait/sound handles.
///
/// Constructed through [`Character::new`], which guarantees that both
/// asset tables carry exactly one entry per [`Emotion`] variant, so
/// lookups by emotion cannot go out of bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    /// Hex color (`#rrggbb`) for the styled name prefix.
    pub color: String,
    portraits: Vec<AssetId>,
    sounds: Vec<AssetId>,
}

impl Character {
    pub fn new(
        name: String,
        color: String,
        portraits: Vec<AssetId>,
        sounds: Vec<AssetId>,
    ) -> Result<Character, LoadError> {
        if !is_hex_color(&color) {
            return Err(LoadError::BadColor {
                character: name,
                color,
            });
        }
        if portraits.len() != Emotion::ALL.len() {
            return Err(LoadError::AssetTableMismatch {
                character: name,
                table: "portraits",
                got: portraits.len(),
                expected: Emotion::ALL.len(),
            });
        }
        if sounds.len() != Emotion::ALL.len() {
            return Err(LoadError::AssetTableMismatch {
                character: name,
                table: "sounds",
                got: sounds.len(),
                expected: Emotion::ALL.len(),
            });
        }
        Ok(Character {
            name,
            color,
            portraits,
            sounds,
        })
    }

    pub fn portrait(&self, emotion: Emotion) -> &AssetId {
        &self.portraits[emotion.ordinal()]
    }

    pub fn sound(&self, emotion: Emotion) -> &AssetId {
        &self.sounds[emotion.ordinal()]
    }

    /// The non-animated "Name: " prefix, styled with native color markup
    /// that passes through the typewriter untouched.
    pub fn styled_prefix(&self) -> String {
        format!("<color={}>{}:</color> ", self.color, self.name)
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
