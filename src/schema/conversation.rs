/// Conversation data — runtime types, RON loading, and resolution.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::block::{Alignment, DialogueBlock};
use super::character::{AssetId, Character, Emotion};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("conversation `{0}` has no blocks")]
    EmptyConversation(String),
    #[error("unknown character `{character}` in conversation `{conversation}`")]
    UnknownCharacter {
        conversation: String,
        character: String,
    },
    #[error("block {index} of conversation `{conversation}` has zero reveal speed")]
    ZeroSpeed {
        conversation: String,
        index: usize,
    },
    #[error("character `{character}` has {got} {table}, expected {expected}")]
    AssetTableMismatch {
        character: String,
        table: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("character `{character}` has malformed color `{color}` (expected #rrggbb)")]
    BadColor { character: String, color: String },
}

/// A named, ordered, fixed sequence of dialogue blocks. Immutable once
/// resolved; exclusively owned by the sequencer between open and close.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub name: String,
    blocks: Vec<DialogueBlock>,
}

impl Conversation {
    pub fn new(name: String, blocks: Vec<DialogueBlock>) -> Result<Conversation, LoadError> {
        if blocks.is_empty() {
            return Err(LoadError::EmptyConversation(name));
        }
        Ok(Conversation { name, blocks })
    }

    pub fn block(&self, index: usize) -> Option<&DialogueBlock> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Where the sequencer gets conversations from. The library below is the
/// file-backed implementation; tests and embedders can supply their own.
pub trait ConversationSource {
    fn resolve(&self, reference: &str) -> Result<Conversation, LoadError>;
}

// RON deserialization helpers — the on-disk format references characters
// by name, so we need intermediate structs before runtime resolution.

fn default_speed_ms() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
struct RonCharacter {
    name: String,
    color: String,
    portraits: Vec<String>,
    sounds: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RonBlock {
    alignment: Alignment,
    emotion: Emotion,
    character: String,
    description: String,
    #[serde(default = "default_speed_ms")]
    speed_ms: u32,
}

#[derive(Debug, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    characters: Vec<RonCharacter>,
    #[serde(default)]
    conversations: std::collections::HashMap<String, Vec<RonBlock>>,
}

/// The authored dialogue content of a game: characters plus conversation
/// scripts, loaded from RON files.
///
/// Character references inside conversations are resolved lazily, in
/// [`ConversationSource::resolve`], so files may be loaded in any order.
#[derive(Debug, Default)]
pub struct DialogueLibrary {
    characters: FxHashMap<String, Arc<Character>>,
    conversations: FxHashMap<String, Vec<RonBlock>>,
}

impl DialogueLibrary {
    pub fn new() -> DialogueLibrary {
        DialogueLibrary::default()
    }

    /// Load every `.ron` file in a directory. Later files override
    /// same-named characters and conversations.
    pub fn load_from_dir(&mut self, dir: &Path) -> Result<(), LoadError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("ron"))
            .collect();
        paths.sort();
        for path in paths {
            self.load_from_ron(&path)?;
        }
        Ok(())
    }

    /// Load a single RON library file, merging into this library.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), LoadError> {
        let contents = std::fs::read_to_string(path)?;
        self.parse_ron(&contents)
    }

    /// Parse a RON library document from a string, merging into this
    /// library. Character asset tables and colors are validated here.
    pub fn parse_ron(&mut self, input: &str) -> Result<(), LoadError> {
        let file: LibraryFile = ron::from_str(input)?;

        for raw in file.characters {
            let character = Character::new(
                raw.name,
                raw.color,
                raw.portraits.into_iter().map(AssetId).collect(),
                raw.sounds.into_iter().map(AssetId).collect(),
            )?;
            self.characters
                .insert(character.name.clone(), Arc::new(character));
        }

        for (name, blocks) in file.conversations {
            self.conversations.insert(name, blocks);
        }

        Ok(())
    }

    pub fn character(&self, name: &str) -> Option<&Arc<Character>> {
        self.characters.get(name)
    }

    /// Names of every loaded conversation, sorted.
    pub fn conversation_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conversations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl ConversationSource for DialogueLibrary {
    fn resolve(&self, reference: &str) -> Result<Conversation, LoadError> {
        let raw_blocks = self
            .conversations
            .get(reference)
            .ok_or_else(|| LoadError::ConversationNotFound(reference.to_string()))?;

        let mut blocks = Vec::with_capacity(raw_blocks.len());
        for (index, raw) in raw_blocks.iter().enumerate() {
            if raw.speed_ms == 0 {
                return Err(LoadError::ZeroSpeed {
                    conversation: reference.to_string(),
                    index,
                });
            }
            let character = self.characters.get(&raw.character).ok_or_else(|| {
                LoadError::UnknownCharacter {
                    conversation: reference.to_string(),
                    character: raw.character.clone(),
                }
            })?;
            blocks.push(DialogueBlock {
                alignment: raw.alignment,
                emotion: raw.emotion,
                character: Arc::clone(character),
                description: raw.description.clone(),
                speed_ms: raw.speed_ms,
            });
        }

        Conversation::new(reference.to_string(), blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_RON: &str = r##"(
        characters: [
            (
                name: "Alice",
                color: "#e06666",
                portraits: ["alice_default", "alice_happy", "alice_sad", "alice_angry", "alice_thinking"],
                sounds: ["alice_blip_0", "alice_blip_1", "alice_blip_2", "alice_blip_3", "alice_blip_4"],
            ),
            (
                name: "Bob",
                color: "#6fa8dc",
                portraits: ["bob_default", "bob_happy", "bob_sad", "bob_angry", "bob_thinking"],
                sounds: ["bob_blip_0", "bob_blip_1", "bob_blip_2", "bob_blip_3", "bob_blip_4"],
            ),
        ],
        conversations: {
            "greeting": [
                (
                    alignment: Left,
                    emotion: Happy,
                    character: "Alice",
                    description: "Hi<wait=0.1> there",
                    speed_ms: 20,
                ),
                (
                    alignment: Right,
                    emotion: Default,
                    character: "Bob",
                    description: "Hey",
                ),
            ],
        },
    )"##;

    #[test]
    fn parse_library_and_resolve() {
        let mut library = DialogueLibrary::new();
        library.parse_ron(LIBRARY_RON).unwrap();

        let conversation = library.resolve("greeting").unwrap();
        assert_eq!(conversation.len(), 2);

        let first = conversation.block(0).unwrap();
        assert_eq!(first.character.name, "Alice");
        assert_eq!(first.speed_ms, 20);
        assert_eq!(first.description, "Hi<wait=0.1> there");

        // Omitted speed falls back to the default
        let second = conversation.block(1).unwrap();
        assert_eq!(second.speed_ms, 30);
        assert_eq!(second.alignment, Alignment::Right);
    }

    #[test]
    fn resolve_unknown_conversation() {
        let mut library = DialogueLibrary::new();
        library.parse_ron(LIBRARY_RON).unwrap();
        let err = library.resolve("missing").unwrap_err();
        assert!(matches!(err, LoadError::ConversationNotFound(name) if name == "missing"));
    }

    #[test]
    fn resolve_unknown_character() {
        let mut library = DialogueLibrary::new();
        library
            .parse_ron(
                r#"(
                conversations: {
                    "orphan": [
                        (alignment: Left, emotion: Default, character: "Ghost", description: "boo"),
                    ],
                },
            )"#,
            )
            .unwrap();
        let err = library.resolve("orphan").unwrap_err();
        assert!(
            matches!(err, LoadError::UnknownCharacter { character, .. } if character == "Ghost")
        );
    }

    #[test]
    fn resolve_zero_speed() {
        let mut library = DialogueLibrary::new();
        library.parse_ron(LIBRARY_RON).unwrap();
        library
            .parse_ron(
                r#"(
                conversations: {
                    "frozen": [
                        (alignment: Left, emotion: Default, character: "Alice", description: "...", speed_ms: 0),
                    ],
                },
            )"#,
            )
            .unwrap();
        let err = library.resolve("frozen").unwrap_err();
        assert!(matches!(err, LoadError::ZeroSpeed { index: 0, .. }));
    }

    #[test]
    fn empty_conversation_rejected() {
        let mut library = DialogueLibrary::new();
        library
            .parse_ron(r#"(conversations: { "hollow": [] })"#)
            .unwrap();
        let err = library.resolve("hollow").unwrap_err();
        assert!(matches!(err, LoadError::EmptyConversation(name) if name == "hollow"));
    }

    #[test]
    fn merge_overrides_same_name() {
        let mut library = DialogueLibrary::new();
        library.parse_ron(LIBRARY_RON).unwrap();
        library
            .parse_ron(
                r#"(
                conversations: {
                    "greeting": [
                        (alignment: Left, emotion: Sad, character: "Bob", description: "Gone"),
                    ],
                },
            )"#,
            )
            .unwrap();
        let conversation = library.resolve("greeting").unwrap();
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.block(0).unwrap().character.name, "Bob");
    }

    #[test]
    fn malformed_character_table_rejected_at_parse() {
        let mut library = DialogueLibrary::new();
        let err = library
            .parse_ron(
                r##"(
                characters: [
                    (name: "Stub", color: "#ffffff", portraits: ["only_one"], sounds: []),
                ],
            )"##,
            )
            .unwrap_err();
        assert!(matches!(err, LoadError::AssetTableMismatch { .. }));
    }

    #[test]
    fn conversation_names_sorted() {
        let mut library = DialogueLibrary::new();
        library.parse_ron(LIBRARY_RON).unwrap();
        library
            .parse_ron(
                r#"(
                conversations: {
                    "aftermath": [
                        (alignment: Left, emotion: Default, character: "Alice", description: "Well."),
                    ],
                },
            )"#,
            )
            .unwrap();
        assert_eq!(library.conversation_names(), vec!["aftermath", "greeting"]);
    }
}
