use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::character::{Character, Emotion};

/// Which side of the panel the speaking character appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Right,
}

/// One authored line of a conversation: who speaks, how they look, and
/// the raw description text, which may embed `<...>` control directives.
///
/// Blocks are immutable at runtime and owned by their [`Conversation`];
/// the character is shared across blocks and conversations.
///
/// [`Conversation`]: super::conversation::Conversation
#[derive(Debug, Clone)]
pub struct DialogueBlock {
    pub alignment: Alignment,
    pub emotion: Emotion,
    pub character: Arc<Character>,
    pub description: String,
    /// Reveal pacing in milliseconds per character. Positive; enforced at
    /// load time.
    pub speed_ms: u32,
}

impl DialogueBlock {
    /// The starting inter-character delay for this block's reveal.
    pub fn speed(&self) -> Duration {
        Duration::from_millis(u64::from(self.speed_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::character::AssetId;

    fn test_character() -> Arc<Character> {
        let table: Vec<AssetId> = Emotion::ALL
            .iter()
            .map(|e| AssetId(format!("asset_{}", e.ordinal())))
            .collect();
        Arc::new(
            Character::new(
                "Alice".to_string(),
                "#e06666".to_string(),
                table.clone(),
                table,
            )
            .unwrap(),
        )
    }

    #[test]
    fn speed_converts_to_duration() {
        let block = DialogueBlock {
            alignment: Alignment::Left,
            emotion: Emotion::Default,
            character: test_character(),
            description: "Hello.".to_string(),
            speed_ms: 30,
        };
        assert_eq!(block.speed(), Duration::from_millis(30));
    }

    #[test]
    fn blocks_share_their_character() {
        let character = test_character();
        let a = DialogueBlock {
            alignment: Alignment::Left,
            emotion: Emotion::Happy,
            character: Arc::clone(&character),
            description: "Hi.".to_string(),
            speed_ms: 30,
        };
        let b = DialogueBlock {
            alignment: Alignment::Right,
            emotion: Emotion::Sad,
            character: Arc::clone(&character),
            description: "Bye.".to_string(),
            speed_ms: 30,
        };
        assert!(Arc::ptr_eq(&a.character, &b.character));
    }
}
