/// Market Scene demo — embeds the engine with an in-memory library and
/// auto-plays a conversation, printing each finished line.
///
/// Run with: cargo run --example market_scene

use std::time::Duration;

use dialogue_engine::core::display::DisplaySurface;
use dialogue_engine::core::sequencer::{DialogueSequencer, PlaybackState};
use dialogue_engine::schema::block::DialogueBlock;
use dialogue_engine::schema::character::Emotion;
use dialogue_engine::schema::conversation::DialogueLibrary;

const LIBRARY: &str = r##"(
    characters: [
        (
            name: "Mara",
            color: "#e06666",
            portraits: ["mara_default", "mara_happy", "mara_sad", "mara_angry", "mara_thinking"],
            sounds: ["mara_blip", "mara_blip", "mara_blip", "mara_blip", "mara_blip"],
        ),
        (
            name: "Tomas",
            color: "#6fa8dc",
            portraits: ["tomas_default", "tomas_happy", "tomas_sad", "tomas_angry", "tomas_thinking"],
            sounds: ["tomas_blip", "tomas_blip", "tomas_blip", "tomas_blip", "tomas_blip"],
        ),
    ],
    conversations: {
        "opening_sale": [
            (
                alignment: Left,
                emotion: Happy,
                character: "Mara",
                description: "Fresh plums!<wait=0.4> Picked this morning.",
                speed_ms: 25,
            ),
            (
                alignment: Right,
                emotion: Thinking,
                character: "Tomas",
                description: "Hmm.<speed=60> How much for the <b>whole basket</b>?",
                speed_ms: 25,
            ),
            (
                alignment: Left,
                emotion: Angry,
                character: "Mara",
                description: "<shake>The basket is not for sale!<emotion=happy> The plums, though...",
                speed_ms: 25,
            ),
        ],
    },
)"##;

/// Collects finished lines instead of animating them; the point here is
/// the embedding API, not the pacing.
#[derive(Default)]
struct TranscriptDisplay {
    current: String,
    effects: Vec<&'static str>,
}

impl DisplaySurface for TranscriptDisplay {
    fn show(&mut self) {
        println!("(panel opens)");
    }
    fn hide(&mut self) {
        println!("(panel closes)");
    }
    fn initialize_block(&mut self, block: &DialogueBlock) {
        self.current.clear();
        self.effects.clear();
        println!("-- {} ({:?}, {:?})", block.character.name, block.alignment, block.emotion);
    }
    fn set_visible_text(&mut self, text: &str) {
        self.current = text.to_string();
    }
    fn mark_complete(&mut self) {
        println!("   {}", self.current);
        if !self.effects.is_empty() {
            println!("   effects: {}", self.effects.join(", "));
        }
    }
    fn show_effect(&mut self) {
        self.effects.push("show");
    }
    fn hide_effect(&mut self) {
        self.effects.push("hide");
    }
    fn shake_effect(&mut self) {
        self.effects.push("shake");
    }
    fn emotion_effect(&mut self, _emotion: Emotion) {
        self.effects.push("emotion change");
    }
}

fn main() {
    env_logger::init();

    let mut library = DialogueLibrary::new();
    library
        .parse_ron(LIBRARY)
        .expect("demo library should parse");

    let mut sequencer = DialogueSequencer::new(library, TranscriptDisplay::default());
    sequencer
        .open("opening_sale")
        .expect("demo conversation should resolve");

    // Drive the sequencer the way a game loop would, advancing as soon
    // as each block finishes.
    let frame = Duration::from_millis(16);
    while sequencer.state() != PlaybackState::Idle {
        match sequencer.state() {
            PlaybackState::Finished | PlaybackState::Skipped => sequencer.advance(),
            _ => sequencer.tick(frame),
        }
    }
}
