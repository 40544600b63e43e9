/// The display collaborator — the narrow, one-way surface the core
/// drives. A host implementation maps these onto its UI, tweening, and
/// audio systems; nothing here returns a value or blocks.

use crate::schema::block::DialogueBlock;
use crate::schema::character::Emotion;

pub trait DisplaySurface {
    /// Show the dialogue container.
    fn show(&mut self);

    /// Hide the dialogue container.
    fn hide(&mut self);

    /// A new block is about to play: set up alignment, portrait, and
    /// blip sound from the block's character and emotion, and clear the
    /// text area.
    fn initialize_block(&mut self, block: &DialogueBlock);

    /// Publish a partial render of the revealed text. Called once per
    /// revealed character and on flush.
    fn set_visible_text(&mut self, text: &str);

    /// The current block's reveal reached a terminal state (completed
    /// or skipped).
    fn mark_complete(&mut self);

    /// `<show>` directive fired.
    fn show_effect(&mut self);

    /// `<hide>` directive fired.
    fn hide_effect(&mut self);

    /// `<shake>` directive fired.
    fn shake_effect(&mut self);

    /// `<emotion=...>` directive fired: swap portrait and blip sound.
    fn emotion_effect(&mut self, emotion: Emotion);
}
