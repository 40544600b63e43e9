/// The conversation sequencer — advances across an ordered block list,
/// orchestrating per-block typewriter runs, skip-to-complete, and
/// end-of-conversation closure.
///
/// The host wires this to its frame loop (`tick`) and its continue
/// input (`advance`); everything else flows out through the display
/// surface.

use log::{debug, info};
use std::time::Duration;

use crate::core::display::DisplaySurface;
use crate::core::typewriter::{RunState, Typewriter};
use crate::schema::conversation::{Conversation, ConversationSource, LoadError};

/// Settle window between showing the panel and starting block 0, long
/// enough for the host's fade-in tween to land.
const OPEN_SETTLE: Duration = Duration::from_millis(250);

/// Sequencer lifecycle as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No conversation open.
    Idle,
    /// Conversation open, settle window still elapsing.
    Opening,
    /// The current block's text is animating.
    Playing,
    /// The current block was skipped to completion.
    Skipped,
    /// The current block finished animating on its own.
    Finished,
}

#[derive(Debug)]
struct ActiveConversation {
    conversation: Conversation,
    index: usize,
    /// Remaining settle time; `None` once playback has started.
    settle: Option<Duration>,
    /// Speaker of the previous block, used to decide when to re-announce
    /// the name prefix.
    last_speaker: Option<String>,
}

/// Plays conversations resolved from `S` onto display `D`. Owns the
/// conversation exclusively between `open` and `close`, and owns the
/// single typewriter, so at most one reveal is ever live.
pub struct DialogueSequencer<S, D> {
    source: S,
    display: D,
    typewriter: Typewriter,
    active: Option<ActiveConversation>,
}

impl<S, D> DialogueSequencer<S, D>
where
    S: ConversationSource,
    D: DisplaySurface,
{
    pub fn new(source: S, display: D) -> DialogueSequencer<S, D> {
        DialogueSequencer {
            source,
            display,
            typewriter: Typewriter::new(),
            active: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        match &self.active {
            None => PlaybackState::Idle,
            Some(active) if active.settle.is_some() => PlaybackState::Opening,
            Some(_) => match self.typewriter.state() {
                RunState::Running => PlaybackState::Playing,
                RunState::Skipped => PlaybackState::Skipped,
                RunState::Completed => PlaybackState::Finished,
                // Settle just expired but no tick has started the block.
                RunState::Idle => PlaybackState::Opening,
            },
        }
    }

    /// Index of the block currently playing, while a conversation is
    /// active. Always within `[0, len)`.
    pub fn block_index(&self) -> Option<usize> {
        self.active.as_ref().map(|active| active.index)
    }

    /// Visible buffer of the current block's reveal.
    pub fn visible_text(&self) -> Option<&str> {
        self.typewriter.visible_text()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Resolve and open a conversation: show the panel, then start block
    /// 0 once the settle window has elapsed. An already-open
    /// conversation is closed first.
    pub fn open(&mut self, reference: &str) -> Result<(), LoadError> {
        if self.active.is_some() {
            self.close();
        }
        let conversation = self.source.resolve(reference)?;
        info!(
            "opening conversation `{}` ({} blocks)",
            reference,
            conversation.len()
        );
        self.display.show();
        self.active = Some(ActiveConversation {
            conversation,
            index: 0,
            settle: Some(OPEN_SETTLE),
            last_speaker: None,
        });
        Ok(())
    }

    /// The host's single continue input. While the reveal is running it
    /// requests a skip; on a finished or skipped block it steps to the
    /// next block, or closes the conversation past the last one.
    pub fn advance(&mut self) {
        let in_settle = match &self.active {
            None => return,
            Some(active) => active.settle.is_some(),
        };
        if in_settle {
            return;
        }

        match self.typewriter.state() {
            RunState::Running => {
                debug!("advance during reveal: requesting skip");
                self.typewriter.skip(&mut self.display);
            }
            RunState::Completed | RunState::Skipped => {
                self.typewriter.reset();
                let past_end = {
                    let active = match self.active.as_mut() {
                        Some(active) => active,
                        None => return,
                    };
                    active.index += 1;
                    active.index >= active.conversation.len()
                };
                if past_end {
                    self.close();
                } else {
                    self.start_block();
                }
            }
            RunState::Idle => {}
        }
    }

    /// Hide the panel and release the conversation.
    pub fn close(&mut self) {
        if self.active.take().is_some() {
            info!("closing conversation");
            self.typewriter.reset();
            self.display.hide();
        }
    }

    /// Drive playback with elapsed frame time.
    pub fn tick(&mut self, elapsed: Duration) {
        let settle_expired = match self.active.as_mut() {
            None => return,
            Some(active) => match active.settle {
                Some(remaining) if elapsed < remaining => {
                    active.settle = Some(remaining - elapsed);
                    return;
                }
                Some(_) => {
                    // Time left over past the settle window is dropped;
                    // the first character's delay starts fresh.
                    active.settle = None;
                    true
                }
                None => false,
            },
        };

        if settle_expired {
            self.start_block();
            return;
        }
        self.typewriter.tick(elapsed, &mut self.display);
    }

    fn start_block(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Some(block) = active.conversation.block(active.index) else {
            return;
        };
        let announce = active.last_speaker.as_deref() != Some(block.character.name.as_str());
        debug!(
            "starting block {} (speaker `{}`)",
            active.index, block.character.name
        );
        active.last_speaker = Some(block.character.name.clone());
        self.typewriter.begin(block, announce, &mut self.display);
    }
}
