/// The typewriter engine — a tick-driven cooperative state machine that
/// walks a block's rich text, paying out elapsed time as per-character
/// delays and directive waits, and publishing partial renders.
///
/// The host owns the clock: it calls [`Typewriter::tick`] with elapsed
/// time from its frame loop and [`Typewriter::skip`] when the player asks
/// to fast-forward. Cancellation is checked at exactly two points — before
/// each character's delay and inside an active wait — so a skip can never
/// corrupt the output buffer.

use log::{debug, warn};
use std::time::Duration;

use crate::core::directive::Directive;
use crate::core::display::DisplaySurface;
use crate::core::markup::{MarkupError, Token, Tokenizer};
use crate::schema::block::DialogueBlock;

/// Lifecycle of one block's reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Source text fully consumed at the configured pace.
    Completed,
    /// Cancelled by skip; remaining text was flushed instantly.
    Skipped,
}

/// Transient per-block reveal bookkeeping. Created by `begin`, replaced
/// wholesale by the next `begin` — which is what enforces "at most one
/// live run".
#[derive(Debug)]
struct RevealState {
    /// The block's raw description. The cursor below only ever advances.
    text: String,
    cursor: usize,
    visible: String,
    /// Effective inter-character delay; `<speed=...>` replaces it
    /// mid-run.
    speed: Duration,
    /// Elapsed time banked toward the next character or wait.
    banked: Duration,
    /// Remaining `<wait=...>` suspension, if one is active.
    wait: Option<Duration>,
    /// Markup errors recovered during this run.
    errors: Vec<MarkupError>,
}

/// What the scanner found at the cursor. Tags are resolved to owned
/// values immediately so applying a step never borrows the source text.
enum Step {
    Char(char),
    Directive(Directive),
    Passthrough(String),
    BadTag(MarkupError),
    End,
}

#[derive(Debug, Default)]
pub struct Typewriter {
    state: RunState,
    reveal: Option<RevealState>,
}

impl Typewriter {
    pub fn new() -> Typewriter {
        Typewriter::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The accumulated visible buffer of the current or just-finished
    /// run.
    pub fn visible_text(&self) -> Option<&str> {
        self.reveal.as_ref().map(|rs| rs.visible.as_str())
    }

    /// Markup errors recovered during the current or just-finished run.
    pub fn markup_errors(&self) -> &[MarkupError] {
        self.reveal.as_ref().map_or(&[], |rs| rs.errors.as_slice())
    }

    /// Start revealing a block, abandoning any previous run. When
    /// `announce_speaker` is set the visible buffer starts with the
    /// character's styled name prefix, emitted in full rather than
    /// animated.
    pub fn begin(
        &mut self,
        block: &DialogueBlock,
        announce_speaker: bool,
        display: &mut dyn DisplaySurface,
    ) {
        let mut visible = String::new();
        if announce_speaker {
            visible.push_str(&block.character.styled_prefix());
        }

        display.initialize_block(block);
        display.set_visible_text(&visible);

        self.reveal = Some(RevealState {
            text: block.description.clone(),
            cursor: 0,
            visible,
            speed: block.speed(),
            banked: Duration::ZERO,
            wait: None,
            errors: Vec::new(),
        });
        self.state = RunState::Running;
    }

    /// Feed elapsed time into the reveal. Characters are paid for before
    /// they are appended; directives at the cursor cost nothing and run
    /// as soon as the preceding character has been paid for.
    pub fn tick(&mut self, elapsed: Duration, display: &mut dyn DisplaySurface) {
        if self.state != RunState::Running {
            return;
        }
        let Some(rs) = self.reveal.as_mut() else {
            return;
        };
        rs.banked += elapsed;

        loop {
            // An active wait soaks up banked time first.
            if let Some(remaining) = rs.wait {
                if rs.banked < remaining {
                    rs.wait = Some(remaining - rs.banked);
                    rs.banked = Duration::ZERO;
                    return;
                }
                rs.banked -= remaining;
                rs.wait = None;
            }

            let (step, next_cursor) = peek_step(rs);
            match step {
                Step::End => break,
                Step::Char(c) => {
                    if rs.banked < rs.speed {
                        // Not enough time yet; the cursor stays put so
                        // the next tick retries this character.
                        return;
                    }
                    rs.banked -= rs.speed;
                    rs.cursor = next_cursor;
                    rs.visible.push(c);
                    display.set_visible_text(&rs.visible);
                }
                Step::Directive(directive) => {
                    rs.cursor = next_cursor;
                    match directive {
                        Directive::Wait(duration) => rs.wait = Some(duration),
                        Directive::Speed(ms) => {
                            rs.speed = Duration::from_millis(u64::from(ms));
                        }
                        Directive::Show => display.show_effect(),
                        Directive::Hide => display.hide_effect(),
                        Directive::Shake => display.shake_effect(),
                        Directive::Emotion(emotion) => display.emotion_effect(emotion),
                    }
                }
                Step::Passthrough(raw) => {
                    rs.cursor = next_cursor;
                    rs.visible.push_str(&raw);
                    display.set_visible_text(&rs.visible);
                }
                Step::BadTag(error) => {
                    rs.cursor = next_cursor;
                    warn!("recovered markup error: {error}");
                    rs.errors.push(error);
                }
            }
        }

        self.state = RunState::Completed;
        display.mark_complete();
    }

    /// Cooperative cancellation: abandon any outstanding wait and flush
    /// the unread remainder instantly. Literals and unrecognized tags
    /// are appended verbatim; recognized directive tags are stripped
    /// without executing. Converges on the same final buffer a full
    /// reveal would have produced.
    pub fn skip(&mut self, display: &mut dyn DisplaySurface) {
        if self.state != RunState::Running {
            return;
        }
        let Some(rs) = self.reveal.as_mut() else {
            return;
        };

        rs.wait = None;
        let mut flushed = String::new();
        for token in Tokenizer::new(&rs.text[rs.cursor..]) {
            match token {
                Token::Literal(c) => flushed.push(c),
                Token::Tag(tag) => {
                    if !Directive::is_directive_name(tag.name()) {
                        flushed.push_str(tag.raw());
                    }
                }
            }
        }
        rs.cursor = rs.text.len();
        rs.visible.push_str(&flushed);
        display.set_visible_text(&rs.visible);

        debug!("reveal skipped, flushed {} bytes", flushed.len());
        self.state = RunState::Skipped;
        display.mark_complete();
    }

    /// Drop the run entirely, returning to `Idle`.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.reveal = None;
    }
}

fn peek_step(rs: &RevealState) -> (Step, usize) {
    let mut tokenizer = Tokenizer::new(&rs.text[rs.cursor..]);
    let step = match tokenizer.next() {
        None => Step::End,
        Some(Token::Literal(c)) => Step::Char(c),
        Some(Token::Tag(tag)) => match Directive::from_tag(&tag) {
            Ok(Some(directive)) => Step::Directive(directive),
            Ok(None) => Step::Passthrough(tag.raw().to_string()),
            Err(error) => Step::BadTag(error),
        },
    };
    (step, rs.cursor + tokenizer.pos())
}
