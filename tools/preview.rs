/// Preview — console player for authored dialogue libraries.
///
/// Usage: preview [--data <dir>] [--list] [<conversation>]
///
/// Plays the named conversation at authored pace, mapping the display
/// surface onto stdout. Press Enter to advance past a finished block.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use dialogue_engine::core::display::DisplaySurface;
use dialogue_engine::core::sequencer::{DialogueSequencer, PlaybackState};
use dialogue_engine::schema::block::DialogueBlock;
use dialogue_engine::schema::character::Emotion;
use dialogue_engine::schema::conversation::DialogueLibrary;

/// Renders the display surface as plain console output. Markup in the
/// visible text (name colors, `<b>`, ...) is printed raw; a real host
/// would hand it to its rich-text renderer.
struct ConsoleDisplay {
    /// Character count of the line currently on screen, so a shorter
    /// redraw can blank the leftovers.
    line_chars: usize,
}

impl ConsoleDisplay {
    fn new() -> ConsoleDisplay {
        ConsoleDisplay { line_chars: 0 }
    }

    fn note(&mut self, message: &str) {
        if self.line_chars > 0 {
            println!();
            self.line_chars = 0;
        }
        println!("{message}");
    }
}

/// Carriage-return redraw of `text`, padded with spaces past any longer
/// previous line. Returns the new on-screen character count.
fn render_line(text: &str, prev_chars: usize) -> (String, usize) {
    let chars = text.chars().count();
    let pad = prev_chars.saturating_sub(chars);
    (format!("\r{text}{:pad$}", ""), chars)
}

impl DisplaySurface for ConsoleDisplay {
    fn show(&mut self) {
        self.note("--- dialogue panel open ---");
    }

    fn hide(&mut self) {
        self.note("--- dialogue panel closed ---");
    }

    fn initialize_block(&mut self, block: &DialogueBlock) {
        self.note(&format!(
            "[{} | {:?} | {:?} | portrait {}]",
            block.character.name,
            block.alignment,
            block.emotion,
            block.character.portrait(block.emotion).0,
        ));
    }

    fn set_visible_text(&mut self, text: &str) {
        let (line, chars) = render_line(text, self.line_chars);
        print!("{line}");
        self.line_chars = chars;
        let _ = io::stdout().flush();
    }

    fn mark_complete(&mut self) {
        self.note("  (Enter to continue)");
    }

    fn show_effect(&mut self) {
        self.note("[show]");
    }

    fn hide_effect(&mut self) {
        self.note("[hide]");
    }

    fn shake_effect(&mut self) {
        self.note("[shake]");
    }

    fn emotion_effect(&mut self, emotion: Emotion) {
        self.note(&format!("[emotion -> {emotion:?}]"));
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let mut data_dir = "data/sample".to_string();
    let mut list = false;
    let mut conversation = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" if i + 1 < args.len() => {
                i += 1;
                data_dir = args[i].clone();
            }
            "--list" => list = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            arg if !arg.starts_with('-') => conversation = Some(arg.to_string()),
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut library = DialogueLibrary::new();
    if let Err(err) = library.load_from_dir(Path::new(&data_dir)) {
        eprintln!("Failed to load library from {data_dir}: {err}");
        std::process::exit(1);
    }

    if list {
        for name in library.conversation_names() {
            println!("{name}");
        }
        return;
    }

    let Some(conversation) = conversation else {
        print_usage();
        std::process::exit(1);
    };

    let mut sequencer = DialogueSequencer::new(library, ConsoleDisplay::new());
    if let Err(err) = sequencer.open(&conversation) {
        eprintln!("Failed to open `{conversation}`: {err}");
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let mut input = String::new();
    let mut last = Instant::now();

    while sequencer.state() != PlaybackState::Idle {
        match sequencer.state() {
            PlaybackState::Finished | PlaybackState::Skipped => {
                input.clear();
                if stdin.lock().read_line(&mut input).is_err() {
                    break;
                }
                sequencer.advance();
                last = Instant::now();
            }
            _ => {
                std::thread::sleep(Duration::from_millis(16));
                let now = Instant::now();
                sequencer.tick(now - last);
                last = now;
            }
        }
    }
}

fn print_usage() {
    println!("Usage: preview [--data <dir>] [--list] [<conversation>]");
    println!();
    println!("  --data <dir>   library directory of .ron files (default: data/sample)");
    println!("  --list         list loaded conversation names and exit");
}

#[cfg(test)]
mod tests {
    use super::render_line;

    #[test]
    fn growing_line_needs_no_padding() {
        assert_eq!(render_line("Hi", 0), ("\rHi".to_string(), 2));
        assert_eq!(render_line("Hi t", 2), ("\rHi t".to_string(), 4));
    }

    #[test]
    fn shorter_redraw_blanks_the_leftovers() {
        // A fresh block's shorter buffer must overwrite the previous
        // line's tail.
        let (line, chars) = render_line("Bob:", 10);
        assert_eq!(line, "\rBob:      ");
        assert_eq!(chars, 4);
    }

    #[test]
    fn padding_counts_chars_not_bytes() {
        let (line, chars) = render_line("héllo", 5);
        assert_eq!(chars, 5);
        assert_eq!(line, "\rhéllo");
    }
}
