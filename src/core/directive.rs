/// Directive interpretation — the recognized control tags and their
/// effects on the reveal.

use std::time::Duration;

use crate::core::markup::{MarkupError, Tag};
use crate::schema::character::Emotion;

/// The effect of a recognized control tag. Every directive is stripped
/// from the visible text; unrecognized tags instead pass through for the
/// downstream renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    /// `<show>` — fade the container back in.
    Show,
    /// `<hide>` — fade the container out while text keeps revealing.
    Hide,
    /// `<shake>` — shake the container.
    Shake,
    /// `<wait=seconds>` — one-shot blocking delay, skippable.
    Wait(Duration),
    /// `<speed=ms>` — replace the per-character delay for the rest of
    /// the block.
    Speed(u32),
    /// `<emotion=name>` — swap the speaker's portrait and blip sound.
    Emotion(Emotion),
}

impl Directive {
    /// Resolve a scanned tag. `Ok(None)` means the tag is not a
    /// recognized directive and should appear verbatim in the output.
    pub fn from_tag(tag: &Tag<'_>) -> Result<Option<Directive>, MarkupError> {
        match tag.name() {
            "show" => Ok(Some(Self::Show)),
            "hide" => Ok(Some(Self::Hide)),
            "shake" => Ok(Some(Self::Shake)),
            "wait" => {
                let seconds = tag.value_f64()?;
                // Seconds to whole milliseconds, truncating. Negative
                // values saturate to zero.
                Ok(Some(Self::Wait(Duration::from_millis(
                    (seconds * 1000.0) as u64,
                ))))
            }
            "speed" => {
                let ms = tag.value_u32()?;
                if ms == 0 {
                    return Err(MarkupError::InvalidArgument {
                        name: "speed".to_string(),
                        value: "0".to_string(),
                    });
                }
                Ok(Some(Self::Speed(ms)))
            }
            "emotion" => {
                let value = tag.value().ok_or_else(|| MarkupError::MissingArgument {
                    name: "emotion".to_string(),
                })?;
                match Emotion::parse(value) {
                    Some(emotion) => Ok(Some(Self::Emotion(emotion))),
                    None => Err(MarkupError::UnknownEmotion {
                        value: value.to_string(),
                    }),
                }
            }
            _ => Ok(None),
        }
    }

    /// True for names in the directive table. The skip flush uses this to
    /// strip recognized tags without executing them.
    pub fn is_directive_name(name: &str) -> bool {
        matches!(
            name,
            "show" | "hide" | "shake" | "wait" | "speed" | "emotion"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markup::{Token, Tokenizer};

    fn tag(src: &str) -> Tag<'_> {
        match Tokenizer::new(src).next() {
            Some(Token::Tag(tag)) => tag,
            other => panic!("expected tag from {:?}, got {:?}", src, other),
        }
    }

    #[test]
    fn bare_signals() {
        assert_eq!(Directive::from_tag(&tag("<show>")), Ok(Some(Directive::Show)));
        assert_eq!(Directive::from_tag(&tag("<hide>")), Ok(Some(Directive::Hide)));
        assert_eq!(
            Directive::from_tag(&tag("<shake>")),
            Ok(Some(Directive::Shake))
        );
    }

    #[test]
    fn wait_truncates_to_milliseconds() {
        assert_eq!(
            Directive::from_tag(&tag("<wait=0.1>")),
            Ok(Some(Directive::Wait(Duration::from_millis(100))))
        );
        // 0.0999 s is 99.9 ms; truncation keeps 99.
        assert_eq!(
            Directive::from_tag(&tag("<wait=0.0999>")),
            Ok(Some(Directive::Wait(Duration::from_millis(99))))
        );
    }

    #[test]
    fn speed_parses_integer() {
        assert_eq!(
            Directive::from_tag(&tag("<speed=5>")),
            Ok(Some(Directive::Speed(5)))
        );
    }

    #[test]
    fn speed_rejects_zero_and_garbage() {
        assert!(matches!(
            Directive::from_tag(&tag("<speed=0>")),
            Err(MarkupError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Directive::from_tag(&tag("<speed=abc>")),
            Err(MarkupError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn emotion_is_case_insensitive() {
        assert_eq!(
            Directive::from_tag(&tag("<emotion=ANGRY>")),
            Ok(Some(Directive::Emotion(Emotion::Angry)))
        );
        assert_eq!(
            Directive::from_tag(&tag("<emotion=happy>")),
            Ok(Some(Directive::Emotion(Emotion::Happy)))
        );
    }

    #[test]
    fn emotion_unknown_fails() {
        assert_eq!(
            Directive::from_tag(&tag("<emotion=smug>")),
            Err(MarkupError::UnknownEmotion {
                value: "smug".to_string(),
            })
        );
    }

    #[test]
    fn wait_missing_argument_fails() {
        assert!(matches!(
            Directive::from_tag(&tag("<wait>")),
            Err(MarkupError::MissingArgument { .. })
        ));
    }

    #[test]
    fn unknown_tags_pass_through() {
        assert_eq!(Directive::from_tag(&tag("<b>")), Ok(None));
        assert_eq!(Directive::from_tag(&tag("<color=#ff0000>")), Ok(None));
        assert_eq!(Directive::from_tag(&tag("<>")), Ok(None));
    }

    #[test]
    fn directive_name_table() {
        for name in ["show", "hide", "shake", "wait", "speed", "emotion"] {
            assert!(Directive::is_directive_name(name));
        }
        assert!(!Directive::is_directive_name("b"));
        assert!(!Directive::is_directive_name("color"));
        assert!(!Directive::is_directive_name(""));
    }
}
