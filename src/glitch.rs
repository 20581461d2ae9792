//! Time-banded, probability-gated cosmetic glitches.
//!
//! Every tick looks at the elapsed session time:
//!
//! | elapsed            | roll    | effect  |
//! |--------------------|---------|---------|
//! | `< 120s`           | none    | dormant |
//! | `120s ..< 600s`    | `< 0.2` | stretch |
//! | `>= 600s`          | `< 0.1` | font    |
//!
//! The scheduler only decides and records. Arming the tick and the expiry
//! timers belongs to the owner of the timer queue.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, info};

use crate::message_log::{MessageId, MessageKind, MessageLog};
use crate::random::RandomSource;

pub const TICK_PERIOD: Duration = Duration::from_secs(30);
pub const DORMANT_UNTIL: Duration = Duration::from_secs(120);
pub const FONT_BAND_FROM: Duration = Duration::from_secs(600);
pub const STRETCH_PROBABILITY: f64 = 0.20;
pub const FONT_PROBABILITY: f64 = 0.10;
pub const STRETCH_DURATION: Duration = Duration::from_secs(6);
pub const FONT_DURATION: Duration = Duration::from_secs(4);
/// How long after a glitch the "what happened" easter egg stays armed.
pub const EASTER_EGG_WINDOW: Duration = Duration::from_secs(10);

pub const STRETCH_LINES: [&str; 4] = [
    "ой нет! опять! :-)",
    "оу, размер поплыл!",
    "чат расширяется, держись!",
    "ха, снова глюк размеров",
];

pub const FONT_LINES: [&str; 3] = [
    "буквы танцуют :-) ",
    "взгляни, шрифт меняется!",
    "ай-ай, текст ползёт",
];

pub const EASTER_EGG_LINE: &str =
    "Это чат поглощает пространство-время, ты становишься чатом, а чат — тобой.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchBand {
    Dormant,
    Stretch,
    Font,
}

impl GlitchBand {
    pub fn for_elapsed(elapsed: Duration) -> Self {
        if elapsed < DORMANT_UNTIL {
            Self::Dormant
        } else if elapsed < FONT_BAND_FROM {
            Self::Stretch
        } else {
            Self::Font
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchEffect {
    /// Whole-surface distortion; `message` is the appended phrase.
    Stretch { message: MessageId },
    /// `target` is the message that was last before the phrase was appended.
    Font { target: MessageId, message: MessageId },
}

#[derive(Debug, Clone)]
pub struct GlitchScheduler {
    start: Instant,
    last_glitch: Option<Instant>,
    stretch_active: bool,
    font_target: Option<MessageId>,
}

impl GlitchScheduler {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            last_glitch: None,
            stretch_active: false,
            font_target: None,
        }
    }

    pub fn start_time(&self) -> Instant {
        self.start
    }

    pub fn last_glitch(&self) -> Option<Instant> {
        self.last_glitch
    }

    pub fn stretch_active(&self) -> bool {
        self.stretch_active
    }

    pub fn font_target(&self) -> Option<MessageId> {
        self.font_target
    }

    /// Evaluates one tick. At most one draw decides whether anything fires;
    /// a second draw picks the phrase when it does.
    pub fn tick(
        &mut self,
        now: Instant,
        log: &mut MessageLog,
        random: &mut dyn RandomSource,
    ) -> Option<GlitchEffect> {
        let elapsed = now.saturating_duration_since(self.start);
        match GlitchBand::for_elapsed(elapsed) {
            GlitchBand::Dormant => None,
            GlitchBand::Stretch => {
                if random.next_unit() >= STRETCH_PROBABILITY {
                    return None;
                }
                Some(self.fire_stretch(now, log, random))
            }
            GlitchBand::Font => {
                if random.next_unit() >= FONT_PROBABILITY {
                    return None;
                }
                self.fire_font(now, log, random)
            }
        }
    }

    fn fire_stretch(
        &mut self,
        now: Instant,
        log: &mut MessageLog,
        random: &mut dyn RandomSource,
    ) -> GlitchEffect {
        self.stretch_active = true;
        self.last_glitch = Some(now);
        let line = STRETCH_LINES[random.pick_index(STRETCH_LINES.len())];
        let message = log.append(line, MessageKind::Assistant, None);
        info!(%message, "stretch glitch fired");
        GlitchEffect::Stretch { message }
    }

    fn fire_font(
        &mut self,
        now: Instant,
        log: &mut MessageLog,
        random: &mut dyn RandomSource,
    ) -> Option<GlitchEffect> {
        let Some(target) = log.last().map(|message| message.id) else {
            debug!("font glitch skipped: log is empty");
            return None;
        };

        self.font_target = Some(target);
        self.last_glitch = Some(now);
        let line = FONT_LINES[random.pick_index(FONT_LINES.len())];
        let message = log.append(line, MessageKind::Assistant, None);
        info!(%target, %message, "font glitch fired");
        Some(GlitchEffect::Font { target, message })
    }

    pub fn stretch_expired(&mut self) {
        self.stretch_active = false;
    }

    /// Clears the font flag only if `target` is still the flagged message.
    pub fn font_expired(&mut self, target: MessageId) {
        if self.font_target == Some(target) {
            self.font_target = None;
        }
    }

    /// True while the easter-egg window after the last glitch is open.
    pub fn recently_glitched(&self, now: Instant) -> bool {
        self.last_glitch
            .is_some_and(|at| now.saturating_duration_since(at) < EASTER_EGG_WINDOW)
    }
}

/// Case-insensitive "what is going on" phrases that arm the easter egg.
pub fn is_glitch_question(text: &str) -> bool {
    static TRIGGER: OnceLock<Option<Regex>> = OnceLock::new();
    TRIGGER
        .get_or_init(|| Regex::new(r"(?i)что происходит|что это|что случилось").ok())
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::random::ScriptedRandom;
    use std::sync::Arc;

    fn setup() -> (GlitchScheduler, MessageLog, ManualClock) {
        let clock = ManualClock::new();
        let log = MessageLog::new(Arc::new(clock.clone()));
        (GlitchScheduler::new(clock.now()), log, clock)
    }

    #[test]
    fn bands_follow_elapsed_time() {
        assert_eq!(GlitchBand::for_elapsed(Duration::from_secs(119)), GlitchBand::Dormant);
        assert_eq!(GlitchBand::for_elapsed(Duration::from_secs(120)), GlitchBand::Stretch);
        assert_eq!(GlitchBand::for_elapsed(Duration::from_secs(599)), GlitchBand::Stretch);
        assert_eq!(GlitchBand::for_elapsed(Duration::from_secs(600)), GlitchBand::Font);
    }

    #[test]
    fn dormant_ticks_never_draw() {
        let (mut glitch, mut log, clock) = setup();
        let mut random = ScriptedRandom::new([0.0]);
        clock.advance(Duration::from_secs(90));

        assert_eq!(glitch.tick(clock.now(), &mut log, &mut random), None);
        assert_eq!(random.remaining(), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn stretch_fires_below_threshold_and_picks_phrase() {
        let (mut glitch, mut log, clock) = setup();
        let mut random = ScriptedRandom::new([0.19, 0.5]);
        clock.advance(Duration::from_secs(150));

        let effect = glitch.tick(clock.now(), &mut log, &mut random);
        assert!(matches!(effect, Some(GlitchEffect::Stretch { .. })));
        assert!(glitch.stretch_active());
        assert_eq!(glitch.last_glitch(), Some(clock.now()));
        assert_eq!(log.messages()[0].text, STRETCH_LINES[2]);

        glitch.stretch_expired();
        assert!(!glitch.stretch_active());
    }

    #[test]
    fn stretch_roll_at_threshold_does_nothing() {
        let (mut glitch, mut log, clock) = setup();
        let mut random = ScriptedRandom::new([0.20]);
        clock.advance(Duration::from_secs(300));

        assert_eq!(glitch.tick(clock.now(), &mut log, &mut random), None);
        assert!(glitch.last_glitch().is_none());
    }

    #[test]
    fn font_flags_previous_last_message() {
        let (mut glitch, mut log, clock) = setup();
        let previous = log.append("hello", MessageKind::User, None);
        let mut random = ScriptedRandom::new([0.05, 0.0]);
        clock.advance(Duration::from_secs(600));

        let effect = glitch.tick(clock.now(), &mut log, &mut random);
        let Some(GlitchEffect::Font { target, message }) = effect else {
            panic!("expected font effect, got {effect:?}");
        };
        assert_eq!(target, previous);
        assert_eq!(glitch.font_target(), Some(previous));
        assert_eq!(log.get(message).map(|m| m.text.as_str()), Some(FONT_LINES[0]));

        glitch.font_expired(message);
        assert_eq!(glitch.font_target(), Some(previous));
        glitch.font_expired(previous);
        assert_eq!(glitch.font_target(), None);
    }

    #[test]
    fn font_with_empty_log_appends_nothing() {
        let (mut glitch, mut log, clock) = setup();
        let mut random = ScriptedRandom::constant(0.0);
        clock.advance(Duration::from_secs(900));

        assert_eq!(glitch.tick(clock.now(), &mut log, &mut random), None);
        assert!(log.is_empty());
        assert!(glitch.last_glitch().is_none());
    }

    #[test]
    fn easter_egg_window_is_ten_seconds() {
        let (mut glitch, mut log, clock) = setup();
        assert!(!glitch.recently_glitched(clock.now()));

        let mut random = ScriptedRandom::constant(0.0);
        clock.advance(Duration::from_secs(130));
        glitch.tick(clock.now(), &mut log, &mut random);

        clock.advance(Duration::from_millis(9_999));
        assert!(glitch.recently_glitched(clock.now()));
        clock.advance(Duration::from_millis(1));
        assert!(!glitch.recently_glitched(clock.now()));
    }

    #[test]
    fn glitch_questions_match_case_insensitively() {
        assert!(is_glitch_question("что происходит"));
        assert!(is_glitch_question("Эй, ЧТО ЭТО было?"));
        assert!(is_glitch_question("что случилось с чатом"));
        assert!(!is_glitch_question("привет"));
    }
}
