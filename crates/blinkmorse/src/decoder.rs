//! The blink-to-Morse state machine.
//!
//! [`Decoder::step`] takes one sample of the eyes-closed signal and returns
//! the events it caused. All timing is expressed as [`Duration`] offsets from
//! an arbitrary origin chosen by the caller, so the decoder never reads a
//! clock and can be driven deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::morse::{DecodedText, Glyph, Symbol, SymbolSequence};

/// What the blink heuristic reports for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Eyes open (no blink in progress).
    Open,
    /// Eyes closed or face obscured.
    Closed,
    /// No observation yet. Never produces an edge.
    Unknown,
}

/// One periodic sample of the blink signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Offset of this sample from the clock origin.
    pub at: Duration,
    /// The signal level at `at`.
    pub presence: Presence,
}

impl Sample {
    /// Create a sample.
    #[must_use]
    pub const fn new(at: Duration, presence: Presence) -> Self {
        Self { at, presence }
    }
}

/// How blinks that are neither clearly short nor clearly long are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguousPolicy {
    /// Drop the blink without producing a symbol.
    #[default]
    Discard,
    /// Round to the closer symbol, splitting the band at its midpoint.
    Nearest,
}

/// When the in-progress sequence is committed as a letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Commit once the eyes have stayed open for the letter gap.
    #[default]
    Gap,
    /// Never commit on a pause; the sequence only grows until reset or flush.
    Never,
}

/// Thresholds and policies for the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Blinks strictly shorter than this are dots.
    pub dot_max: Duration,
    /// Blinks strictly longer than this are dashes.
    pub dash_min: Duration,
    /// A blink still in progress after this long is closed by force.
    pub max_blink: Duration,
    /// Open-eye pause after the last blink that ends a letter.
    pub letter_gap: Duration,
    /// Open-eye pause after the last blink that ends a word, if enabled.
    pub word_gap: Option<Duration>,
    /// Handling of the band between `dot_max` and `dash_min`.
    pub ambiguous: AmbiguousPolicy,
    /// Letter boundary policy.
    pub boundary: BoundaryPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            dot_max: Duration::from_millis(500),
            dash_min: Duration::from_millis(1000),
            max_blink: Duration::from_millis(1500),
            letter_gap: Duration::from_millis(2000),
            word_gap: Some(Duration::from_millis(4000)),
            ambiguous: AmbiguousPolicy::Discard,
            boundary: BoundaryPolicy::Gap,
        }
    }
}

impl DecoderConfig {
    /// Map a blink duration to a symbol.
    #[must_use]
    pub fn classify(&self, duration: Duration) -> Option<Symbol> {
        if duration < self.dot_max {
            Some(Symbol::Dot)
        } else if duration > self.dash_min {
            Some(Symbol::Dash)
        } else {
            match self.ambiguous {
                AmbiguousPolicy::Discard => None,
                AmbiguousPolicy::Nearest => {
                    let midpoint = (self.dot_max + self.dash_min) / 2;
                    if duration < midpoint {
                        Some(Symbol::Dot)
                    } else {
                        Some(Symbol::Dash)
                    }
                }
            }
        }
    }
}

/// A blink in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSession {
    /// When the eyes closed.
    pub started_at: Duration,
}

impl BlinkSession {
    /// Time since the blink started.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.started_at)
    }
}

/// Why a blink session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkEnd {
    /// The eyes opened.
    Opened,
    /// The safety timeout closed the session.
    TimedOut,
}

/// Something the decoder did in response to a sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    /// A blink session started.
    BlinkStarted {
        /// Start offset.
        at: Duration,
    },
    /// A blink session ended.
    BlinkEnded {
        /// How long the eyes were closed.
        duration: Duration,
        /// What closed the session.
        reason: BlinkEnd,
        /// The classified symbol, if any.
        symbol: Option<Symbol>,
    },
    /// A symbol was appended and the sequence re-resolved.
    SymbolAppended {
        /// The new symbol.
        symbol: Symbol,
        /// The whole sequence after the append.
        sequence: String,
        /// The letter the sequence now resolves to.
        letter: Option<char>,
    },
    /// The pending sequence was committed to the decoded text.
    LetterCommitted {
        /// The committed code.
        code: String,
        /// What was appended.
        glyph: Glyph,
    },
    /// A word break was appended to the decoded text.
    WordBreak,
    /// All decoded state was cleared.
    Reset,
}

/// Everything the decoder knows. Cloneable so observers can keep copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoderState {
    /// The active blink, if any. At most one exists at a time.
    pub session: Option<BlinkSession>,
    /// Symbols of the letter in progress.
    pub sequence: SymbolSequence,
    /// What `sequence` currently resolves to.
    pub letter: Option<char>,
    /// Committed output.
    pub text: DecodedText,
    /// Set after a forced close while the eyes are still shut.
    pub latched: bool,
    /// When the eyes last opened after a blink.
    pub last_blink_end: Option<Duration>,
}

impl DecoderState {
    /// Whether a blink is in progress.
    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.session.is_some()
    }
}

/// The published view of the decoder, as a display would show it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Symbols of the letter in progress, e.g. `".-"`.
    pub symbols: String,
    /// What the symbols resolve to, or empty if nothing matches.
    pub letter: String,
    /// Committed text.
    pub text: String,
    /// Whether a blink is in progress.
    pub blinking: bool,
}

impl Snapshot {
    /// Committed text followed by the letter in progress.
    #[must_use]
    pub fn transcription(&self) -> String {
        format!("{}{}", self.text, self.letter)
    }

    /// Render as a single line of JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&DecoderState> for Snapshot {
    fn from(state: &DecoderState) -> Self {
        Self {
            symbols: state.sequence.to_string(),
            letter: state.letter.map(String::from).unwrap_or_default(),
            text: state.text.to_string(),
            blinking: state.is_blinking(),
        }
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Detected Morse Code: {}", self.symbols)?;
        write!(f, "Transcribed Text: {}", self.transcription())
    }
}

/// Blink-to-Morse decoder.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
    state: DecoderState,
}

impl Decoder {
    /// Create a decoder with the given thresholds.
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::default(),
        }
    }

    /// The decoder's configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Feed one sample and return the events it produced.
    pub fn step(&mut self, sample: Sample) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        let now = sample.at;

        trace!(at_ms = now.as_millis(), presence = ?sample.presence, "sample");

        match (sample.presence, self.state.session) {
            (Presence::Open, Some(session)) => {
                self.end_blink(session.elapsed(now), BlinkEnd::Opened, &mut events);
                self.state.last_blink_end = Some(now);
            }
            (Presence::Open, None) => {
                if self.state.latched {
                    debug!("eyes reopened after forced close");
                    self.state.latched = false;
                    self.state.last_blink_end = Some(now);
                }
            }
            (Presence::Closed, None) if !self.state.latched => {
                debug!(at_ms = now.as_millis(), "blink started");
                self.state.session = Some(BlinkSession { started_at: now });
                events.push(DecoderEvent::BlinkStarted { at: now });
            }
            (Presence::Closed | Presence::Unknown, Some(session)) => {
                let elapsed = session.elapsed(now);
                if elapsed > self.config.max_blink {
                    self.end_blink(elapsed, BlinkEnd::TimedOut, &mut events);
                    self.state.latched = true;
                    self.state.last_blink_end = Some(now);
                }
            }
            (Presence::Closed | Presence::Unknown, None) => {}
        }

        if self.state.session.is_none() && !self.state.latched {
            self.check_boundaries(now, &mut events);
        }

        events
    }

    /// Commit any pending sequence regardless of timing.
    pub fn flush(&mut self) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        self.commit(&mut events);
        events
    }

    /// Clear all decoded state, abandoning any blink in progress.
    pub fn reset(&mut self) -> Vec<DecoderEvent> {
        debug!("decoder reset");
        self.state = DecoderState::default();
        vec![DecoderEvent::Reset]
    }

    fn end_blink(&mut self, duration: Duration, reason: BlinkEnd, events: &mut Vec<DecoderEvent>) {
        self.state.session = None;
        let symbol = self.config.classify(duration);

        debug!(
            duration_ms = duration.as_millis(),
            ?reason,
            ?symbol,
            "blink ended"
        );
        events.push(DecoderEvent::BlinkEnded {
            duration,
            reason,
            symbol,
        });

        if let Some(symbol) = symbol {
            self.state.sequence.push(symbol);
            self.state.letter = self.state.sequence.resolve();
            events.push(DecoderEvent::SymbolAppended {
                symbol,
                sequence: self.state.sequence.to_string(),
                letter: self.state.letter,
            });
        }
    }

    fn check_boundaries(&mut self, now: Duration, events: &mut Vec<DecoderEvent>) {
        let Some(last_end) = self.state.last_blink_end else {
            return;
        };
        let idle = now.saturating_sub(last_end);

        if self.config.boundary == BoundaryPolicy::Gap
            && !self.state.sequence.is_empty()
            && idle >= self.config.letter_gap
        {
            self.commit(events);
        }

        if let Some(word_gap) = self.config.word_gap {
            let ends_in_letter = matches!(
                self.state.text.last(),
                Some(Glyph::Letter(_) | Glyph::Unrecognized)
            );
            if self.state.sequence.is_empty() && ends_in_letter && idle >= word_gap {
                debug!("word break");
                self.state.text.push(Glyph::WordBreak);
                events.push(DecoderEvent::WordBreak);
            }
        }
    }

    fn commit(&mut self, events: &mut Vec<DecoderEvent>) {
        if self.state.sequence.is_empty() {
            return;
        }
        let code = self.state.sequence.to_string();
        let glyph = Glyph::from_resolved(self.state.sequence.resolve());

        debug!(%code, ?glyph, "letter committed");
        self.state.text.push(glyph);
        self.state.sequence.clear();
        self.state.letter = None;
        events.push(DecoderEvent::LetterCommitted { code, glyph });
    }
}

/// An input to [`decode_gestures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Eyes closed for the given duration.
    Blink(Duration),
    /// A pause long enough to end the letter.
    LetterBreak,
    /// A pause long enough to end the word.
    WordBreak,
}

/// Run a sequence of gestures through a fresh decoder without a clock.
///
/// Blinks are separated by `spacing` of open eyes, which should be shorter
/// than the letter gap. Any pending letter is flushed at the end.
#[must_use]
pub fn decode_gestures(config: DecoderConfig, gestures: &[Gesture], spacing: Duration) -> Decoder {
    let letter_gap = config.letter_gap;
    let word_gap = config.word_gap.unwrap_or(letter_gap).max(letter_gap);
    let mut decoder = Decoder::new(config);
    let mut now = Duration::ZERO;

    for gesture in gestures {
        match *gesture {
            Gesture::Blink(duration) => {
                let end = now.saturating_add(duration);
                decoder.step(Sample::new(now, Presence::Closed));
                decoder.step(Sample::new(end, Presence::Closed));
                decoder.step(Sample::new(end, Presence::Open));
                now = end.saturating_add(spacing);
            }
            Gesture::LetterBreak => {
                now = now.saturating_add(letter_gap);
                decoder.step(Sample::new(now, Presence::Open));
            }
            Gesture::WordBreak => {
                decoder.step(Sample::new(now.saturating_add(letter_gap), Presence::Open));
                now = now.saturating_add(word_gap);
                decoder.step(Sample::new(now, Presence::Open));
            }
        }
    }

    decoder.flush();
    decoder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn closed(at: u64) -> Sample {
        Sample::new(ms(at), Presence::Closed)
    }

    fn open(at: u64) -> Sample {
        Sample::new(ms(at), Presence::Open)
    }

    /// Blink from `start` for `len` ms, returning the events of the reopening.
    fn blink(decoder: &mut Decoder, start: u64, len: u64) -> Vec<DecoderEvent> {
        decoder.step(closed(start));
        decoder.step(open(start + len))
    }

    fn symbols_appended(events: &[DecoderEvent]) -> Vec<Symbol> {
        events
            .iter()
            .filter_map(|e| match e {
                DecoderEvent::SymbolAppended { symbol, .. } => Some(*symbol),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_classify_thresholds() {
        let config = DecoderConfig::default();
        assert_eq!(config.classify(ms(0)), Some(Symbol::Dot));
        assert_eq!(config.classify(ms(499)), Some(Symbol::Dot));
        assert_eq!(config.classify(ms(500)), None);
        assert_eq!(config.classify(ms(750)), None);
        assert_eq!(config.classify(ms(1000)), None);
        assert_eq!(config.classify(ms(1001)), Some(Symbol::Dash));
        assert_eq!(config.classify(ms(1400)), Some(Symbol::Dash));
    }

    #[test]
    fn test_classify_nearest_policy() {
        let config = DecoderConfig {
            ambiguous: AmbiguousPolicy::Nearest,
            ..DecoderConfig::default()
        };
        assert_eq!(config.classify(ms(500)), Some(Symbol::Dot));
        assert_eq!(config.classify(ms(749)), Some(Symbol::Dot));
        assert_eq!(config.classify(ms(750)), Some(Symbol::Dash));
        assert_eq!(config.classify(ms(1000)), Some(Symbol::Dash));
    }

    #[test]
    fn test_short_blink_appends_one_dot() {
        for len in [200, 400] {
            let mut decoder = Decoder::default();
            let events = blink(&mut decoder, 200, len);
            assert_eq!(symbols_appended(&events), vec![Symbol::Dot]);
            assert_eq!(decoder.state().sequence.to_string(), ".");
        }
    }

    #[test]
    fn test_long_blink_appends_one_dash() {
        for len in [1200, 1400] {
            let mut decoder = Decoder::default();
            let events = blink(&mut decoder, 200, len);
            assert_eq!(symbols_appended(&events), vec![Symbol::Dash]);
            assert_eq!(decoder.state().sequence.to_string(), "-");
        }
    }

    #[test]
    fn test_ambiguous_blink_appends_nothing() {
        for len in [600, 800, 1000] {
            let mut decoder = Decoder::default();
            let events = blink(&mut decoder, 200, len);
            assert!(symbols_appended(&events).is_empty());
            assert!(matches!(
                events.as_slice(),
                [DecoderEvent::BlinkEnded { symbol: None, .. }]
            ));
            assert!(decoder.state().sequence.is_empty());
        }
    }

    #[test]
    fn test_blink_start_event() {
        let mut decoder = Decoder::default();
        let events = decoder.step(closed(400));
        assert_eq!(events, vec![DecoderEvent::BlinkStarted { at: ms(400) }]);
        assert!(decoder.state().is_blinking());

        // Staying closed does not start a second session.
        assert!(decoder.step(closed(600)).is_empty());
        assert_eq!(
            decoder.state().session,
            Some(BlinkSession {
                started_at: ms(400)
            })
        );
    }

    #[test]
    fn test_letter_resolves_after_each_append() {
        let mut decoder = Decoder::default();
        let events = blink(&mut decoder, 0, 200);
        assert!(events.contains(&DecoderEvent::SymbolAppended {
            symbol: Symbol::Dot,
            sequence: ".".to_string(),
            letter: Some('E'),
        }));

        let events = blink(&mut decoder, 600, 1200);
        assert!(events.contains(&DecoderEvent::SymbolAppended {
            symbol: Symbol::Dash,
            sequence: ".-".to_string(),
            letter: Some('A'),
        }));
        assert_eq!(decoder.state().letter, Some('A'));
    }

    #[test]
    fn test_unmapped_sequence_resolves_to_none() {
        let config = DecoderConfig {
            boundary: BoundaryPolicy::Never,
            ..DecoderConfig::default()
        };
        let mut decoder = Decoder::new(config);
        let mut t = 0;
        for _ in 0..5 {
            blink(&mut decoder, t, 200);
            t += 400;
        }
        assert_eq!(decoder.state().sequence.to_string(), ".....");
        assert_eq!(decoder.state().letter, None);
    }

    #[test]
    fn test_safety_timeout_forces_dash() {
        let mut decoder = Decoder::default();
        decoder.step(closed(200));

        let mut t = 400;
        while t <= 1600 {
            assert!(decoder.step(closed(t)).is_empty(), "closed early at {t}");
            t += 200;
        }

        let events = decoder.step(closed(1800));
        assert_eq!(
            events[0],
            DecoderEvent::BlinkEnded {
                duration: ms(1600),
                reason: BlinkEnd::TimedOut,
                symbol: Some(Symbol::Dash),
            }
        );
        assert!(!decoder.state().is_blinking());
        assert!(decoder.state().latched);
    }

    #[test]
    fn test_timeout_latches_until_eyes_open() {
        let mut decoder = Decoder::default();
        decoder.step(closed(0));
        decoder.step(closed(1600));
        assert!(decoder.state().latched);

        // Still closed: no new session.
        assert!(decoder.step(closed(1800)).is_empty());
        assert!(!decoder.state().is_blinking());

        // Open then close again starts a fresh blink.
        assert!(decoder.step(open(2000)).is_empty());
        assert!(!decoder.state().latched);
        let events = decoder.step(closed(2200));
        assert_eq!(events, vec![DecoderEvent::BlinkStarted { at: ms(2200) }]);
    }

    #[test]
    fn test_timeout_applies_without_observations() {
        let mut decoder = Decoder::default();
        decoder.step(closed(0));
        let events = decoder.step(Sample::new(ms(1600), Presence::Unknown));
        assert!(matches!(
            events[0],
            DecoderEvent::BlinkEnded {
                reason: BlinkEnd::TimedOut,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_samples_never_start_blinks() {
        let mut decoder = Decoder::default();
        for t in (0..2000).step_by(200) {
            assert!(decoder
                .step(Sample::new(ms(t), Presence::Unknown))
                .is_empty());
        }
        assert_eq!(decoder.state(), &DecoderState::default());
    }

    #[test]
    fn test_letter_gap_commits_and_clears() {
        let mut decoder = Decoder::default();
        blink(&mut decoder, 0, 200);
        blink(&mut decoder, 400, 1200);

        // Last blink ended at 1600; gap is 2000.
        assert!(decoder.step(open(3400)).is_empty());
        let events = decoder.step(open(3600));
        assert_eq!(
            events,
            vec![DecoderEvent::LetterCommitted {
                code: ".-".to_string(),
                glyph: Glyph::Letter('A'),
            }]
        );
        assert!(decoder.state().sequence.is_empty());
        assert_eq!(decoder.state().letter, None);
        assert_eq!(decoder.state().text.to_string(), "A");
    }

    #[test]
    fn test_multi_letter_transcription() {
        let mut decoder = Decoder::new(DecoderConfig {
            word_gap: None,
            ..DecoderConfig::default()
        });
        // S: ...
        blink(&mut decoder, 0, 200);
        blink(&mut decoder, 400, 200);
        blink(&mut decoder, 800, 200);
        decoder.step(open(3000));
        // O: ---
        blink(&mut decoder, 3200, 1200);
        blink(&mut decoder, 4600, 1200);
        blink(&mut decoder, 6000, 1200);
        decoder.step(open(9200));
        // S: ...
        blink(&mut decoder, 9400, 200);
        blink(&mut decoder, 9800, 200);
        blink(&mut decoder, 10_200, 200);
        decoder.flush();

        assert_eq!(decoder.state().text.to_string(), "SOS");
    }

    #[test]
    fn test_unrecognized_commit_renders_empty() {
        let mut decoder = Decoder::default();
        let mut t = 0;
        for _ in 0..5 {
            blink(&mut decoder, t, 200);
            t += 400;
        }
        let events = decoder.flush();
        assert_eq!(
            events,
            vec![DecoderEvent::LetterCommitted {
                code: ".....".to_string(),
                glyph: Glyph::Unrecognized,
            }]
        );
        assert_eq!(decoder.state().text.to_string(), "");
        assert_eq!(decoder.state().text.glyphs(), &[Glyph::Unrecognized]);
    }

    #[test]
    fn test_never_policy_keeps_growing() {
        let mut decoder = Decoder::new(DecoderConfig {
            boundary: BoundaryPolicy::Never,
            ..DecoderConfig::default()
        });
        blink(&mut decoder, 0, 200);
        assert!(decoder.step(open(10_000)).is_empty());
        blink(&mut decoder, 10_200, 1200);

        assert_eq!(decoder.state().sequence.to_string(), ".-");
        assert_eq!(decoder.state().letter, Some('A'));
        assert!(decoder.state().text.is_empty());
    }

    #[test]
    fn test_word_gap_inserts_single_break() {
        let mut decoder = Decoder::default();
        blink(&mut decoder, 0, 200);
        decoder.step(open(2200));
        assert_eq!(decoder.state().text.to_string(), "E");

        assert!(decoder.step(open(4000)).is_empty());
        assert_eq!(decoder.step(open(4200)), vec![DecoderEvent::WordBreak]);
        assert!(decoder.step(open(8000)).is_empty());
        assert_eq!(decoder.state().text.to_string(), "E ");
    }

    #[test]
    fn test_word_gap_disabled() {
        let mut decoder = Decoder::new(DecoderConfig {
            word_gap: None,
            ..DecoderConfig::default()
        });
        blink(&mut decoder, 0, 200);
        decoder.step(open(20_000));
        assert_eq!(decoder.state().text.to_string(), "E");
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let mut decoder = Decoder::default();
        assert!(decoder.flush().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut decoder = Decoder::default();
        blink(&mut decoder, 0, 200);
        decoder.step(open(2400));
        blink(&mut decoder, 2600, 1200);
        decoder.step(closed(4000));
        assert!(decoder.state().is_blinking());

        assert_eq!(decoder.reset(), vec![DecoderEvent::Reset]);
        assert_eq!(decoder.state(), &DecoderState::default());
    }
    #[test]
    fn test_snapshot_from_state() {
        let mut decoder = Decoder::default();
        blink(&mut decoder, 0, 200);
        decoder.step(open(2200));
        blink(&mut decoder, 2400, 200);
        decoder.step(closed(2800));

        let snapshot = Snapshot::from(decoder.state());
        assert_eq!(
            snapshot,
            Snapshot {
                symbols: ".".to_string(),
                letter: "E".to_string(),
                text: "E".to_string(),
                blinking: true,
            }
        );
        assert_eq!(snapshot.transcription(), "EE");
        assert_eq!(
            snapshot.to_string(),
            "Detected Morse Code: .\nTranscribed Text: EE"
        );
    }

    #[test]
    fn test_snapshot_to_json() {
        let snapshot = Snapshot {
            symbols: ".-".to_string(),
            letter: "A".to_string(),
            text: "SO".to_string(),
            blinking: false,
        };
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"symbols":".-","letter":"A","text":"SO","blinking":false}"#
        );
    }

    #[test]
    fn test_snapshot_unresolved_letter_is_empty() {
        let mut decoder = Decoder::default();
        for t in [0, 400, 800, 1200, 1600] {
            blink(&mut decoder, t, 200);
        }
        let snapshot = Snapshot::from(decoder.state());
        assert_eq!(snapshot.symbols, ".....");
        assert_eq!(snapshot.letter, "");
    }

    #[test]
    fn test_decode_gestures() {
        let dot = Gesture::Blink(ms(200));
        let dash = Gesture::Blink(ms(1200));
        let gestures = [
            dot,
            dash,
            Gesture::LetterBreak,
            dash,
            dot,
            dot,
            dot,
            Gesture::WordBreak,
            dash,
        ];
        let decoder = decode_gestures(DecoderConfig::default(), &gestures, ms(200));
        assert_eq!(decoder.state().text.to_string(), "AB T");
        assert!(decoder.state().sequence.is_empty());
    }

    #[test]
    fn test_decode_gestures_timeout_blink() {
        let decoder = decode_gestures(
            DecoderConfig::default(),
            &[Gesture::Blink(ms(3000))],
            ms(200),
        );
        assert_eq!(decoder.state().text.to_string(), "T");
        assert!(!decoder.state().latched);
    }

    #[test]
    fn test_decode_gestures_ambiguous_blink_dropped() {
        let decoder = decode_gestures(
            DecoderConfig::default(),
            &[Gesture::Blink(ms(700)), Gesture::Blink(ms(200))],
            ms(200),
        );
        assert_eq!(decoder.state().text.to_string(), "E");
    }

    #[test]
    fn test_decode_gestures_huge_blinks_clamp() {
        let huge = Gesture::Blink(Duration::from_secs_f64(1e19));
        let decoder = decode_gestures(DecoderConfig::default(), &[huge, huge], ms(200));
        // The clock saturates: the first blink times out as a dash and the
        // second has no room left, so it reads as a dot.
        assert_eq!(decoder.state().text.to_string(), "N");
    }
}
