//! Streaming decoder turning chart source lines into a [`ChartDocument`].
//!
//! Raw lines == [`decode`] ==> [`ChartDocument`] (in [`DecodeOutput`])
//!
//! Decoding never aborts: every directive the classifier rejects becomes a
//! [`DecodeWarning`] and the rest of the chart still decodes. The one-shot
//! [`decode`] covers most callers; [`Decoder`] exposes the same pass as a
//! resumable object for hosts that interleave decoding with frame work.

pub mod directive;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use thiserror::Error;

use self::directive::Directive;
use crate::chart::{ChartDocument, NoteEvent, SampleId};

/// A condition tolerated while decoding.
///
/// None of these stop the decode or poison the document; the affected line
/// (or trailing byte) is dropped and everything else proceeds.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeWarning {
    /// A scalar directive argument failed to parse as a number. The field
    /// keeps its previous (or default) value.
    #[error("number expected for `#{field}` at line {line}")]
    MalformedNumber {
        /// Keyword of the directive, without `#`.
        field: String,
        /// 1-based source line number.
        line: usize,
    },
    /// The measure or channel column of a channel message is not numeric.
    /// The line is skipped.
    #[error("malformed measure/channel header at line {line}")]
    MalformedHeader {
        /// 1-based source line number.
        line: usize,
    },
    /// A channel message addressed a slot outside `0..=128`. The line is
    /// skipped.
    #[error("channel {channel} out of range at line {line}")]
    ChannelOutOfRange {
        /// The out-of-range channel index.
        channel: u8,
        /// 1-based source line number.
        line: usize,
    },
    /// A channel message payload had odd length; its trailing byte
    /// produced no event.
    #[error("odd-length payload at line {line}, trailing byte dropped")]
    OddPayload {
        /// 1-based source line number.
        line: usize,
    },
    /// A `#WAV` directive too short to hold an id and filename, or with an
    /// id not on a character boundary. The line is skipped.
    #[error("truncated `#WAV` directive at line {line}")]
    TruncatedWav {
        /// 1-based source line number.
        line: usize,
    },
}

/// Decoding result: the document plus the warnings accumulated while
/// building it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecodeOutput {
    /// The decoded chart.
    pub chart: ChartDocument,
    /// Warnings in source order. Empty for a well-formed chart.
    pub warnings: Vec<DecodeWarning>,
}

/// Default checkpoint cadence: one cooperative yield every 50 lines.
pub const DEFAULT_CHECKPOINT_INTERVAL: NonZeroUsize = NonZeroUsize::new(50).unwrap();

/// Resumable decoding state with exactly one writer: this value.
///
/// Feed lines in batches of any size; the split points are invisible in
/// the output. Dropping a `Decoder` without calling [`Decoder::finish`]
/// discards the partial document.
///
/// ```
/// use bms_chart::Decoder;
///
/// let mut decoder = Decoder::new("songs/foo");
/// decoder.feed(["#TITLE A", "#WAV01 a.wav"]);
/// // ... yield to the host between batches ...
/// decoder.feed(["#00011:0101"]);
/// let output = decoder.finish();
/// assert_eq!(output.chart.channels[11].len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    chart: ChartDocument,
    warnings: Vec<DecodeWarning>,
    lines_seen: usize,
}

impl Decoder {
    /// Creates a decoder producing a document rooted at `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            chart: ChartDocument::new(base_path.into()),
            warnings: Vec::new(),
            lines_seen: 0,
        }
    }

    /// Consumes one source line.
    pub fn feed_line(&mut self, line: &str) {
        self.lines_seen += 1;
        match Directive::classify(line, self.lines_seen) {
            Ok(Some(directive)) => self.apply(directive, self.lines_seen),
            Ok(None) => {}
            Err(warning) => self.warnings.push(warning),
        }
    }

    /// Consumes a batch of source lines.
    pub fn feed<S: AsRef<str>>(&mut self, lines: impl IntoIterator<Item = S>) {
        for line in lines {
            self.feed_line(line.as_ref());
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Finalizes into the immutable document and the collected warnings.
    #[must_use]
    pub fn finish(self) -> DecodeOutput {
        DecodeOutput {
            chart: self.chart,
            warnings: self.warnings,
        }
    }

    fn apply(&mut self, directive: Directive<'_>, line_no: usize) {
        match directive {
            Directive::Title(text) => self.chart.title = text.to_owned(),
            Directive::Artist(text) => self.chart.artist = text.to_owned(),
            Directive::Genre(text) => self.chart.genre = text.to_owned(),
            Directive::Bpm(bpm) => self.chart.bpm = bpm,
            Directive::Player(player) => self.chart.player = player,
            Directive::PlayLevel(level) => self.chart.play_level = level,
            Directive::Rank(rank) => self.chart.rank = rank,
            Directive::Difficulty(difficulty) => self.chart.difficulty = difficulty,
            Directive::Total(total) => self.chart.total = total,
            Directive::Wav(id, filename) => {
                // The rest marker can never be referenced by a payload, so
                // a `#WAV00` registration would only dangle.
                if !id.is_rest() {
                    self.chart.sample_paths.insert(id, PathBuf::from(filename));
                }
            }
            Directive::Message {
                measure,
                channel,
                payload,
            } => self.apply_message(measure, channel, payload, line_no),
        }
    }

    fn apply_message(&mut self, measure: u32, channel: u8, payload: &str, line_no: usize) {
        let Some(timeline) = self.chart.channels.get_mut(usize::from(channel)) else {
            self.warnings
                .push(DecodeWarning::ChannelOutOfRange { channel, line: line_no });
            return;
        };
        if payload.len() % 2 != 0 {
            self.warnings.push(DecodeWarning::OddPayload { line: line_no });
        }
        let slots = payload.len() / 2;
        for (i, pair) in payload.as_bytes().chunks_exact(2).enumerate() {
            let &[hi, lo] = pair else { continue };
            let sample = SampleId::from([hi, lo]);
            if sample.is_rest() {
                continue;
            }
            timeline.push(NoteEvent {
                position: f64::from(measure) + i as f64 / slots as f64,
                sample,
            });
        }
    }
}

/// Decodes a whole chart in one call.
///
/// `lines` must already be split on line boundaries; CR/LF normalization is
/// the caller's concern (a trailing `\r` is trimmed away with the rest of
/// the surrounding whitespace). Identical input always yields a
/// structurally identical output.
pub fn decode<S: AsRef<str>>(
    base_path: impl Into<PathBuf>,
    lines: impl IntoIterator<Item = S>,
) -> DecodeOutput {
    let mut decoder = Decoder::new(base_path);
    decoder.feed(lines);
    decoder.finish()
}

/// Decodes a whole chart, invoking `on_checkpoint` with the number of lines
/// consumed after every `every` lines.
///
/// This is the cooperative-yield hook for frame-budgeted hosts: park the
/// work, pump a frame, continue. The output is identical to [`decode`] on
/// the same input.
pub fn decode_with_checkpoints<S: AsRef<str>>(
    base_path: impl Into<PathBuf>,
    lines: impl IntoIterator<Item = S>,
    every: NonZeroUsize,
    mut on_checkpoint: impl FnMut(usize),
) -> DecodeOutput {
    let mut decoder = Decoder::new(base_path);
    for line in lines {
        decoder.feed_line(line.as_ref());
        if decoder.lines_seen() % every.get() == 0 {
            on_checkpoint(decoder.lines_seen());
        }
    }
    decoder.finish()
}
