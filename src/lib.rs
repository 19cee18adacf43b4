//! Decoder of BMS(.bms/.bme) chart files, reduced to the surface a keysound
//! player actually needs: scalar metadata, `#WAV` sample registrations and
//! per-channel note timelines.
//!
//! Raw lines == [`decode`] ==> [`ChartDocument`] (in [`DecodeOutput`])
//!
//! The decoder is a single pass over pre-split text lines. It never fails:
//! malformed input degrades to skipped lines or kept defaults, and every
//! oddity it tolerates is reported as a [`DecodeWarning`] beside the
//! document. Hosts that must not stall a frame can drive a [`Decoder`]
//! incrementally and yield between batches.
//!
//! In detail, our policies are:
//!
//! - Support only UTF-8 (as required `&str` to input).
//! - Do not perform any I/O; the caller supplies lines and a base path.
//! - Do not abort on malformed lines; isolate the fault to the line.
//! - Do not re-sort note events; encounter order is preserved as written.
//!
//! ```
//! use bms_chart::{decode, DecodeOutput};
//!
//! let lines = ["#TITLE Spring Rain", "#BPM 174", "#WAV01 kick.wav", "#00311:0100"];
//! let DecodeOutput { chart, warnings } = decode("songs/spring_rain", lines);
//! assert_eq!(chart.title, "Spring Rain");
//! assert_eq!(chart.channels[11].len(), 1);
//! assert!(warnings.is_empty());
//! ```

pub mod chart;
pub mod decode;

pub use chart::{CHANNEL_COUNT, ChannelTimeline, ChartDocument, NoteEvent, SampleId};
pub use decode::{
    DEFAULT_CHECKPOINT_INTERVAL, DecodeOutput, DecodeWarning, Decoder, decode,
    decode_with_checkpoints, directive::Directive,
};
