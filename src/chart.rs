//! Definitions of the decoded chart model.
//!
//! Everything in this module is produced by [`crate::decode`] and immutable
//! afterwards: the decoder owns the only mutable handle while it runs and
//! hands the finished [`ChartDocument`] to the caller by value.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;

/// Number of channel slots in a chart. Channel indices `0..=128` are
/// addressable; which of them carry key sounds is up to the chart author.
pub const CHANNEL_COUNT: usize = 129;

/// Beats per measure assumed for tempo math. The format has no meter
/// directive in the subset decoded here, so 4/4 it is.
const BEATS_PER_MEASURE: f64 = 4.0;

/// A key-sound sample id. Its meaning is determined by the `#WAV` directive
/// that registered it.
///
/// The representation is 2 bytes, kept as they appeared in the source with
/// ASCII letters normalized to upper case. Well-formed charts only write
/// ASCII alphanumerics here; other bytes are admitted unchanged rather
/// than rejected, keeping the decoder's tolerant-parsing contract. The id
/// `"00"` is reserved as the rest marker ([`SampleId::REST`]) and never
/// appears in [`ChartDocument::sample_paths`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId([u8; 2]);

// Ids travel as 2-character strings, also when used as map keys.
#[cfg(feature = "serde")]
impl serde::Serialize for SampleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SampleId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{Error, Unexpected};
        let id = String::deserialize(deserializer)?;
        Self::try_from(id.as_str()).map_err(|rejected| {
            D::Error::invalid_value(Unexpected::Str(rejected), &"a 2-character sample id")
        })
    }
}

impl std::fmt::Debug for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SampleId")
            .field(&format!("{}{}", self.0[0] as char, self.0[1] as char))
            .finish()
    }
}

impl std::fmt::Display for SampleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl From<[u8; 2]> for SampleId {
    fn from(value: [u8; 2]) -> Self {
        Self([
            value[0].to_ascii_uppercase(),
            value[1].to_ascii_uppercase(),
        ])
    }
}

impl<'a> TryFrom<&'a str> for SampleId {
    type Error = &'a str;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        let bytes: [u8; 2] = value.as_bytes().try_into().map_err(|_| value)?;
        Ok(Self::from(bytes))
    }
}

impl SampleId {
    /// The reserved `"00"` id, denoting an empty slot in a channel message.
    pub const REST: Self = Self(*b"00");

    /// Whether this id is the reserved rest marker.
    #[must_use]
    pub const fn is_rest(self) -> bool {
        matches!(self.0, [b'0', b'0'])
    }
}

/// One scheduled sound trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    /// Fractional measure index: the integer part is the measure number,
    /// the fractional part the offset within it. Non-negative by
    /// construction.
    pub position: f64,
    /// The key sound to trigger.
    pub sample: SampleId,
}

impl NoteEvent {
    /// Seconds from chart start at which this event fires, given the
    /// seconds-per-measure of the playing tempo.
    #[must_use]
    pub fn play_offset(&self, seconds_per_measure: f64) -> f64 {
        self.position * seconds_per_measure
    }
}

/// Time-ordered container of [`NoteEvent`] for one channel.
///
/// Events appear in line-encounter order. Within a single channel message
/// positions increase, but two messages for the same measure interleave as
/// written; use [`ChannelTimeline::iter_by_position`] when chronological
/// order matters.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelTimeline(Vec<NoteEvent>);

impl ChannelTimeline {
    pub(crate) fn push(&mut self, event: NoteEvent) {
        self.0.push(event);
    }

    /// The events of this channel, in encounter order.
    #[must_use]
    pub fn events(&self) -> &[NoteEvent] {
        &self.0
    }

    /// Number of events in this channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this channel carries no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates events in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.0.iter()
    }

    /// Iterates events sorted by [`NoteEvent::position`]. The decoder never
    /// re-sorts, so this is the accessor for schedulers.
    pub fn iter_by_position(&self) -> impl Iterator<Item = &NoteEvent> {
        self.0
            .iter()
            .sorted_by(|a, b| a.position.total_cmp(&b.position))
    }
}

impl<'a> IntoIterator for &'a ChannelTimeline {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A decoded chart: scalar metadata, the sample registry and 129 channel
/// timelines.
///
/// All scalar fields keep their zero/empty default when the source carries
/// no (or no parseable) directive for them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChartDocument {
    /// Directory the sample filenames resolve against. Stored as given;
    /// the decoder performs no I/O with it.
    pub base_path: PathBuf,
    /// `#TITLE` text, empty if absent.
    pub title: String,
    /// `#ARTIST` text, empty if absent.
    pub artist: String,
    /// `#GENRE` text, empty if absent.
    pub genre: String,
    /// `#BPM` value, `0.0` if absent or unparseable.
    pub bpm: f64,
    /// `#PLAYER` mode value.
    pub player: i32,
    /// `#PLAYLEVEL` value.
    pub play_level: i32,
    /// `#RANK` judge level value.
    pub rank: i32,
    /// `#DIFFICULTY` value.
    pub difficulty: i32,
    /// `#TOTAL` gauge value.
    pub total: f64,
    /// Sample registry from `#WAV` directives; last registration of an id
    /// wins. Keys are upper-cased and never [`SampleId::REST`].
    pub sample_paths: HashMap<SampleId, PathBuf>,
    /// One timeline per channel index, always all [`CHANNEL_COUNT`] of
    /// them regardless of chart content.
    #[cfg_attr(
        feature = "serde",
        serde(serialize_with = "ser_channels", deserialize_with = "de_channels")
    )]
    pub channels: [ChannelTimeline; CHANNEL_COUNT],
}

impl Default for ChartDocument {
    fn default() -> Self {
        Self {
            base_path: PathBuf::new(),
            title: String::new(),
            artist: String::new(),
            genre: String::new(),
            bpm: 0.0,
            player: 0,
            play_level: 0,
            rank: 0,
            difficulty: 0,
            total: 0.0,
            sample_paths: HashMap::new(),
            channels: std::array::from_fn(|_| ChannelTimeline::default()),
        }
    }
}

impl ChartDocument {
    pub(crate) fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            ..Self::default()
        }
    }

    /// Play time of one measure in seconds, assuming the common 4/4 meter:
    /// `60 / bpm * 4`. `None` when the chart has no usable tempo.
    #[must_use]
    pub fn seconds_per_measure(&self) -> Option<f64> {
        (self.bpm.is_finite() && self.bpm > 0.0).then(|| 60.0 / self.bpm * BEATS_PER_MEASURE)
    }

    /// Full path of a registered sample, joined onto
    /// [`ChartDocument::base_path`]. `None` for unregistered ids.
    #[must_use]
    pub fn sample_path(&self, id: SampleId) -> Option<PathBuf> {
        self.sample_paths
            .get(&id)
            .map(|filename| self.base_path.join(filename))
    }

    /// Registered filename of a sample, relative to the base path.
    #[must_use]
    pub fn sample_filename(&self, id: SampleId) -> Option<&Path> {
        self.sample_paths.get(&id).map(PathBuf::as_path)
    }

    /// Total number of note events across all channels.
    #[must_use]
    pub fn note_count(&self) -> usize {
        self.channels.iter().map(ChannelTimeline::len).sum()
    }
}

// Serde implements the array traits only up to length 32; serialize as a
// sequence and deserialize through a Vec, checking the slot count by hand.
#[cfg(feature = "serde")]
fn ser_channels<S>(
    channels: &[ChannelTimeline; CHANNEL_COUNT],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(channels)
}

#[cfg(feature = "serde")]
fn de_channels<'de, D>(deserializer: D) -> Result<[ChannelTimeline; CHANNEL_COUNT], D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::{Deserialize, de::Error};
    let timelines = Vec::<ChannelTimeline>::deserialize(deserializer)?;
    let len = timelines.len();
    timelines
        .try_into()
        .map_err(|_| D::Error::invalid_length(len, &"exactly 129 channel timelines"))
}
