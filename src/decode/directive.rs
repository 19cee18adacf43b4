//! Per-line classification of chart source.
//!
//! A chart line is classified in a fixed priority order: scalar string
//! directives, scalar numeric directives, `#WAV` registrations, then
//! fixed-column channel messages. Lines matching none of these (including
//! anything not starting with `#`) are not chart content and classify to
//! `None`.

use std::str::FromStr;

use super::DecodeWarning;
use crate::chart::SampleId;

/// One recognized line of chart source, borrowing its text arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive<'a> {
    /// `#TITLE` text.
    Title(&'a str),
    /// `#ARTIST` text.
    Artist(&'a str),
    /// `#GENRE` text.
    Genre(&'a str),
    /// `#BPM` tempo value.
    Bpm(f64),
    /// `#PLAYER` mode value.
    Player(i32),
    /// `#PLAYLEVEL` value.
    PlayLevel(i32),
    /// `#RANK` judge level value.
    Rank(i32),
    /// `#DIFFICULTY` value.
    Difficulty(i32),
    /// `#TOTAL` gauge value.
    Total(f64),
    /// `#WAVxx` sample registration: id and relative filename.
    Wav(SampleId, &'a str),
    /// `#MMMCC:...` channel message.
    Message {
        /// Measure number from the 3-digit column.
        measure: u32,
        /// Channel index from the 2-digit column. Two decimal digits, so
        /// at most 99; bounds against the slot table are still checked at
        /// apply time.
        channel: u8,
        /// Even-length run of 2-character sample ids, trimmed.
        payload: &'a str,
    },
}

impl<'a> Directive<'a> {
    /// Classifies one trimmed source line.
    ///
    /// `Ok(None)` means the line is not chart content and carries no
    /// information at all. `line_no` is 1-based and only used to position
    /// warnings.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeWarning`] describing why a line that looked
    /// like chart content had to be skipped. The caller records it and
    /// moves on; nothing here is fatal.
    pub fn classify(line: &'a str, line_no: usize) -> Result<Option<Self>, DecodeWarning> {
        let line = line.trim();
        if !line.starts_with('#') {
            return Ok(None);
        }

        if let Some(text) = line.strip_prefix("#TITLE ") {
            return Ok(Some(Self::Title(text.trim())));
        }
        if let Some(text) = line.strip_prefix("#ARTIST ") {
            return Ok(Some(Self::Artist(text.trim())));
        }
        if let Some(text) = line.strip_prefix("#GENRE ") {
            return Ok(Some(Self::Genre(text.trim())));
        }

        if let Some(arg) = line.strip_prefix("#BPM ") {
            return parse_scalar(arg, "BPM", line_no).map(Self::Bpm).map(Some);
        }
        if let Some(arg) = line.strip_prefix("#PLAYER ") {
            return parse_scalar(arg, "PLAYER", line_no)
                .map(Self::Player)
                .map(Some);
        }
        if let Some(arg) = line.strip_prefix("#PLAYLEVEL ") {
            return parse_scalar(arg, "PLAYLEVEL", line_no)
                .map(Self::PlayLevel)
                .map(Some);
        }
        if let Some(arg) = line.strip_prefix("#RANK ") {
            return parse_scalar(arg, "RANK", line_no).map(Self::Rank).map(Some);
        }
        if let Some(arg) = line.strip_prefix("#TOTAL ") {
            return parse_scalar(arg, "TOTAL", line_no)
                .map(Self::Total)
                .map(Some);
        }
        if let Some(arg) = line.strip_prefix("#DIFFICULTY ") {
            return parse_scalar(arg, "DIFFICULTY", line_no)
                .map(Self::Difficulty)
                .map(Some);
        }

        if line.starts_with("#WAV") {
            return Self::classify_wav(line, line_no).map(Some);
        }

        if line.as_bytes().get(6) == Some(&b':') {
            return Self::classify_message(line, line_no).map(Some);
        }

        Ok(None)
    }

    /// `#WAVxx <filename>`: id at byte columns 4-5, filename from column 7.
    fn classify_wav(line: &'a str, line_no: usize) -> Result<Self, DecodeWarning> {
        let id = line
            .get(4..6)
            .and_then(|id| SampleId::try_from(id).ok());
        let filename = line.get(7..);
        match (id, filename) {
            (Some(id), Some(filename)) => Ok(Self::Wav(id, filename.trim())),
            _ => Err(DecodeWarning::TruncatedWav { line: line_no }),
        }
    }

    /// `#MMMCC:<payload>`: measure at byte columns 1-3, channel at 4-5.
    fn classify_message(line: &'a str, line_no: usize) -> Result<Self, DecodeWarning> {
        let measure = line.get(1..4).and_then(|m| m.parse::<u32>().ok());
        let channel = line.get(4..6).and_then(|c| c.parse::<u8>().ok());
        let (Some(measure), Some(channel)) = (measure, channel) else {
            return Err(DecodeWarning::MalformedHeader { line: line_no });
        };
        // Byte 6 is the ASCII colon, so column 7 is always a char boundary.
        let payload = line.get(7..).unwrap_or("").trim();
        Ok(Self::Message {
            measure,
            channel,
            payload,
        })
    }
}

/// Parse-or-warn helper for scalar numeric directives. The applier keeps
/// the previous field value when this warns.
fn parse_scalar<T: FromStr>(
    arg: &str,
    field: &str,
    line_no: usize,
) -> Result<T, DecodeWarning> {
    arg.trim().parse().map_err(|_| DecodeWarning::MalformedNumber {
        field: field.to_owned(),
        line: line_no,
    })
}
