//! Fault-isolation behavior: a malformed line never takes the rest of the
//! chart down with it.

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use bms_chart::{DecodeOutput, DecodeWarning, SampleId, decode};

fn id(s: &str) -> SampleId {
    SampleId::try_from(s).unwrap()
}

#[test]
fn empty_input_yields_default_document() {
    let DecodeOutput { chart, warnings } = decode("base", std::iter::empty::<&str>());

    assert_eq!(warnings, vec![]);
    assert_eq!(chart.base_path, PathBuf::from("base"));
    assert_eq!(chart.title, "");
    assert_eq!(chart.artist, "");
    assert_eq!(chart.genre, "");
    assert_eq!(chart.bpm, 0.0);
    assert_eq!(chart.player, 0);
    assert_eq!(chart.play_level, 0);
    assert_eq!(chart.rank, 0);
    assert_eq!(chart.difficulty, 0);
    assert_eq!(chart.total, 0.0);
    assert!(chart.sample_paths.is_empty());
    assert_eq!(chart.channels.len(), bms_chart::CHANNEL_COUNT);
    assert!(chart.channels.iter().all(|channel| channel.is_empty()));
}

#[test]
fn non_directive_lines_change_nothing() {
    let noisy = decode(
        "base",
        [
            "",
            "   ",
            "; a comment",
            "random text",
            "*---------------------- HEADER FIELD",
            "#TITLE Kept",
        ],
    );
    let clean = decode("base", ["#TITLE Kept"]);

    assert_eq!(noisy.chart, clean.chart);
    assert_eq!(noisy.warnings, vec![]);
}

#[test]
fn unparseable_bpm_keeps_prior_value() {
    let DecodeOutput { chart, warnings } = decode("", ["#BPM abc"]);
    assert_eq!(chart.bpm, 0.0);
    assert_eq!(
        warnings,
        vec![DecodeWarning::MalformedNumber {
            field: "BPM".to_owned(),
            line: 1,
        }]
    );

    let DecodeOutput { chart, .. } = decode("", ["#BPM 150", "#BPM not-a-tempo"]);
    assert_eq!(chart.bpm, 150.0);
}

#[test]
fn every_numeric_field_tolerates_garbage() {
    let DecodeOutput { chart, warnings } = decode(
        "",
        [
            "#PLAYER x",
            "#PLAYLEVEL x",
            "#RANK x",
            "#TOTAL x",
            "#DIFFICULTY x",
        ],
    );
    assert_eq!(chart.player, 0);
    assert_eq!(chart.play_level, 0);
    assert_eq!(chart.rank, 0);
    assert_eq!(chart.total, 0.0);
    assert_eq!(chart.difficulty, 0);
    assert_eq!(warnings.len(), 5);
}

#[test]
fn duplicate_wav_registration_last_wins() {
    let DecodeOutput { chart, .. } = decode("", ["#WAV01 first.wav", "#WAV01 second.wav"]);
    assert_eq!(chart.sample_paths.len(), 1);
    assert_eq!(
        chart.sample_filename(id("01")),
        Some(PathBuf::from("second.wav").as_path())
    );
}

#[test]
fn wav_id_is_case_normalized() {
    let DecodeOutput { chart, .. } = decode("", ["#WAVa1 lower.wav"]);
    assert_eq!(
        chart.sample_filename(id("A1")),
        Some(PathBuf::from("lower.wav").as_path())
    );
}

#[test]
fn payload_ids_are_case_normalized() {
    let DecodeOutput { chart, .. } = decode("", ["#00101:0a"]);
    assert_eq!(chart.channels[1].events()[0].sample, id("0A"));
}

#[test]
fn malformed_message_header_skips_line_only() {
    let DecodeOutput { chart, warnings } = decode(
        "",
        ["#xx011:0101", "#001yy:0101", "#00111:0202"],
    );
    assert_eq!(chart.note_count(), 2);
    assert_eq!(
        warnings,
        vec![
            DecodeWarning::MalformedHeader { line: 1 },
            DecodeWarning::MalformedHeader { line: 2 },
        ]
    );
}

#[test]
fn odd_payload_drops_trailing_byte() {
    let DecodeOutput { chart, warnings } = decode("", ["#00211:01023"]);
    let events = chart.channels[11].events();
    // Two whole tokens survive; the dangling "3" produces nothing.
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].position, 2.0);
    assert_eq!(events[1].position, 2.5);
    assert_eq!(warnings, vec![DecodeWarning::OddPayload { line: 1 }]);
}

#[test]
fn multibyte_in_fixed_columns_skips_the_line() {
    // 'þ' straddles the measure and channel columns, so neither slice is
    // on a char boundary; the line must be dropped, not panic.
    let DecodeOutput { chart, warnings } = decode("", ["#00þ1:0101"]);
    assert_eq!(chart.note_count(), 0);
    assert_eq!(warnings, vec![DecodeWarning::MalformedHeader { line: 1 }]);
}

#[test]
fn events_stay_within_their_measure() {
    let DecodeOutput { chart, .. } = decode("", ["#00713:01020304050607Ф08"]);
    for event in &chart.channels[13] {
        assert!((7.0..8.0).contains(&event.position));
    }
}

#[test]
fn truncated_wav_is_reported_and_skipped() {
    let DecodeOutput { chart, warnings } = decode("", ["#WAV01", "#WAV02 kept.wav"]);
    assert_eq!(chart.sample_paths.len(), 1);
    assert_eq!(warnings, vec![DecodeWarning::TruncatedWav { line: 1 }]);
}

#[test]
fn two_token_payload_halves_the_measure() {
    let DecodeOutput { chart, warnings } = decode("", ["#00311:0102"]);
    let events = chart.channels[11].events();
    assert_eq!(warnings, vec![]);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].position, 3.0);
    assert_eq!(events[0].sample, id("01"));
    assert_eq!(events[1].position, 3.5);
    assert_eq!(events[1].sample, id("02"));
}

#[test]
fn decoding_is_idempotent() {
    let lines = [
        "#TITLE Same",
        "#BPM 144",
        "#WAV0Z z.ogg",
        "#00101:0Z000Z0Z",
        "garbage",
        "#BPM zzz",
    ];
    let first = decode("songs/same", lines);
    let second = decode("songs/same", lines);
    assert_eq!(first, second);
}
