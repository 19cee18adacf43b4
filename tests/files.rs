//! Decodes a committed chart file end to end.

use pretty_assertions::assert_eq;

use bms_chart::{DecodeOutput, SampleId, decode};

#[test]
fn decodes_april_fixture() {
    let source = include_str!("fixtures/april.bms");
    let DecodeOutput { chart, warnings } = decode("fixtures", source.lines());

    assert_eq!(warnings, vec![]);

    assert_eq!(chart.title, "April Index");
    assert_eq!(chart.artist, "NightHiker");
    assert_eq!(chart.genre, "Happy Hardcore");
    assert_eq!(chart.bpm, 174.0);
    assert_eq!(chart.player, 1);
    assert_eq!(chart.play_level, 7);
    assert_eq!(chart.rank, 2);
    assert_eq!(chart.total, 300.0);
    assert_eq!(chart.difficulty, 4);

    assert_eq!(chart.sample_paths.len(), 6);
    let crash = SampleId::try_from("ZZ").unwrap();
    assert_eq!(
        chart.sample_path(crash),
        Some(std::path::PathBuf::from("fixtures/crash.ogg"))
    );

    assert_eq!(chart.note_count(), 23);
    assert_eq!(chart.channels[11].len(), 8);
    assert_eq!(chart.channels[12].len(), 4);
    assert_eq!(chart.channels[13].len(), 8);
    assert_eq!(chart.channels[14].len(), 2);
    assert_eq!(chart.channels[16].len(), 1);

    // A single-token payload lands exactly on the measure start.
    let crash_hit = chart.channels[16].events()[0];
    assert_eq!(crash_hit.position, 2.0);
    assert_eq!(crash_hit.sample, crash);

    // The half-measure bass pair of measure 1 on channel 14.
    let bass = chart.channels[14].events();
    assert_eq!(bass[0].position, 1.0);
    assert_eq!(bass[1].position, 1.5);

    // Channel 13 events arrive already position sorted here, so the
    // sorting accessor must agree with encounter order.
    let encounter: Vec<_> = chart.channels[13].iter().collect();
    let sorted: Vec<_> = chart.channels[13].iter_by_position().collect();
    assert_eq!(encounter, sorted);
}
