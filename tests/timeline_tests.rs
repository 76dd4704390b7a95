use std::sync::Arc;
use std::time::Duration;

use verse_timeline::adapters::ManifestDurationAdapter;
use verse_timeline::app::{DurationPrefetcher, FixupInteractor};
use verse_timeline::domain::model::{PrecomputedSpan, TimelineEntry};
use verse_timeline::*;

fn verses(n: u32) -> Vec<VerseRef> {
    (1..=n).map(|v| VerseRef::new(2, v)).collect()
}

/// Arabic durations that vary per verse, including a zero
fn arabic(n: u32) -> Vec<Frames> {
    (0..n).map(|i| u64::from(i * 37 % 250)).collect()
}

fn map_for(verses: &[VerseRef], skip_every: usize) -> TranslationDurationMap {
    verses
        .iter()
        .enumerate()
        .filter(|(i, _)| skip_every == 0 || i % skip_every != 0)
        .map(|(i, v)| (*v, 100 + (i as u64 * 13) % 400))
        .collect()
}

#[test]
fn test_starts_are_contiguous_for_every_mode() {
    let accumulator = TimelineAccumulator::default();
    let verses = verses(40);
    let arabic = arabic(40);
    let map = map_for(&verses, 3);

    for mode in [AudioTrackMode::None, AudioTrackMode::Full, AudioTrackMode::TranslationOnly] {
        let timeline = accumulator.compute(&verses, &arabic, mode, &map).unwrap();
        assert_eq!(timeline.len(), verses.len());
        assert_eq!(timeline.placements[0].start, 0);

        for pair in timeline.placements.windows(2) {
            let end = accumulator.placement_end(&pair[0], mode).unwrap();
            assert_eq!(pair[1].start, end, "mode {}", mode);
        }

        let last = timeline.placements.last().unwrap();
        assert_eq!(
            timeline.total_duration,
            accumulator.placement_end(last, mode).unwrap() + 60
        );
    }
}

#[test]
fn test_fallback_applies_exactly_to_missing_verses() {
    let accumulator = TimelineAccumulator::default();
    let verses = verses(12);
    let map = map_for(&verses, 4);
    let timeline = accumulator
        .compute(&verses, &arabic(12), AudioTrackMode::Full, &map)
        .unwrap();

    for (verse, placement) in verses.iter().zip(&timeline.placements) {
        match map.get(verse) {
            Some(frames) => assert_eq!(placement.translation_duration, frames),
            None => assert_eq!(placement.translation_duration, 300),
        }
    }
}

#[test]
fn test_annotated_output_resolves_to_itself() {
    let accumulator = TimelineAccumulator::default();
    let verses = verses(10);
    let arabic = arabic(10);
    let map = map_for(&verses, 0);

    for mode in [AudioTrackMode::Full, AudioTrackMode::TranslationOnly] {
        let first = accumulator.compute(&verses, &arabic, mode, &map).unwrap();
        let entries: Vec<TimelineEntry> = verses
            .iter()
            .zip(&arabic)
            .zip(&first.placements)
            .map(|((verse, &arabic), placement)| {
                TimelineEntry::new(*verse, arabic).with_precomputed(PrecomputedSpan {
                    start: placement.start,
                    translation_start: placement.translation_start,
                    translation_duration: placement.translation_duration,
                })
            })
            .collect();

        let second = accumulator
            .resolve(&entries, mode, &TranslationDurationMap::new())
            .unwrap();
        assert_eq!(second, first);
    }
}

#[tokio::test]
async fn test_prefetched_manifest_feeds_accumulator() {
    let verses = verses(6);
    let manifest = map_for(&verses, 2);
    let port = Arc::new(ManifestDurationAdapter::new(manifest.clone()));
    let prefetcher = DurationPrefetcher::with_limits(port, 300, Duration::from_secs(1), 3);

    let report = prefetcher.prefetch(&verses).await;
    assert_eq!(report.fetched, manifest.len());
    assert_eq!(report.fallbacks.len(), verses.len() - manifest.len());

    let accumulator = TimelineAccumulator::default();
    let from_report = accumulator
        .compute(&verses, &arabic(6), AudioTrackMode::Full, &report.durations)
        .unwrap();
    let from_manifest = accumulator
        .compute(&verses, &arabic(6), AudioTrackMode::Full, &manifest)
        .unwrap();
    assert_eq!(from_report, from_manifest);
}

#[test]
fn test_fixup_agrees_with_accumulator() {
    let accumulator = TimelineAccumulator::default();
    let verses = verses(3);
    let arabic: Vec<Frames> = vec![90, 45, 120];
    let map = map_for(&verses, 0);
    let expected = accumulator
        .compute(&verses, &arabic, AudioTrackMode::TranslationOnly, &map)
        .unwrap();

    let mut props = serde_json::json!({
        "translationAudio": "translation-only",
        "verses": verses,
        "timestamps": arabic
            .iter()
            .map(|a| serde_json::json!({"start": 0, "durationInFrames": a}))
            .collect::<Vec<_>>(),
        "translationDurations": map,
    });

    let outcome = FixupInteractor::new(accumulator).fix_props(&mut props).unwrap();
    assert_eq!(outcome.duration_in_frames, expected.total_duration);
    for (stamp, placement) in props["timestamps"]
        .as_array()
        .unwrap()
        .iter()
        .zip(&expected.placements)
    {
        assert_eq!(stamp["start"], placement.start);
        assert_eq!(stamp["translationDuration"], placement.translation_duration);
    }
}
