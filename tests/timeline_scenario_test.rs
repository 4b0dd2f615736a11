// tests/timeline_scenario_test.rs
//
// End-to-end timeline scenarios on synthetic recordings with known layouts.
//
// Usage:
//   cargo test --test timeline_scenario_test -- --nocapture

mod test_utils;

use setlistr::testgen::{build_mix, demo_layout, demo_songs, ChordSong, Segment};
use setlistr::{DedupPolicy, SettingsBuilder, TimelineAnalyzer, TimelineScanner};
use test_utils::{library_from, short_scan_settings, FRAME, SR};

#[test]
fn test_demo_mix_timeline() {
    let settings = short_scan_settings();
    let songs = demo_songs();
    let library = library_from(&songs, &settings);

    let (mix, placements) = build_mix(&songs, &demo_layout(), SR, FRAME);
    assert_eq!(mix.len(), 40 * SR as usize);

    let scanner = TimelineScanner::new(&library, &settings).unwrap();
    let events = scanner.scan_events(&mix).unwrap();
    let timeline = TimelineAnalyzer::new(DedupPolicy::FirstDetection).analyze(events);

    for event in &timeline {
        println!(
            "{:>6.2}s  {}  ({:.3})",
            event.estimated_start_time, event.song_name, event.similarity
        );
    }

    assert_eq!(timeline.song_names(), vec!["B", "A", "C"]);
    for (event, placement) in timeline.iter().zip(&placements) {
        assert_eq!(event.song_name, placement.name);
        assert!(
            (event.estimated_start_time - placement.start_sec).abs() <= 1.0,
            "{} estimated at {:.2}s, placed at {:.2}s",
            event.song_name,
            event.estimated_start_time,
            placement.start_sec
        );
    }

    let missing = TimelineAnalyzer::not_detected(library.names(), &timeline);
    assert!(missing.is_empty(), "missing: {:?}", missing);
}

#[test]
fn test_unplayed_song_is_reported_missing() {
    let settings = short_scan_settings();
    let mut songs = demo_songs();
    songs.push(ChordSong::new("D", 330.0, 9.0));
    let library = library_from(&songs, &settings);

    let (mix, _) = build_mix(&songs, &demo_layout(), SR, FRAME);
    let scanner = TimelineScanner::new(&library, &settings).unwrap();
    let timeline = TimelineAnalyzer::default().analyze(scanner.scan(&mix).unwrap());

    assert!(!timeline.contains("D"));
    let missing = TimelineAnalyzer::not_detected(library.names(), &timeline);
    assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["D".to_string()]);
}

#[test]
fn test_silence_only_recording() {
    let settings = short_scan_settings();
    let library = library_from(&demo_songs(), &settings);

    let (mix, placements) = build_mix(&[], &[Segment::Silence(20.0)], SR, FRAME);
    assert!(placements.is_empty());

    let scanner = TimelineScanner::new(&library, &settings).unwrap();
    let events = scanner.scan_events(&mix).unwrap();
    assert!(events.is_empty());

    let timeline = TimelineAnalyzer::default().analyze(events);
    let missing = TimelineAnalyzer::not_detected(library.names(), &timeline);
    assert_eq!(missing.len(), 3);
}

#[test]
fn test_skip_ahead_reduces_work_not_results() {
    let song = ChordSong::new("D", 330.0, 30.0);
    let layout = [Segment::Silence(3.0), Segment::Song(0), Segment::Silence(2.0)];
    let (mix, _) = build_mix(std::slice::from_ref(&song), &layout, SR, FRAME);

    let base = SettingsBuilder::new()
        .chunk_size_sec(5.0)
        .hop_size_sec(2.0)
        .similarity_threshold(0.1)
        .best_similarity_threshold(0.1);
    let skipping = base.skip_duration_sec(10.0).build().unwrap();
    let exhaustive = base.no_skip().build().unwrap();

    let library = library_from(std::slice::from_ref(&song), &skipping);

    let fast_scanner = TimelineScanner::new(&library, &skipping).unwrap();
    let mut fast_scan = fast_scanner.scan(&mix).unwrap();
    let fast_events: Vec<_> = fast_scan.by_ref().collect();
    let fast_stats = fast_scan.stats();

    let slow_scanner = TimelineScanner::new(&library, &exhaustive).unwrap();
    let slow_events = slow_scanner.scan_events(&mix).unwrap();

    println!(
        "raw events: {} with skip ({} windows skipped), {} without",
        fast_events.len(),
        fast_stats.skipped,
        slow_events.len()
    );
    assert!(fast_stats.skipped > 0);
    assert!(fast_events.len() < slow_events.len());

    let analyzer = TimelineAnalyzer::new(DedupPolicy::FirstDetection);
    let fast = analyzer.analyze(fast_events);
    let slow = analyzer.analyze(slow_events);
    assert_eq!(fast, slow);
    assert_eq!(fast.song_names(), vec!["D"]);
}

#[test]
fn test_highest_similarity_policy_keeps_one_event_per_song() {
    let settings = short_scan_settings();
    let songs = demo_songs();
    let library = library_from(&songs, &settings);
    let (mix, placements) = build_mix(&songs, &demo_layout(), SR, FRAME);

    let scanner = TimelineScanner::new(&library, &settings).unwrap();
    let events = scanner.scan_events(&mix).unwrap();
    let timeline = TimelineAnalyzer::new(DedupPolicy::HighestSimilarity).analyze(events.clone());

    assert_eq!(timeline.len(), 3);
    for placement in &placements {
        let best = events
            .iter()
            .filter(|e| e.song_name == placement.name)
            .map(|e| e.similarity)
            .fold(f64::MIN, f64::max);
        let kept = timeline
            .iter()
            .find(|e| e.song_name == placement.name)
            .unwrap();
        assert_eq!(kept.similarity, best);
    }
    let starts: Vec<f64> = timeline.iter().map(|e| e.estimated_start_time).collect();
    assert!(starts.windows(2).all(|w| w[0] <= w[1]));
}
