// tests/fingerprint_properties_test.rs
//
// Properties of fingerprints and scores that the timeline scanner relies on:
// determinism, self-similarity, shift invariance, bounded output and
// persistence.

mod test_utils;

use setlistr::testgen::ChordSong;
use setlistr::{
    FingerprintBuilder, FingerprintConfig, MatchConfig, ReferenceLibrary, SetlistError,
    SimilarityScorer,
};
use test_utils::{remove_dir, scratch_dir, FRAME, SR};

fn builder() -> FingerprintBuilder {
    FingerprintBuilder::new(FingerprintConfig::default(), SR).unwrap()
}

#[test]
fn test_fingerprint_is_deterministic() {
    let samples = ChordSong::new("tune", 440.0, 6.0).render(SR, FRAME);
    let a = builder().build(&samples).unwrap();
    let b = builder().build(&samples).unwrap();
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

#[test]
fn test_self_similarity_is_perfect() {
    let samples = ChordSong::new("tune", 440.0, 6.0).render(SR, FRAME);
    let fp = builder().build(&samples).unwrap();
    let (similarity, offset) = SimilarityScorer::default().score(&fp, &fp);
    assert_eq!(similarity, 1.0);
    assert_eq!(offset, 0.0);
}

#[test]
fn test_excerpt_offset_matches_its_position() {
    let config = FingerprintConfig::default();
    let reference = ChordSong::new("tune", 440.0, 10.0).render(SR, FRAME);

    // Frame-aligned start so excerpt frames coincide with reference frames
    let start = 256 * config.hop_size;
    let excerpt = &reference[start..start + 5 * SR as usize];
    let expected = start as f64 / SR as f64;

    let b = builder();
    let ref_fp = b.build(&reference).unwrap();
    let query_fp = b.build(excerpt).unwrap();

    let (similarity, offset) = SimilarityScorer::new(MatchConfig::default()).score(&query_fp, &ref_fp);
    assert!(similarity > 0.5, "similarity {}", similarity);
    assert!((offset - expected).abs() <= 0.01, "offset {} vs {}", offset, expected);
}

#[test]
fn test_delayed_query_offset_off_the_frame_grid() {
    let config = FingerprintConfig::default();
    let reference = ChordSong::new("tune", 440.0, 8.0).render(SR, FRAME);

    // 13331 samples is not a multiple of the hop
    let delay = 13_331;
    let mut delayed = vec![0.0f32; delay];
    delayed.extend_from_slice(&reference[..6 * SR as usize]);
    let delta = delay as f64 / SR as f64;

    let b = builder();
    let ref_fp = b.build(&reference).unwrap();
    let query_fp = b.build(&delayed).unwrap();

    let (similarity, offset) = SimilarityScorer::default().score(&query_fp, &ref_fp);
    // Half a hop of frame-grid error plus half a 10 ms bucket
    let tolerance = config.hop_size as f64 / SR as f64 / 2.0 + 0.005;
    assert!(similarity > 0.1, "similarity {}", similarity);
    assert!(
        (offset + delta).abs() <= tolerance,
        "offset {} vs {}",
        offset,
        -delta
    );
}

#[test]
fn test_unrelated_songs_score_low() {
    let b = builder();
    let a = b.build(&ChordSong::new("low", 220.0, 6.0).render(SR, FRAME)).unwrap();
    let c = b.build(&ChordSong::new("high", 1760.0, 6.0).render(SR, FRAME)).unwrap();
    let (similarity, _) = SimilarityScorer::default().score(&a, &c);
    assert!(similarity < 0.1, "similarity {}", similarity);
}

#[test]
fn test_output_is_bounded() {
    let config = FingerprintConfig::default();
    let b = builder();
    let samples = ChordSong::new("tune", 880.0, 4.0).render(SR, FRAME);
    let fp = b.build(&samples).unwrap();

    let per_frame = config.max_peaks_per_frame * config.fan_out;
    assert!(fp.occurrences() <= b.frame_count(samples.len()) * per_frame);

    let duration = samples.len() as f64 / SR as f64;
    for (key, times) in fp.iter() {
        let (anchor, delta) = config.hash.decode(key);
        assert!(anchor as f32 >= config.min_frequency_hz.floor());
        assert!((anchor as u64) < config.hash.anchor_capacity());
        assert!(delta as f32 >= config.min_delta_hz && delta as f32 <= config.max_delta_hz);
        assert!(times.iter().all(|&t| (0.0..duration).contains(&t)));
    }

    let scorer = SimilarityScorer::default();
    let others = [
        b.build(&ChordSong::new("tune", 880.0, 9.0).render(SR, FRAME)).unwrap(),
        b.build(&ChordSong::new("near", 900.0, 3.0).render(SR, FRAME)).unwrap(),
        b.build(&samples[..SR as usize]).unwrap(),
    ];
    for other in &others {
        for (q, r) in [(&fp, other), (other, &fp)] {
            let (similarity, offset) = scorer.score(q, r);
            assert!((0.0..=1.0).contains(&similarity), "similarity {}", similarity);
            assert!(offset.is_finite());
        }
    }
}

#[test]
fn test_empty_and_silent_input() {
    let b = builder();
    assert!(matches!(b.build(&[]), Err(SetlistError::EmptyAudio)));

    let silent = b.build(&vec![0.0; SR as usize]).unwrap();
    assert!(silent.is_empty());

    let tune = b.build(&ChordSong::new("tune", 440.0, 2.0).render(SR, FRAME)).unwrap();
    assert_eq!(SimilarityScorer::default().score(&silent, &tune), (0.0, 0.0));
}

#[test]
fn test_library_save_and_load() {
    let dir = scratch_dir("setlistr-lib");
    let path = dir.join("library.json");

    let mut library = ReferenceLibrary::new(FingerprintConfig::default(), SR);
    for song in [ChordSong::new("one", 440.0, 3.0), ChordSong::new("two", 660.0, 3.0)] {
        library.add_recording(song.name.clone(), &song.render(SR, FRAME)).unwrap();
    }
    library.save(&path).unwrap();

    let loaded = ReferenceLibrary::load(&path).unwrap();
    assert_eq!(loaded, library);
    assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["one", "two"]);

    remove_dir(&dir);
}
