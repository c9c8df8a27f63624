//! Property-based tests for place loading.
//!
//! # Invariants tested
//!
//! - **Determinism:** loading the same corpus twice yields identical output.
//! - **Sort law:** places come back with non-increasing dates.
//! - **Stable ties:** places sharing a date keep file-name order.
//! - **Atomicity:** one malformed record yields an error and no places.

mod support;

use proptest::prelude::*;
use travelmap_content::parse_date;

use support::TempCorpus;

/// Dates spread across years, months and days, written without zero padding
/// half of the time so lexical order disagrees with calendar order.
fn date_strategy() -> impl Strategy<Value = String> {
    (2015_i32..2026, 1_u32..=12, 1_u32..=28, any::<bool>()).prop_map(
        |(year, month, day, padded)| {
            if padded {
                format!("{year}-{month:02}-{day:02}")
            } else {
                format!("{year}-{month}-{day}")
            }
        },
    )
}

fn corpus_with(dates: &[String]) -> TempCorpus {
    let corpus = TempCorpus::new();
    for (index, date) in dates.iter().enumerate() {
        corpus.add_place(&format!("place-{index:03}"), date, &[]);
    }
    corpus
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: repeated loads produce identical collections.
    #[test]
    fn loads_are_deterministic(dates in prop::collection::vec(date_strategy(), 0..12)) {
        let corpus = corpus_with(&dates);
        let first = corpus.corpus().load_places().expect("valid corpus");
        let second = corpus.corpus().load_places().expect("valid corpus");
        prop_assert_eq!(first, second);
    }

    /// Property: dates never increase along the result, and equal dates keep
    /// file-name order.
    #[test]
    fn places_are_sorted_newest_first(dates in prop::collection::vec(date_strategy(), 1..12)) {
        let corpus = corpus_with(&dates);
        let places = corpus.corpus().load_places().expect("valid corpus");
        prop_assert_eq!(places.len(), dates.len());
        for pair in places.windows(2) {
            let [newer, older] = pair else { continue };
            let newer_date = parse_date(&newer.place.date).expect("generated date parses");
            let older_date = parse_date(&older.place.date).expect("generated date parses");
            prop_assert!(newer_date >= older_date);
            if newer_date == older_date {
                prop_assert!(newer.place.id < older.place.id);
            }
        }
    }

    /// Property: a single malformed record poisons the whole batch.
    #[test]
    fn one_bad_record_loads_nothing(
        dates in prop::collection::vec(date_strategy(), 0..8),
        bad_title in any::<bool>(),
    ) {
        let corpus = corpus_with(&dates);
        let broken = if bad_title {
            "---\nid: broken\ndate: \"2020-01-01\"\ncoords: [0, 0]\n---\n"
        } else {
            "---\nid: broken\ntitle: Broken\ndate: \"2020-01-01\"\ncoords: [0]\n---\n"
        };
        corpus.write_place("zz-broken.mdx", broken);
        let err = corpus.corpus().load_places().expect_err("malformed corpus");
        prop_assert_eq!(err.file(), Some("zz-broken.mdx"));
    }
}
