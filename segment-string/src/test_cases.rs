use crate::{Search, Segmenter};

/// Run a segmenter against the built-in test cases
///
/// The cases hold for the sample table in `data/` under both cost policies.
pub fn run(segmenter: &Segmenter) {
    let mut search = Search::default();
    {
        let result = segmenter.segment("", &mut search);
        assert_eq!(result.len(), 0);
        assert_eq!(result.cost(), 0.0);
    }

    let mut success = true;
    for test in TEST_CASES.iter().copied() {
        success &= assert_segments(test, &mut search, segmenter);
    }

    assert!(success);
}

pub fn assert_segments(s: &[&str], search: &mut Search, segmenter: &Segmenter) -> bool {
    let result = segmenter.segment(&s.join(""), search);
    let cmp = result.words().collect::<Vec<_>>();
    let success = cmp == s;
    if !success {
        println!("expected: {:?}", s);
        println!("actual:   {:?}\n", cmp);
    }
    success
}

/// Correctly segmented test cases
pub const TEST_CASES: &[&[&str]] = &[
    &["the", "man"],
    &["choose", "spain"],
    &["this", "is", "a", "test"],
    &["i", "am", "not", "a", "number", "i", "am", "a", "person"],
    &["my", "lifeboat", "is", "full", "of", "eels"],
    &[
        "when",
        "in",
        "the",
        "course",
        "of",
        "human",
        "events",
        "it",
        "becomes",
        "necessary",
    ],
    &[
        "it", "was", "a", "bright", "cold", "day", "in", "april", "and", "the", "clocks", "were",
        "striking", "thirteen",
    ],
    &[
        "it",
        "was",
        "the",
        "best",
        "of",
        "times",
        "it",
        "was",
        "the",
        "worst",
        "of",
        "times",
        "it",
        "was",
        "the",
        "age",
        "of",
        "wisdom",
        "it",
        "was",
        "the",
        "age",
        "of",
        "foolishness",
    ],
];
