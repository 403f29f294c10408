use std::ops::Range;

use smartstring::alias::String;

pub mod error;
pub mod freq;
pub mod model;
#[cfg(feature = "test-cases")]
pub mod test_cases;
#[cfg(feature = "__test_data")]
pub mod test_data;

pub use error::{Error, Result};
pub use freq::FrequencyTable;
pub use model::{CostModel, CostPolicy, DEFAULT_MAX_COST, DEFAULT_ZIPF_SCALE};

/// Splits unspaced text into the sequence of words with the lowest total cost
///
/// The segmenter only reads its `CostModel`, so it can be shared between threads; every thread
/// brings its own `Search`.
#[derive(Clone, Debug)]
pub struct Segmenter {
    model: CostModel,
}

impl Segmenter {
    pub fn new(model: CostModel) -> Self {
        Self { model }
    }

    /// Build the cost model for `table` under `policy` and wrap it
    pub fn from_table(table: &FrequencyTable, policy: CostPolicy) -> Result<Self> {
        Ok(Self::new(CostModel::build(table, policy)?))
    }

    /// Segment the text in `input`
    ///
    /// Word boundaries fall between characters of `input` and the returned words keep its case;
    /// only the cost lookups are case-insensitive. Substrings missing from the vocabulary cost the
    /// model's `max_cost`, so this never fails. The `search` parameter holds the buffers used
    /// during segmentation; passing it in allows callers to reuse the allocations.
    pub fn segment<'a>(&self, input: &str, search: &'a mut Search) -> Segmentation<'a> {
        SegmentState::new(input, &self.model, search).run();
        log::trace!(
            "segmented {} chars into {} words, cost {}",
            search.bounds.len() - 1,
            search.result.len(),
            search.cost
        );

        let search: &'a Search = search;
        Segmentation {
            words: &search.result,
            cost: search.cost,
        }
    }

    /// Segment `input` with a fresh `Search`, returning owned words and the total cost
    pub fn segment_to_vec(&self, input: &str) -> (Vec<std::string::String>, f64) {
        let mut search = Search::default();
        let segmentation = self.segment(input, &mut search);
        (segmentation.to_vec(), segmentation.cost())
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }
}

struct SegmentState<'a> {
    model: &'a CostModel,
    text: &'a str,
    search: &'a mut Search,
}

impl<'a> SegmentState<'a> {
    fn new(text: &'a str, model: &'a CostModel, search: &'a mut Search) -> Self {
        search.clear();
        search.bounds.extend(text.char_indices().map(|(i, _)| i));
        search.bounds.push(text.len());
        Self {
            model,
            text,
            search,
        }
    }

    fn run(mut self) {
        self.forward();
        self.backtrack();
    }

    /// Computes the cheapest way to reach every character boundary
    ///
    /// `best[i]` is the minimum cost of any segmentation of the first `i` characters and
    /// `back[i]` the length of the last word on that path. Candidate words are scanned from
    /// length 1 upward and only a strictly lower cost replaces the current best, so ties go to
    /// the shortest last word.
    fn forward(&mut self) {
        let n = self.search.bounds.len() - 1;
        let window = self.model.max_len().max(1);

        self.search.best.push(0.0);
        self.search.back.push(0);
        for end in 1..=n {
            let (mut best, mut best_len) = (f64::INFINITY, 1);
            for len in 1..=window.min(end) {
                let start = end - len;
                let word = self.word(start..end);
                let cost =
                    self.search.best[start] + self.model.cost_in(word, &mut self.search.lower);
                if cost < best {
                    best = cost;
                    best_len = len;
                }
            }

            self.search.best.push(best);
            self.search.back.push(best_len);
        }
    }

    /// Follows the back pointers from the end of the text to recover the words
    fn backtrack(&mut self) {
        let n = self.search.back.len() - 1;
        let mut end = n;
        while end > 0 {
            let start = end - self.search.back[end];
            let word = self.word(start..end);
            self.search.result.push(word.into());
            end = start;
        }

        self.search.result.reverse();
        self.search.cost = self.search.best[n];
    }

    /// Slice of the text covering the characters in `range`
    fn word(&self, range: Range<usize>) -> &'a str {
        let text = self.text;
        &text[self.search.bounds[range.start]..self.search.bounds[range.end]]
    }
}

/// Buffers reused across calls to `Segmenter::segment`
#[derive(Clone, Debug, Default)]
pub struct Search {
    /// Byte offset of every character boundary, including the end of the text
    bounds: Vec<usize>,
    best: Vec<f64>,
    back: Vec<usize>,
    result: Vec<String>,
    cost: f64,
    /// Lowercased candidate word, for lookups of mixed-case input
    lower: std::string::String,
}

impl Search {
    fn clear(&mut self) {
        self.bounds.clear();
        self.best.clear();
        self.back.clear();
        self.result.clear();
        self.cost = 0.0;
    }
}

/// Best segmentation of a text, borrowed from the `Search` that produced it
#[derive(Clone, Copy, Debug)]
pub struct Segmentation<'a> {
    words: &'a [String],
    cost: f64,
}

impl<'a> Segmentation<'a> {
    /// The words, in order; concatenated they reproduce the input
    pub fn words(&self) -> impl Iterator<Item = &'a str> + ExactSizeIterator {
        self.words.iter().map(|w| w.as_str())
    }

    /// Sum of the costs of the words on the chosen path
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// `exp(-cost)`, a likelihood-like score
    ///
    /// Only meaningful for `CostPolicy::NegLogProb`, where it is the product of the word
    /// probabilities.
    pub fn likelihood(&self) -> f64 {
        (-self.cost).exp()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn to_vec(&self) -> Vec<std::string::String> {
        self.words().map(|w| w.to_owned()).collect()
    }
}

type HashMap<K, V> = std::collections::HashMap<K, V, ahash::RandomState>;
