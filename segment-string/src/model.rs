use std::fmt;
use std::str::FromStr;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};
use smartstring::alias::String;

use crate::error::{Error, Result};
use crate::freq::FrequencyTable;
use crate::HashMap;

/// Rule used to turn a word's frequency or rank into a cost
#[cfg_attr(feature = "with-serde", derive(Deserialize, Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostPolicy {
    /// `log(total frequency) - log(frequency)`
    NegLogProb,
    /// `ln((rank + 1) * scale)`, where rank is the word's position in the table
    Zipf { scale: f64 },
}

impl CostPolicy {
    /// Zipf policy with the default scaling constant
    pub fn zipf() -> Self {
        Self::Zipf {
            scale: DEFAULT_ZIPF_SCALE,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Self::NegLogProb => Ok(()),
            Self::Zipf { scale } if scale.is_finite() && scale > 0.0 => Ok(()),
            Self::Zipf { scale } => Err(Error::invalid_policy(format!(
                "zipf scale must be finite and positive, got {}",
                scale
            ))),
        }
    }
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self::NegLogProb
    }
}

impl FromStr for CostPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "neg_log_prob" | "prob" => Ok(Self::NegLogProb),
            "zipf" => Ok(Self::zipf()),
            _ => Err(Error::invalid_policy(format!("unknown cost policy {:?}", s))),
        }
    }
}

impl fmt::Display for CostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegLogProb => f.write_str("neg_log_prob"),
            Self::Zipf { scale } => write!(f, "zipf(scale = {})", scale),
        }
    }
}

/// Immutable mapping from lowercase words to their cost
///
/// Lower cost means the word is more likely. Words missing from the vocabulary cost `max_cost`,
/// a large finite penalty, so every string has at least one segmentation.
#[cfg_attr(feature = "with-serde", derive(Deserialize, Serialize))]
#[derive(Clone, Debug)]
pub struct CostModel {
    costs: HashMap<String, f64>,
    policy: CostPolicy,
    max_len: usize,
    max_cost: f64,
}

impl CostModel {
    /// Build a model from `table` under `policy`
    ///
    /// Words are folded to lowercase; if two entries fold to the same word, the earlier one
    /// wins. Fails with `InvalidFrequencyTable` for an empty table, for negative or non-finite
    /// frequencies, and (under `NegLogProb`) for any frequency that is not strictly positive.
    pub fn build(table: &FrequencyTable, policy: CostPolicy) -> Result<Self> {
        policy.validate()?;
        if table.is_empty() {
            return Err(Error::invalid_table("table is empty"));
        }

        let mut total = 0.0;
        for (word, freq) in table.iter() {
            if !freq.is_finite() || freq < 0.0 {
                return Err(Error::invalid_table(format!(
                    "invalid frequency {} for {:?}",
                    freq, word
                )));
            }
            if policy == CostPolicy::NegLogProb && freq <= 0.0 {
                return Err(Error::invalid_table(format!(
                    "frequency of {:?} must be positive under neg_log_prob",
                    word
                )));
            }
            total += freq;
        }

        if !total.is_finite() {
            return Err(Error::invalid_table("sum of frequencies overflows"));
        }

        let log_total = total.ln();
        let mut costs = HashMap::default();
        costs.reserve(table.len());
        for (rank, (word, freq)) in table.iter().enumerate() {
            let cost = match policy {
                CostPolicy::NegLogProb => log_total - freq.ln(),
                CostPolicy::Zipf { scale } => ((rank + 1) as f64 * scale).ln(),
            };
            costs.entry(fold(word)).or_insert(cost);
        }

        let max_len = table.max_word_len();
        log::debug!(
            "built {} cost model: {} words, max_len {}",
            policy,
            costs.len(),
            max_len
        );

        Ok(Self {
            costs,
            policy,
            max_len,
            max_cost: DEFAULT_MAX_COST,
        })
    }

    /// Cost of `word`, or `max_cost` if it is not in the vocabulary
    ///
    /// `word` is folded to lowercase before the lookup.
    pub fn cost(&self, word: &str) -> f64 {
        match needs_folding(word) {
            false => self.lookup(word),
            true => self.lookup(&fold(word)),
        }
    }

    /// Like `cost`, folding into `scratch` instead of allocating
    pub(crate) fn cost_in(&self, word: &str, scratch: &mut std::string::String) -> f64 {
        match needs_folding(word) {
            false => self.lookup(word),
            true => {
                fold_into(word, scratch);
                self.lookup(scratch)
            }
        }
    }

    fn lookup(&self, lowercase: &str) -> f64 {
        match self.costs.get(lowercase) {
            Some(cost) => *cost,
            None => self.max_cost,
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        match needs_folding(word) {
            false => self.costs.contains_key(word),
            true => self.costs.contains_key(fold(word).as_str()),
        }
    }

    /// Length in characters of the longest vocabulary word
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Penalty charged for words outside the vocabulary
    pub fn max_cost(&self) -> f64 {
        self.max_cost
    }

    /// Customize the penalty charged for words outside the vocabulary
    ///
    /// Fails with `InvalidMaxCost` unless `max_cost` is finite and positive.
    pub fn set_max_cost(&mut self, max_cost: f64) -> Result<()> {
        if !max_cost.is_finite() || max_cost <= 0.0 {
            return Err(Error::InvalidMaxCost(max_cost));
        }
        self.max_cost = max_cost;
        Ok(())
    }

    pub fn policy(&self) -> CostPolicy {
        self.policy
    }

    /// Number of distinct (case-folded) words
    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

fn needs_folding(word: &str) -> bool {
    match word.is_ascii() {
        true => word.bytes().any(|b| b.is_ascii_uppercase()),
        false => word.chars().any(char::is_uppercase),
    }
}

fn fold(word: &str) -> String {
    word.chars().flat_map(char::to_lowercase).collect::<std::string::String>().into()
}

fn fold_into(word: &str, scratch: &mut std::string::String) {
    scratch.clear();
    scratch.extend(word.chars().flat_map(char::to_lowercase));
}

pub const DEFAULT_MAX_COST: f64 = 1.0e16;
pub const DEFAULT_ZIPF_SCALE: f64 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;

    fn table(words: &[(&str, f64)]) -> FrequencyTable {
        words.iter().copied().collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn neg_log_prob() {
        let model = CostModel::build(
            &table(&[("the", 6.0), ("man", 3.0), ("a", 1.0)]),
            CostPolicy::NegLogProb,
        )
        .unwrap();

        assert_close(model.cost("the"), 10f64.ln() - 6f64.ln());
        assert_close(model.cost("man"), 10f64.ln() - 3f64.ln());
        assert_close(model.cost("a"), 10f64.ln());
        assert_eq!(model.max_len(), 3);
        assert_eq!(model.cost("woman"), DEFAULT_MAX_COST);
    }

    #[test]
    fn zipf_uses_rank_not_frequency() {
        let model = CostModel::build(
            &table(&[("rare", 1.0), ("common", 1000.0)]),
            CostPolicy::Zipf { scale: 2.5 },
        )
        .unwrap();

        assert_close(model.cost("rare"), 2.5f64.ln());
        assert_close(model.cost("common"), 5f64.ln());
    }

    #[test]
    fn zipf_allows_zero_frequency() {
        let model = CostModel::build(&table(&[("a", 0.0)]), CostPolicy::zipf()).unwrap();
        assert_close(model.cost("a"), DEFAULT_ZIPF_SCALE.ln());
    }

    #[test]
    fn case_folding() {
        let model =
            CostModel::build(&table(&[("The", 2.0), ("the", 8.0)]), CostPolicy::NegLogProb)
                .unwrap();
        assert_eq!(model.len(), 1);
        assert_close(model.cost("the"), 5f64.ln());
        assert_close(model.cost("THE"), 5f64.ln());
        assert!(model.contains("tHe"));
        assert!(!model.contains("he"));
    }

    #[test]
    fn invalid_tables() {
        let empty = FrequencyTable::new();
        for policy in &[CostPolicy::NegLogProb, CostPolicy::zipf()] {
            let err = CostModel::build(&empty, *policy).unwrap_err();
            assert!(matches!(err, Error::InvalidFrequencyTable(_)));
        }

        for freq in &[0.0, -1.0] {
            let err = CostModel::build(&table(&[("a", 1.0), ("b", *freq)]), CostPolicy::NegLogProb)
                .unwrap_err();
            assert!(matches!(err, Error::InvalidFrequencyTable(_)));
        }

        for freq in &[-1.0, f64::NAN, f64::INFINITY] {
            let err = CostModel::build(&table(&[("a", *freq)]), CostPolicy::zipf()).unwrap_err();
            assert!(matches!(err, Error::InvalidFrequencyTable(_)));
        }
    }

    #[test]
    fn policies() {
        assert_eq!("prob".parse::<CostPolicy>().unwrap(), CostPolicy::NegLogProb);
        assert_eq!(
            "neg_log_prob".parse::<CostPolicy>().unwrap(),
            CostPolicy::NegLogProb
        );
        assert_eq!("zipf".parse::<CostPolicy>().unwrap(), CostPolicy::zipf());
        assert!(matches!(
            "bigram".parse::<CostPolicy>(),
            Err(Error::InvalidPolicy(_))
        ));

        let table = table(&[("a", 1.0)]);
        for scale in &[0.0, -2.0, f64::NAN] {
            let err = CostModel::build(&table, CostPolicy::Zipf { scale: *scale }).unwrap_err();
            assert!(matches!(err, Error::InvalidPolicy(_)));
        }
    }

    #[test]
    fn max_cost() {
        let mut model = CostModel::build(&table(&[("a", 1.0)]), CostPolicy::NegLogProb).unwrap();
        model.set_max_cost(100.0).unwrap();
        assert_eq!(model.max_cost(), 100.0);
        assert_eq!(model.cost("b"), 100.0);
        assert_eq!(model.cost("a"), 0.0);
    }

    #[test]
    fn max_cost_must_be_finite_and_positive() {
        let mut model = CostModel::build(&table(&[("the", 10.0)]), CostPolicy::NegLogProb).unwrap();
        for max_cost in &[f64::INFINITY, f64::NEG_INFINITY, f64::NAN, 0.0, -5.0] {
            match model.set_max_cost(*max_cost) {
                Err(Error::InvalidMaxCost(_)) => {}
                other => panic!("accepted {}: {:?}", max_cost, other),
            }
        }
        assert_eq!(model.max_cost(), DEFAULT_MAX_COST);
    }

    #[test]
    fn scratch_folding_matches_cost() {
        let model =
            CostModel::build(&table(&[("café", 2.0), ("the", 8.0)]), CostPolicy::NegLogProb)
                .unwrap();
        let mut scratch = std::string::String::new();
        for word in &["THE", "The", "the", "CAFÉ", "Café", "x", "X"] {
            assert_eq!(model.cost_in(word, &mut scratch), model.cost(word));
        }
        assert_eq!(scratch, "x");
    }
}
