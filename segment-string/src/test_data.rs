#![cfg(feature = "__test_data")]

use std::path::PathBuf;

use super::{CostPolicy, FrequencyTable, Segmenter};

#[test]
fn test_data() {
    for policy in &[CostPolicy::NegLogProb, CostPolicy::zipf()] {
        crate::test_cases::run(&segmenter(crate_data_dir(), *policy));
    }
}

/// Frequency table bundled with the repository, most frequent words first
pub fn table(dir: PathBuf) -> FrequencyTable {
    let file = dir.join("en-sample.tsv");
    FrequencyTable::from_tsv(&file).unwrap_or_else(|e| panic!("error reading {:?}: {}", file, e))
}

pub fn segmenter(dir: PathBuf, policy: CostPolicy) -> Segmenter {
    Segmenter::from_table(&table(dir), policy).unwrap()
}

pub fn crate_data_dir() -> PathBuf {
    PathBuf::from(format!("{}/../data", env!("CARGO_MANIFEST_DIR")))
}
