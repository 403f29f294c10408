use segment_string::{CostPolicy, FrequencyTable, Search, Segmenter};

fn main() -> Result<(), segment_string::Error> {
    // Listed rarest first: zipf only sees the order, neg_log_prob sees the counts
    let mut table = FrequencyTable::new();
    table.push("chooses", 7_000.0);
    table.push("pain", 9_000.0);
    table.push("choose", 80_000.0);
    table.push("spain", 20_000.0);

    let mut search = Search::default();
    for policy in &[CostPolicy::NegLogProb, CostPolicy::zipf()] {
        let segmenter = Segmenter::from_table(&table, *policy)?;
        let result = segmenter.segment("choosespain", &mut search);
        println!(
            "{}: {:?} (cost {:.3})",
            policy,
            result.words().collect::<Vec<&str>>(),
            result.cost()
        );
    }

    Ok(())
}
