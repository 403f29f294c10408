use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use segment_string::{CostModel, CostPolicy, FrequencyTable, Search, Segmenter};

#[derive(Parser, Debug)]
#[command(
    name = "segment-string",
    about = "Insert word boundaries into unspaced text."
)]
struct Opt {
    /// Word frequency file: `word<TAB>count` lines (.tsv, .txt), a JSON object (.json) or a
    /// gzipped JSON object (anything else)
    #[arg(long)]
    freq: PathBuf,

    /// Cost policy: neg_log_prob (alias prob) or zipf
    #[arg(long, default_value = "neg_log_prob")]
    policy: CostPolicy,

    /// Scaling constant for the zipf policy
    #[arg(long)]
    zipf_scale: Option<f64>,

    /// Cost charged for substrings missing from the vocabulary
    #[arg(long)]
    max_cost: Option<f64>,

    /// Print exp(-cost) instead of the cost
    #[arg(long)]
    likelihood: bool,

    /// Number of threads used for stdin input; 1 segments lines in order on one thread
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Texts to segment; lines are read from stdin when none are given
    text: Vec<String>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let level = match opt.verbose {
        true => "info",
        false => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let policy = cost_policy(&opt)?;

    let start = Instant::now();
    let table = load_table(&opt.freq)?;
    let mut model = CostModel::build(&table, policy)
        .with_context(|| format!("cannot build cost model from {:?}", opt.freq))?;
    if let Some(max_cost) = opt.max_cost {
        model.set_max_cost(max_cost)?;
    }
    let segmenter = Segmenter::new(model);
    log::info!(
        "loaded {} words in {:.3} [sec]",
        table.len(),
        start.elapsed().as_secs_f64()
    );

    let out = stdout();
    let mut out = BufWriter::new(out.lock());
    let mut search = Search::default();
    let start = Instant::now();
    let mut n_lines = 0;

    if !opt.text.is_empty() {
        for text in &opt.text {
            let line = format_line(&segmenter, text, &mut search, opt.likelihood);
            writeln!(out, "{}", line)?;
            n_lines += 1;
        }
    } else if opt.threads <= 1 {
        for line in stdin().lock().lines() {
            let line = format_line(&segmenter, &line?, &mut search, opt.likelihood);
            writeln!(out, "{}", line)?;
            n_lines += 1;
        }
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opt.threads)
            .build()?;
        let lines = stdin().lock().lines().collect::<Result<Vec<_>, _>>()?;
        let results = pool.install(|| {
            lines
                .par_iter()
                .map_init(Search::default, |search, line| {
                    format_line(&segmenter, line, search, opt.likelihood)
                })
                .collect::<Vec<_>>()
        });
        for line in &results {
            writeln!(out, "{}", line)?;
        }
        n_lines = results.len();
    }

    out.flush()?;
    log::info!(
        "segmented {} lines in {:.3} [sec]",
        n_lines,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn cost_policy(opt: &Opt) -> Result<CostPolicy> {
    match (opt.policy, opt.zipf_scale) {
        (CostPolicy::Zipf { .. }, Some(scale)) => Ok(CostPolicy::Zipf { scale }),
        (policy, Some(_)) => bail!(
            "--zipf-scale only applies to the zipf policy, not {}",
            policy
        ),
        (policy, None) => Ok(policy),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Format {
    Tsv,
    Json,
    GzipJson,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsv") | Some("txt") => Self::Tsv,
            Some("json") => Self::Json,
            _ => Self::GzipJson,
        }
    }
}

fn load_table(path: &Path) -> Result<FrequencyTable> {
    let table = match Format::from_path(path) {
        Format::Tsv => FrequencyTable::from_tsv(path),
        Format::Json => FrequencyTable::from_json(path),
        Format::GzipJson => FrequencyTable::from_gzip_json(path),
    };
    table.with_context(|| format!("cannot read frequency table {:?}", path))
}

fn format_line(segmenter: &Segmenter, text: &str, search: &mut Search, likelihood: bool) -> String {
    let result = segmenter.segment(text, search);
    let score = match likelihood {
        true => result.likelihood(),
        false => result.cost(),
    };
    format!("{}\t{}", result.words().collect::<Vec<_>>().join(" "), score)
}
