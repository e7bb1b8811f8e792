use clap::{Parser, ValueEnum};
use pltb_eval::aggregate::{
    self, FileResult, SortOrder, combined_histogram, file_variances, model_pair_distances,
    selector_pair_matrix, sort_by_relative, sort_by_variance,
};
use pltb_eval::io::{pair_file_name, write_combined_table, write_counts, write_samples};
use pltb_eval::RaxmlOracle;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

/// Evaluate PLTB model-selection results: parse the result files, compute
/// pairwise RF distances between the candidate trees with RAxML and
/// aggregate them per selection criterion.
#[derive(Parser, Debug)]
#[command(name = "pltb-eval", version, about = "Pairwise RF-distance evaluation of PLTB results")]
struct Args {
    /// PLTB result files
    #[arg(required = true)]
    results: Vec<PathBuf>,

    /// What to compute: distances | sort | variance | hist
    #[arg(long = "action", value_enum, default_value_t = ActionArg::Distances)]
    action: ActionArg,

    /// RAxML binary for RF-distance calculation
    #[arg(long = "raxml", default_value = "raxmlHPC-SSE3")]
    raxml: String,

    /// Output directory for histogram data and count files
    #[arg(short = 'o', long = "out-dir", default_value = "eval/res")]
    out_dir: PathBuf,

    /// Sort descending instead of ascending
    #[arg(long = "descending", default_value_t = false)]
    descending: bool,

    /// Accept result files without a GTR tree
    #[arg(long = "no-require-gtr", default_value_t = false)]
    no_require_gtr: bool,

    /// Quiet mode: suppresses progress messages on stdout
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ActionArg {
    /// Print every file's models and pairwise distances
    Distances,
    /// One sorted list of all pairwise distances
    Sort,
    /// Per-file variance of relative distances
    Variance,
    /// Histogram data files per selector pair, plus count files
    Hist,
}

fn main() {
    let args = Args::parse();
    let order = if args.descending { SortOrder::Descending } else { SortOrder::Ascending };
    let oracle = RaxmlOracle::new(args.raxml.clone());

    let t0 = Instant::now();
    log_if(!args.quiet, format!("Processing {} result files", args.results.len()));

    // One bad file is reported and skipped; the rest still aggregate.
    let mut results: Vec<FileResult> = Vec::new();
    for (file, outcome) in
        aggregate::collect_results(&oracle, &args.results, !args.no_require_gtr)
    {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => match std::error::Error::source(&e) {
                Some(source) => eprintln!("Skipping {file}: {e}: {source}"),
                None => eprintln!("Skipping {file}: {e}"),
            },
        }
    }
    if results.is_empty() {
        eprintln!("No result file could be processed.");
        std::process::exit(2);
    }
    log_if(
        !args.quiet,
        format!("Parsed and measured {} files in {:.3}s", results.len(), t0.elapsed().as_secs_f64()),
    );

    match args.action {
        ActionArg::Distances => print_distances(&results),
        ActionArg::Sort => print_sorted(&results, order),
        ActionArg::Variance => print_variances(&results, order),
        ActionArg::Hist => {
            if let Err(e) = write_histograms(&results, &args.out_dir, args.quiet) {
                eprintln!("Failed to write histogram data: {e}");
                std::process::exit(4);
            }
        }
    }
}

fn print_distances(results: &[FileResult]) {
    for r in results {
        let models = r
            .trees
            .iter()
            .map(|t| {
                let ics = t.ics.iter().map(|s| s.label()).collect::<Vec<_>>().join(",");
                format!("{} ({ics})", t.model)
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}: {models}", r.file);
        if r.trees.len() == 1 {
            println!("Single tree, nothing to be done.");
            continue;
        }
        for (&(i, j), &(absolute, relative)) in &r.distances {
            println!("{i} {j}: {absolute} {relative}");
        }
    }
}

fn print_sorted(results: &[FileResult], order: SortOrder) {
    let mut all = model_pair_distances(results);
    sort_by_relative(&mut all, order);
    for d in &all {
        println!("{:<66}   {}   {}   {}", d.file, d.model_a, d.model_b, d.relative);
    }
    println!("{:<66} | {:^15} | {}", "Result file", "Models", "Relative Distance");
    println!("Validation: We processed {} distances", all.len());
}

fn print_variances(results: &[FileResult], order: SortOrder) {
    let mut variances = match file_variances(results) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(3);
        }
    };
    sort_by_variance(&mut variances, order);
    for v in &variances {
        println!("{:<66}   {}", v.file, v.variance);
    }
}

fn write_histograms(
    results: &[FileResult],
    out_dir: &PathBuf,
    quiet: bool,
) -> std::io::Result<()> {
    let data_dir = out_dir.join("histograms").join("data");
    fs::create_dir_all(&data_dir)?;

    let matrix = selector_pair_matrix(results);
    for (&pair, samples) in matrix.iter() {
        log_if(!quiet, format!("# {} vs {}: {}", pair.0, pair.1, samples.len()));
        write_samples(data_dir.join(pair_file_name(pair)), samples)?;
    }

    write_counts(out_dir.join("model_counts"), aggregate::model_histogram(results))?;
    for (selector, models) in aggregate::selector_model_histogram(results) {
        write_counts(out_dir.join(format!("{}_counts", selector.serialize())), models)?;
    }
    write_combined_table(out_dir.join("combined_counts.tsv"), &combined_histogram(results))?;

    log_if(!quiet, format!("Histogram data written to {}", data_dir.display()));
    Ok(())
}

fn log_if(show: bool, msg: String) {
    if show {
        println!("{}", msg);
    }
}
