//! Aggregation over many PLTB runs.
//!
//! Each result file contributes an independent `(trees, distances)` pair;
//! the views below are folds over an ordered slice of those pairs. Per-file
//! contributions are computed in isolation and only concatenated or merged
//! at the end, so files can be processed in parallel (see
//! [`collect_results`]) without changing observable semantics.
//!
//! Views:
//! 1. Flat model-pairwise relative distances, sortable by distance.
//! 2. Per-file population variance of relative distances.
//! 3. Symmetric selector-pair sample matrix ([`PairMatrix`]).
//! 4. Model-selection histograms, per selector and combined.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use itertools::Itertools;
use rayon::prelude::*;

use crate::error::EvalError;
use crate::matrix::PairMatrix;
use crate::oracle::{DistanceMap, DistanceOracle, distances_for};
use crate::report::{TreeEntry, parse_report_file};
use crate::selector::{GTR_MODEL, Selector};

/// One result file's parsed trees and oracle distances.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub file: String,
    pub trees: Vec<TreeEntry>,
    pub distances: DistanceMap,
}

impl FileResult {
    /// Parse one report and run the distance oracle over its trees.
    pub fn compute<O: DistanceOracle + ?Sized>(
        oracle: &O,
        path: &PathBuf,
        requires_gtr: bool,
    ) -> Result<FileResult, EvalError> {
        let file = path.display().to_string();
        let trees = parse_report_file(path, requires_gtr)?;
        let distances = distances_for(oracle, &file, &trees)?;
        Ok(FileResult { file, trees, distances })
    }
}

/// Compute all files in parallel, preserving input order. Failures stay
/// paired with their file name; one bad file never poisons the others.
pub fn collect_results<O: DistanceOracle + Sync + ?Sized>(
    oracle: &O,
    files: &[PathBuf],
    requires_gtr: bool,
) -> Vec<(String, Result<FileResult, EvalError>)> {
    files
        .par_iter()
        .map(|path| {
            (
                path.display().to_string(),
                FileResult::compute(oracle, path, requires_gtr),
            )
        })
        .collect()
}

/// Sort direction for the flat views. Both sorts are stable; ties keep
/// input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One relative distance between two models' trees in one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPairDistance {
    pub file: String,
    pub model_a: String,
    pub model_b: String,
    pub relative: f64,
}

/// Flatten every file's distance map, file order first, `(i, j)` order
/// within a file.
pub fn model_pair_distances(results: &[FileResult]) -> Vec<ModelPairDistance> {
    results
        .iter()
        .flat_map(|r| {
            r.distances.iter().map(|(&(i, j), &(_, relative))| ModelPairDistance {
                file: r.file.clone(),
                model_a: r.trees[i].model.clone(),
                model_b: r.trees[j].model.clone(),
                relative,
            })
        })
        .collect()
}

pub fn sort_by_relative(distances: &mut [ModelPairDistance], order: SortOrder) {
    distances.sort_by(|a, b| match order {
        SortOrder::Ascending => a.relative.total_cmp(&b.relative),
        SortOrder::Descending => b.relative.total_cmp(&a.relative),
    });
}

/// Population variance of one file's relative distances.
#[derive(Debug, Clone, PartialEq)]
pub struct FileVariance {
    pub file: String,
    pub variance: f64,
}

/// Mean of squared deviations from the mean, divisor `n` (not `n - 1`).
pub fn population_variance(samples: &[f64]) -> Result<f64, EvalError> {
    if samples.is_empty() {
        return Err(EvalError::EmptySample { stat: "variance" });
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    Ok(samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n)
}

/// Per-file variance of relative distances, in file order.
pub fn file_variances(results: &[FileResult]) -> Result<Vec<FileVariance>, EvalError> {
    results
        .iter()
        .map(|r| {
            let relatives: Vec<f64> = r.distances.values().map(|&(_, rel)| rel).collect();
            Ok(FileVariance {
                file: r.file.clone(),
                variance: population_variance(&relatives)?,
            })
        })
        .collect()
}

pub fn sort_by_variance(variances: &mut [FileVariance], order: SortOrder) {
    variances.sort_by(|a, b| match order {
        SortOrder::Ascending => a.variance.total_cmp(&b.variance),
        SortOrder::Descending => b.variance.total_cmp(&a.variance),
    });
}

/// Derived selector lists, one per tree, with the GTR sentinel appended to
/// the entry carrying the GTR model string when it is not already listed.
/// The parsed entries themselves stay untouched, so the same `FileResult`
/// slice can feed several aggregation passes.
pub fn selector_views(trees: &[TreeEntry]) -> Vec<Vec<Selector>> {
    trees
        .iter()
        .map(|t| {
            let mut ics = t.ics.clone();
            if t.model == GTR_MODEL && !ics.contains(&Selector::Gtr) {
                ics.push(Selector::Gtr);
            }
            ics
        })
        .collect()
}

/// Build the selector-pair matrix across all files.
///
/// Per file: selectors that co-selected one tree contribute a 0.0 sample for
/// each of their pairs (criteria that agreed have no detectable difference);
/// every distance-map edge contributes its relative distance for every
/// selector pair across the two trees. All insertions go through the
/// canonical-key normalization of [`PairMatrix`].
pub fn selector_pair_matrix(results: &[FileResult]) -> PairMatrix {
    let mut merged = PairMatrix::new();
    for r in results {
        merged.merge(file_pair_matrix(r));
    }
    merged
}

fn file_pair_matrix(result: &FileResult) -> PairMatrix {
    let views = selector_views(&result.trees);
    let mut matrix = PairMatrix::new();

    for view in &views {
        for (&a, &b) in view.iter().tuple_combinations() {
            matrix.insert(a, b, 0.0);
        }
    }

    for (&(i, j), &(_, relative)) in &result.distances {
        for &a in &views[i] {
            for &b in &views[j] {
                matrix.insert(a, b, relative);
            }
        }
    }

    matrix
}

/// How often each model was chosen, over all files. Entries carried only as
/// the GTR baseline (derived selector view is the sentinel alone) and
/// entries with no selectors at all contribute nothing.
pub fn model_histogram(results: &[FileResult]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in results {
        for (tree, view) in r.trees.iter().zip(selector_views(&r.trees)) {
            if view.iter().any(|s| !s.is_sentinel()) {
                *counts.entry(tree.model.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// `selector -> model -> count`, skipping the sentinel-on-GTR pairing (the
/// baseline inclusion is not a choice).
pub fn selector_model_histogram(
    results: &[FileResult],
) -> BTreeMap<Selector, BTreeMap<String, usize>> {
    let mut counts: BTreeMap<Selector, BTreeMap<String, usize>> = BTreeMap::new();
    for r in results {
        for (tree, view) in r.trees.iter().zip(selector_views(&r.trees)) {
            for s in view {
                if s.is_sentinel() && tree.model == GTR_MODEL {
                    continue;
                }
                *counts
                    .entry(s)
                    .or_default()
                    .entry(tree.model.clone())
                    .or_insert(0) += 1;
            }
        }
    }
    counts
}

/// The per-selector histogram reshaped for tabular export: one row per
/// model, one column per selector, columns in selector rank order.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedHistogram {
    pub selectors: Vec<Selector>,
    pub rows: BTreeMap<String, Vec<usize>>,
}

pub fn combined_histogram(results: &[FileResult]) -> CombinedHistogram {
    let per_selector = selector_model_histogram(results);
    let selectors: Vec<Selector> = per_selector.keys().copied().collect();
    let models: BTreeSet<&String> = per_selector.values().flat_map(|m| m.keys()).collect();

    let rows = models
        .into_iter()
        .map(|model| {
            let row = selectors
                .iter()
                .map(|s| per_selector[s].get(model).copied().unwrap_or(0))
                .collect();
            (model.clone(), row)
        })
        .collect();

    CombinedHistogram { selectors, rows }
}
