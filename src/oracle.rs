//! Pairwise tree distance oracle.
//!
//! The core never computes topological distances itself. It hands an ordered
//! tree list to a [`DistanceOracle`] and consumes the oracle's raw output:
//! one line per unordered index pair, `"<i> <j>: <absolute> <relative>"`,
//! terminated by the first non-matching line. [`RaxmlOracle`] is the stock
//! implementation, shelling out to RAxML's RF-distance mode in a scratch
//! directory that is removed on every exit path.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::process::Command;

use crate::error::{EvalError, OracleFailure};
use crate::report::TreeEntry;

/// `(i, j) -> (absolute, relative)` distances, `i < j`, indices into the
/// parsed tree list of one file. Ordered so per-file iteration is
/// deterministic.
pub type DistanceMap = BTreeMap<(usize, usize), (f64, f64)>;

/// External collaborator computing pairwise topological distances.
pub trait DistanceOracle {
    /// Raw tool output for the given trees, in the line format above.
    /// Only called with two or more trees.
    fn raw_distances(&self, trees: &[TreeEntry]) -> Result<String, OracleFailure>;
}

/// Distances for one file's trees, handling the degenerate sizes without
/// touching the oracle: a single tree maps to `{(0,0): (0,0)}`, an empty
/// list is a usage error. Oracle failures are tagged with `file`.
pub fn distances_for<O: DistanceOracle + ?Sized>(
    oracle: &O,
    file: &str,
    trees: &[TreeEntry],
) -> Result<DistanceMap, EvalError> {
    match trees.len() {
        0 => Err(EvalError::EmptyTreeList),
        1 => Ok(BTreeMap::from([((0, 0), (0.0, 0.0))])),
        _ => {
            let raw = oracle
                .raw_distances(trees)
                .map_err(|source| EvalError::Oracle {
                    file: file.to_string(),
                    source,
                })?;
            Ok(parse_distance_output(&raw))
        }
    }
}

/// Parse the oracle's raw output. Reading stops at the first line that does
/// not match the pair format; everything before it must be well-formed.
pub fn parse_distance_output(raw: &str) -> DistanceMap {
    raw.lines()
        .map_while(parse_distance_line)
        .collect()
}

fn parse_distance_line(line: &str) -> Option<((usize, usize), (f64, f64))> {
    let (pair, values) = line.split_once(": ")?;
    let (i, j) = pair.split_once(' ')?;
    let (absolute, relative) = values.split_once(' ')?;
    Some((
        (i.parse().ok()?, j.parse().ok()?),
        (absolute.parse::<u64>().ok()? as f64, relative.parse().ok()?),
    ))
}

/// Oracle backed by RAxML's `-f r` RF-distance computation.
///
/// Trees are written one newick per line to a temporary tree file; RAxML is
/// invoked with `-m GTRGAMMAX -f r -z <tree_file> -n run -w <tmpdir>` and the
/// resulting `RAxML_RF-Distances.run` is returned verbatim. The temporary
/// directory (tree file, info file, distance file) is cleaned up when the
/// guard drops, on success and failure alike.
pub struct RaxmlOracle {
    binary: String,
}

impl RaxmlOracle {
    pub fn new(binary: impl Into<String>) -> Self {
        RaxmlOracle { binary: binary.into() }
    }
}

impl DistanceOracle for RaxmlOracle {
    fn raw_distances(&self, trees: &[TreeEntry]) -> Result<String, OracleFailure> {
        let dir = tempfile::Builder::new()
            .prefix("pltb-eval-")
            .tempdir()
            .map_err(io_failure)?;

        let tree_file = dir.path().join("tree_file");
        let mut out = fs::File::create(&tree_file).map_err(io_failure)?;
        for tree in trees {
            writeln!(out, "{}", tree.newick).map_err(io_failure)?;
        }
        out.flush().map_err(io_failure)?;

        let output = Command::new(&self.binary)
            .arg("-m")
            .arg("GTRGAMMAX")
            .arg("-f")
            .arg("r")
            .arg("-z")
            .arg(&tree_file)
            .arg("-n")
            .arg("run")
            .arg("-w")
            .arg(dir.path())
            .output()
            .map_err(io_failure)?;

        if !output.status.success() {
            return Err(OracleFailure {
                output: format!(
                    "{} exited with {}\n{}{}",
                    self.binary,
                    output.status,
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr),
                ),
            });
        }

        fs::read_to_string(dir.path().join("RAxML_RF-Distances.run")).map_err(io_failure)
    }
}

fn io_failure(e: std::io::Error) -> OracleFailure {
    OracleFailure { output: e.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;

    fn entry(model: &str, newick: &str) -> TreeEntry {
        TreeEntry {
            model: model.to_string(),
            ics: vec![Selector::Aic],
            newick: newick.to_string(),
        }
    }

    struct FixedOracle(&'static str);

    impl DistanceOracle for FixedOracle {
        fn raw_distances(&self, _trees: &[TreeEntry]) -> Result<String, OracleFailure> {
            Ok(self.0.to_string())
        }
    }

    struct FailingOracle;

    impl DistanceOracle for FailingOracle {
        fn raw_distances(&self, _trees: &[TreeEntry]) -> Result<String, OracleFailure> {
            Err(OracleFailure { output: "tool blew up".to_string() })
        }
    }

    #[test]
    fn parses_pair_lines_until_first_mismatch() {
        let raw = "0 1: 4 0.2\n0 2: 6 0.3\n1 2: 2 0.1\nTotal execution time: 0.1\n";
        let map = parse_distance_output(raw);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&(0, 1)], (4.0, 0.2));
        assert_eq!(map[&(1, 2)], (2.0, 0.1));
    }

    #[test]
    fn mismatch_in_the_middle_drops_the_tail() {
        let raw = "0 1: 4 0.2\noops\n1 2: 2 0.1\n";
        let map = parse_distance_output(raw);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&(0, 1)));
    }

    #[test]
    fn single_tree_skips_the_oracle() {
        let trees = vec![entry("012345", "(A,B);")];
        let map = distances_for(&FailingOracle, "r.txt", &trees).unwrap();
        assert_eq!(map, BTreeMap::from([((0, 0), (0.0, 0.0))]));
    }

    #[test]
    fn empty_tree_list_is_a_usage_error() {
        let err = distances_for(&FixedOracle(""), "r.txt", &[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyTreeList));
    }

    #[test]
    fn oracle_failure_names_the_file_and_keeps_the_diagnostic() {
        let trees = vec![entry("012345", "(A,B);"), entry("000000", "(A,C);")];
        let err = distances_for(&FailingOracle, "r.txt", &trees).unwrap_err();
        match err {
            EvalError::Oracle { file, source } => {
                assert_eq!(file, "r.txt");
                assert_eq!(source.output, "tool blew up");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn two_trees_go_through_the_oracle() {
        let trees = vec![entry("012345", "(A,B);"), entry("000000", "(A,C);")];
        let map = distances_for(&FixedOracle("0 1: 4 0.2\n"), "r.txt", &trees).unwrap();
        assert_eq!(map[&(0, 1)], (4.0, 0.2));
    }
}
