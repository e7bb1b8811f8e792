//! Writers for the evaluation output artifacts.
//!
//! Three shapes: per-pair sample files (one float per line), count files
//! (`<label> <count>` per line) and the combined selector/model table (TSV
//! with a header row of selector tokens). If a target path ends with `.gz`
//! the output is gzip-compressed transparently.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::aggregate::CombinedHistogram;
use crate::selector::Selector;

fn open_out(path: &Path) -> io::Result<Box<dyn Write>> {
    let is_gz = path.to_string_lossy().ends_with(".gz");
    let file = File::create(path)?;
    Ok(if is_gz {
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    })
}

/// File name for one selector pair's sample file: the canonical serialized
/// tokens joined by `-`, e.g. `aic-bics`.
pub fn pair_file_name(pair: (Selector, Selector)) -> String {
    format!("{}-{}", pair.0.serialize(), pair.1.serialize())
}

/// One sample per line.
pub fn write_samples<P: AsRef<Path>>(path: P, samples: &[f64]) -> io::Result<()> {
    let mut out = open_out(path.as_ref())?;
    for sample in samples {
        writeln!(out, "{sample}")?;
    }
    out.flush()
}

/// `<label> <count>` per line, in iteration order.
pub fn write_counts<P, L>(
    path: P,
    counts: impl IntoIterator<Item = (L, usize)>,
) -> io::Result<()>
where
    P: AsRef<Path>,
    L: Display,
{
    let mut out = open_out(path.as_ref())?;
    for (label, count) in counts {
        writeln!(out, "{label} {count}")?;
    }
    out.flush()
}

/// Combined histogram as TSV: header row of selector tokens, then one row
/// per model with its per-selector counts.
pub fn write_combined_table<P: AsRef<Path>>(
    path: P,
    combined: &CombinedHistogram,
) -> io::Result<()> {
    let mut out = open_out(path.as_ref())?;

    write!(out, "model")?;
    for selector in &combined.selectors {
        write!(out, "\t{}", selector.serialize())?;
    }
    writeln!(out)?;

    for (model, row) in &combined.rows {
        write!(out, "{model}")?;
        for count in row {
            write!(out, "\t{count}")?;
        }
        writeln!(out)?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Read;

    #[test]
    fn pair_file_names_use_serialized_tokens() {
        assert_eq!(pair_file_name((Aic, BicS)), "aic-bics");
        assert_eq!(pair_file_name((AiccM, Gtr)), "aiccm-extra");
    }

    #[test]
    fn samples_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aic-bics");
        write_samples(&path, &[0.0, 0.25, 1.0]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "0\n0.25\n1\n");
    }

    #[test]
    fn counts_as_label_space_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models");
        write_counts(&path, [("012345".to_string(), 3), ("000000".to_string(), 1)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "012345 3\n000000 1\n");
    }

    #[test]
    fn combined_table_has_token_header() {
        let combined = CombinedHistogram {
            selectors: vec![Aic, BicS],
            rows: BTreeMap::from([
                ("000000".to_string(), vec![0, 2]),
                ("012345".to_string(), vec![1, 0]),
            ]),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.tsv");
        write_combined_table(&path, &combined).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "model\taic\tbics\n000000\t0\t2\n012345\t1\t0\n"
        );
    }

    #[test]
    fn gz_suffix_compresses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("samples.gz");
        write_samples(&path, &[0.5]).unwrap();
        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "0.5\n");
    }
}
