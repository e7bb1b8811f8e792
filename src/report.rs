//! Reading and parsing PLTB result reports.
//!
//! A report is plain text. Everything up to and including the first
//! `Tree search...` line is preamble. After that, each candidate tree
//! occupies exactly two lines:
//!
//! ```text
//! # Model 012345 [newick] (AIC, BIC-S)
//! ((A,B),(C,D));
//! ```
//!
//! The header names the substitution model (six digits, `0`-`5`) and the
//! selectors that chose it; the next line is the raw newick string, which
//! this crate treats as opaque data. The first line that is not a valid
//! header ends the tree block.

use std::fs;
use std::path::Path;

use crate::error::EvalError;
use crate::selector::{GTR_MODEL, Selector};

/// One candidate tree from a single PLTB run.
///
/// Read-only after parsing; aggregation passes that need the GTR sentinel
/// attached work on a derived selector view instead of mutating `ics`
/// (see [`crate::aggregate::selector_views`]).
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEntry {
    /// Six-digit substitution model string, e.g. "012345" for GTR.
    pub model: String,
    /// Selectors that chose this model, in order of appearance.
    pub ics: Vec<Selector>,
    /// Verbatim newick string, trailing whitespace stripped. Opaque here.
    pub newick: String,
}

/// Parse one report, reading it from `path`.
///
/// The file name reported in errors is the path as given.
pub fn parse_report_file<P: AsRef<Path>>(
    path: P,
    requires_gtr: bool,
) -> Result<Vec<TreeEntry>, EvalError> {
    let name = path.as_ref().display().to_string();
    let content = fs::read_to_string(path.as_ref())?;
    parse_report(&name, &content, requires_gtr)
}

/// Parse the content of one report.
///
/// Returns the tree entries in report order. With `requires_gtr`, the entry
/// carrying the GTR model string must exist and is moved to index 0; the
/// relative order of all other entries is preserved.
///
/// # Errors
/// `EvalError::Parse`, always naming `file`, when the `Tree search` marker is
/// missing, a header has no following tree line, a selector token is not in
/// the catalog, no tree was found at all, or (with `requires_gtr`) no entry
/// has the GTR model.
pub fn parse_report(
    file: &str,
    content: &str,
    requires_gtr: bool,
) -> Result<Vec<TreeEntry>, EvalError> {
    let mut lines = content
        .lines()
        .skip_while(|line| !line.starts_with("Tree search"));
    if lines.next().is_none() {
        return Err(EvalError::parse(file, "no tree searches have been conducted"));
    }

    let mut trees = Vec::new();
    while let Some(head) = lines.next() {
        // A non-header line ends the contiguous tree block.
        let Some((model, group)) = split_header(head) else {
            break;
        };
        let newick = lines
            .next()
            .ok_or_else(|| EvalError::parse(file, format!("{model} has no tree")))?
            .trim_end();
        let ics = parse_selector_group(file, group)?;
        trees.push(TreeEntry {
            model: model.to_string(),
            ics,
            newick: newick.to_string(),
        });
    }

    if trees.is_empty() {
        return Err(EvalError::parse(file, "no tree found"));
    }

    if requires_gtr {
        let pos = trees
            .iter()
            .position(|t| t.model == GTR_MODEL)
            .ok_or_else(|| EvalError::parse(file, "no tree found for GTR"))?;
        let gtr = trees.remove(pos);
        trees.insert(0, gtr);
    }

    Ok(trees)
}

/// Match `# Model <6 digits of 0-5> [newick] (<group>)` and return the model
/// string and the raw selector group. `None` means "not a header line".
fn split_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("# Model ")?;
    let (model, rest) = rest.split_at_checked(6)?;
    if !model.bytes().all(|b| (b'0'..=b'5').contains(&b)) {
        return None;
    }
    let group = rest
        .strip_prefix(" [newick] (")?
        .strip_suffix(')')?;
    // Same character class the report writer produces; anything else means
    // this is not a header line.
    if !group
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == ',' || c == '-' || c.is_whitespace())
    {
        return None;
    }
    Some((model, group))
}

/// Split the header's selector group on `", "` and resolve each token.
/// An empty group yields an empty list; an unknown token is a hard error.
fn parse_selector_group(file: &str, group: &str) -> Result<Vec<Selector>, EvalError> {
    if group.is_empty() {
        return Ok(Vec::new());
    }
    group
        .split(", ")
        .map(|token| {
            Selector::from_label(token)
                .ok_or_else(|| EvalError::parse(file, format!("unknown selector '{token}'")))
        })
        .collect()
}
