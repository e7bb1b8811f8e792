//! The catalog of model-selection criteria.
//!
//! PLTB scores every candidate substitution model under a fixed set of
//! information criteria. Each criterion is a `Selector`; the `Gtr` variant is
//! a sentinel for trees that are carried along as the GTR baseline rather
//! than chosen by any criterion. The declaration order below defines the
//! total order used everywhere (canonical pair keys, table columns), so new
//! variants must be appended with care.

use std::fmt;

/// Model string of the general time-reversible model, e.g. as printed in a
/// PLTB report header.
pub const GTR_MODEL: &str = "012345";

/// Human-facing name of the GTR baseline.
pub const GTR_LABEL: &str = "GTR";

/// Report label used when a tree is included only as the GTR baseline.
pub const GTR_SELECTOR_LABEL: &str = "extra";

/// An information criterion, ordered by declaration rank.
///
/// `Ord` follows the declaration order, not the label text, so `Aic <
/// BicS` even though "AIC" > "BIC-S" lexically. `Gtr` sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Selector {
    Aic,
    AiccS,
    AiccM,
    BicS,
    BicM,
    /// Sentinel for the forced GTR baseline, not a real criterion.
    Gtr,
}

impl Selector {
    /// All selectors in rank order.
    pub const ALL: [Selector; 6] = [
        Selector::Aic,
        Selector::AiccS,
        Selector::AiccM,
        Selector::BicS,
        Selector::BicM,
        Selector::Gtr,
    ];

    /// The label as it appears in a PLTB report header.
    pub fn label(self) -> &'static str {
        match self {
            Selector::Aic => "AIC",
            Selector::AiccS => "AICc-S",
            Selector::AiccM => "AICc-M",
            Selector::BicS => "BIC-S",
            Selector::BicM => "BIC-M",
            Selector::Gtr => GTR_SELECTOR_LABEL,
        }
    }

    /// Map an exact report label back to its selector.
    pub fn from_label(label: &str) -> Option<Selector> {
        Selector::ALL.iter().copied().find(|s| s.label() == label)
    }

    /// Filesystem-safe token: lowercase, spaces and hyphens removed.
    /// Unique per selector, used to build output file names.
    pub fn serialize(self) -> String {
        self.label()
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect::<String>()
            .to_lowercase()
    }

    /// Whether this is the GTR baseline sentinel.
    pub fn is_sentinel(self) -> bool {
        self == Selector::Gtr
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_wins_over_lexical_order() {
        assert!(Selector::Aic < Selector::AiccS);
        assert!(Selector::AiccM < Selector::BicS);
        // "BIC-M" < "extra" lexically too, but the point is rank:
        assert!(Selector::BicM < Selector::Gtr);
        let mut shuffled = vec![Selector::Gtr, Selector::BicS, Selector::Aic];
        shuffled.sort();
        assert_eq!(shuffled, vec![Selector::Aic, Selector::BicS, Selector::Gtr]);
    }

    #[test]
    fn serialize_tokens_are_unique_and_flat() {
        let tokens: Vec<String> = Selector::ALL.iter().map(|s| s.serialize()).collect();
        assert_eq!(tokens, ["aic", "aiccs", "aiccm", "bics", "bicm", "extra"]);
        for t in &tokens {
            assert!(t.chars().all(|c| c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn labels_round_trip() {
        for s in Selector::ALL {
            assert_eq!(Selector::from_label(s.label()), Some(s));
        }
        assert_eq!(Selector::from_label("AICC-S"), None);
        assert_eq!(Selector::from_label(""), None);
    }
}
