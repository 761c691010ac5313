use std::fmt::Debug;

use serde::Serialize;

/// A term with its tf-idf weight inside one group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedTerm<'a> {
    pub term: &'a str,
    /// raw count in the group
    pub n: u64,
    pub tf: f64,
    pub idf: f64,
    pub tf_idf: f64,
}

/// Ranked terms of one group
#[derive(Clone, Default, Serialize)]
pub struct TermHits<'a> {
    pub list: Vec<WeightedTerm<'a>>,
}

impl<'a> TermHits<'a> {
    pub fn new(list: Vec<WeightedTerm<'a>>) -> Self {
        TermHits { list }
    }

    /// Sort by descending weight, ties by term ascending
    pub fn sort_by_weight(&mut self) -> &mut Self {
        // Remove NaN weights
        self.list.retain(|w| !w.tf_idf.is_nan());
        self.list
            .sort_by(|a, b| b.tf_idf.total_cmp(&a.tf_idf).then_with(|| a.term.cmp(b.term)));
        self
    }

    /// Keep the first `n`
    pub fn truncate(&mut self, n: usize) -> &mut Self {
        self.list.truncate(n);
        self
    }

    pub fn terms(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.list.iter().map(|w| w.term)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl Debug for TermHits<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            // one term per line
            writeln!(f, "TermHits [")?;
            for w in &self.list {
                writeln!(f, "    {:?}: {:.6} (n: {})", w.term, w.tf_idf, w.n)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|w| (w.term, w.tf_idf)))
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(term: &str, tf_idf: f64) -> WeightedTerm<'_> {
        WeightedTerm { term, n: 1, tf: 1.0, idf: tf_idf, tf_idf }
    }

    #[test]
    fn sorts_descending_and_drops_nan() {
        let mut hits = TermHits::new(vec![w("b", 0.5), w("nan", f64::NAN), w("c", 0.9), w("a", 0.5)]);
        hits.sort_by_weight();
        assert_eq!(hits.terms().collect::<Vec<_>>(), vec!["c", "a", "b"]);

        hits.truncate(2);
        assert_eq!(hits.terms().collect::<Vec<_>>(), vec!["c", "a"]);
    }

    #[test]
    fn pretty_debug_lists_one_per_line() {
        let mut hits = TermHits::new(vec![w("tax", 0.25)]);
        hits.sort_by_weight();
        let pretty = format!("{hits:#?}");
        assert!(pretty.starts_with("TermHits ["));
        assert!(pretty.contains("\"tax\": 0.250000 (n: 1)"));
        assert_eq!(format!("{hits:?}"), "[(\"tax\", 0.25)]");
    }
}
