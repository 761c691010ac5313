use num::{Num, NumCast};
use serde::{Deserialize, Serialize};

use crate::{
    error::{PipelineError, Result, Stage},
    vectorizer::dtm::DocumentTermMatrix,
};

/// Compressed sparse row matrix
///
/// Row `r` owns `indices[indptr[r]..indptr[r + 1]]` and the matching `data`.
/// Column indices inside a row are ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix<N>
where
    N: Num + Copy,
{
    pub n_rows: usize,
    pub n_cols: usize,
    pub indptr: Vec<usize>,
    pub indices: Vec<u32>,
    pub data: Vec<N>,
}

impl<N> CsrMatrix<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// `(column, value)` pairs of row `r`
    pub fn row(&self, r: usize) -> impl Iterator<Item = (u32, N)> + '_ {
        let (start, end) = match (self.indptr.get(r), self.indptr.get(r + 1)) {
            (Some(&s), Some(&e)) => (s, e),
            _ => (0, 0),
        };
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.data[start..end].iter().copied())
    }

    /// Value at `(r, c)`, zero when not stored
    pub fn get(&self, r: usize, c: u32) -> N {
        self.row(r)
            .find(|&(idx, _)| idx == c)
            .map_or_else(N::zero, |(_, v)| v)
    }
}

impl DocumentTermMatrix {
    /// Export the counts as a CSR matrix, rows in matrix order
    ///
    /// # Errors
    /// * `InvalidConfig` - a count does not fit into `N`
    pub fn to_csr<N>(&self) -> Result<CsrMatrix<N>>
    where
        N: Num + Copy + NumCast,
    {
        let mut indptr = Vec::with_capacity(self.n_docs() + 1);
        let mut indices = Vec::with_capacity(self.nnz());
        let mut data = Vec::with_capacity(self.nnz());
        indptr.push(0);
        for (id, row) in self.rows() {
            for (idx, count) in row.iter() {
                let value = N::from(count).ok_or_else(|| PipelineError::InvalidConfig {
                    stage: Stage::Classify,
                    message: format!("count {count} of document {id} does not fit the numeric type"),
                })?;
                indices.push(idx);
                data.push(value);
            }
            indptr.push(indices.len());
        }
        Ok(CsrMatrix {
            n_rows: self.n_docs(),
            n_cols: self.n_terms(),
            indptr,
            indices,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::AnalyzedDocument, document::DocId, vectorizer::term::TermFrequency};

    fn dtm() -> DocumentTermMatrix {
        let docs = [("a", &["x", "y", "y"][..]), ("b", &["z"][..])];
        DocumentTermMatrix::from_documents(docs.iter().map(|(id, terms)| AnalyzedDocument {
            id: DocId::from(*id),
            terms: TermFrequency::from(*terms),
        }))
        .unwrap()
    }

    #[test]
    fn layout_matches_rows() {
        let csr: CsrMatrix<f64> = dtm().to_csr().unwrap();
        assert_eq!(csr.n_rows, 2);
        assert_eq!(csr.n_cols, 3);
        assert_eq!(csr.indptr, vec![0, 2, 3]);
        assert_eq!(csr.indices, vec![0, 1, 2]);
        assert_eq!(csr.data, vec![1.0, 2.0, 1.0]);
        assert_eq!(csr.get(0, 1), 2.0);
        assert_eq!(csr.get(1, 0), 0.0);
        assert_eq!(csr.get(7, 0), 0.0);
        assert_eq!(csr.row(1).collect::<Vec<_>>(), vec![(2, 1.0)]);
    }

    #[test]
    fn narrow_types_fail_on_overflow() {
        let mut terms = TermFrequency::new();
        for _ in 0..300 {
            terms.add_term("many");
        }
        let dtm = DocumentTermMatrix::from_documents([AnalyzedDocument {
            id: DocId::from("big"),
            terms,
        }])
        .unwrap();
        assert!(dtm.to_csr::<u16>().is_ok());
        let err = dtm.to_csr::<u8>().unwrap_err();
        assert_eq!(err.stage(), Stage::Classify);
    }
}
