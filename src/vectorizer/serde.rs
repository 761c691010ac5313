use std::{
    collections::HashSet,
    io::{Read, Write},
};

use ahash::RandomState;
use tracing::{debug, warn};

use crate::{
    error::{PipelineError, Result, Stage},
    vectorizer::dtm::{DocumentTermMatrix, SparseRow},
};

/// CBOR snapshots of a document-term matrix
///
/// The vocabulary, rows, document frequencies and excluded ids are all
/// stored, so a restored matrix compares equal to the original. Decoded
/// snapshots are checked before use and document frequencies are recomputed
/// from the rows.
impl DocumentTermMatrix {
    /// Serialize into a CBOR byte buffer
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let bytes = serde_cbor::to_vec(self)?;
        debug!(bytes = bytes.len(), "matrix snapshot written");
        Ok(bytes)
    }

    /// Restore from a buffer produced by `to_cbor`
    ///
    /// # Errors
    /// * `Snapshot` - not a CBOR matrix
    /// * `InvalidSnapshot` - decoded, but the matrix is malformed
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let decoded: DocumentTermMatrix = serde_cbor::from_slice(bytes)?;
        decoded.into_checked()
    }

    /// Stream a snapshot into `writer`
    pub fn write_cbor<W: Write>(&self, writer: W) -> Result<()> {
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    /// Read a snapshot from `reader`
    pub fn read_cbor<R: Read>(reader: R) -> Result<Self> {
        let decoded: DocumentTermMatrix = serde_cbor::from_reader(reader)?;
        decoded.into_checked()
    }

    fn into_checked(self) -> Result<Self> {
        let invalid = |message: String| {
            warn!(%message, "rejecting matrix snapshot");
            PipelineError::InvalidSnapshot { stage: Stage::Vectorize, message }
        };

        let terms: Vec<&str> = self.vocabulary.iter().collect();
        if let Some(pair) = terms.windows(2).find(|w| w[0] >= w[1]) {
            return Err(invalid(format!(
                "vocabulary is not strictly sorted at {:?}, {:?}",
                pair[0], pair[1]
            )));
        }

        let n_terms = self.vocabulary.len();
        for (id, row) in &self.rows {
            check_row(row, n_terms).map_err(|reason| invalid(format!("row {id}: {reason}")))?;
        }

        let mut excluded: HashSet<_, RandomState> = HashSet::default();
        for id in &self.excluded {
            if self.rows.contains_key(id) || !excluded.insert(id) {
                return Err(invalid(format!("excluded document {id} is listed twice")));
            }
        }

        let DocumentTermMatrix { vocabulary, rows, excluded, .. } = self;
        Ok(DocumentTermMatrix::from_parts(vocabulary, rows, excluded))
    }
}

fn check_row(row: &SparseRow, n_terms: usize) -> std::result::Result<(), String> {
    let (indices, counts) = (row.indices(), row.counts());
    if indices.len() != counts.len() {
        return Err(format!("{} indices but {} counts", indices.len(), counts.len()));
    }
    if indices.windows(2).any(|w| w[0] >= w[1]) {
        return Err("column indices are not strictly ascending".to_string());
    }
    if let Some(&idx) = indices.iter().find(|&&idx| idx as usize >= n_terms) {
        return Err(format!("column {idx} outside a vocabulary of {n_terms}"));
    }
    if counts.contains(&0) {
        return Err("stored zero count".to_string());
    }
    Ok(())
}
