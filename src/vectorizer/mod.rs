pub mod corpus;
pub mod csr;
pub mod dtm;
pub mod hits;
pub mod serde;
pub mod sparsity;
pub mod term;
pub mod tfidf;
pub mod vocabulary;
