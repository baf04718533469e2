//! ANN search over the recipe embedding matrix.
//!
//! The corpus build step emits a row-major f32 matrix, one embedding per
//! recipe, positionally aligned with the metadata table. At startup the
//! matrix is loaded and an HNSW graph is constructed over it; both are
//! read-only for the process lifetime.

pub mod error;


pub use error::IndexError;

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use hnsw_rs::prelude::*;
use tracing::{debug, info};

/// Magic bytes identifying an embedding matrix file.
const MATRIX_MAGIC: &[u8; 4] = b"GGEM";

/// HNSW construction parameters. Recall matters more than build time here:
/// the graph is built once at startup over a corpus of at most a few
/// hundred thousand rows.
const MAX_NB_CONNECTION: usize = 16;
const MAX_LAYER: usize = 16;
const EF_CONSTRUCTION: usize = 200;
const EF_SEARCH_MIN: usize = 64;

/// Row-major f32 embedding matrix, the precomputed retrieval artifact.
///
/// File layout: `"GGEM"` magic, `u64` row count, `u32` dimension (both
/// little-endian), then `rows * dim` little-endian f32 values.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Reads a matrix file written by the corpus build step (or [`save`](Self::save)).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MATRIX_MAGIC {
            return Err(IndexError::BadMagic);
        }

        let mut rows_bytes = [0u8; 8];
        reader.read_exact(&mut rows_bytes)?;
        let rows = u64::from_le_bytes(rows_bytes) as usize;

        let mut dim_bytes = [0u8; 4];
        reader.read_exact(&mut dim_bytes)?;
        let dim = u32::from_le_bytes(dim_bytes) as usize;

        if dim == 0 {
            return Err(IndexError::ZeroDimension);
        }
        if rows == 0 {
            return Err(IndexError::Empty);
        }

        let mut data = vec![0f32; rows * dim];
        let mut buf = [0u8; 4];
        for value in data.iter_mut() {
            reader.read_exact(&mut buf)?;
            *value = f32::from_le_bytes(buf);
        }

        info!(
            path = %path.display(),
            rows,
            dim,
            "Embedding matrix loaded"
        );

        Ok(Self { data, rows, dim })
    }

    /// Writes the matrix in the on-disk layout consumed by [`load`](Self::load).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), IndexError> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MATRIX_MAGIC)?;
        writer.write_all(&(self.rows as u64).to_le_bytes())?;
        writer.write_all(&(self.dim as u32).to_le_bytes())?;
        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Builds a matrix from equal-length vectors.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        let rows = vectors.len();
        if rows == 0 {
            return Err(IndexError::Empty);
        }
        let dim = vectors[0].len();
        if dim == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(rows * dim);
        for vector in &vectors {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    got: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { data, rows, dim })
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.rows {
            return None;
        }
        let start = index * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// HNSW index over the recipe embeddings (L2 distance).
pub struct AnnIndex {
    hnsw: Hnsw<'static, f32, DistL2>,
    len: usize,
    dim: usize,
}

impl std::fmt::Debug for AnnIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnIndex")
            .field("len", &self.len)
            .field("dim", &self.dim)
            .finish()
    }
}

impl AnnIndex {
    /// Builds the search graph over a loaded matrix. Ids are the matrix row
    /// numbers, which keeps the index positionally aligned with the recipe
    /// table built from the same artifact set.
    pub fn build(matrix: &EmbeddingMatrix) -> Result<Self, IndexError> {
        let rows = matrix.rows();
        let dim = matrix.dim();
        if rows == 0 {
            return Err(IndexError::Empty);
        }

        debug!(rows, dim, "Building HNSW graph");

        let hnsw = Hnsw::<f32, DistL2>::new(
            MAX_NB_CONNECTION,
            rows,
            MAX_LAYER,
            EF_CONSTRUCTION,
            DistL2 {},
        );

        for row in 0..rows {
            // row() is in range by construction of the loop bound
            if let Some(vector) = matrix.row(row) {
                hnsw.insert_slice((vector, row));
            }
        }

        info!(rows, dim, "ANN index ready");

        Ok(Self {
            hnsw,
            len: rows,
            dim,
        })
    }

    /// Returns up to `top_n` `(row, distance)` pairs, nearest first. Fewer
    /// only when the index holds fewer vectors than requested.
    pub fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }

        let knbn = top_n.min(self.len);
        let ef = knbn.max(EF_SEARCH_MIN);
        let neighbours = self.hnsw.search(query, knbn, ef);

        Ok(neighbours
            .into_iter()
            .map(|n| (n.d_id, n.distance))
            .collect())
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}
