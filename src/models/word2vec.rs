use std::{collections::HashSet, io::ErrorKind, path::Path};

use burn::tensor::{backend::Backend, Data, Shape, Tensor};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader},
};

use crate::{
    pipelines::text_classification::vocabulary::Vocabulary, utils::files::read_lines,
};

/// Bound of the uniform initialization for words missing from the embedding file
pub const INIT_RANGE: f32 = 0.25;

/// Embedding Error
#[derive(thiserror::Error, Debug)]
pub enum EmbeddingError {
    /// The file could not be read
    #[error("unable to read embedding file: {0}")]
    Io(#[from] std::io::Error),

    /// The header line is not `<count> <dim>`
    #[error("malformed embedding header: {0:?}")]
    MalformedHeader(String),

    /// The vectors in the file have another dimensionality than the model
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The configured embedding dimension
        expected: usize,

        /// The dimension found in the file
        found: usize,
    },

    /// The file ends before all announced vectors were read
    #[error("embedding file truncated at word {0}")]
    Truncated(usize),

    /// A vector component is not a number
    #[error("invalid value {0:?} in embedding file")]
    InvalidValue(String),
}

/// An embedding matrix aligned with a vocabulary
#[derive(Clone, Debug)]
pub struct Matrix {
    /// Number of rows, equal to the vocabulary size
    pub rows: usize,

    /// Dimensionality of every row
    pub dim: usize,

    /// Row-major values
    pub values: Vec<f32>,

    /// Number of vocabulary words found in the embedding file
    pub found: usize,

    loaded: HashSet<usize>,
}

impl Matrix {
    /// A matrix with every row drawn uniformly from `[-INIT_RANGE, INIT_RANGE)`
    pub fn random(rows: usize, dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let values = (0..rows * dim)
            .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
            .collect();

        Self {
            rows,
            dim,
            values,
            found: 0,
            loaded: HashSet::new(),
        }
    }

    /// A single row
    pub fn row(&self, id: usize) -> &[f32] {
        &self.values[id * self.dim..(id + 1) * self.dim]
    }

    fn set_row(&mut self, id: usize, vector: &[f32]) {
        self.values[id * self.dim..(id + 1) * self.dim].copy_from_slice(vector);

        if self.loaded.insert(id) {
            self.found += 1;
        }
    }

    /// Copy the matrix into a `[rows, dim]` tensor
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        let data = Data::new(self.values.clone(), Shape::new([self.rows, self.dim]));

        Tensor::from_data(data.convert::<B::FloatElem>(), device)
    }
}

/// Build an embedding matrix for the vocabulary from a word2vec file.
///
/// Words found in the file take its vectors; every other row keeps a random
/// initialization so unseen words still train.
pub async fn load<P: AsRef<Path>>(
    vocabulary: &Vocabulary,
    path: P,
    binary: bool,
    dim: usize,
    seed: u64,
) -> Result<Matrix, EmbeddingError> {
    let mut matrix = Matrix::random(vocabulary.len(), dim, seed);

    if binary {
        let file = File::open(path.as_ref()).await?;
        read_binary(BufReader::new(file), vocabulary, &mut matrix).await?;
    } else {
        let lines = read_lines(path.as_ref()).await?;
        read_text(&lines, vocabulary, &mut matrix)?;
    }

    Ok(matrix)
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();

    let count = parts.next()?.parse().ok()?;
    let dim = parts.next()?.parse().ok()?;

    parts.next().is_none().then_some((count, dim))
}

fn check_dim(expected: usize, found: usize) -> Result<(), EmbeddingError> {
    if expected == found {
        Ok(())
    } else {
        Err(EmbeddingError::DimensionMismatch { expected, found })
    }
}

async fn read_binary<R: AsyncBufRead + Unpin>(
    mut reader: R,
    vocabulary: &Vocabulary,
    matrix: &mut Matrix,
) -> Result<(), EmbeddingError> {
    let mut header = String::new();
    reader.read_line(&mut header).await?;

    if !header.ends_with('\n') {
        return Err(EmbeddingError::MalformedHeader(header));
    }

    let (count, dim) = parse_header(&header)
        .ok_or_else(|| EmbeddingError::MalformedHeader(header.trim_end().to_string()))?;

    check_dim(matrix.dim, dim)?;

    let mut word_bytes = Vec::new();
    let mut vector_bytes = vec![0u8; dim * std::mem::size_of::<f32>()];
    let mut vector = vec![0f32; dim];

    for word_index in 0..count {
        word_bytes.clear();
        reader.read_until(b' ', &mut word_bytes).await?;

        if word_bytes.pop() != Some(b' ') {
            return Err(EmbeddingError::Truncated(word_index));
        }

        // Vectors may be followed by a newline before the next word
        let start = word_bytes
            .iter()
            .position(|&b| b != b'\n' && b != b'\r')
            .unwrap_or(word_bytes.len());
        let word = String::from_utf8_lossy(&word_bytes[start..]);

        reader
            .read_exact(&mut vector_bytes)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => EmbeddingError::Truncated(word_index),
                _ => EmbeddingError::Io(e),
            })?;

        for (value, chunk) in vector.iter_mut().zip(vector_bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let id = vocabulary.id(&word);
        if id != 0 {
            matrix.set_row(id, &vector);
        }
    }

    Ok(())
}

fn read_text(
    lines: &[String],
    vocabulary: &Vocabulary,
    matrix: &mut Matrix,
) -> Result<(), EmbeddingError> {
    let mut lines = lines.iter().peekable();

    if let Some((_, dim)) = lines.peek().and_then(|line| parse_header(line)) {
        check_dim(matrix.dim, dim)?;
        lines.next();
    }

    for line in lines {
        let mut parts = line.split_whitespace();

        let Some(word) = parts.next() else {
            continue;
        };

        let vector = parts
            .map(|v| {
                v.parse::<f32>()
                    .map_err(|_| EmbeddingError::InvalidValue(v.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_dim(matrix.dim, vector.len())?;

        let id = vocabulary.id(word);
        if id != 0 {
            matrix.set_row(id, &vector);
        }
    }

    Ok(())
}
