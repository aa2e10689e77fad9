use crate::selector::Selector;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("shape {shape:?} holds {expected} elements but {actual} values were given")]
    Size {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("{given} indices given for a rank {rank} dataset")]
    TooManyIndices { given: usize, rank: usize },
    #[error("{given} indices given for a rank {rank} dataset; add ';;;' to take the remaining axes at 0")]
    TooFewIndices { given: usize, rank: usize },
    #[error("index {index} is out of bounds for axis {axis} with extent {extent}")]
    OutOfBounds {
        axis: usize,
        index: usize,
        extent: usize,
    },
    #[error("dataset has {0} elements; select one with [i,j,...]")]
    NotScalar(usize),
}

/// A numeric array read from a simulation output file, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Dataset {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, DatasetError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(DatasetError::Size {
                shape,
                expected,
                actual: data.len(),
            });
        }

        Ok(Dataset { shape, data })
    }

    /// Rank-0 dataset holding one value
    pub fn scalar(value: f64) -> Self {
        Dataset {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolve `sel` against this dataset's shape and return the element
    pub fn get(&self, sel: &Selector) -> Result<f64, DatasetError> {
        if sel.is_bare() {
            return match self.data.as_slice() {
                [only] => Ok(*only),
                other => Err(DatasetError::NotScalar(other.len())),
            };
        }

        let rank = self.rank();
        let given = sel.indices.len();
        if given > rank {
            return Err(DatasetError::TooManyIndices { given, rank });
        }
        if given < rank && !sel.fill {
            return Err(DatasetError::TooFewIndices { given, rank });
        }

        let mut offset = 0;
        for (axis, &extent) in self.shape.iter().enumerate() {
            let index = sel.indices.get(axis).copied().unwrap_or(0);
            if index >= extent {
                return Err(DatasetError::OutOfBounds {
                    axis,
                    index,
                    extent,
                });
            }
            offset = offset * extent + index;
        }

        Ok(self.data[offset])
    }
}
