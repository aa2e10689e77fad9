//! # sfout
//! Reading diagnostic values out of SFINCS simulation output.
//!
//! Values are addressed with selectors such as `FSABFlow[0,0;;;]`: a
//! dataset name and the indices of the element to read. See `Selector`
//! for the notation.
mod dataset;
#[cfg(feature = "hdf5")]
mod h5;
mod selector;
mod source;

pub use crate::dataset::{Dataset, DatasetError};
#[cfg(feature = "hdf5")]
pub use crate::h5::H5Output;
pub use crate::selector::{Selector, SelectorError};
pub use crate::source::{MemOutput, OutputSource, SourceError};

use std::path::Path;

/// Name of the output file SFINCS writes into the run directory
pub const DEFAULT_OUTPUT: &str = "sfincsOutput.h5";

/// Open a simulation output file for reading
#[cfg(feature = "hdf5")]
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn OutputSource>, SourceError> {
    H5Output::open(path).map(|o| Box::new(o) as Box<dyn OutputSource>)
}

/// Open a simulation output file for reading
#[cfg(not(feature = "hdf5"))]
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn OutputSource>, SourceError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SourceError::Open {
            path: path.to_path_buf(),
            cause: "no such file".into(),
        });
    }

    Err(SourceError::Unsupported(path.to_path_buf()))
}
