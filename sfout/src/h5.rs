use crate::dataset::Dataset;
use crate::source::{OutputSource, SourceError};
use hdf5::types::TypeDescriptor;
use log::debug;
use std::path::{Path, PathBuf};

/// A SFINCS HDF5 output file, opened read-only
pub struct H5Output {
    path: PathBuf,
    file: hdf5::File,
}

impl H5Output {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let file = hdf5::File::open(&path).map_err(|e| SourceError::Open {
            path: path.clone(),
            cause: e.to_string().into(),
        })?;
        debug!("opened {}", path.display());

        Ok(H5Output { path, file })
    }
}

impl OutputSource for H5Output {
    fn dataset(&self, name: &str) -> Result<Dataset, SourceError> {
        let read_err = |e: hdf5::Error| SourceError::Read {
            name: name.to_string(),
            cause: e.to_string().into(),
        };

        let ds = self
            .file
            .dataset(name)
            .map_err(|_| SourceError::NoDataset(name.to_string()))?;

        match ds.dtype().and_then(|t| t.to_descriptor()).map_err(read_err)? {
            TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) | TypeDescriptor::Float(_) => (),
            _ => return Err(SourceError::NotNumeric(name.to_string())),
        }

        // Integer datasets are converted by the library on read
        let data = ds.read_raw::<f64>().map_err(read_err)?;

        Dataset::new(ds.shape(), data).map_err(|e| SourceError::Read {
            name: name.to_string(),
            cause: Box::new(e),
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
