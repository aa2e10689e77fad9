use crate::dataset::{Dataset, DatasetError};
use crate::selector::Selector;
use log::trace;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no dataset named <{0}> in the output")]
    NoDataset(String),
    #[error("couldn't select {selector}")]
    Select {
        selector: String,
        #[source]
        cause: DatasetError,
    },
    #[error("dataset <{0}> is not numeric")]
    NotNumeric(String),
    #[error("couldn't open output file <{path}>")]
    Open {
        path: PathBuf,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("couldn't read dataset <{name}>")]
    Read {
        name: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("reading <{0}> needs HDF5 support; rebuild with the default `hdf5` feature")]
    Unsupported(PathBuf),
}

/// Anything simulation output can be read from
pub trait OutputSource {
    /// Read the whole dataset at `name` (group paths separated by '/')
    fn dataset(&self, name: &str) -> Result<Dataset, SourceError>;

    /// Human readable origin of the data, for diagnostics
    fn describe(&self) -> String;

    /// Look up the single value that `sel` points at
    fn scalar(&self, sel: &Selector) -> Result<f64, SourceError> {
        let ds = self.dataset(&sel.name)?;
        trace!("{} has shape {:?}", &sel.name, ds.shape());
        ds.get(sel).map_err(|cause| SourceError::Select {
            selector: sel.to_string(),
            cause,
        })
    }
}

impl<S: OutputSource + ?Sized> OutputSource for Box<S> {
    fn dataset(&self, name: &str) -> Result<Dataset, SourceError> {
        (**self).dataset(name)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Output held in memory, keyed by dataset path
#[derive(Debug, Default, Clone)]
pub struct MemOutput {
    label: String,
    datasets: BTreeMap<String, Dataset>,
}

impl MemOutput {
    pub fn new<L: Into<String>>(label: L) -> Self {
        MemOutput {
            label: label.into(),
            datasets: BTreeMap::new(),
        }
    }

    pub fn insert<N: Into<String>>(&mut self, name: N, ds: Dataset) -> &mut Self {
        self.datasets.insert(name.into(), ds);
        self
    }

    pub fn with<N: Into<String>>(mut self, name: N, ds: Dataset) -> Self {
        self.insert(name, ds);
        self
    }
}

impl OutputSource for MemOutput {
    fn dataset(&self, name: &str) -> Result<Dataset, SourceError> {
        self.datasets
            .get(name.trim_start_matches('/'))
            .cloned()
            .ok_or_else(|| SourceError::NoDataset(name.to_string()))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
