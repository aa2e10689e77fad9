use log::debug;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Where check diagnostics go: the file at `path`, or stdout if there is none
pub fn create_file_or_stdout<P>(path: Option<P>) -> io::Result<Box<dyn Write>>
where
    P: AsRef<Path>,
{
    match path {
        Some(p) => {
            debug!("writing report to {}", p.as_ref().display());
            File::create(p.as_ref()).map(|f| Box::new(BufWriter::new(f)) as Box<dyn Write>)
        }
        None => Ok(Box::new(io::stdout()) as Box<dyn Write>),
    }
}
