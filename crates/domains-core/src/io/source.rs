use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DomainsError, Result};
use crate::frame::{Calibration, ImageStack};

use super::ser::SerReader;

/// One decoded stack, or the error that kept an input from decoding,
/// tagged with the title it was imported under.
pub type StackEntry = (String, Result<ImageStack>);

/// Supplies the decoded stacks of one batch, in processing order.
///
/// An error returned from either method aborts the whole batch.
pub trait StackSource {
    fn load_stacks(&self) -> Result<Vec<ImageStack>>;

    /// Like [`load_stacks`](Self::load_stacks), but inputs that fail to
    /// decode are reported per entry instead of failing the batch.
    fn load_entries(&self) -> Result<Vec<StackEntry>> {
        Ok(self
            .load_stacks()?
            .into_iter()
            .map(|stack| (stack.title.clone(), Ok(stack)))
            .collect())
    }
}

impl<F> StackSource for F
where
    F: Fn() -> Result<Vec<ImageStack>>,
{
    fn load_stacks(&self) -> Result<Vec<ImageStack>> {
        self()
    }
}

/// SER video files, one stack per file.
///
/// Titles take the `"{file name} - {file stem}"` form, so the file stem is
/// both the output stem and the metadata segment.
#[derive(Clone, Debug)]
pub struct SerSource {
    pub paths: Vec<PathBuf>,
    /// SER files carry no pixel size, so it is supplied by the caller.
    pub calibration: Calibration,
}

impl SerSource {
    pub fn new(paths: Vec<PathBuf>, calibration: Calibration) -> Self {
        Self { paths, calibration }
    }

    /// Expand directories into the `.ser` files they contain (sorted by
    /// name); plain file paths are kept as given.
    pub fn expand(inputs: &[PathBuf], calibration: Calibration) -> Result<Self> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                let mut found: Vec<PathBuf> = std::fs::read_dir(input)
                    .map_err(|e| DomainsError::Import(format!("{}: {e}", input.display())))?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| is_ser(p))
                    .collect();
                found.sort();
                paths.extend(found);
            } else {
                paths.push(input.clone());
            }
        }
        if paths.is_empty() {
            return Err(DomainsError::Import("no SER files found".into()));
        }
        Ok(Self::new(paths, calibration))
    }
}

impl SerSource {
    fn decode(&self, path: &Path) -> StackEntry {
        let title = ser_title(path);
        let stack = SerReader::open(path)
            .and_then(|reader| reader.read_stack(&title, self.calibration.clone()))
            .map_err(|e| DomainsError::Import(format!("{}: {e}", path.display())));
        match &stack {
            Ok(stack) => info!(
                path = %path.display(),
                frames = stack.frame_count(),
                "Decoded SER stack"
            ),
            Err(error) => warn!(path = %path.display(), %error, "Could not decode SER file"),
        }
        (title, stack)
    }
}

impl StackSource for SerSource {
    fn load_stacks(&self) -> Result<Vec<ImageStack>> {
        self.paths.iter().map(|path| self.decode(path).1).collect()
    }

    /// Fails only when no file at all could be decoded.
    fn load_entries(&self) -> Result<Vec<StackEntry>> {
        let entries: Vec<StackEntry> = self.paths.iter().map(|path| self.decode(path)).collect();
        if !entries.is_empty() && entries.iter().all(|(_, stack)| stack.is_err()) {
            return Err(DomainsError::Import(format!(
                "none of {} SER file(s) could be decoded",
                entries.len()
            )));
        }
        Ok(entries)
    }
}

fn ser_title(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{name} - {stem}")
}

fn is_ser(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ser"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ser_title_form() {
        assert_eq!(
            ser_title(Path::new("/data/cellA_di8.ser")),
            "cellA_di8.ser - cellA_di8"
        );
    }

    #[test]
    fn test_closure_source() {
        let source = || -> Result<Vec<ImageStack>> { Ok(Vec::new()) };
        assert!(source.load_stacks().unwrap().is_empty());
    }

    #[test]
    fn test_entries_carry_stack_titles() {
        let source = || -> Result<Vec<ImageStack>> {
            let frames = vec![ndarray::Array2::zeros((2, 2))];
            Ok(vec![ImageStack::new("s.lif - a_b", frames, 8, Calibration::default())])
        };
        let entries = source.load_entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "s.lif - a_b");
        assert!(entries[0].1.is_ok());
    }
}
