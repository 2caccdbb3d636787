use crate::error::{LingamError, Result};
use log::debug;
use nalgebra::DMatrix;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fully written contents waiting in a sibling temporary file.
/// Dropping it without `commit` removes the temporary file and leaves `path` untouched.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    tmp: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temporary file over the destination
    pub fn commit(self) -> Result<()> {
        let path = self.path;
        self.tmp.persist(&path).map_err(|e| LingamError::io(&path, e.error))?;
        debug!("Committed {}", path.display());
        Ok(())
    }
}

/// Write `path`'s future contents into a temporary file in the same directory
pub fn stage<F>(path: impl AsRef<Path>, fill: F) -> Result<StagedFile>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| LingamError::io(path, e))?;
    fill(&mut tmp).map_err(|e| LingamError::io(path, e))?;
    tmp.flush().map_err(|e| LingamError::io(path, e))?;
    tmp.as_file().sync_all().map_err(|e| LingamError::io(path, e))?;
    Ok(StagedFile { path: path.to_path_buf(), tmp })
}

/// Write through a sibling temporary file, then rename over `path`
pub fn write_atomic<F>(path: impl AsRef<Path>, fill: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> std::io::Result<()>,
{
    stage(path, fill)?.commit()
}

/// Stage a matrix as comma-separated rows, no header, no row index
pub fn stage_matrix(path: impl AsRef<Path>, matrix: &DMatrix<f64>) -> Result<StagedFile> {
    let path = path.as_ref();
    let staged = stage(path, |file| {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        for row in matrix.row_iter() {
            writer
                .write_record(row.iter().map(|v| v.to_string()))
                .map_err(std::io::Error::from)?;
        }
        writer.flush()
    })?;
    debug!("Staged {}x{} matrix for {}", matrix.nrows(), matrix.ncols(), path.display());
    Ok(staged)
}

/// Stage a causal order as a single comma-separated row of variable indices
pub fn stage_order(path: impl AsRef<Path>, order: &[usize]) -> Result<StagedFile> {
    stage(path, |file| {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(order.iter().map(|v| v.to_string()))
            .map_err(std::io::Error::from)?;
        writer.flush()
    })
}

pub fn write_matrix(path: impl AsRef<Path>, matrix: &DMatrix<f64>) -> Result<()> {
    stage_matrix(path, matrix)?.commit()
}

pub fn write_order(path: impl AsRef<Path>, order: &[usize]) -> Result<()> {
    stage_order(path, order)?.commit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_matrix;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let m = DMatrix::from_row_slice(3, 3, &[0.0, 1.25, 0.0, 0.0, 0.0, -0.3333333333333333, 1e-12, 0.0, 0.0]);
        write_matrix(&path, &m).unwrap();

        let back = load_matrix(&path).unwrap();
        assert_eq!(back.shape(), (3, 3));
        for (a, b) in m.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_format_has_no_header_or_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        write_matrix(&path, &DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 0.0, 0.0])).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "0,0.5\n0,0\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        std::fs::write(&path, "stale contents that are longer than the new ones\n").unwrap();
        write_matrix(&path, &DMatrix::from_row_slice(1, 1, &[2.0])).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2\n");
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("result.csv");
        let result = write_matrix(&path, &DMatrix::zeros(2, 2));
        assert!(matches!(result, Err(LingamError::Io { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.csv");
        write_order(&path, &[2, 0, 1]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2,0,1\n");
    }

    #[test]
    fn test_staged_file_appears_only_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");

        let staged = stage_matrix(&path, &DMatrix::from_row_slice(1, 2, &[0.0, 1.5])).unwrap();
        assert_eq!(staged.path(), path.as_path());
        assert!(!path.exists());
        staged.commit().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0,1.5\n");

        // dropped without commit: destination and directory are untouched
        let other = dir.path().join("order.csv");
        drop(stage_order(&other, &[1, 0]).unwrap());
        assert!(!other.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_matrix(dir.path().join("a.csv"), &DMatrix::zeros(1, 1)).unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
