//! File selection: normalise the two ways a user hands us a file.
//!
//! A file arrives either through a picker (a list of chosen files) or through
//! a drag-and-drop gesture. Both collapse into one canonical
//! [`SelectedFile`]: only the first file is honoured, and nothing is rejected
//! on extension. The conversion service decides what it can parse;
//! [`ACCEPTED_EXTENSIONS`] is only a hint for pickers and for CLI warnings.

use crate::error::File2JsonError;
use bytes::Bytes;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions the conversion service is known to handle. Advisory only.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    ".pdf", ".pptx", ".xlsx", ".xls", ".xlsm", ".csv", ".docx", ".xml", ".txt", ".log",
];

/// Advertised upload limit in bytes (100 MB). Never enforced client-side.
pub const MAX_ADVISORY_SIZE: u64 = 100 * 1024 * 1024;

/// Where the bytes of a [`SelectedFile`] live.
#[derive(Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Read from disk at upload time.
    Path(PathBuf),
    /// Already in memory. Cloning shares the buffer.
    Memory(Bytes),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            FileSource::Memory(b) => write!(f, "Memory(<{} bytes>)", b.len()),
        }
    }
}

/// An immutable reference to a user-chosen file.
///
/// Never mutated after creation; a new selection replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    size: u64,
    source: FileSource,
}

impl SelectedFile {
    /// Select a file on disk, recording its name and size.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, File2JsonError> {
        let path = path.as_ref().to_path_buf();
        let meta = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::NotFound => File2JsonError::FileNotFound { path },
                    ErrorKind::PermissionDenied => File2JsonError::PermissionDenied { path },
                    _ => File2JsonError::Io { path, source: e },
                });
            }
        };
        if !meta.is_file() {
            return Err(File2JsonError::NotAFile { path });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| File2JsonError::NotAFile { path: path.clone() })?;

        Ok(Self {
            name,
            size: meta.len(),
            source: FileSource::Path(path),
        })
    }

    /// Select an in-memory blob under the given file name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

/// The files a picker reported on change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerInput {
    pub files: Vec<SelectedFile>,
}

impl PickerInput {
    pub fn new(files: Vec<SelectedFile>) -> Self {
        Self { files }
    }
}

/// A drag gesture over the drop zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    /// Pointer is hovering with a payload.
    Over,
    /// Pointer left the drop zone.
    Leave,
    /// Payload released over the drop zone.
    Drop { files: Vec<SelectedFile> },
}

impl DragEvent {
    /// Whether the platform's default handling must be suppressed.
    ///
    /// Without suppressing `Over`, most platforms never deliver `Drop`.
    pub fn suppresses_default(&self) -> bool {
        matches!(self, DragEvent::Over | DragEvent::Drop { .. })
    }
}

/// Take the first file a picker reported, if any.
pub fn select_from_picker(input: PickerInput) -> Option<SelectedFile> {
    let count = input.files.len();
    let first = input.files.into_iter().next();
    if count > 1 {
        debug!("Picker reported {count} files; only the first is used");
    }
    first
}

/// Take the first dropped file, if the event is a drop carrying any.
pub fn select_from_drop(event: &DragEvent) -> Option<SelectedFile> {
    match event {
        DragEvent::Drop { files } => {
            if files.len() > 1 {
                debug!("Drop carried {} files; only the first is used", files.len());
            }
            files.first().cloned()
        }
        DragEvent::Over | DragEvent::Leave => None,
    }
}

/// Lower-cased final extension of `name` including the dot, e.g. `".pdf"`.
///
/// A leading dot alone (`.bashrc`) or a trailing dot (`notes.`) is not an
/// extension.
pub fn file_extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Whether `name` has one of the [`ACCEPTED_EXTENSIONS`].
pub fn is_accepted_hint(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Human-readable size: bytes below 1 KiB, then KB / MB with two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn blob(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, b"hello".to_vec())
    }

    #[test]
    fn picker_takes_first_file_only() {
        let input = PickerInput::new(vec![blob("a.pdf"), blob("b.csv")]);
        assert_eq!(select_from_picker(input).unwrap().name(), "a.pdf");
        assert!(select_from_picker(PickerInput::default()).is_none());
    }

    #[test]
    fn drop_takes_first_file_only() {
        let ev = DragEvent::Drop {
            files: vec![blob("x.xml"), blob("y.log")],
        };
        assert_eq!(select_from_drop(&ev).unwrap().name(), "x.xml");
        assert!(select_from_drop(&DragEvent::Drop { files: vec![] }).is_none());
        assert!(select_from_drop(&DragEvent::Over).is_none());
    }

    #[test]
    fn unsupported_extensions_are_still_selected() {
        let ev = DragEvent::Drop {
            files: vec![blob("movie.mkv")],
        };
        let file = select_from_drop(&ev).unwrap();
        assert!(!is_accepted_hint(file.name()));
    }

    #[test]
    fn drag_default_suppression() {
        assert!(DragEvent::Over.suppresses_default());
        assert!(DragEvent::Drop { files: vec![] }.suppresses_default());
        assert!(!DragEvent::Leave.suppresses_default());
    }

    #[test]
    fn accepted_hint_is_case_insensitive() {
        assert!(is_accepted_hint("Budget.XLSX"));
        assert!(is_accepted_hint("server.log"));
        assert!(!is_accepted_hint("archive.zip"));
    }

    #[test]
    fn extension_detection() {
        assert_eq!(file_extension("Report.PDF").as_deref(), Some(".pdf"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".bashrc"), None);
        assert_eq!(file_extension("notes."), None);
        assert!(!is_accepted_hint("report.pdf."));
        assert!(!is_accepted_hint(".log"));
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn from_path_records_name_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"a,b\n1,2\n").unwrap();

        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "data.csv");
        assert_eq!(file.size(), 8);
        assert_eq!(file.source(), &FileSource::Path(path));
    }

    #[test]
    fn from_path_rejects_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SelectedFile::from_path(dir.path().join("nope.pdf")),
            Err(File2JsonError::FileNotFound { .. })
        ));
        assert!(matches!(
            SelectedFile::from_path(dir.path()),
            Err(File2JsonError::NotAFile { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn from_path_reports_other_io_errors_as_they_are() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.txt");
        std::fs::write(&plain, "x").unwrap();

        // A path below a regular file fails with ENOTDIR, not ENOENT.
        match SelectedFile::from_path(plain.join("child.pdf")) {
            Err(File2JsonError::Io { path, source }) => {
                assert_eq!(path, plain.join("child.pdf"));
                assert_ne!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn memory_clones_share_the_buffer() {
        let file = blob("note.txt");
        let copy = file.clone();
        match (file.source(), copy.source()) {
            (FileSource::Memory(a), FileSource::Memory(b)) => {
                assert_eq!(a.as_ptr(), b.as_ptr());
                assert_eq!(&a[..], b"hello");
            }
            other => panic!("expected memory sources, got {other:?}"),
        }
    }
}
