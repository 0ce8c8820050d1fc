use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use cgf_files::ChunkFileError;
use cgf_files::cgf::types::ContentCgf;
use cgf_files::cgf::writer::ChunkFileWriter;
use log::{error, info};

/// The sink exporters hand their finished containers to. The target path is the container's
/// filename.
pub trait AssetWriter {
    fn write_cgf(&self, content: &ContentCgf) -> bool;
    fn write_chr(&self, content: &ContentCgf) -> bool;
    fn write_skin(&self, content: &ContentCgf) -> bool;
}

pub type SharedAssetWriter = Rc<dyn AssetWriter>;

/// Writes chunk files to disk.
#[derive(Debug, Default)]
pub struct ChunkFileAssetWriter {}

impl ChunkFileAssetWriter {
    pub fn new() -> ChunkFileAssetWriter {
        ChunkFileAssetWriter {}
    }

    fn report(kind: &str, content: &ContentCgf, result: Result<(), ChunkFileError>) -> bool {
        match result {
            Ok(()) => {
                info!("Wrote {} {}", kind, content.filename().display());
                true
            }
            Err(err) => {
                error!("Failed to write {} {}: {:?}", kind, content.filename().display(), err);
                false
            }
        }
    }
}

impl AssetWriter for ChunkFileAssetWriter {
    fn write_cgf(&self, content: &ContentCgf) -> bool {
        ChunkFileAssetWriter::report("CGF", content, ChunkFileWriter::write_cgf(content))
    }

    fn write_chr(&self, content: &ContentCgf) -> bool {
        ChunkFileAssetWriter::report("CHR", content, ChunkFileWriter::write_chr(content))
    }

    fn write_skin(&self, content: &ContentCgf) -> bool {
        ChunkFileAssetWriter::report("SKIN", content, ChunkFileWriter::write_skin(content))
    }
}

/// Forwards to another writer and remembers every file that was written successfully.
pub struct RecordingAssetWriter {
    inner: SharedAssetWriter,
    written_files: RefCell<Vec<PathBuf>>,
}

impl RecordingAssetWriter {
    pub fn new(inner: SharedAssetWriter) -> RecordingAssetWriter {
        RecordingAssetWriter {
            inner,
            written_files: RefCell::new(Vec::new()),
        }
    }

    pub fn written_files(&self) -> Vec<PathBuf> {
        self.written_files.borrow().clone()
    }

    fn record(&self, content: &ContentCgf, written: bool) -> bool {
        if written {
            self.written_files.borrow_mut().push(content.filename().to_path_buf());
        }
        written
    }
}

impl AssetWriter for RecordingAssetWriter {
    fn write_cgf(&self, content: &ContentCgf) -> bool {
        self.record(content, self.inner.write_cgf(content))
    }

    fn write_chr(&self, content: &ContentCgf) -> bool {
        self.record(content, self.inner.write_chr(content))
    }

    fn write_skin(&self, content: &ContentCgf) -> bool {
        self.record(content, self.inner.write_skin(content))
    }
}
