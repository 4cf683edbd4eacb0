//! File writer for the logger

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::LoggerError;
use crate::logger::config::FileConfig;

/// Shared, buffered log file handed to the fmt layer.
#[derive(Clone)]
pub struct FileWriter {
    file: Arc<Mutex<BufWriter<File>>>,
}

impl FileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = FileWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriterGuard {
            file: Arc::clone(&self.file),
        }
    }
}

/// Per-event handle; flushes when the event is written out.
pub struct FileWriterGuard {
    file: Arc<Mutex<BufWriter<File>>>,
}

impl Write for FileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.lock() {
            Ok(mut file) => file.write(buf),
            // A panicking writer must not take logging down with it.
            Err(_) => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.lock() {
            Ok(mut file) => file.flush(),
            Err(_) => Ok(()),
        }
    }
}

impl Drop for FileWriterGuard {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn file_config(path: PathBuf, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path,
            append,
            ..Default::default()
        }
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/app.log");

        let writer = FileWriter::new(&file_config(path.clone(), true)).unwrap();
        writer.make_writer().write_all(b"hello\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_append_and_truncate_modes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "old\n").unwrap();

        {
            let writer = FileWriter::new(&file_config(path.clone(), true)).unwrap();
            writer.make_writer().write_all(b"new\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nnew\n");

        {
            let writer = FileWriter::new(&file_config(path.clone(), false)).unwrap();
            writer.make_writer().write_all(b"fresh\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}
