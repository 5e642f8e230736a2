// Tracing initialization with a reloadable log level and an optional rotating log file.
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, tracing_subscriber::Registry>> =
    OnceLock::new();

static LOG_FILE: OnceLock<Mutex<RotatingFile>> = OnceLock::new();

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    // Prefer RUST_LOG from env, otherwise use provided level string.
    let base_filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(|| LogFileWriter))
        .try_init();
}

/// Apply a new logging level at runtime if reload handle is configured.
///
/// `RUST_LOG` keeps precedence over the configured level.
pub fn apply_logging_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = LOG_RELOAD_HANDLE.get() {
        let _ = handle.modify(|f| {
            *f = EnvFilter::new(level);
        });
    }
}

/// Starts copying log lines to `path`, creating parent directories.
///
/// The file is rotated once it would exceed `max_bytes`, keeping `backups`
/// older files as `path.1` (newest) to `path.N`. Only the first call takes effect.
pub fn open_log_file(path: impl AsRef<Path>, max_bytes: u64, backups: usize) -> io::Result<()> {
    let file = RotatingFile::open(path, max_bytes, backups)?;
    let _ = LOG_FILE.set(Mutex::new(file));
    Ok(())
}

/// Size-capped log file with numbered backups.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    pub fn open(path: impl AsRef<Path>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.backups > 0 {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
        } else {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Writer for the file layer; discards output until a file is opened.
struct LogFileWriter;

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match LOG_FILE.get() {
            Some(file) => file.lock().write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match LOG_FILE.get() {
            Some(file) => file.lock().flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_receives_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app.log");

        init_tracing_with_level("info");
        open_log_file(&path, 1_000_000, 5).unwrap();
        tracing::info!("written to file");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("written to file"));
    }

    #[test]
    fn test_rotation_keeps_capped_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["first 000\n", "second 00\n", "third 000\n", "fourth 00\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fourth 00\n");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "third 000\n");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "second 00\n");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_rotation_counts_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "0123456789").unwrap();

        let mut file = RotatingFile::open(&path, 10, 1).unwrap();
        file.write_all(b"next\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "0123456789");
    }

    #[test]
    fn test_rotation_without_backups_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut file = RotatingFile::open(&path, 8, 0).unwrap();

        file.write_all(b"aaaaaa\n").unwrap();
        file.write_all(b"bbbbbb\n").unwrap();
        file.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "bbbbbb\n");
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_writer_without_file_discards() {
        let mut writer = LogFileWriter;
        if LOG_FILE.get().is_none() {
            assert_eq!(writer.write(b"dropped").unwrap(), 7);
        }
        assert!(writer.flush().is_ok());
    }
}
