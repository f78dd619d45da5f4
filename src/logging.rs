use log::Record;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::error::Error;

/// Installs the global logger.
///
/// Records go to standard output and are appended to `path`, one line each.
/// The level filter comes from `RUST_LOG` and defaults to `info`.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a logger is already installed.
pub fn init(path: &Path) -> Result<(), Error> {
    let writer = TeeWriter::open(io::stdout(), path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp_millis();
            write_line(buf, timestamp, record)
        })
        .target(env_logger::Target::Pipe(Box::new(writer)))
        .try_init()?;
    Ok(())
}

/// `2024-05-01T12:00:00.123Z [updown::work] [INFO   ]  message`
fn write_line<W: Write>(out: &mut W, timestamp: impl Display, record: &Record) -> io::Result<()> {
    writeln!(
        out,
        "{timestamp} [{:<12.12}] [{:<7.7}]  {}",
        record.target(),
        record.level(),
        record.args()
    )
}

/// Writes everything to the console and to an append-only log file.
struct TeeWriter<C> {
    console: C,
    file: File,
}

impl<C: Write> TeeWriter<C> {
    fn open(console: C, path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { console, file })
    }
}

impl<C: Write> Write for TeeWriter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}
