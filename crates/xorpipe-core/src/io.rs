//! Terminal stages.
//!
//! These stages sit at the bottom of a chain and perform the actual I/O.
//! Reads on file and reader stages keep pulling until the buffer is full or
//! the underlying stream ends, so a short read always means end of data.

use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, XorError};
use crate::stage::{Control, Reply, Stage};

/// Read into `buf` until it is full or the reader reports end of stream.
fn fill<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Open the source for a run: a file when `path` is given, stdin otherwise.
///
/// # Errors
///
/// Returns `XorError::Io` if the file cannot be opened.
pub fn open_source(path: Option<&Path>) -> Result<Box<dyn Stage>> {
    match path {
        Some(path) => Ok(Box::new(FileStage::open(path)?)),
        None => {
            debug!("reading from stdin");
            Ok(Box::new(ReadStage::stdin()))
        }
    }
}

/// Open the sink for a run: a new file when `path` is given, buffered
/// stdout otherwise.
///
/// # Errors
///
/// Returns `XorError::Io` if the file cannot be created.
pub fn open_sink(path: Option<&Path>) -> Result<Box<dyn Stage>> {
    match path {
        Some(path) => Ok(Box::new(FileStage::create(path)?)),
        None => {
            debug!("writing to stdout");
            Ok(Box::new(WriteStage::stdout()))
        }
    }
}

/// A file opened for reading or writing.
#[derive(Debug)]
pub struct FileStage {
    file: File,
    eof: bool,
}

impl FileStage {
    /// Open an existing file for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            io::Error::new(e.kind(), format!("Failed to open {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "opened file source");
        Ok(Self::from_file(file))
    }

    /// Create (or truncate) a file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to create {}: {}", path.display(), e),
            )
        })?;
        debug!(path = %path.display(), "opened file sink");
        Ok(Self::from_file(file))
    }

    /// Wrap an already open file.
    pub fn from_file(file: File) -> Self {
        Self { file, eof: false }
    }
}

impl Stage for FileStage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = fill(&mut self.file, buf)?;
        if n < buf.len() {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.file.write(buf)?)
    }

    fn control(&mut self, cmd: Control) -> Result<Reply> {
        match cmd {
            Control::Reset => {
                self.file.seek(SeekFrom::Start(0))?;
                self.eof = false;
                Ok(Reply::Done)
            }
            Control::Flush => {
                self.file.flush()?;
                Ok(Reply::Done)
            }
            Control::Eof => Ok(Reply::Flag(self.eof)),
            Control::SetKey(_) | Control::Custom { .. } => Ok(Reply::Unsupported),
        }
    }

    fn duplicate(&self) -> Result<Box<dyn Stage>> {
        Ok(Box::new(FileStage {
            file: self.file.try_clone()?,
            eof: self.eof,
        }))
    }
}

/// Read-only stage over any reader, typically stdin.
pub struct ReadStage<R> {
    reader: R,
    name: &'static str,
    eof: bool,
}

impl ReadStage<io::Stdin> {
    /// Stage over the process's standard input.
    pub fn stdin() -> Self {
        Self::named(io::stdin(), "stdin")
    }
}

impl<R: Read + Send> ReadStage<R> {
    pub fn new(reader: R) -> Self {
        Self::named(reader, "reader")
    }

    fn named(reader: R, name: &'static str) -> Self {
        Self {
            reader,
            name,
            eof: false,
        }
    }
}

impl<R: Read + Send> Stage for ReadStage<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = fill(&mut self.reader, buf)?;
        if n < buf.len() {
            self.eof = true;
        }
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(XorError::unsupported(self.name, "write"))
    }

    fn control(&mut self, cmd: Control) -> Result<Reply> {
        match cmd {
            Control::Eof => Ok(Reply::Flag(self.eof)),
            _ => Ok(Reply::Unsupported),
        }
    }
}

/// Write-only stage over any writer, typically stdout.
pub struct WriteStage<W> {
    writer: W,
    name: &'static str,
}

impl WriteStage<BufWriter<io::Stdout>> {
    /// Buffered stage over the process's standard output.
    pub fn stdout() -> Self {
        Self {
            writer: BufWriter::new(io::stdout()),
            name: "stdout",
        }
    }
}

impl<W: Write + Send> WriteStage<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            name: "writer",
        }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Stage for WriteStage<W> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize> {
        Err(XorError::unsupported(self.name, "read"))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        Ok(self.writer.write(buf)?)
    }

    fn control(&mut self, cmd: Control) -> Result<Reply> {
        match cmd {
            Control::Flush => {
                self.writer.flush()?;
                Ok(Reply::Done)
            }
            _ => Ok(Reply::Unsupported),
        }
    }
}

/// In-memory stage: writes append, reads consume from a cursor.
#[derive(Debug, Clone, Default)]
pub struct MemoryStage {
    data: Vec<u8>,
    cursor: usize,
    write_limit: Option<usize>,
}

impl MemoryStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage whose reads return `data`.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Accept at most `limit` bytes per write call.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Every byte written so far, including bytes already read back.
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl Stage for MemoryStage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = &self.data[self.cursor..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = self.write_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn control(&mut self, cmd: Control) -> Result<Reply> {
        match cmd {
            Control::Reset => {
                self.cursor = 0;
                Ok(Reply::Done)
            }
            Control::Flush => Ok(Reply::Done),
            Control::Eof => Ok(Reply::Flag(self.cursor >= self.data.len())),
            Control::SetKey(_) | Control::Custom { .. } => Ok(Reply::Unsupported),
        }
    }

    fn duplicate(&self) -> Result<Box<dyn Stage>> {
        Ok(Box::new(self.clone()))
    }
}
