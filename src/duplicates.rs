//! Side output for duplicate (and optionally canonical) records
//!
//! Each entry is one line: `DUPLICATE: '<line>'` or `INSERTING: '<line>'`,
//! where `<line>` is the stripped input line, byte for byte.

use std::io::{self, Write};

/// Label written before a duplicate line
pub const DUPLICATE_LABEL: &str = "DUPLICATE";
/// Label written before a canonical line when insert logging is on
pub const INSERT_LABEL: &str = "INSERTING";

/// Writer for the duplicates side file
#[derive(Debug)]
pub struct DuplicateLog<W: Write> {
    sink: W,
    log_inserts: bool,
    written: u64,
}

impl<W: Write> DuplicateLog<W> {
    /// Wrap a sink. With `log_inserts`, canonical records are logged too.
    pub fn new(sink: W, log_inserts: bool) -> Self {
        Self {
            sink,
            log_inserts,
            written: 0,
        }
    }

    /// Record a duplicate line
    pub fn duplicate(&mut self, line: &[u8]) -> io::Result<()> {
        self.write_entry(DUPLICATE_LABEL, line)
    }

    /// Record a canonical line (no-op unless insert logging is on)
    pub fn insert(&mut self, line: &[u8]) -> io::Result<()> {
        if self.log_inserts {
            self.write_entry(INSERT_LABEL, line)?;
        }
        Ok(())
    }

    fn write_entry(&mut self, label: &str, line: &[u8]) -> io::Result<()> {
        write!(self.sink, "{}: '", label)?;
        self.sink.write_all(line)?;
        self.sink.write_all(b"'\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of entries written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
