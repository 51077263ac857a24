//! CSV record writer.
//!
//! A thin owner of a [`csv::Writer`] configured for the output contract:
//! comma delimiter, double-quote quoting, CRLF after every record
//! (header included) regardless of platform, and minimal quoting — a
//! field is quoted only when it contains the delimiter, the quote
//! character, or a line break, with embedded quotes doubled. An optional
//! UTF-8 byte-order mark (EF BB BF) goes out once, before the header.

use std::io::{self, Write};

use csv::{QuoteStyle, Terminator, WriterBuilder};

/// The UTF-8 byte-order mark.
const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Writes header and data records to a byte sink.
pub struct RecordWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a sink. When `with_bom` is set the byte-order mark is
    /// written immediately, before any record.
    pub fn new(mut sink: W, with_bom: bool) -> io::Result<Self> {
        if with_bom {
            sink.write_all(BOM)?;
        }
        let inner = WriterBuilder::new()
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .from_writer(sink);
        Ok(Self { inner })
    }

    /// Write the header record.
    pub fn write_header<I, S>(&mut self, headers: I) -> csv::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.write_record(headers)
    }

    /// Write one data record.
    pub fn write_record<I, S>(&mut self, fields: I) -> csv::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.inner.write_record(fields)
    }

    /// Flush buffered bytes to the sink. Idempotent.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
    }
}
