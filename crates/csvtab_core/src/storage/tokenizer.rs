//! Push-style CSV tokenizer adapter.
//!
//! # Responsibility
//! - Drive `csv_core::Reader` over byte chunks as they arrive.
//! - Report field and record boundaries to a `RecordSink` via callbacks.
//!
//! # Invariants
//! - Quoting rules are those of `csv-core` defaults (comma delimiter,
//!   doubled quotes, CR/LF/CRLF terminators, no trimming).
//! - A field split across chunk boundaries is delivered once, whole.
//! - A sink error stops tokenization immediately and is returned as-is.

use csv_core::{ReadFieldResult, Reader};

const FIELD_SCRATCH_BYTES: usize = 1024;

/// Receiver of tokenizer callbacks.
pub trait RecordSink {
    type Error;

    /// Called once per field with the unescaped field bytes.
    fn on_cell(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Called after the last field of each record.
    fn on_record_end(&mut self) -> Result<(), Self::Error>;
}

/// Incremental CSV tokenizer fed with arbitrary byte chunks.
pub struct PushParser {
    reader: Reader,
    field: Vec<u8>,
    scratch: [u8; FIELD_SCRATCH_BYTES],
}

impl Default for PushParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PushParser {
    pub fn new() -> Self {
        Self {
            reader: Reader::new(),
            field: Vec::new(),
            scratch: [0; FIELD_SCRATCH_BYTES],
        }
    }

    /// Tokenizes one chunk of input.
    ///
    /// Empty chunks are ignored; end of input is signalled by `finish`.
    pub fn feed<S: RecordSink>(&mut self, mut input: &[u8], sink: &mut S) -> Result<(), S::Error> {
        while !input.is_empty() {
            let (result, consumed, written) = self.reader.read_field(input, &mut self.scratch);
            input = &input[consumed..];
            self.field.extend_from_slice(&self.scratch[..written]);
            match result {
                ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
                ReadFieldResult::Field { record_end } => self.emit(record_end, sink)?,
                ReadFieldResult::End => return Ok(()),
            }
        }
        Ok(())
    }

    /// Flushes the final field and record once the input is exhausted.
    pub fn finish<S: RecordSink>(&mut self, sink: &mut S) -> Result<(), S::Error> {
        loop {
            let (result, _, written) = self.reader.read_field(&[], &mut self.scratch);
            self.field.extend_from_slice(&self.scratch[..written]);
            match result {
                ReadFieldResult::OutputFull => {}
                ReadFieldResult::Field { record_end } => self.emit(record_end, sink)?,
                ReadFieldResult::InputEmpty | ReadFieldResult::End => return Ok(()),
            }
        }
    }

    fn emit<S: RecordSink>(&mut self, record_end: bool, sink: &mut S) -> Result<(), S::Error> {
        let outcome = sink.on_cell(&self.field);
        self.field.clear();
        outcome?;
        if record_end {
            sink.on_record_end()?;
        }
        Ok(())
    }
}
