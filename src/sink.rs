//! Result sinks.
//!
//! A sink receives the finished `RarityMap` once per run. What it does with
//! it (persist, publish, feed a generator) is up to the sink.

use crate::breakdown::RarityMap;
use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Consumer of a finished rarity map.
pub trait ResultSink {
    /// Receive the map for one run.
    fn write(&mut self, map: &RarityMap) -> Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    fn write(&mut self, map: &RarityMap) -> Result<()> {
        (**self).write(map)
    }
}

/// Keeps every map it receives. Useful for tests and in-process consumers.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Maps received so far, oldest first.
    pub runs: Vec<RarityMap>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent map.
    pub fn last(&self) -> Option<&RarityMap> {
        self.runs.last()
    }
}

impl ResultSink for MemorySink {
    fn write(&mut self, map: &RarityMap) -> Result<()> {
        self.runs.push(map.clone());
        Ok(())
    }
}

/// Writes each map as a pretty-printed flat JSON object, keys sorted.
///
/// Unresolved scores are written as `null`.
///
/// # Examples
///
/// ```rust
/// use rarecraft::sink::{JsonSink, ResultSink};
/// use rarecraft::{ItemId, RarityMap, RarityScore};
///
/// let mut map = RarityMap::new();
/// map.insert(ItemId::from_str("stick"), RarityScore::from_odds(0.5));
///
/// let mut sink = JsonSink::new(Vec::new());
/// sink.write(&map).unwrap();
///
/// let text = String::from_utf8(sink.into_inner()).unwrap();
/// assert_eq!(text, "{\n  \"stick\": 0.5\n}\n");
/// ```
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonSink<BufWriter<File>> {
    /// Create (or truncate) a report file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn write(&mut self, map: &RarityMap) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, map)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
