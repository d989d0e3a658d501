use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    encode::sink::{EncodedFrame, StreamHeader, StreamSink},
    foundation::error::{VidpressError, VidpressResult},
};

/// One line of a JSONL stream.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum StreamRecord {
    Header(StreamHeader),
    Frame(EncodedFrame),
}

// Borrowing twin of `StreamRecord` for the write path.
#[derive(serde::Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum RecordRef<'a> {
    Header(&'a StreamHeader),
    Frame(&'a EncodedFrame),
}

/// Writes the header and every frame as one JSON object per line.
pub struct JsonlSink {
    path: PathBuf,
    out: Option<BufWriter<File>>,
}

impl JsonlSink {
    /// The file is created (or truncated) on `begin`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            out: None,
        }
    }

    fn write_record(&mut self, record: RecordRef<'_>) -> VidpressResult<()> {
        let out = self
            .out
            .as_mut()
            .ok_or_else(|| VidpressError::sink("jsonl sink used before begin"))?;
        serde_json::to_writer(&mut *out, &record)
            .map_err(|e| VidpressError::sink(format!("serialize record: {e}")))?;
        out.write_all(b"\n")
            .map_err(|e| VidpressError::sink(format!("write '{}': {e}", self.path.display())))
    }
}

impl StreamSink for JsonlSink {
    fn begin(&mut self, header: StreamHeader) -> VidpressResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let file = File::create(&self.path)
            .map_err(|e| VidpressError::sink(format!("create '{}': {e}", self.path.display())))?;
        self.out = Some(BufWriter::new(file));
        self.write_record(RecordRef::Header(&header))
    }

    fn push_frame(&mut self, frame: &EncodedFrame) -> VidpressResult<()> {
        self.write_record(RecordRef::Frame(frame))
    }

    fn end(&mut self) -> VidpressResult<()> {
        if let Some(mut out) = self.out.take() {
            out.flush()
                .map_err(|e| VidpressError::sink(format!("flush '{}': {e}", self.path.display())))?;
        }
        Ok(())
    }
}

/// A stream read back from disk.
#[derive(Clone, Debug, PartialEq)]
pub struct WrittenStream {
    pub header: StreamHeader,
    pub frames: Vec<EncodedFrame>,
}

/// Parse a file written by [`JsonlSink`]. The first line must be the header.
pub fn read_jsonl_stream(path: impl AsRef<Path>) -> VidpressResult<WrittenStream> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("open stream '{}'", path.display()))?;

    let mut header = None;
    let mut frames = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read stream '{}'", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: StreamRecord = serde_json::from_str(&line).map_err(|e| {
            VidpressError::serde(format!("{}:{}: {e}", path.display(), lineno + 1))
        })?;
        match (record, header.is_some()) {
            (StreamRecord::Header(h), false) => header = Some(h),
            (StreamRecord::Frame(f), true) => frames.push(f),
            (StreamRecord::Header(_), true) => {
                return Err(VidpressError::serde(format!(
                    "{}:{}: duplicate stream header",
                    path.display(),
                    lineno + 1
                )));
            }
            (StreamRecord::Frame(_), false) => {
                return Err(VidpressError::serde(format!(
                    "{}:{}: frame record before stream header",
                    path.display(),
                    lineno + 1
                )));
            }
        }
    }

    let header = header.ok_or_else(|| {
        VidpressError::serde(format!("stream '{}' has no header", path.display()))
    })?;
    Ok(WrittenStream { header, frames })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jsonl.rs"]
mod tests;
