// log.rs — Append-only JSONL audit log.
//
// One JSON object per line. Each event's `previous_hash` is the SHA-256 of
// the raw previous line, so inserting, deleting or editing a line breaks
// the chain and `verify_chain` reports where.
//
// The chain head is read back from the end of the file before every
// append, so separate handles (or processes) taking turns on one file keep
// a single chain. Two appends racing from different processes can still
// fork it; within a process, `JsonlSink` serializes appends.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::AuditError;
use crate::event::{AuditEvent, EventKind};
use crate::hasher;

/// Bytes read per step when scanning backwards for the last line.
const TAIL_CHUNK: u64 = 4096;

/// An append-only audit log backed by a JSONL file.
pub struct AuditLog {
    file: File,
    path: PathBuf,
}

/// What a successful chain verification saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSummary {
    pub events: usize,
    pub intercepted: usize,
    pub blocked: usize,
    pub approved: usize,
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl ChainSummary {
    fn count(&mut self, event: &AuditEvent) {
        self.events += 1;
        match event.kind {
            EventKind::Intercept => self.intercepted += 1,
            EventKind::Block => self.blocked += 1,
            EventKind::Approve => self.approved += 1,
        }
        self.last_timestamp = Some(event.timestamp);
    }
}

impl AuditLog {
    /// Open (or create) an audit log at the given path, creating parent
    /// directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let open_failed = |source| AuditError::OpenFailed {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(open_failed)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(open_failed)?;

        Ok(Self { file, path })
    }

    /// Link `event` to the current last line and append it as one write.
    pub fn append(&mut self, event: &mut AuditEvent) -> Result<(), AuditError> {
        event.previous_hash = chain_head(&mut self.file)?;

        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }

    /// Read all events, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Vec::new();
        for entry in Self::entries(path.as_ref())? {
            let (_, line) = entry?;
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }

    /// The last `n` events, oldest first.
    pub fn tail(path: impl AsRef<Path>, n: usize) -> Result<Vec<AuditEvent>, AuditError> {
        let mut events = Self::read_all(path)?;
        let skip = events.len().saturating_sub(n);
        Ok(events.split_off(skip))
    }

    /// The event on 1-based `line`, if that line exists and parses.
    pub fn event_at(path: impl AsRef<Path>, line: usize) -> Result<Option<AuditEvent>, AuditError> {
        for entry in Self::entries(path.as_ref())? {
            let (number, text) = entry?;
            if number == line {
                return Ok(serde_json::from_str(&text).ok());
            }
        }
        Ok(None)
    }

    /// Walk the hash chain of a log file.
    ///
    /// Fails with `IntegrityViolation` at the first line whose
    /// `previous_hash` is not the hash of the line before it.
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<ChainSummary, AuditError> {
        let mut summary = ChainSummary::default();
        let mut expected: Option<String> = None;

        for entry in Self::entries(path.as_ref())? {
            let (number, line) = entry?;
            let event: AuditEvent = serde_json::from_str(&line)?;

            if event.previous_hash != expected {
                return Err(AuditError::IntegrityViolation {
                    line: number,
                    expected: expected.unwrap_or_else(|| "None".to_string()),
                    actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }

            // The raw line is hashed, so field order never matters.
            expected = Some(hasher::hash_str(&line));
            summary.count(&event);
        }

        Ok(summary)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blank lines with their 1-based line numbers.
    fn entries(
        path: &Path,
    ) -> Result<impl Iterator<Item = Result<(usize, String), AuditError>>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(BufReader::new(file)
            .lines()
            .enumerate()
            .filter_map(|(index, line)| match line {
                Ok(line) if line.trim().is_empty() => None,
                Ok(line) => Some(Ok((index + 1, line))),
                Err(e) => Some(Err(AuditError::from(e))),
            }))
    }
}

/// Hash of the last non-blank line, found by reading backwards from the end.
fn chain_head(file: &mut File) -> Result<Option<String>, AuditError> {
    let mut start = file.seek(SeekFrom::End(0))?;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        if let Some(last) = buf.iter().rposition(|b| !b.is_ascii_whitespace()) {
            let line_start = match buf[..last].iter().rposition(|&b| b == b'\n') {
                Some(newline) => Some(newline + 1),
                None if start == 0 => Some(0),
                None => None,
            };
            if let Some(line_start) = line_start {
                let line_end = buf[last..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(buf.len(), |offset| last + offset);
                let line = &buf[line_start..line_end];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                return Ok(Some(hasher::hash_bytes(line)));
            }
        } else if start == 0 {
            return Ok(None);
        }

        let from = start.saturating_sub(TAIL_CHUNK);
        let mut chunk = vec![0; (start - from) as usize];
        file.seek(SeekFrom::Start(from))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        start = from;
    }
}
