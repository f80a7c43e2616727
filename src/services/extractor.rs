//! Icon definition extraction.
//!
//! Definition files are TypeScript modules with an `icons: [ ... ]` array of
//! object literals. Only a small, flat subset of that notation is understood:
//!
//! ```text
//! icons: [
//!   { name: 'file' },
//!   { name: 'rust', fileExtensions: ['rs', 'ron'] },
//!   { name: 'docker', fileNames: 'Dockerfile', light: true },
//! ]
//! ```
//!
//! The first entry is the theme's default icon and never appears in the index.

use super::tokenizer::{Token, Tokenizer};
use crate::models::{IconField, IconRecord, IndexKind, Matcher};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors raised while reading a definition region
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("No bracketed icon list found after the marker line")]
    MissingListRegion,

    #[error("Invalid token '{literal}' at offset {offset}")]
    InvalidLiteral { literal: String, offset: usize },

    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Unterminated list starting at offset {offset}")]
    UnterminatedList { offset: usize },

    #[error("Unsupported list item at offset {offset}")]
    MalformedList { offset: usize },

    #[error("Field {field} has no value at offset {offset}")]
    MissingValue { field: IconField, offset: usize },

    #[error("Icon name must be a string, found a list near offset {offset}")]
    InvalidName { offset: usize },
}

/// Cut the icon list out of a definition file and collapse its whitespace.
///
/// Scanning starts at the first line whose trimmed content begins with
/// `marker`, or at the top of the file if there is none. The region is the
/// text between the first `[` and the last `]` from there on.
pub fn select_region(source: &str, marker: &str) -> Result<String, ExtractError> {
    let mut offset = 0;
    let mut start = None;
    for line in source.split_inclusive('\n') {
        if line.trim().starts_with(marker) {
            start = Some(offset);
            break;
        }
        offset += line.len();
    }

    let tail = match start {
        Some(start) => &source[start..],
        None => {
            tracing::warn!("Marker '{}' not found, scanning whole file", marker);
            source
        }
    };

    let open = tail.find('[').ok_or(ExtractError::MissingListRegion)?;
    let close = tail.rfind(']').ok_or(ExtractError::MissingListRegion)?;
    if close < open {
        return Err(ExtractError::MissingListRegion);
    }

    Ok(tail[open + 1..close]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" "))
}

/// Parse every entry of a collapsed region, in scan order.
///
/// The first record returned is the placeholder; [`build_index`] drops it.
pub fn parse_records(region: &str, kind: IndexKind) -> Result<Vec<IconRecord>, ExtractError> {
    let mut tokens = Tokenizer::new(region, kind.fields());
    let mut records = Vec::new();
    let mut current: Option<IconRecord> = None;

    while let Some(token) = tokens.next() {
        let Token::Field(field) = token? else {
            // Values are always consumed together with their field below
            continue;
        };

        let value = match tokens.next() {
            Some(value) => value?,
            None => {
                return Err(ExtractError::MissingValue {
                    field,
                    offset: tokens.position(),
                });
            }
        };

        match (field, value) {
            (IconField::Name, Token::Str(name)) => {
                records.extend(current.replace(IconRecord::new(name)));
            }
            (IconField::Name, Token::Bool(flag)) => {
                tracing::debug!("Icon name given as boolean {}, leaving it empty", flag);
                records.extend(current.replace(IconRecord::default()));
            }
            (IconField::Name, _) => {
                return Err(ExtractError::InvalidName {
                    offset: tokens.position(),
                });
            }
            (field, Token::Bool(flag)) => {
                tracing::debug!("Discarding boolean {} for {}", flag, field);
            }
            (field, value) => {
                let matcher = match value {
                    Token::Str(value) => Matcher::Single(value),
                    Token::List(values) => Matcher::List(values),
                    _ => continue,
                };
                match current.as_mut() {
                    Some(record) => {
                        record.matchers.insert(field, matcher);
                    }
                    None => tracing::warn!("Ignoring {} found before any icon name", field),
                }
            }
        }
    }

    records.extend(current);
    Ok(records)
}

/// Drop the first scanned record and sort the rest by name.
pub fn build_index(mut records: Vec<IconRecord>) -> Vec<IconRecord> {
    if records.is_empty() {
        return records;
    }

    let placeholder = records.remove(0);
    tracing::debug!("Dropping placeholder icon '{}'", placeholder.name);

    records.sort_by(|a, b| a.name.cmp(&b.name));
    records
}

/// Render the index file content: header line plus one `name|col|...` line per record.
pub fn render_index(kind: IndexKind, records: &[IconRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(kind.header());
    out.push('\n');

    for record in records {
        out.push_str(&record.name);
        for &field in kind.columns() {
            out.push('|');
            out.push_str(&record.column(field));
        }
        out.push('\n');
    }

    out
}

/// Full pipeline from definition source text to index file content.
pub fn extract_index(source: &str, kind: IndexKind, marker: &str) -> Result<String, ExtractError> {
    let region = select_region(source, marker)?;
    let records = build_index(parse_records(&region, kind)?);
    Ok(render_index(kind, &records))
}

/// Service for turning definition files into index files on disk
#[derive(Debug, Clone)]
pub struct IndexService {
    marker: String,
}

impl IndexService {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Extract one definition file and write its index.
    ///
    /// The whole index is built in memory first; if extraction fails nothing is written.
    ///
    /// # Returns
    /// The number of icon lines written
    pub fn write_index(
        &self,
        input: &Utf8Path,
        output: &Utf8Path,
        kind: IndexKind,
    ) -> Result<usize> {
        let source = fs::read_to_string(input)
            .with_context(|| format!("Failed to read definition file: {}", input))?;

        let index = extract_index(&source, kind, &self.marker)
            .with_context(|| format!("Failed to extract {} icons from {}", kind, input))?;
        let count = index.lines().count() - 1;

        if let Some(parent) = output.parent().filter(|p| !p.as_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create output directory: {}", parent))?;
            }
        }

        fs::write(output, index)
            .with_context(|| format!("Failed to write index file: {}", output))?;

        tracing::info!("Wrote {} {} icons to {}", count, kind, output);
        Ok(count)
    }

    /// Write the index of every kind in `kinds` using the standard file names.
    pub fn generate_all(
        &self,
        source_dir: &Utf8Path,
        output_dir: &Utf8Path,
        kinds: &[IndexKind],
    ) -> Result<Vec<Utf8PathBuf>> {
        let mut written = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let input = source_dir.join(kind.source_file_name());
            let output = output_dir.join(kind.output_file_name());
            self.write_index(&input, &output, kind)?;
            println!("Wrote output to {}", output);
            written.push(output);
        }

        Ok(written)
    }
}

impl Default for IndexService {
    fn default() -> Self {
        Self::new("icons:")
    }
}
