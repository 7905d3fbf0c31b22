//! Experiment metadata and output names derived from stack titles.
//!
//! # Title convention, version 1
//!
//! 1. All whitespace is removed from the title.
//! 2. The title is split on the segment delimiter (`-`).
//! 3. The output stem is segment 1, or `segment1-segment2`.
//! 4. The metadata segment is picked by index, or the last segment.
//! 5. If the importer reports a container name containing underscores,
//!    the part of that name after its first underscore, followed by `_`,
//!    is removed from the metadata segment.
//! 6. The metadata segment is split on the field delimiter (`_`) and the
//!    tokens are paired with the configured column names by position.
//!
//! A token count that differs from the column count is reported as a
//! [`MetadataMismatch`]; columns without a token get an empty value and
//! surplus tokens are dropped. A title without the required segments is
//! rejected as ambiguous rather than guessed at.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::TITLE_CONVENTION_VERSION;
use crate::error::{DomainsError, Result};

/// Which segment of the title holds the metadata fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentIndex {
    /// Zero-based segment index.
    Index(usize),
    Last,
}

/// Which segments make up the output file stem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StemSegments {
    /// Segment 1 only.
    #[default]
    Second,
    /// Segments 1 and 2, joined with the segment delimiter.
    SecondAndThird,
}

/// Tokenization rules for stack titles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConvention {
    pub segment_delimiter: char,
    pub field_delimiter: char,
    pub metadata_segment: SegmentIndex,
    pub stem_segments: StemSegments,
    pub strip_source_tail: bool,
}

impl Default for TitleConvention {
    fn default() -> Self {
        Self {
            segment_delimiter: '-',
            field_delimiter: '_',
            metadata_segment: SegmentIndex::Last,
            stem_segments: StemSegments::Second,
            strip_source_tail: true,
        }
    }
}

impl TitleConvention {
    pub const VERSION: u32 = TITLE_CONVENTION_VERSION;

    fn segments(&self, title: &str) -> Vec<String> {
        strip_whitespace(title)
            .split(self.segment_delimiter)
            .map(str::to_string)
            .collect()
    }
}

/// Metadata columns in configured order, each with its parsed value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExperimentMetadata {
    pub fields: Vec<(String, String)>,
}

impl ExperimentMetadata {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Token count differs from the configured column count. Not fatal.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataMismatch {
    pub expected: usize,
    pub found: usize,
    pub tokens: Vec<String>,
}

impl fmt::Display for MetadataMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} metadata column(s), title has {} token(s): {:?}",
            self.expected, self.found, self.tokens
        )
    }
}

/// Result of [`parse_title`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedTitle {
    pub metadata: ExperimentMetadata,
    pub mismatch: Option<MetadataMismatch>,
}

/// Column names from a comma-separated list. Whitespace is ignored and
/// empty names are dropped.
pub fn column_names(experiment: &str) -> Vec<String> {
    strip_whitespace(experiment)
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse experiment metadata out of a stack title.
///
/// `source_name` is the name of the container the stack came from, if the
/// importer reports one.
pub fn parse_title(
    title: &str,
    columns: &[String],
    convention: &TitleConvention,
    source_name: Option<&str>,
) -> Result<ParsedTitle> {
    let segments = convention.segments(title);
    let picked = match convention.metadata_segment {
        SegmentIndex::Index(i) => segments.get(i),
        SegmentIndex::Last if segments.len() > 1 => segments.last(),
        SegmentIndex::Last => None,
    };
    let Some(segment) = picked else {
        return Err(ambiguous(
            title,
            format!(
                "no metadata segment {:?} after splitting on {:?}",
                convention.metadata_segment, convention.segment_delimiter
            ),
        ));
    };

    let mut segment = segment.clone();
    if convention.strip_source_tail {
        if let Some(tail) = source_name.and_then(|name| source_tail(name, convention.field_delimiter)) {
            segment = segment.replace(&tail, "");
        }
    }

    let tokens: Vec<String> = segment
        .split(convention.field_delimiter)
        .map(|t| t.trim().to_string())
        .collect();

    let mismatch = (tokens.len() != columns.len()).then(|| MetadataMismatch {
        expected: columns.len(),
        found: tokens.len(),
        tokens: tokens.clone(),
    });

    let fields = columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), tokens.get(i).cloned().unwrap_or_default()))
        .collect();

    Ok(ParsedTitle {
        metadata: ExperimentMetadata { fields },
        mismatch,
    })
}

/// Output file stem for a stack title, e.g. `"file.lif - cellA_di8"`
/// gives `"cellA_di8"`.
pub fn derive_stem(title: &str, convention: &TitleConvention) -> Result<String> {
    let segments = convention.segments(title);
    let needed = match convention.stem_segments {
        StemSegments::Second => 2,
        StemSegments::SecondAndThird => 3,
    };
    if segments.len() < needed {
        return Err(ambiguous(
            title,
            format!(
                "needs {needed} segments separated by {:?}, found {}",
                convention.segment_delimiter,
                segments.len()
            ),
        ));
    }

    let stem = segments[1..needed].join(&convention.segment_delimiter.to_string());
    if segments[1..needed].iter().any(String::is_empty) {
        return Err(ambiguous(title, "empty stem segment".to_string()));
    }
    Ok(stem)
}

/// The text after the first delimiter of `name`, plus a trailing delimiter.
fn source_tail(name: &str, delimiter: char) -> Option<String> {
    let (_, tail) = name.split_once(delimiter)?;
    if tail.is_empty() {
        return None;
    }
    Some(format!("{tail}{delimiter}"))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn ambiguous(title: &str, reason: String) -> DomainsError {
    DomainsError::AmbiguousTitle {
        title: title.to_string(),
        reason,
    }
}
