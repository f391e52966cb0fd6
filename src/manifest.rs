//! Label manifest: sample identifier → direction, persisted as CSV

use crate::{
    direction::Direction,
    error::{Result, SynthError},
};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE_NAME: &str = "labels.csv";

/// Header row of the manifest
pub const MANIFEST_HEADER: &str = "unique_id,direction";

/// Whether `unique_id` can be written as a bare CSV field
///
/// Commas, double quotes and line breaks would need quoting; they are not
/// allowed in identifiers.
#[must_use]
pub fn is_manifest_safe(unique_id: &str) -> bool {
    !unique_id.contains([',', '"', '\n', '\r'])
}

/// Insertion-ordered mapping from unique identifier to label
///
/// Identifiers can only be inserted once; a second insert of the same id is a
/// [`SynthError::DuplicateIdentifier`].
#[derive(Debug, Clone, Default)]
pub struct LabelManifest {
    entries: Vec<(String, Direction)>,
    ids: HashSet<String>,
}

impl LabelManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a label for a new identifier
    ///
    /// # Errors
    /// - `DuplicateIdentifier` if `unique_id` is already present
    /// - `InvalidConfig` if `unique_id` is not a bare CSV field
    ///
    /// The manifest is left unchanged on error.
    pub fn insert<S: Into<String>>(&mut self, unique_id: S, direction: Direction) -> Result<()> {
        let unique_id = unique_id.into();
        if !is_manifest_safe(&unique_id) {
            return Err(SynthError::invalid_config(format!(
                "Identifier '{}' contains a CSV delimiter",
                unique_id.escape_debug()
            )));
        }
        if self.ids.contains(&unique_id) {
            return Err(SynthError::duplicate_identifier(unique_id));
        }
        self.ids.insert(unique_id.clone());
        self.entries.push((unique_id, direction));
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, unique_id: &str) -> bool {
        self.ids.contains(unique_id)
    }

    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<Direction> {
        if !self.contains(unique_id) {
            return None;
        }
        self.entries
            .iter()
            .find(|(id, _)| id == unique_id)
            .map(|(_, direction)| *direction)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.entries.iter().map(|(id, d)| (id.as_str(), *d))
    }

    /// Serialize to CSV text (header plus one row per entry)
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "{}", MANIFEST_HEADER)?;
        for (unique_id, direction) in &self.entries {
            writeln!(writer, "{},{}", unique_id, direction)?;
        }
        writer.flush()
    }

    /// Write the manifest to `path`, replacing any existing file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|e| SynthError::file_io_error("create manifest", path, &e))?;
        self.write_to(BufWriter::new(file))
            .map_err(|e| SynthError::file_io_error("write manifest", path, &e))
    }

    /// Read a manifest previously written by [`LabelManifest::write_csv`]
    ///
    /// # Errors
    /// Missing or wrong header, malformed rows, unknown direction names and
    /// repeated identifiers are all rejected.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| SynthError::file_io_error("open manifest", path, &e))?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .transpose()
            .map_err(|e| SynthError::file_io_error("read manifest", path, &e))?;
        if header.as_deref() != Some(MANIFEST_HEADER) {
            return Err(SynthError::processing(format!(
                "Manifest '{}' does not start with '{}'",
                path.display(),
                MANIFEST_HEADER
            )));
        }

        let mut manifest = Self::new();
        for (line_no, line) in lines.enumerate() {
            let line = line.map_err(|e| SynthError::file_io_error("read manifest", path, &e))?;
            if line.is_empty() {
                continue;
            }
            let (unique_id, direction) = line.rsplit_once(',').ok_or_else(|| {
                SynthError::processing(format!("Malformed manifest row {}: '{}'", line_no + 2, line))
            })?;
            let direction = direction
                .parse::<Direction>()
                .map_err(|e| SynthError::processing(format!("Row {}: {}", line_no + 2, e)))?;
            manifest.insert(unique_id, direction)?;
        }

        Ok(manifest)
    }
}
