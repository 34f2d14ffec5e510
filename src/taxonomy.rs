//! Ordered label taxonomy of the classifier.
//!
//! Each display name is a comma separated hierarchy path, most general first,
//! e.g. `Animal, Domestic animals, pets, Dog, Bark`. The position of a label
//! in the taxonomy is the column of that label in the score matrix.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{Error, Result};

/// Column of `class_labels_indices.csv` holding the display name.
const DISPLAY_NAME_COLUMN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    path: String,
    segments: Vec<String>,
}

impl Label {
    pub fn new(path: &str) -> Self {
        let path = path.trim().to_string();
        let segments = path.split(',').map(|s| s.trim().to_string()).collect();
        Self { path, segments }
    }

    /// Full display path, exactly as listed in the taxonomy file.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Most specific segment of the path.
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    labels: Vec<Label>,
}

impl Taxonomy {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(paths.into_iter().map(|p| Label::new(p.as_ref())).collect())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::TaxonomyLoad(format!("{}: {e}", path.display())))?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Parses a labels CSV: header row skipped, display name in the third column.
    pub fn from_csv_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate();
        match lines.next() {
            Some((_, Ok(_))) => {}
            Some((_, Err(e))) => return Err(Error::TaxonomyLoad(e.to_string())),
            None => return Err(Error::TaxonomyLoad("missing header row".into())),
        }

        let mut labels = Vec::new();
        let mut seen = HashSet::new();
        for (line_no, line) in lines {
            let line = line.map_err(|e| Error::TaxonomyLoad(e.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_csv_row(&line);
            let name = fields.get(DISPLAY_NAME_COLUMN).ok_or_else(|| {
                Error::TaxonomyLoad(format!(
                    "line {}: expected at least {} columns, found {}",
                    line_no + 1,
                    DISPLAY_NAME_COLUMN + 1,
                    fields.len()
                ))
            })?;
            let name = name.trim().replace('"', "");
            if !seen.insert(name.clone()) {
                tracing::warn!("duplicate label {:?} at line {}", name, line_no + 1);
            }
            labels.push(Label::new(&name));
        }
        tracing::debug!("loaded {} labels", labels.len());
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

/// Splits one CSV row, honouring double quoted fields and `""` escapes.
fn split_csv_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Whole-path labels that are too coarse to report as the final answer.
#[derive(Debug, Clone)]
pub struct GeneralLabels {
    paths: HashSet<String>,
}

pub const DEFAULT_GENERAL_LABELS: &[&str] = &[
    "Animal",
    "Domestic animals, pets",
    "Livestock, farm animals, working animals",
    "Wild animals",
    "Inside, small room",
    "Outside, urban or rural",
    "Music",
    "Noise",
    "Speech",
];

impl GeneralLabels {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.paths.contains(label.path())
    }
}

impl Default for GeneralLabels {
    fn default() -> Self {
        Self::new(DEFAULT_GENERAL_LABELS.iter().copied())
    }
}
