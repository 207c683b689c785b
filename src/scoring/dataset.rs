use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const USER_ID_HEADER: &str = "User_ID";
pub const SEX_HEADER: &str = "Sex";

pub(crate) const PHONE_COLUMN: usize = 0;
pub(crate) const USER_ID_COLUMN: usize = 1;

/// Failure to obtain the bundled dataset. Always fatal: a missing table means a
/// packaging defect, not a user-facing condition.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset resource '{}' could not be opened: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset resource is not readable as comma-separated text: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the user table comes from. Every query re-opens the source.
pub trait DatasetSource {
    fn open(&self) -> Result<Box<dyn Read + '_>, DatasetError>;

    fn load(&self) -> Result<Dataset, DatasetError> {
        let reader = self.open()?;
        Dataset::from_reader(reader)
    }
}

#[derive(Debug, Clone)]
pub struct FileDataset {
    path: PathBuf,
}

impl FileDataset {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DatasetSource for FileDataset {
    fn open(&self) -> Result<Box<dyn Read + '_>, DatasetError> {
        let file = File::open(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(Box::new(file))
    }
}

/// Dataset held in memory, e.g. from `include_bytes!`.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    bytes: Vec<u8>,
}

impl InMemoryDataset {
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl DatasetSource for InMemoryDataset {
    fn open(&self) -> Result<Box<dyn Read + '_>, DatasetError> {
        Ok(Box::new(Cursor::new(self.bytes.as_slice())))
    }
}

/// Header plus raw data rows of the user table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Splits every line on `,` with no quoting support; rows may differ in length.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);
        let mut records = csv_reader.records();

        let header = match records.next() {
            Some(record) => to_cells(&record?),
            None => return Ok(Self::default()),
        };

        let mut rows = Vec::new();
        for record in records {
            rows.push(to_cells(&record?));
        }

        debug!(rows = rows.len(), columns = header.len(), "dataset loaded");
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = DatasetRow<'_>> {
        self.rows.iter().map(|cells| DatasetRow { cells })
    }

    /// Exact header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|column| column == name)
    }

    pub fn user_id_column(&self) -> usize {
        self.column_index(USER_ID_HEADER).unwrap_or(USER_ID_COLUMN)
    }

    /// First row whose user id (column 1) matches; later duplicates are ignored.
    pub fn find_row(&self, user_id: &str) -> Option<DatasetRow<'_>> {
        self.find_row_in_column(USER_ID_COLUMN, user_id)
    }

    pub fn find_row_in_column(&self, column: usize, user_id: &str) -> Option<DatasetRow<'_>> {
        self.records()
            .find(|row| row.cell(column).map(str::trim) == Some(user_id))
    }

    pub fn sex_of(&self, row: &DatasetRow<'_>) -> Option<Sex> {
        self.column_index(SEX_HEADER)
            .and_then(|index| row.cell(index))
            .and_then(Sex::parse)
    }
}

fn to_cells(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Copy)]
pub struct DatasetRow<'a> {
    cells: &'a [String],
}

impl<'a> DatasetRow<'a> {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, index: usize) -> Option<&'a str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Trimmed (phone number, user id), or `None` for rows too short to carry both.
    pub fn identity(&self) -> Option<(&'a str, &'a str)> {
        match (self.cell(PHONE_COLUMN), self.cell(USER_ID_COLUMN)) {
            (Some(phone), Some(user_id)) => Some((phone.trim(), user_id.trim())),
            _ => None,
        }
    }

    pub fn score_at(&self, index: usize) -> f32 {
        self.cell(index).map(parse_score).unwrap_or(0.0)
    }
}

/// Unparseable or non-finite cells count as zero.
pub fn parse_score(cell: &str) -> f32 {
    cell.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Suffix carried by the sex-specific sub-score columns.
    pub const fn column_suffix(self) -> &'static str {
        self.label()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
