// Column-oriented in-memory repository table
// Loads from fetched records or a CSV file and writes back to CSV

use crate::errors::LoadError;
use crate::models::Repository;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, instrument};

/// CSV header, in file order
pub const CSV_HEADER: [&str; 10] = [
    "Repository Name",
    "Description",
    "Stars",
    "Forks",
    "Watchers",
    "Issues",
    "URL",
    "Date",
    "Language",
    "Owner",
];

/// Parse an ISO date, accepting a datetime (`T` or space separated) by taking its date prefix
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            let (prefix, rest) = (raw.get(..10)?, raw.get(10..)?);
            if !(rest.starts_with('T') || rest.starts_with(' ')) {
                return None;
            }
            NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
        })
}

/// A date cell: the raw text as read and its normalized value
#[derive(Debug, Clone, PartialEq)]
pub struct DateCell {
    pub raw: Option<String>,
    pub value: Option<NaiveDate>,
}

impl DateCell {
    fn parse(raw: Option<String>) -> Self {
        let value = raw.as_deref().and_then(parse_date);
        Self { raw, value }
    }

    fn from_date(date: Option<NaiveDate>) -> Self {
        Self {
            raw: date.map(|d| d.format("%Y-%m-%d").to_string()),
            value: date,
        }
    }
}

/// RepositoryTable stores one column per field, all of equal length
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryTable {
    pub names: Vec<String>,
    pub descriptions: Vec<Option<String>>,
    pub stars: Vec<u64>,
    pub forks: Vec<Option<u64>>,
    pub watchers: Vec<u64>,
    pub open_issues: Vec<u64>,
    pub urls: Vec<String>,
    pub dates: Vec<DateCell>,
    pub languages: Vec<Option<String>>,
    pub owners: Vec<Option<String>>,
}

/// Column positions resolved from a CSV header row
struct ColumnIndex {
    name: usize,
    stars: usize,
    watchers: usize,
    issues: usize,
    url: usize,
    description: Option<usize>,
    forks: Option<usize>,
    date: Option<usize>,
    language: Option<usize>,
    owner: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| find(name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));

        Ok(Self {
            name: require("Repository Name")?,
            stars: require("Stars")?,
            watchers: require("Watchers")?,
            issues: require("Issues")?,
            url: require("URL")?,
            description: find("Description"),
            forks: find("Forks"),
            date: find("Date"),
            language: find("Language"),
            owner: find("Owner"),
        })
    }
}

fn optional_text(record: &StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_count(raw: &str, column: &str, row: usize) -> Result<u64, LoadError> {
    let trimmed = raw.trim();
    // Counts exported through a float column come back as "150.0"
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| {
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as u64)
        })
        .ok_or_else(|| LoadError::InvalidField {
            column: column.to_string(),
            row,
            value: raw.to_string(),
        })
}

impl RepositoryTable {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Append one record as a new row
    pub fn push(&mut self, repo: &Repository) {
        self.names.push(repo.name.clone());
        self.descriptions.push(repo.description.clone());
        self.stars.push(repo.stars);
        self.forks.push(repo.forks);
        self.watchers.push(repo.watchers);
        self.open_issues.push(repo.open_issues);
        self.urls.push(repo.url.clone());
        self.dates.push(DateCell::from_date(repo.date));
        self.languages.push(repo.language.clone());
        self.owners.push(repo.owner.clone());
    }

    /// Materialize fetched records into a table
    pub fn from_records(records: &[Repository]) -> Self {
        let mut table = Self::default();
        for repo in records {
            table.push(repo);
        }
        table
    }

    /// Convert the table back into row records
    pub fn records(&self) -> Vec<Repository> {
        (0..self.len())
            .map(|i| Repository {
                name: self.names[i].clone(),
                url: self.urls[i].clone(),
                description: self.descriptions[i].clone(),
                stars: self.stars[i],
                forks: self.forks[i],
                watchers: self.watchers[i],
                open_issues: self.open_issues[i],
                language: self.languages[i].clone(),
                owner: self.owners[i].clone(),
                date: self.dates[i].value,
            })
            .collect()
    }

    /// Read a CSV file from disk
    #[instrument]
    pub fn read_csv(path: &Path) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_csv_reader(file)?;
        info!(path = %path.display(), rows = table.len(), "Loaded repository table from CSV");
        Ok(table)
    }

    /// Parse CSV data with a header row; columns are matched by name
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = ColumnIndex::resolve(reader.headers()?)?;

        let mut table = Self::default();
        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("");

            let forks = match optional_text(&record, columns.forks) {
                Some(raw) => Some(parse_count(&raw, "Forks", row)?),
                None => None,
            };

            table.names.push(field(columns.name).trim().to_string());
            table.descriptions.push(optional_text(&record, columns.description));
            table.stars.push(parse_count(field(columns.stars), "Stars", row)?);
            table.forks.push(forks);
            table
                .watchers
                .push(parse_count(field(columns.watchers), "Watchers", row)?);
            table
                .open_issues
                .push(parse_count(field(columns.issues), "Issues", row)?);
            table.urls.push(field(columns.url).trim().to_string());
            table
                .dates
                .push(DateCell::parse(optional_text(&record, columns.date)));
            table.languages.push(optional_text(&record, columns.language));
            table.owners.push(optional_text(&record, columns.owner));
        }

        Ok(table)
    }

    /// Write the table to a CSV file, replacing any existing file
    #[instrument(skip(self))]
    pub fn write_csv(&self, path: &Path) -> Result<(), LoadError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)?;
        info!(path = %path.display(), rows = self.len(), "Wrote repository table to CSV");
        Ok(())
    }

    pub fn to_csv_writer<W: Write>(&self, writer: W) -> Result<(), LoadError> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(CSV_HEADER)?;

        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        for i in 0..self.len() {
            writer.write_record([
                self.names[i].clone(),
                text(&self.descriptions[i]),
                self.stars[i].to_string(),
                self.forks[i].map(|f| f.to_string()).unwrap_or_default(),
                self.watchers[i].to_string(),
                self.open_issues[i].to_string(),
                self.urls[i].clone(),
                text(&self.dates[i].raw),
                text(&self.languages[i]),
                text(&self.owners[i]),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
