//! Row sources: CSV files with headers and in-memory rows
//!
//! Every row reaches the loader as a map of canonical column name to raw text.
//! Legacy files are read through a per-task header-rename table.

use super::task::LoadTask;
use crate::error::{RowError, ScholarResult};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column naming used by a set of source files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// `authorID`, `paperID`, `referenceID`, ...
    #[default]
    Canonical,
    /// `authorId`, `paperId`, `citedPaperId`, `reviewerId`, ...
    Legacy,
}

impl SchemaVariant {
    /// Canonical name of a source header for the given task.
    pub fn canonical_header(&self, task: LoadTask, header: &str) -> String {
        let header = header.trim();
        if *self == SchemaVariant::Legacy {
            if let Some((_, canonical)) = legacy_renames(task)
                .iter()
                .find(|(legacy, _)| *legacy == header)
            {
                return (*canonical).to_string();
            }
        }
        header.to_string()
    }
}

fn legacy_renames(task: LoadTask) -> &'static [(&'static str, &'static str)] {
    match task {
        LoadTask::Authors => &[("authorId", "authorID")],
        LoadTask::Years => &[],
        LoadTask::Journals => &[("ISSN", "issn")],
        LoadTask::Conferences => &[
            ("conferenceId", "conferenceID"),
            ("conferenceName", "name"),
            ("chairName", "chair"),
        ],
        LoadTask::Workshops => &[("workshopId", "workshopID"), ("chairName", "chair")],
        LoadTask::Keywords => &[("Keywords", "keyword")],
        LoadTask::Organizations => &[("organizationId", "orgID"), ("organizationType", "type")],
        LoadTask::Papers => &[("paperId", "paperID")],
        LoadTask::Volumes => &[("volumeID", "volID")],
        LoadTask::Proceedings => &[
            ("proceedingsId", "proceedingsID"),
            ("conferenceId", "conferenceID"),
            ("start_date", "startDate"),
            ("end_date", "endDate"),
        ],
        LoadTask::Writes => &[
            ("authorId", "authorID"),
            ("paperId", "paperID"),
            ("isCorrespondence", "corresponds"),
        ],
        LoadTask::Cites => &[("paperId", "paperID"), ("citedPaperId", "referenceID")],
        LoadTask::Reviews => &[("reviewerId", "authorID"), ("paperId", "paperID")],
        LoadTask::PaperVolume => &[("paperId", "paperID"), ("volumeID", "volID")],
        LoadTask::PaperProceedings => &[("paperId", "paperID"), ("proceedingsId", "proceedingsID")],
        LoadTask::PaperKeywords => &[("paperId", "paperID"), ("Keywords", "keyword")],
        LoadTask::Affiliations => &[("authorId", "authorID"), ("organizationId", "affiliation")],
        LoadTask::ReviewDetails => &[
            ("reviewerId", "authorID"),
            ("paperId", "paperID"),
            ("acceptance", "decision"),
        ],
        LoadTask::JournalPolicies => &[],
        LoadTask::ConferencePolicies => &[("conferenceId", "conferenceID")],
        LoadTask::WorkshopPolicies => &[("workshopId", "workshopID")],
    }
}

/// One source record: canonical column name -> raw text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    line: u64,
    fields: IndexMap<String, String>,
}

impl Row {
    pub fn new(line: u64, fields: IndexMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Build a row from literal pairs. Handy for in-memory sources.
    pub fn from_pairs(line: u64, pairs: &[(&str, &str)]) -> Self {
        Self {
            line,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    /// Trimmed field value; empty fields read as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn required(&self, field: &str) -> Result<&str, RowError> {
        self.get(field).ok_or_else(|| self.error(field, "is missing"))
    }

    pub fn text(&self, field: &str) -> Result<String, RowError> {
        self.required(field).map(str::to_string)
    }

    pub fn optional_text(&self, field: &str) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    /// Strict integer: surrounding whitespace only, no decimals.
    pub fn integer(&self, field: &str) -> Result<i64, RowError> {
        let raw = self.required(field)?;
        raw.parse::<i64>()
            .map_err(|_| self.error(field, format!("is not an integer: '{}'", raw)))
    }

    pub fn optional_integer(&self, field: &str) -> Result<Option<i64>, RowError> {
        match self.get(field) {
            Some(_) => self.integer(field).map(Some),
            None => Ok(None),
        }
    }

    /// ISO `YYYY-MM-DD` date
    pub fn date(&self, field: &str) -> Result<NaiveDate, RowError> {
        let raw = self.required(field)?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| self.error(field, format!("is not a YYYY-MM-DD date: '{}'", raw)))
    }

    pub fn optional_date(&self, field: &str) -> Result<Option<NaiveDate>, RowError> {
        match self.get(field) {
            Some(_) => self.date(field).map(Some),
            None => Ok(None),
        }
    }

    /// `true` in any case is true; anything else, including absence, is false.
    pub fn flag(&self, field: &str) -> bool {
        self.get(field)
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub(crate) fn error(&self, field: &str, reason: impl Into<String>) -> RowError {
        RowError {
            line: self.line,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Streaming CSV source with canonicalised headers
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    record: csv::StringRecord,
}

impl CsvRowSource<File> {
    pub fn open(path: impl AsRef<Path>, task: LoadTask, variant: SchemaVariant) -> ScholarResult<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, task, variant)
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(reader: R, task: LoadTask, variant: SchemaVariant) -> ScholarResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()?
            .iter()
            .map(|header| variant.canonical_header(task, header))
            .collect();

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for CsvRowSource<R> {
    type Item = ScholarResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                let fields = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(self.record.iter().map(str::to_string))
                    .collect();
                Some(Ok(Row::new(line, fields)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing() {
        let row = Row::from_pairs(
            3,
            &[
                ("year", " 2021 "),
                ("volNumber", "4.5"),
                ("publicationDate", "2020-02-29"),
                ("corresponds", "TRUE"),
                ("abstract", "   "),
            ],
        );

        assert_eq!(row.integer("year").unwrap(), 2021);
        assert!(row.integer("volNumber").is_err());
        assert_eq!(
            row.date("publicationDate").unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()
        );
        assert!(row.flag("corresponds"));
        assert!(!row.flag("missing"));
        assert_eq!(row.get("abstract"), None);
        assert_eq!(row.optional_integer("edition").unwrap(), None);

        let err = row.required("title").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.field, "title");
    }

    #[test]
    fn test_rejects_non_iso_dates() {
        let row = Row::from_pairs(1, &[("startDate", "03/04/2021")]);
        assert!(row.date("startDate").is_err());
        assert!(row.optional_date("startDate").is_err());
    }

    #[test]
    fn test_csv_source_reads_rows_with_lines() {
        let data = "authorID,name\na1,Ada\na2,\"Grace, H.\"\n";
        let rows: Vec<Row> = CsvRowSource::from_reader(data.as_bytes(), LoadTask::Authors, SchemaVariant::Canonical)
            .unwrap()
            .collect::<ScholarResult<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name"), Some("Grace, H."));
        assert_eq!(rows[0].line(), 2);
    }

    #[test]
    fn test_legacy_headers_are_renamed_per_task() {
        let data = "paperId,citedPaperId\np1,p2\n";
        let source = CsvRowSource::from_reader(data.as_bytes(), LoadTask::Cites, SchemaVariant::Legacy).unwrap();
        assert_eq!(source.headers(), &["paperID".to_string(), "referenceID".to_string()]);

        // organizationId names the organization in one file and the affiliation in another
        assert_eq!(
            SchemaVariant::Legacy.canonical_header(LoadTask::Organizations, "organizationId"),
            "orgID"
        );
        assert_eq!(
            SchemaVariant::Legacy.canonical_header(LoadTask::Affiliations, "organizationId"),
            "affiliation"
        );
        assert_eq!(
            SchemaVariant::Canonical.canonical_header(LoadTask::Cites, "citedPaperId"),
            "citedPaperId"
        );
    }
}
