#![allow(dead_code)]

use scholargraph::client::{Connection, MemoryClient};
use scholargraph::graph::GraphStore;
use scholargraph::loader::{run_task, LoadTask, Row};
use scholargraph::ScholarResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory rows per loader task, loaded in canonical task order
#[derive(Default)]
pub struct Corpus {
    rows: HashMap<LoadTask, Vec<Vec<(String, String)>>>,
}

impl Corpus {
    pub fn add(&mut self, task: LoadTask, fields: &[(&str, &str)]) -> &mut Self {
        self.rows.entry(task).or_default().push(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn author(&mut self, id: &str, name: &str) -> &mut Self {
        self.add(LoadTask::Authors, &[("authorID", id), ("name", name)])
    }

    pub fn paper(&mut self, id: &str, year: i64) -> &mut Self {
        let year = year.to_string();
        let title = format!("Title of {}", id);
        self.add(
            LoadTask::Papers,
            &[("paperID", id), ("title", &title), ("year", &year)],
        )
    }

    pub fn writes(&mut self, author: &str, paper: &str) -> &mut Self {
        self.add(
            LoadTask::Writes,
            &[("authorID", author), ("paperID", paper), ("corresponds", "false")],
        )
    }

    pub fn cite(&mut self, citing: &str, cited: &str) -> &mut Self {
        self.add(LoadTask::Cites, &[("paperID", citing), ("referenceID", cited)])
    }

    /// `count` fresh papers from `year` citing `cited`
    pub fn cited_by(&mut self, cited: &str, count: usize, year: i64) -> &mut Self {
        for i in 0..count {
            let citing = format!("{}-citer-{}-{}", cited, year, i);
            self.paper(&citing, year);
            self.cite(&citing, cited);
        }
        self
    }

    pub fn conference(&mut self, id: &str, name: &str) -> &mut Self {
        self.add(LoadTask::Conferences, &[("conferenceID", id), ("name", name)])
    }

    pub fn workshop(&mut self, id: &str, name: &str) -> &mut Self {
        self.add(LoadTask::Workshops, &[("workshopID", id), ("name", name)])
    }

    pub fn proceedings(&mut self, id: &str, venue: &str, kind: &str, edition: i64) -> &mut Self {
        let edition = edition.to_string();
        self.add(
            LoadTask::Proceedings,
            &[
                ("proceedingsID", id),
                ("edition", &edition),
                ("conferenceID", venue),
                ("type", kind),
            ],
        )
    }

    pub fn in_proceedings(&mut self, paper: &str, proceedings: &str) -> &mut Self {
        self.add(
            LoadTask::PaperProceedings,
            &[("paperID", paper), ("proceedingsID", proceedings)],
        )
    }

    pub fn journal(&mut self, id: &str, name: &str) -> &mut Self {
        self.add(LoadTask::Journals, &[("journalID", id), ("name", name)])
    }

    pub fn volume(&mut self, id: &str, journal: &str, number: i64) -> &mut Self {
        let number = number.to_string();
        self.add(
            LoadTask::Volumes,
            &[("volID", id), ("volNumber", &number), ("journalID", journal)],
        )
    }

    pub fn in_volume(&mut self, paper: &str, volume: &str) -> &mut Self {
        self.add(LoadTask::PaperVolume, &[("paperID", paper), ("volID", volume)])
    }

    pub fn keyword(&mut self, paper: &str, keyword: &str) -> &mut Self {
        self.add(
            LoadTask::PaperKeywords,
            &[("paperID", paper), ("keyword", keyword)],
        )
    }

    /// Load every task into `connection`, asserting each row applied cleanly
    pub async fn load_into(&self, connection: &Connection) {
        for task in LoadTask::ALL {
            let Some(rows) = self.rows.get(&task) else {
                continue;
            };
            let rows: Vec<ScholarResult<Row>> = rows
                .iter()
                .enumerate()
                .map(|(idx, fields)| {
                    let pairs: Vec<(&str, &str)> =
                        fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                    Ok(Row::from_pairs(idx as u64 + 2, &pairs))
                })
                .collect();
            let report = run_task(connection, task, rows).await.unwrap();
            assert_eq!(
                report.failed + report.parse_errors + report.unmatched,
                0,
                "{:?}",
                report
            );
        }
    }

    /// Fresh memory-backed connection holding this corpus
    pub async fn connect(&self) -> (Connection, Arc<RwLock<GraphStore>>) {
        let store = Arc::new(RwLock::new(GraphStore::new()));
        let client = MemoryClient::with_store(store.clone());
        let connection = Connection::open(Arc::new(client)).await.unwrap();
        self.load_into(&connection).await;
        (connection, store)
    }
}
