use async_trait::async_trait;
use scholargraph::client::{Connection, GraphClient, MemoryClient, QueryResult};
use scholargraph::graph::GraphStore;
use scholargraph::loader::{LoadPlan, LoadTask, PlanEntry, Pipeline, SchemaVariant, Stage};
use scholargraph::schema::{Key, NodeLabel, RelType};
use scholargraph::statement::Statement;
use scholargraph::{ScholarError, ScholarResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Small corpus covering every create-stage task plus two enrichments
fn fixture(dir: &Path) -> BTreeMap<String, PathBuf> {
    let files = [
        ("authors", "authorID,name\na1,Ada Lovelace\na2,Grace Hopper\n"),
        ("years", "year\n2020\n2021\n"),
        ("journals", "journalID,name,issn,editor\nj1,Graph Journal,1234-5678,Edsger\n"),
        ("conferences", "conferenceID,name,chair\nc1,ICDE,Barbara\n"),
        ("workshops", "workshopID,name,chair\nw1,GRADES,Peter\n"),
        ("keywords", "keyword\ngraph\ndatabases\n"),
        ("organizations", "orgID,name,type\no1,UPC,university\n"),
        (
            "papers",
            "paperID,title,abstract,publicationDate,year\n\
             p1,Graphs,About graphs,2020-03-01,2020\n\
             p2,More graphs,Follow up,2021-05-10,\n\
             p3,Tables,,,2021\n",
        ),
        ("volumes", "volID,volNumber,journalID\nv1,7,j1\n"),
        (
            "proceedings",
            "proceedingsID,edition,conferenceID,type,venue,startDate,endDate\n\
             pr1,1,c1,Conference,Venice,2021-04-01,2021-04-05\n\
             pr2,1,w1,workshop,Utrecht,2021-06-01,2021-06-01\n",
        ),
        (
            "writes",
            "authorID,paperID,corresponds\na1,p1,true\na2,p2,false\nghost,p3,false\n",
        ),
        ("cites", "paperID,referenceID\np2,p1\np3,p1\np1,p1\n"),
        ("reviews", "authorID,paperID\na2,p1\n"),
        ("paper_volume", "paperID,volID\np1,v1\n"),
        ("paper_proceedings", "paperID,proceedingsID\np2,pr1\np3,pr2\n"),
        ("paper_keywords", "paperID,keyword\np1,graph\np2,\np3,databases\n"),
        ("affiliations", "authorID,affiliation\na1,o1\n"),
        (
            "review_details",
            "authorID,paperID,content,decision\na2,p1,Solid work,TRUE\na1,p3,Missing review,false\n",
        ),
        ("journal_policies", "journalID,reviewerPolicy\nj1,3 reviewers\n"),
    ];

    files
        .iter()
        .map(|(task, content)| (task.to_string(), write(dir, &format!("{}.csv", task), content)))
        .collect()
}

async fn memory_connection() -> (Connection, Arc<RwLock<GraphStore>>) {
    let store = Arc::new(RwLock::new(GraphStore::new()));
    let client = MemoryClient::with_store(store.clone());
    let connection = Connection::open(Arc::new(client)).await.unwrap();
    (connection, store)
}

#[tokio::test]
async fn test_full_load_reports_every_task() {
    let dir = tempfile::tempdir().unwrap();
    let plan = LoadPlan::from_paths(&fixture(dir.path())).unwrap();
    let (connection, store) = memory_connection().await;

    let report = Pipeline::new(&connection, SchemaVariant::Canonical)
        .run(&plan)
        .await
        .unwrap();
    assert_eq!(report.tasks.len(), plan.len());

    let writes = report.task(LoadTask::Writes).unwrap();
    assert_eq!(writes.rows_read, 3);
    assert_eq!(writes.applied, 2);
    assert_eq!(writes.unmatched, 1);

    let cites = report.task(LoadTask::Cites).unwrap();
    assert_eq!(cites.applied, 2);
    assert_eq!(cites.parse_errors, 1);

    let keywords = report.task(LoadTask::PaperKeywords).unwrap();
    assert_eq!(keywords.applied, 2);
    assert_eq!(keywords.skipped, 1);

    // The second review row has no REVIEWS edge to update
    let details = report.task(LoadTask::ReviewDetails).unwrap();
    assert_eq!(details.applied, 1);
    assert_eq!(details.unmatched, 1);

    let store = store.read().await;
    assert_eq!(store.label_count(NodeLabel::Author), 2);
    assert_eq!(store.label_count(NodeLabel::Paper), 3);
    assert_eq!(store.rel_count(RelType::InYear), 3);
    assert_eq!(store.rel_count(RelType::PresentedIn), 3);

    let p2 = store.find_node(NodeLabel::Paper, &Key::from("p2")).unwrap();
    let year = store.targets(p2, RelType::InYear).next().unwrap();
    assert_eq!(year.get_property("value"), Some(&serde_json::json!(2021)));

    let pr2 = store.find_node(NodeLabel::Proceedings, &Key::from("pr2")).unwrap();
    let venue = store.targets(pr2, RelType::PresentedIn).next().unwrap();
    assert_eq!(venue.label, NodeLabel::Workshop);

    let a2 = store.find_node(NodeLabel::Author, &Key::from("a2")).unwrap();
    let p1 = store.find_node(NodeLabel::Paper, &Key::from("p1")).unwrap();
    let review = store.find_edge(a2, p1, RelType::Reviews).unwrap();
    let review = store.get_edge(review).unwrap();
    assert_eq!(review.properties.get("decision"), Some(&serde_json::json!(true)));
    assert_eq!(review.properties.get("content"), Some(&serde_json::json!("Solid work")));

    let j1 = store.find_node(NodeLabel::Journal, &Key::from("j1")).unwrap();
    assert_eq!(store.get_node(j1).unwrap().text("reviewerPolicy"), Some("3 reviewers"));
}

#[tokio::test]
async fn test_reloading_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let plan = LoadPlan::from_paths(&fixture(dir.path())).unwrap();
    let (connection, store) = memory_connection().await;
    let pipeline = Pipeline::new(&connection, SchemaVariant::Canonical);

    pipeline.run(&plan).await.unwrap();
    let (nodes, edges) = {
        let store = store.read().await;
        (store.node_count(), store.edge_count())
    };

    pipeline.run(&plan).await.unwrap();
    let store = store.read().await;
    assert_eq!(store.node_count(), nodes);
    assert_eq!(store.edge_count(), edges);
}

#[tokio::test]
async fn test_stages_run_separately() {
    let dir = tempfile::tempdir().unwrap();
    let plan = LoadPlan::from_paths(&fixture(dir.path())).unwrap();
    let (connection, _store) = memory_connection().await;
    let pipeline = Pipeline::new(&connection, SchemaVariant::Canonical);

    let created = pipeline.run_stages(&plan, &[Stage::Create]).await.unwrap();
    assert!(created.task(LoadTask::ReviewDetails).is_none());

    let enriched = pipeline.run_stages(&plan, &[Stage::Enrich]).await.unwrap();
    assert_eq!(enriched.tasks.len(), 2);
    assert_eq!(enriched.task(LoadTask::JournalPolicies).unwrap().applied, 1);
}

#[tokio::test]
async fn test_legacy_headers() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = BTreeMap::new();
    paths.insert(
        "authors".to_string(),
        write(dir.path(), "authors.csv", "authorId,name\na1,Ada\n"),
    );
    paths.insert(
        "papers".to_string(),
        write(dir.path(), "papers.csv", "paperId,title,abstract,publicationDate\np1,T,,2019-01-01\np2,U,,2019-02-01\n"),
    );
    paths.insert(
        "cites".to_string(),
        write(dir.path(), "cites.csv", "paperId,citedPaperId\np2,p1\n"),
    );
    let plan = LoadPlan::from_paths(&paths).unwrap();
    let (connection, store) = memory_connection().await;

    let report = Pipeline::new(&connection, SchemaVariant::Legacy)
        .run(&plan)
        .await
        .unwrap();
    assert!(!report.has_issues());
    assert_eq!(store.read().await.rel_count(RelType::Cites), 1);
}

#[tokio::test]
async fn test_missing_file_does_not_stop_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = BTreeMap::new();
    paths.insert("authors".to_string(), dir.path().join("missing.csv"));
    paths.insert(
        "years".to_string(),
        write(dir.path(), "years.csv", "year\n2020\nnot-a-year\n"),
    );
    let plan = LoadPlan::from_paths(&paths).unwrap();
    let (connection, _store) = memory_connection().await;

    let report = Pipeline::new(&connection, SchemaVariant::Canonical)
        .run(&plan)
        .await
        .unwrap();
    assert!(report.task(LoadTask::Authors).unwrap().error.is_some());
    let years = report.task(LoadTask::Years).unwrap();
    assert_eq!(years.applied, 1);
    assert_eq!(years.parse_errors, 1);
    assert_eq!(connection.open_sessions(), 0);
}

#[test]
fn test_relationships_must_follow_their_endpoints() {
    let plan = LoadPlan::new(vec![
        PlanEntry {
            task: LoadTask::Writes,
            path: PathBuf::from("writes.csv"),
        },
        PlanEntry {
            task: LoadTask::Authors,
            path: PathBuf::from("authors.csv"),
        },
    ]);
    assert!(plan.validate().is_err());
}

/// Accepts the connectivity check, then loses the store
struct DroppingClient;

#[async_trait]
impl GraphClient for DroppingClient {
    async fn execute(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        match statement {
            Statement::Ping => Ok(QueryResult::single(&["ok"], vec![serde_json::json!(1)])),
            _ => Err(ScholarError::Connection("connection reset".to_string())),
        }
    }

    fn backend(&self) -> &'static str {
        "dropping"
    }
}

#[tokio::test]
async fn test_connection_loss_is_fatal_and_releases_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let plan = LoadPlan::from_paths(&fixture(dir.path())).unwrap();
    let connection = Connection::open(Arc::new(DroppingClient)).await.unwrap();

    let result = Pipeline::new(&connection, SchemaVariant::Canonical)
        .run(&plan)
        .await;
    assert!(matches!(result, Err(ScholarError::Connection(_))));
    assert_eq!(connection.open_sessions(), 0);
    assert!(connection.tracker().opened() >= 1);
}
