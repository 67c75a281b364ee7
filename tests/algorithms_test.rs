mod common;

use async_trait::async_trait;
use common::Corpus;
use scholargraph::algorithms::{Algorithm, AlgorithmPlan, AlgorithmRunner, Projection};
use scholargraph::client::{Connection, GraphClient, MemoryClient, QueryResult};
use scholargraph::schema::Orientation;
use scholargraph::statement::Statement;
use scholargraph::{ScholarError, ScholarResult};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Records every statement and answers with canned results
#[derive(Default)]
struct RecordingClient {
    log: Mutex<Vec<Statement>>,
    existing: Vec<String>,
    failing: Option<Algorithm>,
    lost: bool,
}

impl RecordingClient {
    fn names(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().iter().map(Statement::name).collect()
    }
}

#[async_trait]
impl GraphClient for RecordingClient {
    async fn execute(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        self.log.lock().unwrap().push(statement.clone());
        match statement {
            Statement::Ping => Ok(QueryResult::single(&["ok"], vec![json!(1)])),
            Statement::ProjectionExists { name } => Ok(QueryResult::single(
                statement.columns(),
                vec![json!(self.existing.contains(name))],
            )),
            Statement::ProjectGraph { projection } => Ok(QueryResult::single(
                statement.columns(),
                vec![json!(projection.name), json!(3), json!(2)],
            )),
            Statement::StreamAlgorithm { algorithm, .. } => {
                if self.lost {
                    return Err(ScholarError::Connection("gone".to_string()));
                }
                if self.failing == Some(*algorithm) {
                    return Err(ScholarError::Query {
                        statement: statement.name().to_string(),
                        message: "Procedure not found".to_string(),
                    });
                }
                let mut result = QueryResult::new(statement.columns());
                result.push(vec![json!("p2"), json!(0.1)]);
                result.push(vec![json!("p3"), json!(0.5)]);
                result.push(vec![json!("p1"), json!(0.5)]);
                result.push(vec![json!("p4"), json!(0.05)]);
                Ok(result)
            }
            Statement::DropProjection { name } => Ok(QueryResult::single(
                statement.columns(),
                vec![json!(name)],
            )),
            other => Err(ScholarError::Query {
                statement: other.name().to_string(),
                message: "unexpected".to_string(),
            }),
        }
    }

    fn backend(&self) -> &'static str {
        "recording"
    }
}

#[tokio::test]
async fn test_projection_created_once_and_results_ranked() {
    let client = Arc::new(RecordingClient::default());
    let connection = Connection::open(client.clone()).await.unwrap();
    let mut runner = AlgorithmRunner::new(&connection, 3);
    let projection = Projection::citations("paper_cites", Orientation::Natural);

    let scores = runner.run(Algorithm::PageRank, &projection).await.unwrap();
    runner.run(Algorithm::Betweenness, &projection).await.unwrap();

    let ranked: Vec<_> = scores
        .iter()
        .map(|s| (s.rank, s.paper_id.as_str(), s.score))
        .collect();
    assert_eq!(ranked, vec![(1, "p1", 0.5), (2, "p3", 0.5), (3, "p2", 0.1)]);

    assert_eq!(
        client.names(),
        vec![
            "ping",
            "projection_exists",
            "project_graph",
            "stream_algorithm",
            "stream_algorithm",
        ]
    );
    assert_eq!(connection.open_sessions(), 0);
}

#[tokio::test]
async fn test_existing_projection_is_reused() {
    let client = Arc::new(RecordingClient {
        existing: vec!["paper_cites_undirected".to_string()],
        ..Default::default()
    });
    let connection = Connection::open(client.clone()).await.unwrap();
    let mut runner = AlgorithmRunner::new(&connection, 10);

    let created = runner
        .ensure_projection(&Projection::citations(
            "paper_cites_undirected",
            Orientation::Undirected,
        ))
        .await
        .unwrap();
    assert!(!created);
    assert!(!client.names().contains(&"project_graph"));

    assert!(runner.drop_projection("paper_cites_undirected").await.unwrap());
}

#[tokio::test]
async fn test_failing_algorithm_is_skipped() {
    let client = Arc::new(RecordingClient {
        failing: Some(Algorithm::Louvain),
        ..Default::default()
    });
    let connection = Connection::open(client.clone()).await.unwrap();

    let scores = AlgorithmRunner::new(&connection, 2)
        .run_plan(&AlgorithmPlan::default())
        .await
        .unwrap();
    assert_eq!(scores.len(), 6 * 2);
    assert!(scores.iter().all(|s| s.algorithm != Algorithm::Louvain));

    // One projection per orientation
    let projected = client
        .names()
        .into_iter()
        .filter(|name| *name == "project_graph")
        .count();
    assert_eq!(projected, 2);
}

#[tokio::test]
async fn test_connection_loss_stops_the_plan() {
    let client = Arc::new(RecordingClient {
        lost: true,
        ..Default::default()
    });
    let connection = Connection::open(client).await.unwrap();

    let result = AlgorithmRunner::new(&connection, 2)
        .run_plan(&AlgorithmPlan::default())
        .await;
    assert!(matches!(result, Err(ScholarError::Connection(_))));
    assert_eq!(connection.open_sessions(), 0);
}

#[tokio::test]
async fn test_default_plan_on_memory_backend() {
    let mut corpus = Corpus::default();
    for paper in ["p1", "p2", "p3", "p4", "p5"] {
        corpus.paper(paper, 2020);
    }
    corpus
        .cite("p1", "p3")
        .cite("p2", "p3")
        .cite("p4", "p3")
        .cite("p1", "p2")
        .cite("p2", "p1");
    let (connection, _) = corpus.connect().await;

    let scores = AlgorithmRunner::new(&connection, 10)
        .run_plan(&AlgorithmPlan::default())
        .await
        .unwrap();
    for algorithm in Algorithm::ALL {
        assert!(
            scores.iter().any(|s| s.algorithm == algorithm),
            "no rows for {}",
            algorithm
        );
    }

    let pagerank: Vec<_> = scores
        .iter()
        .filter(|s| s.algorithm == Algorithm::PageRank)
        .collect();
    assert_eq!(pagerank.len(), 5);
    assert_eq!(pagerank[0].paper_id, "p3");

    // p1, p2 and p3 form the only triangle
    let triangles: Vec<_> = scores
        .iter()
        .filter(|s| s.algorithm == Algorithm::TriangleCount && s.score > 0.0)
        .map(|s| s.paper_id.as_str())
        .collect();
    assert_eq!(triangles, vec!["p1", "p2", "p3"]);

    // p5 is isolated: its own weak component
    let wcc: Vec<_> = scores
        .iter()
        .filter(|s| s.algorithm == Algorithm::WeaklyConnectedComponents)
        .collect();
    let p5 = wcc.iter().find(|s| s.paper_id == "p5").unwrap();
    assert_eq!(wcc.iter().filter(|s| s.score == p5.score).count(), 1);
}

#[tokio::test]
async fn test_memory_projection_survives_between_runs() {
    let mut corpus = Corpus::default();
    corpus.paper("p1", 2020).paper("p2", 2020).cite("p1", "p2");
    let store = Arc::new(tokio::sync::RwLock::new(scholargraph::graph::GraphStore::new()));
    let client = Arc::new(MemoryClient::with_store(store));
    let connection = Connection::open(client.clone()).await.unwrap();
    corpus.load_into(&connection).await;

    let projection = Projection::citations("paper_cites", Orientation::Natural);
    AlgorithmRunner::new(&connection, 5)
        .run(Algorithm::PageRank, &projection)
        .await
        .unwrap();
    // A second runner finds the projection through the store
    let mut runner = AlgorithmRunner::new(&connection, 5);
    assert!(!runner.ensure_projection(&projection).await.unwrap());
    assert_eq!(client.projection_names().await, vec!["paper_cites".to_string()]);
}
