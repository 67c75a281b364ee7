//! Neo4jHttpClient: network client for the Neo4j transactional HTTP endpoint
//!
//! Every statement is one auto-commit request to `/db/{database}/tx/commit`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::client::{GraphClient, QueryResult};
use crate::config::ConnectionConfig;
use crate::error::{ScholarError, ScholarResult};
use crate::statement::Statement;

#[derive(Debug, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Debug, Deserialize)]
struct DataRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    code: String,
    message: String,
}

/// Client for a Neo4j server reached over HTTP(S)
pub struct Neo4jHttpClient {
    commit_url: String,
    user: String,
    password: String,
    http_client: Client,
}

impl Neo4jHttpClient {
    /// Create a client. Only `http://` and `https://` URIs are accepted.
    pub fn new(config: &ConnectionConfig) -> ScholarResult<Self> {
        let uri = config.uri.trim_end_matches('/');
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(ScholarError::Config(format!(
                "unsupported Neo4j URI '{}': use the HTTP endpoint (http:// or https://)",
                config.uri
            )));
        }

        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build()?;

        Ok(Self {
            commit_url: format!("{}/db/{}/tx/commit", uri, config.database),
            user: config.user.clone(),
            password: config.password.clone(),
            http_client,
        })
    }

    pub fn commit_url(&self) -> &str {
        &self.commit_url
    }

    /// Only a failure to reach the server is a connection error. A statement
    /// that outlives the request timeout failed on its own.
    fn transport_error(&self, statement: &Statement, e: reqwest::Error) -> ScholarError {
        if e.is_connect() {
            ScholarError::Connection(format!("{}: {}", self.commit_url, e))
        } else if e.is_timeout() {
            ScholarError::query(statement.name(), format!("timed out: {}", e))
        } else {
            ScholarError::Http(e)
        }
    }

    /// POST one statement and decode the single result
    async fn post_statement(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        let body = json!({
            "statements": [{
                "statement": statement.cypher(),
                "parameters": statement.parameters(),
                "resultDataContents": ["row"],
            }]
        });

        let response = self
            .http_client
            .post(&self.commit_url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(statement, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ScholarError::Connection(format!(
                "authentication failed for user '{}' ({})",
                self.user, status
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScholarError::query(
                statement.name(),
                format!("HTTP {}: {}", status, text),
            ));
        }

        let decoded: CommitResponse = response
            .json()
            .await
            .map_err(|e| self.transport_error(statement, e))?;
        if let Some(error) = decoded.errors.first() {
            if error.code.contains("Security") {
                return Err(ScholarError::Connection(format!(
                    "{}: {}",
                    error.code, error.message
                )));
            }
            return Err(ScholarError::query(
                statement.name(),
                format!("{}: {}", error.code, error.message),
            ));
        }

        Ok(decoded
            .results
            .into_iter()
            .next()
            .map(|result| QueryResult {
                columns: result.columns,
                records: result.data.into_iter().map(|d| d.row).collect(),
            })
            .unwrap_or_else(|| QueryResult::new(statement.columns())))
    }
}

#[async_trait]
impl GraphClient for Neo4jHttpClient {
    async fn execute(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        self.post_statement(statement).await
    }

    fn backend(&self) -> &'static str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn config(uri: &str) -> ConnectionConfig {
        ConnectionConfig {
            uri: uri.to_string(),
            user: "neo4j".to_string(),
            password: "secret".to_string(),
            database: "papers".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: None,
        }
    }

    /// Read one request: headers, then `content-length` bytes of body
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    /// Answer a single request with a fixed status and JSON body
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });
        format!("http://{}", addr)
    }

    async fn execute_against(uri: &str) -> ScholarResult<QueryResult> {
        Neo4jHttpClient::new(&config(uri))
            .unwrap()
            .execute(&Statement::Ping)
            .await
    }

    #[test]
    fn test_commit_url() {
        let client = Neo4jHttpClient::new(&config("http://localhost:7474/")).unwrap();
        assert_eq!(client.commit_url(), "http://localhost:7474/db/papers/tx/commit");
    }

    #[test]
    fn test_bolt_uri_rejected() {
        assert!(matches!(
            Neo4jHttpClient::new(&config("bolt://localhost:7687")),
            Err(ScholarError::Config(_))
        ));
    }

    #[test]
    fn test_commit_response_decoding() {
        let raw = r#"{"results":[{"columns":["matched"],"data":[{"row":[1],"meta":[null]}]}],"errors":[]}"#;
        let decoded: CommitResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.results[0].columns, vec!["matched"]);
        assert_eq!(decoded.results[0].data[0].row, vec![json!(1)]);

        let failed = r#"{"results":[],"errors":[{"code":"Neo.ClientError.Statement.SyntaxError","message":"bad"}]}"#;
        let decoded: CommitResponse = serde_json::from_str(failed).unwrap();
        assert_eq!(decoded.errors[0].message, "bad");
    }

    #[tokio::test]
    async fn test_successful_statement() {
        let uri = serve_once(
            "200 OK",
            r#"{"results":[{"columns":["ok"],"data":[{"row":[1]}]}],"errors":[]}"#,
        )
        .await;
        let result = execute_against(&uri).await.unwrap();
        assert_eq!(result.columns, vec!["ok"]);
        assert_eq!(result.records, vec![vec![json!(1)]]);
    }

    #[tokio::test]
    async fn test_unauthorized_is_fatal() {
        let uri = serve_once("401 Unauthorized", "{}").await;
        let err = execute_against(&uri).await.unwrap_err();
        assert!(matches!(err, ScholarError::Connection(_)), "{}", err);
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_forbidden_is_fatal() {
        let uri = serve_once("403 Forbidden", "{}").await;
        let err = execute_against(&uri).await.unwrap_err();
        assert!(matches!(err, ScholarError::Connection(_)), "{}", err);
    }

    #[tokio::test]
    async fn test_security_error_body_is_fatal() {
        let uri = serve_once(
            "200 OK",
            r#"{"results":[],"errors":[{"code":"Neo.ClientError.Security.Unauthorized","message":"bad credentials"}]}"#,
        )
        .await;
        let err = execute_against(&uri).await.unwrap_err();
        assert!(matches!(err, ScholarError::Connection(_)), "{}", err);
    }

    #[tokio::test]
    async fn test_statement_error_body_is_a_query_error() {
        let uri = serve_once(
            "200 OK",
            r#"{"results":[],"errors":[{"code":"Neo.ClientError.Procedure.ProcedureNotFound","message":"no gds"}]}"#,
        )
        .await;
        let err = execute_against(&uri).await.unwrap_err();
        match &err {
            ScholarError::Query { statement, message } => {
                assert_eq!(statement, "ping");
                assert!(message.contains("ProcedureNotFound"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_server_error_status_is_a_query_error() {
        let uri = serve_once("500 Internal Server Error", "{}").await;
        let err = execute_against(&uri).await.unwrap_err();
        assert!(matches!(err, ScholarError::Query { .. }), "{}", err);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_refused_connection_is_fatal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = execute_against(&format!("http://{}", addr)).await.unwrap_err();
        assert!(matches!(err, ScholarError::Connection(_)), "{}", err);
    }

    #[tokio::test]
    async fn test_slow_statement_is_not_fatal() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let mut slow = config(&format!("http://{}", addr));
        slow.request_timeout_secs = Some(1);
        let err = Neo4jHttpClient::new(&slow)
            .unwrap()
            .execute(&Statement::Ping)
            .await
            .unwrap_err();
        assert!(matches!(err, ScholarError::Query { .. }), "{}", err);
        assert!(!err.is_fatal());
        server.abort();
    }
}
