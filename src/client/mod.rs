//! Graph client interface, connections and scoped sessions
//!
//! Implemented by:
//! - `Neo4jHttpClient`: Neo4j transactional HTTP endpoint
//! - `MemoryClient`: in-process store, used by tests and `--backend memory`

pub mod memory;
pub mod models;
pub mod remote;

pub use memory::MemoryClient;
pub use models::{QueryResult, ResultRow};
pub use remote::Neo4jHttpClient;

use crate::error::{ScholarError, ScholarResult};
use crate::statement::Statement;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Executes typed statements against a graph store
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Execute one statement in its own auto-commit transaction
    async fn execute(&self, statement: &Statement) -> ScholarResult<QueryResult>;

    /// Backend name for logs
    fn backend(&self) -> &'static str;

    /// Check the store is reachable and credentials are accepted
    async fn verify_connectivity(&self) -> ScholarResult<()> {
        self.execute(&Statement::Ping).await.map(|_| ())
    }

    /// Release client resources
    async fn close(&self) -> ScholarResult<()> {
        Ok(())
    }
}

/// Counts sessions that are currently open
#[derive(Debug, Default)]
pub struct SessionTracker {
    open: AtomicUsize,
    opened: AtomicUsize,
}

impl SessionTracker {
    fn acquire(&self) {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn open(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Sessions opened over the tracker's lifetime
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// A verified client plus the tracker of its sessions
pub struct Connection {
    client: Arc<dyn GraphClient>,
    tracker: Arc<SessionTracker>,
}

impl Connection {
    /// Verify connectivity and wrap the client.
    ///
    /// On failure the client is closed before the error is returned.
    pub async fn open(client: Arc<dyn GraphClient>) -> ScholarResult<Self> {
        if let Err(e) = client.verify_connectivity().await {
            if let Err(close_err) = client.close().await {
                debug!("Error while closing failed connection: {}", close_err);
            }
            return Err(match e {
                ScholarError::Connection(msg) => ScholarError::Connection(msg),
                other => ScholarError::Connection(other.to_string()),
            });
        }
        info!("Connected to {} backend", client.backend());
        Ok(Self {
            client,
            tracker: Arc::new(SessionTracker::default()),
        })
    }

    /// Open a session; it is released when dropped.
    pub fn session(&self, scope: impl Into<String>) -> Session<'_> {
        self.tracker.acquire();
        let scope = scope.into();
        debug!("Opened session '{}'", scope);
        Session {
            connection: self,
            scope,
            statements: AtomicUsize::new(0),
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.tracker.open()
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn client(&self) -> &Arc<dyn GraphClient> {
        &self.client
    }

    pub async fn close(self) -> ScholarResult<()> {
        let open = self.tracker.open();
        if open > 0 {
            warn!("Closing connection with {} open sessions", open);
        }
        self.client.close().await?;
        info!(
            "Closed {} connection after {} sessions",
            self.client.backend(),
            self.tracker.opened()
        );
        Ok(())
    }
}

/// Scope guard for a unit of work (one load task, query or algorithm call)
pub struct Session<'c> {
    connection: &'c Connection,
    scope: String,
    statements: AtomicUsize,
}

impl Session<'_> {
    pub async fn run(&self, statement: &Statement) -> ScholarResult<QueryResult> {
        self.statements.fetch_add(1, Ordering::Relaxed);
        debug!("[{}] {}", self.scope, statement.name());
        self.connection.client.execute(statement).await
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.connection.tracker.release();
        debug!(
            "Closed session '{}' after {} statements",
            self.scope,
            self.statements.load(Ordering::Relaxed)
        );
    }
}
