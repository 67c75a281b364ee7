//! Typed statements: the single source of truth for every query the crate issues
//!
//! A statement knows its Cypher text, its bound parameters and the columns it
//! returns. The Neo4j client sends the Cypher; the memory client evaluates the
//! variant directly. Row data only ever travels as parameters.

use crate::algorithms::{Algorithm, Projection};
use crate::schema::{NodeLabel, NodeRef, PropertyMap, RelType, Tag};
use serde_json::{json, Map, Value};

/// Statement catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Connectivity check
    Ping,

    // ---- writes (all return a single `matched` count) ----
    /// MERGE by natural key, then SET the remaining properties. `dates` hold ISO
    /// strings converted with `date()`.
    UpsertNode {
        node: NodeRef,
        properties: PropertyMap,
        dates: PropertyMap,
    },
    /// MATCH both endpoints by key, MERGE the relationship, SET its properties
    MergeEdge {
        rel: RelType,
        from: NodeRef,
        to: NodeRef,
        properties: PropertyMap,
    },
    /// SET properties on an existing node
    SetNodeProperties { node: NodeRef, properties: PropertyMap },
    /// SET properties on an existing relationship
    SetEdgeProperties {
        rel: RelType,
        from: NodeRef,
        to: NodeRef,
        properties: PropertyMap,
    },
    /// MERGE a keyword and link it PART_OF an existing community
    LinkKeywordToCommunity { keyword: String, community: String },
    /// Add a secondary label
    TagNode { node: NodeRef, tag: Tag },
    /// Remove a secondary label everywhere
    ClearTag { tag: Tag },
    /// Delete derived author relationships pointing at a community
    ClearCommunityEdges { rel: RelType, community: String },

    // ---- reads ----
    CountNodes { label: NodeLabel },
    CountEdges { rel: RelType },
    /// (conference, paper, distinct citing papers) for conference proceedings
    ConferencePaperCitations,
    /// (conference, author, distinct editions published in)
    ConferenceAuthorEditions,
    /// (journal, window paper, citations from target-year papers); journals
    /// without window papers appear once with a null paper
    JournalWindowCitations { window: Vec<i64>, target_year: i64 },
    /// (author, paper, distinct citing papers)
    AuthorPaperCitations,
    /// (venue, papers, papers containing a community keyword)
    VenueKeywordCoverage { community: String },
    /// (paper, citations) restricted to papers in GraphSpecific venues
    CommunityVenueCitations,
    /// (author, number of Top100 papers written)
    AuthorTopPaperCounts,

    // ---- graph algorithms ----
    ProjectionExists { name: String },
    ProjectGraph { projection: Projection },
    DropProjection { name: String },
    StreamAlgorithm {
        algorithm: Algorithm,
        projection: Projection,
        limit: usize,
    },
}

const MATCHED: &[&str] = &["matched"];
const COUNT: &[&str] = &["count"];

impl Statement {
    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Ping => "ping",
            Statement::UpsertNode { .. } => "upsert_node",
            Statement::MergeEdge { .. } => "merge_edge",
            Statement::SetNodeProperties { .. } => "set_node_properties",
            Statement::SetEdgeProperties { .. } => "set_edge_properties",
            Statement::LinkKeywordToCommunity { .. } => "link_keyword_to_community",
            Statement::TagNode { .. } => "tag_node",
            Statement::ClearTag { .. } => "clear_tag",
            Statement::ClearCommunityEdges { .. } => "clear_community_edges",
            Statement::CountNodes { .. } => "count_nodes",
            Statement::CountEdges { .. } => "count_edges",
            Statement::ConferencePaperCitations => "conference_paper_citations",
            Statement::ConferenceAuthorEditions => "conference_author_editions",
            Statement::JournalWindowCitations { .. } => "journal_window_citations",
            Statement::AuthorPaperCitations => "author_paper_citations",
            Statement::VenueKeywordCoverage { .. } => "venue_keyword_coverage",
            Statement::CommunityVenueCitations => "community_venue_citations",
            Statement::AuthorTopPaperCounts => "author_top_paper_counts",
            Statement::ProjectionExists { .. } => "projection_exists",
            Statement::ProjectGraph { .. } => "project_graph",
            Statement::DropProjection { .. } => "drop_projection",
            Statement::StreamAlgorithm { .. } => "stream_algorithm",
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Statement::UpsertNode { .. }
                | Statement::MergeEdge { .. }
                | Statement::SetNodeProperties { .. }
                | Statement::SetEdgeProperties { .. }
                | Statement::LinkKeywordToCommunity { .. }
                | Statement::TagNode { .. }
                | Statement::ClearTag { .. }
                | Statement::ClearCommunityEdges { .. }
        )
    }

    /// Result columns, in order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Statement::Ping => &["ok"],
            Statement::UpsertNode { .. }
            | Statement::MergeEdge { .. }
            | Statement::SetNodeProperties { .. }
            | Statement::SetEdgeProperties { .. }
            | Statement::LinkKeywordToCommunity { .. }
            | Statement::TagNode { .. }
            | Statement::ClearTag { .. }
            | Statement::ClearCommunityEdges { .. } => MATCHED,
            Statement::CountNodes { .. } | Statement::CountEdges { .. } => COUNT,
            Statement::ConferencePaperCitations => {
                &["conferenceId", "conference", "paperId", "title", "citations"]
            }
            Statement::ConferenceAuthorEditions => {
                &["conferenceId", "conference", "authorId", "author", "editions"]
            }
            Statement::JournalWindowCitations { .. } => {
                &["journalId", "journal", "paperId", "citations"]
            }
            Statement::AuthorPaperCitations => &["authorId", "author", "paperId", "citations"],
            Statement::VenueKeywordCoverage { .. } => {
                &["venueLabel", "venueId", "venue", "papers", "communityPapers"]
            }
            Statement::CommunityVenueCitations => &["paperId", "title", "citations"],
            Statement::AuthorTopPaperCounts => &["authorId", "author", "topPapers"],
            Statement::ProjectionExists { .. } => &["exists"],
            Statement::ProjectGraph { .. } => &["graphName", "nodeCount", "relationshipCount"],
            Statement::DropProjection { .. } => &["graphName"],
            Statement::StreamAlgorithm { .. } => &["paperId", "score"],
        }
    }

    /// Cypher text. Labels and types come from closed enums; everything else is a parameter.
    pub fn cypher(&self) -> String {
        match self {
            Statement::Ping => "RETURN 1 AS ok".to_string(),

            Statement::UpsertNode {
                node,
                properties,
                dates,
            } => {
                let mut assignments = Vec::new();
                if !properties.is_empty() {
                    assignments.push("n += $properties".to_string());
                }
                for field in dates.keys() {
                    assignments.push(format!("n.{0} = date($dates.{0})", field));
                }
                let set = if assignments.is_empty() {
                    String::new()
                } else {
                    format!(" SET {}", assignments.join(", "))
                };
                format!(
                    "MERGE (n:{} {{{}: $key}}){} RETURN count(n) AS matched",
                    node.label,
                    node.key_property(),
                    set
                )
            }

            Statement::MergeEdge {
                rel,
                from,
                to,
                properties,
            } => {
                let set = if properties.is_empty() {
                    ""
                } else {
                    " SET r += $properties"
                };
                format!(
                    "MATCH (a:{} {{{}: $from}}) MATCH (b:{} {{{}: $to}}) MERGE (a)-[r:{}]->(b){} RETURN count(r) AS matched",
                    from.label,
                    from.key_property(),
                    to.label,
                    to.key_property(),
                    rel,
                    set
                )
            }

            Statement::SetNodeProperties { node, .. } => format!(
                "MATCH (n:{} {{{}: $key}}) SET n += $properties RETURN count(n) AS matched",
                node.label,
                node.key_property()
            ),

            Statement::SetEdgeProperties { rel, from, to, .. } => format!(
                "MATCH (a:{} {{{}: $from}})-[r:{}]->(b:{} {{{}: $to}}) SET r += $properties RETURN count(r) AS matched",
                from.label,
                from.key_property(),
                rel,
                to.label,
                to.key_property()
            ),

            Statement::LinkKeywordToCommunity { .. } => {
                "MERGE (k:Keyword {text: $keyword}) WITH k \
                 MATCH (c:Community {name: $community}) \
                 MERGE (k)-[r:PART_OF]->(c) RETURN count(r) AS matched"
                    .to_string()
            }

            Statement::TagNode { node, tag } => format!(
                "MATCH (n:{} {{{}: $key}}) SET n:{} RETURN count(n) AS matched",
                node.label,
                node.key_property(),
                tag
            ),

            Statement::ClearTag { tag } => format!(
                "MATCH (n:{0}) REMOVE n:{0} RETURN count(n) AS matched",
                tag
            ),

            Statement::ClearCommunityEdges { rel, .. } => format!(
                "MATCH (:Author)-[r:{}]->(:Community {{name: $community}}) DELETE r RETURN count(*) AS matched",
                rel
            ),

            Statement::CountNodes { label } => {
                format!("MATCH (n:{}) RETURN count(n) AS count", label)
            }

            Statement::CountEdges { rel } => {
                format!("MATCH ()-[r:{}]->() RETURN count(r) AS count", rel)
            }

            Statement::ConferencePaperCitations => {
                "MATCH (c:Conference)<-[:PRESENTED_IN]-(pr:Proceedings {type: 'conference'})<-[:PUBLISHED_IN]-(p:Paper) \
                 WITH DISTINCT c, p \
                 OPTIONAL MATCH (citing:Paper)-[:CITES]->(p) \
                 RETURN c.id AS conferenceId, c.name AS conference, p.id AS paperId, p.title AS title, \
                 count(DISTINCT citing) AS citations"
                    .to_string()
            }

            Statement::ConferenceAuthorEditions => {
                "MATCH (c:Conference)<-[:PRESENTED_IN]-(pr:Proceedings {type: 'conference'})<-[:PUBLISHED_IN]-(:Paper)<-[:WRITES]-(a:Author) \
                 RETURN c.id AS conferenceId, c.name AS conference, a.id AS authorId, a.name AS author, \
                 count(DISTINCT pr.edition) AS editions"
                    .to_string()
            }

            Statement::JournalWindowCitations { .. } => {
                "MATCH (j:Journal) \
                 OPTIONAL MATCH (j)<-[:PRESENTED_IN]-(:Volume)<-[:PUBLISHED_IN]-(p:Paper)-[:IN_YEAR]->(y:Year) \
                 WHERE y.value IN $window \
                 WITH DISTINCT j, p \
                 OPTIONAL MATCH (citing:Paper)-[:CITES]->(p) \
                 WHERE (citing)-[:IN_YEAR]->(:Year {value: $targetYear}) \
                 RETURN j.id AS journalId, j.name AS journal, p.id AS paperId, \
                 count(DISTINCT citing) AS citations"
                    .to_string()
            }

            Statement::AuthorPaperCitations => {
                "MATCH (a:Author)-[:WRITES]->(p:Paper) \
                 WITH DISTINCT a, p \
                 OPTIONAL MATCH (citing:Paper)-[:CITES]->(p) \
                 RETURN a.id AS authorId, a.name AS author, p.id AS paperId, \
                 count(DISTINCT citing) AS citations"
                    .to_string()
            }

            Statement::VenueKeywordCoverage { .. } => {
                "MATCH (v)<-[:PRESENTED_IN]-()<-[:PUBLISHED_IN]-(p:Paper) \
                 WHERE v:Journal OR v:Conference OR v:Workshop \
                 WITH DISTINCT v, p \
                 OPTIONAL MATCH (p)-[:CONTAINS]->(:Keyword)-[:PART_OF]->(c:Community {name: $community}) \
                 WITH v, p, count(c) > 0 AS relevant \
                 RETURN CASE WHEN v:Journal THEN 'Journal' WHEN v:Conference THEN 'Conference' ELSE 'Workshop' END AS venueLabel, \
                 v.id AS venueId, v.name AS venue, count(p) AS papers, \
                 sum(CASE WHEN relevant THEN 1 ELSE 0 END) AS communityPapers"
                    .to_string()
            }

            Statement::CommunityVenueCitations => {
                "MATCH (cited:Paper)-[:PUBLISHED_IN]->()-[:PRESENTED_IN]->(:GraphSpecific) \
                 WITH DISTINCT cited \
                 MATCH (citing:Paper)-[:CITES]->(cited) \
                 WHERE (citing)-[:PUBLISHED_IN]->()-[:PRESENTED_IN]->(:GraphSpecific) \
                 RETURN cited.id AS paperId, cited.title AS title, count(DISTINCT citing) AS citations"
                    .to_string()
            }

            Statement::AuthorTopPaperCounts => {
                "MATCH (a:Author)-[:WRITES]->(p:Top100) \
                 RETURN a.id AS authorId, a.name AS author, count(DISTINCT p) AS topPapers"
                    .to_string()
            }

            Statement::ProjectionExists { .. } => {
                "CALL gds.graph.exists($name) YIELD exists RETURN exists".to_string()
            }

            Statement::ProjectGraph { .. } => {
                "CALL gds.graph.project($name, $label, $relationships) \
                 YIELD graphName, nodeCount, relationshipCount \
                 RETURN graphName, nodeCount, relationshipCount"
                    .to_string()
            }

            Statement::DropProjection { .. } => {
                "CALL gds.graph.drop($name, false) YIELD graphName RETURN graphName".to_string()
            }

            Statement::StreamAlgorithm {
                algorithm,
                projection,
                ..
            } => format!(
                "CALL gds.{}.stream($graph) YIELD nodeId, {1} \
                 RETURN gds.util.asNode(nodeId).{2} AS paperId, {1} AS score \
                 ORDER BY score DESC, paperId ASC LIMIT $limit",
                algorithm.procedure(),
                algorithm.yield_column(),
                projection.label.key_property()
            ),
        }
    }

    /// Bound parameters as a JSON object
    pub fn parameters(&self) -> Map<String, Value> {
        let value = match self {
            Statement::Ping
            | Statement::ClearTag { .. }
            | Statement::CountNodes { .. }
            | Statement::CountEdges { .. }
            | Statement::ConferencePaperCitations
            | Statement::ConferenceAuthorEditions
            | Statement::AuthorPaperCitations
            | Statement::CommunityVenueCitations
            | Statement::AuthorTopPaperCounts => json!({}),

            Statement::UpsertNode {
                node,
                properties,
                dates,
            } => json!({
                "key": node.key.to_value(),
                "properties": properties,
                "dates": dates,
            }),

            Statement::MergeEdge {
                from,
                to,
                properties,
                ..
            }
            | Statement::SetEdgeProperties {
                from,
                to,
                properties,
                ..
            } => json!({
                "from": from.key.to_value(),
                "to": to.key.to_value(),
                "properties": properties,
            }),

            Statement::SetNodeProperties { node, properties } => json!({
                "key": node.key.to_value(),
                "properties": properties,
            }),

            Statement::LinkKeywordToCommunity { keyword, community } => json!({
                "keyword": keyword,
                "community": community,
            }),

            Statement::TagNode { node, .. } => json!({ "key": node.key.to_value() }),

            Statement::ClearCommunityEdges { community, .. }
            | Statement::VenueKeywordCoverage { community } => json!({ "community": community }),

            Statement::JournalWindowCitations {
                window,
                target_year,
            } => json!({
                "window": window,
                "targetYear": target_year,
            }),

            Statement::ProjectionExists { name } | Statement::DropProjection { name } => {
                json!({ "name": name })
            }

            Statement::ProjectGraph { projection } => json!({
                "name": projection.name,
                "label": projection.label.as_str(),
                "relationships": {
                    projection.relationship.as_str(): {
                        "type": projection.relationship.as_str(),
                        "orientation": projection.orientation.as_str(),
                    }
                },
            }),

            Statement::StreamAlgorithm {
                projection, limit, ..
            } => json!({
                "graph": projection.name,
                "limit": limit,
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Orientation;

    fn props(pairs: &[(&str, Value)]) -> PropertyMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_upsert_merges_by_key_and_converts_dates() {
        let statement = Statement::UpsertNode {
            node: NodeRef::new(NodeLabel::Paper, "p1"),
            properties: props(&[("title", json!("Graphs"))]),
            dates: props(&[("publicationDate", json!("2020-01-31"))]),
        };

        assert_eq!(
            statement.cypher(),
            "MERGE (n:Paper {id: $key}) SET n += $properties, \
             n.publicationDate = date($dates.publicationDate) RETURN count(n) AS matched"
        );
        let params = statement.parameters();
        assert_eq!(params["key"], json!("p1"));
        assert_eq!(params["properties"]["title"], json!("Graphs"));
        assert!(statement.is_write());
    }

    #[test]
    fn test_year_upsert_without_properties_has_no_set() {
        let statement = Statement::UpsertNode {
            node: NodeRef::new(NodeLabel::Year, 2021),
            properties: PropertyMap::new(),
            dates: PropertyMap::new(),
        };
        assert_eq!(
            statement.cypher(),
            "MERGE (n:Year {value: $key}) RETURN count(n) AS matched"
        );
        assert_eq!(statement.parameters()["key"], json!(2021));
    }

    #[test]
    fn test_row_values_never_reach_cypher_text() {
        let hostile = "x'}) DETACH DELETE n //";
        let statement = Statement::MergeEdge {
            rel: RelType::Writes,
            from: NodeRef::new(NodeLabel::Author, hostile),
            to: NodeRef::new(NodeLabel::Paper, "p1"),
            properties: props(&[("corresponding", json!(true))]),
        };

        let cypher = statement.cypher();
        assert!(!cypher.contains(hostile));
        assert!(cypher.contains("MERGE (a)-[r:WRITES]->(b) SET r += $properties"));
        assert_eq!(statement.parameters()["from"], json!(hostile));
    }

    #[test]
    fn test_projection_parameters() {
        let statement = Statement::ProjectGraph {
            projection: Projection::new(
                "paper_cites_undirected",
                NodeLabel::Paper,
                RelType::Cites,
                Orientation::Undirected,
            ),
        };
        let params = statement.parameters();
        assert_eq!(params["label"], json!("Paper"));
        assert_eq!(
            params["relationships"]["CITES"]["orientation"],
            json!("UNDIRECTED")
        );
        assert!(!statement.is_write());
    }

    #[test]
    fn test_stream_algorithm_cypher() {
        let statement = Statement::StreamAlgorithm {
            algorithm: Algorithm::Louvain,
            projection: Projection::citations("paper_cites_undirected", Orientation::Undirected),
            limit: 10,
        };
        let cypher = statement.cypher();
        assert!(cypher.starts_with("CALL gds.louvain.stream($graph) YIELD nodeId, communityId"));
        assert!(cypher.contains("gds.util.asNode(nodeId).id AS paperId, communityId AS score"));
        assert_eq!(statement.columns(), &["paperId", "score"]);
        assert_eq!(statement.parameters()["limit"], json!(10));
    }
}
