mod common;

use common::Corpus;
use scholargraph::community::{CommunityConfig, Recommender};
use scholargraph::schema::{Key, NodeLabel, RelType, Tag};

/// c1: 9 of 10 papers on graphs. c2: 89 of 100.
fn corpus() -> Corpus {
    let mut corpus = Corpus::default();
    corpus
        .author("a1", "Ada")
        .author("a2", "Alan")
        .author("a3", "Barbara")
        .conference("c1", "Graph Conf")
        .conference("c2", "General Conf")
        .proceedings("pr1", "c1", "conference", 1)
        .proceedings("pr2", "c2", "conference", 1);

    for i in 0..10 {
        let paper = format!("g{}", i);
        corpus.paper(&paper, 2020).in_proceedings(&paper, "pr1");
        if i < 9 {
            corpus.keyword(&paper, "graph");
        }
    }
    for i in 0..100 {
        let paper = format!("m{:03}", i);
        corpus.paper(&paper, 2020).in_proceedings(&paper, "pr2");
        if i < 89 {
            corpus.keyword(&paper, "graph");
        }
    }

    corpus
        .cite("g1", "g0")
        .cite("g2", "g0")
        .cite("g2", "g1")
        // From an untagged venue, does not count
        .cite("m000", "g0")
        .cite("m001", "g3")
        .writes("a1", "g0")
        .writes("a1", "g1")
        .writes("a2", "g1")
        .writes("a3", "g5");
    corpus
}

fn config() -> CommunityConfig {
    CommunityConfig {
        keywords: vec!["graph".to_string(), "graph neural".to_string()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_recommender_tags_and_links() {
    let (connection, store) = corpus().connect().await;

    let report = Recommender::new(&connection, config()).run().await.unwrap();

    assert_eq!(report.community, "Graph");
    assert_eq!(report.tagged_venues.len(), 1);
    assert_eq!(report.tagged_venues[0].venue_id, "c1");
    assert_eq!(report.tagged_venues[0].papers, 10);
    assert_eq!(report.tagged_venues[0].community_papers, 9);

    let top: Vec<_> = report
        .top_papers
        .iter()
        .map(|p| (p.paper_id.as_str(), p.citations))
        .collect();
    assert_eq!(top, vec![("g0", 2), ("g1", 1)]);

    assert_eq!(report.reviewers, 2);
    assert_eq!(report.gurus.len(), 1);
    assert_eq!(report.gurus[0].author_id, "a1");
    assert_eq!(report.gurus[0].top_papers, 2);

    let store = store.read().await;
    assert_eq!(store.nodes_with_tag(Tag::GraphSpecific).count(), 1);
    assert_eq!(store.nodes_with_tag(Tag::Top100).count(), 2);
    assert_eq!(store.rel_count(RelType::PotentialReviewerFor), 2);
    assert_eq!(store.rel_count(RelType::GuruFor), 1);
    assert_eq!(store.rel_count(RelType::PartOf), 2);
    assert_eq!(connection.open_sessions(), 0);
}

#[tokio::test]
async fn test_rerun_recomputes_from_scratch() {
    let (connection, store) = corpus().connect().await;

    let first = Recommender::new(&connection, config()).run().await.unwrap();
    let second = Recommender::new(&connection, config()).run().await.unwrap();
    assert_eq!(first, second);
    {
        let store = store.read().await;
        assert_eq!(store.rel_count(RelType::GuruFor), 1);
        assert_eq!(store.nodes_with_tag(Tag::Top100).count(), 2);
    }

    // A stricter threshold untags c1, which empties everything derived from it
    let strict = CommunityConfig {
        threshold: 0.95,
        ..config()
    };
    let report = Recommender::new(&connection, strict).run().await.unwrap();
    assert!(report.tagged_venues.is_empty());
    assert!(report.top_papers.is_empty());
    assert!(report.gurus.is_empty());

    let store = store.read().await;
    assert_eq!(store.nodes_with_tag(Tag::GraphSpecific).count(), 0);
    assert_eq!(store.nodes_with_tag(Tag::Top100).count(), 0);
    assert_eq!(store.rel_count(RelType::PotentialReviewerFor), 0);
    assert_eq!(store.rel_count(RelType::GuruFor), 0);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let (connection, _) = corpus().connect().await;

    // 89% passes once the bar is lowered to it
    let lenient = CommunityConfig {
        threshold: 0.89,
        ..config()
    };
    let report = Recommender::new(&connection, lenient).run().await.unwrap();
    let mut tagged: Vec<_> = report
        .tagged_venues
        .iter()
        .map(|v| v.venue_id.as_str())
        .collect();
    tagged.sort();
    assert_eq!(tagged, vec!["c1", "c2"]);
}

#[tokio::test]
async fn test_venue_below_threshold_loses_tag_on_rerun() {
    let (connection, store) = corpus().connect().await;

    let lenient = CommunityConfig {
        threshold: 0.89,
        ..config()
    };
    Recommender::new(&connection, lenient).run().await.unwrap();
    assert_eq!(store.read().await.nodes_with_tag(Tag::GraphSpecific).count(), 2);

    // c2 sits at 89%, below the default 90%
    let report = Recommender::new(&connection, config()).run().await.unwrap();
    assert_eq!(report.tagged_venues.len(), 1);

    let store = store.read().await;
    let tagged = |id: &str| {
        let node = store.find_node(NodeLabel::Conference, &Key::from(id)).unwrap();
        store.get_node(node).unwrap().has_tag(Tag::GraphSpecific)
    };
    assert!(tagged("c1"));
    assert!(!tagged("c2"));
    assert_eq!(store.nodes_with_tag(Tag::GraphSpecific).count(), 1);
}
