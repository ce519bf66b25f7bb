use moviegraph::graph::{
    Depth, Direction, Edge, EdgeLabel, Pagination, Vertex, VertexId, VertexLabel,
};
use moviegraph::{AdapterOptions, MemoryGraph, QueryAdapter};
use std::collections::HashSet;
use std::sync::Arc;

const PEOPLE: usize = 40;
const MOVIES: usize = 60;

fn vid(s: &str) -> VertexId {
    VertexId::parse(s).unwrap()
}

/// Deterministic pseudo-random movie graph. Some edges are written in both
/// orientations and some pairs are linked twice, like the bulk loader does.
fn random_graph(seed: u64) -> MemoryGraph {
    let mut state = seed;
    let mut next = move |bound: usize| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as usize) % bound
    };

    let mut g = MemoryGraph::new();
    for i in 0..PEOPLE {
        g.add_vertex(Vertex::new(vid(&format!("nm{:04}", i)), VertexLabel::Person))
            .unwrap();
    }
    for i in 0..MOVIES {
        g.add_vertex(Vertex::new(vid(&format!("tt{:04}", i)), VertexLabel::Movie))
            .unwrap();
    }

    for e in 0..250 {
        let person = vid(&format!("nm{:04}", next(PEOPLE)));
        let movie = vid(&format!("tt{:04}", next(MOVIES)));
        let (from, to) = if next(4) == 0 {
            (movie, person)
        } else {
            (person, movie)
        };
        g.add_edge(Edge::new(format!("e{}", e), EdgeLabel::AppearsIn, from, to))
            .unwrap();
    }
    g
}

fn adapter(seed: u64) -> QueryAdapter {
    QueryAdapter::new(Arc::new(random_graph(seed)), AdapterOptions::default())
}

fn all_ids() -> Vec<VertexId> {
    (0..PEOPLE)
        .map(|i| vid(&format!("nm{:04}", i)))
        .chain((0..MOVIES).map(|i| vid(&format!("tt{:04}", i))))
        .collect()
}

fn id_set(vertices: &[Vertex]) -> HashSet<String> {
    vertices.iter().map(|v| v.id.to_string()).collect()
}

fn assert_unique(vertices: &[Vertex]) {
    assert_eq!(id_set(vertices).len(), vertices.len(), "duplicate ids");
}

#[tokio::test]
async fn test_both_is_deduplicated_union_of_in_and_out() {
    for seed in [1, 7, 42] {
        let a = adapter(seed);
        for id in all_ids() {
            let both = a.get_neighbors(&id, Direction::Both, None).await.unwrap();
            let inc = a.get_neighbors(&id, Direction::In, None).await.unwrap();
            let out = a.get_neighbors(&id, Direction::Out, None).await.unwrap();

            assert_unique(&both);
            let union: HashSet<String> = id_set(&inc).union(&id_set(&out)).cloned().collect();
            assert_eq!(id_set(&both), union, "vertex {}", id);
        }
    }
}

#[tokio::test]
async fn test_get_vertex_returns_requested_id() {
    let a = adapter(3);
    for id in all_ids() {
        let v = a.get_vertex(&id).await.unwrap();
        assert_eq!(v.id, id);
    }
}

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let a = adapter(11);
    for id in all_ids().into_iter().step_by(7) {
        let first = a.get_edges(&id, Direction::Both).await.unwrap();
        let second = a.get_edges(&id, Direction::Both).await.unwrap();
        assert_eq!(first, second);

        let n1 = a.get_neighbors(&id, Direction::Out, None).await.unwrap();
        let n2 = a.get_neighbors(&id, Direction::Out, None).await.unwrap();
        assert_eq!(n1, n2);
    }
}

#[tokio::test]
async fn test_edges_touch_the_source_and_are_unique() {
    let a = adapter(5);
    for id in all_ids() {
        let edges = a.get_edges(&id, Direction::Both).await.unwrap();
        let unique: HashSet<&str> = edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(unique.len(), edges.len());
        for e in &edges {
            assert!(e.from == id || e.to == id);
        }

        let out = a.get_edges(&id, Direction::Out).await.unwrap();
        assert!(out.iter().all(|e| e.from == id));
    }
}

#[tokio::test]
async fn test_search_results_never_exceed_limit() {
    let a = adapter(9);
    for label in [VertexLabel::Movie, VertexLabel::Person] {
        let expected_total = match label {
            VertexLabel::Movie => MOVIES,
            VertexLabel::Person => PEOPLE,
        } as u64;
        for limit in [1u64, 7, 10, 50, 100] {
            for offset in [0u64, 5, 39, 59, 60, 1000] {
                let page = a
                    .search_by_label(label, Pagination::new(limit, offset).unwrap())
                    .await
                    .unwrap();
                assert!(page.results.len() as u64 <= limit);
                assert_eq!(page.total, expected_total);
                let expected_len = expected_total.saturating_sub(offset).min(limit);
                assert_eq!(page.results.len() as u64, expected_len);
                assert!(page.results.iter().all(|v| v.label == label));
            }
        }
    }
}

#[tokio::test]
async fn test_cast_and_recommendations_exclude_source() {
    let a = adapter(21);
    for i in 0..MOVIES {
        let movie = vid(&format!("tt{:04}", i));

        let cast = a
            .get_cast(&movie, Pagination::new(100, 0).unwrap())
            .await
            .unwrap();
        assert_unique(&cast.results);
        assert_eq!(cast.total as usize, cast.results.len());
        assert!(cast.results.iter().all(|v| v.label == VertexLabel::Person));

        let recs = a.get_recommendations(&movie, 100).await.unwrap();
        assert_unique(&recs);
        assert!(recs.iter().all(|v| v.id != movie && v.label == VertexLabel::Movie));

        // every recommendation shares a cast member
        let cast_ids = id_set(&cast.results);
        for rec in &recs {
            let rec_cast = a
                .get_cast(&rec.id, Pagination::new(100, 0).unwrap())
                .await
                .unwrap();
            assert!(!id_set(&rec_cast.results).is_disjoint(&cast_ids));
        }
    }
}

#[tokio::test]
async fn test_subgraph_invariants() {
    for cap in [1usize, 5, 25, 500] {
        let options = AdapterOptions {
            max_subgraph_vertices: cap,
            ..AdapterOptions::default()
        };
        let a = QueryAdapter::new(Arc::new(random_graph(13)), options);
        for id in all_ids().into_iter().step_by(9) {
            for depth in 1..=3u64 {
                let sub = a.get_subgraph(&id, Depth::new(depth).unwrap()).await.unwrap();
                assert!(sub.vertices.len() <= cap);
                assert_eq!(sub.vertices[0].id, id);
                assert_unique(&sub.vertices);
                let ids = id_set(&sub.vertices);
                for e in &sub.edges {
                    assert!(ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()));
                }
            }
        }
    }
}
