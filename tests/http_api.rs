//! HTTP surface tests against a scripted in-memory graph.
//!
//! Run with: `cargo test --test http_api`

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use commgraph::config::Config;
use commgraph::context::Context;
use commgraph::error::AppError;
use commgraph::graph::{CypherExecutor, Params, Row, RowStream};
use commgraph::search::HashingEmbedder;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

/// Answers queries by matching a fragment of the Cypher text.
#[derive(Default)]
struct ScriptedGraph {
    script: Vec<(&'static str, Vec<JsonValue>)>,
    calls: Mutex<Vec<(String, Params)>>,
    writes: Mutex<Vec<(String, Params)>>,
}

impl ScriptedGraph {
    fn with(mut self, fragment: &'static str, rows: Vec<JsonValue>) -> Self {
        self.script.push((fragment, rows));
        self
    }

    fn params_for(&self, fragment: &str) -> Option<Params> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(cypher, _)| cypher.contains(fragment))
            .map(|(_, params)| params.clone())
    }

    /// Statements sent through `run_cypher`, in order.
    fn writes(&self) -> Vec<(String, Params)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CypherExecutor for ScriptedGraph {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        self.calls
            .lock()
            .unwrap()
            .push((cypher.to_string(), params));
        let rows: Vec<Result<Row, AppError>> = self
            .script
            .iter()
            .find(|(fragment, _)| cypher.contains(fragment))
            .map(|(_, rows)| rows.iter().cloned().map(|r| Ok(Row::from(r))).collect())
            .unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(rows)))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.writes
            .lock()
            .unwrap()
            .push((cypher.to_string(), params));
        Ok(())
    }
}

fn app(graph: Arc<ScriptedGraph>) -> Router {
    app_with(graph, Config::default())
}

fn app_with(graph: Arc<ScriptedGraph>, config: Config) -> Router {
    let embedder = Arc::new(HashingEmbedder::new(config.embedding.dimensions));
    commgraph::http::router(Context::new(graph, config, embedder))
}

async fn get(app: Router, uri: &str) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_index_not_ready() {
    let (status, body) = get(app(Arc::new(ScriptedGraph::default())), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["index_ready"], json!(false));
    assert_eq!(body["indexed_messages"], JsonValue::Null);
}

#[tokio::test]
async fn test_read_example_on_empty_database() {
    let (status, body) = get(app(Arc::new(ScriptedGraph::default())), "/read-db-example").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("EMPTY_DATABASE"));
    assert_eq!(body["error-message"], json!("The database is empty!"));
}

#[tokio::test]
async fn test_read_example_lists_people_and_relations() {
    let graph = ScriptedGraph::default()
        .with(
            "MATCH (p:Person)",
            vec![
                json!({"name": "Alice", "age": 31}),
                json!({"name": "Bob", "age": null}),
            ],
        )
        .with(
            "MATCH (a:Person)-[r]->(b:Person)",
            vec![json!({"from": "Alice", "relation": "KNOWS", "to": "Bob"})],
        );

    let (status, body) = get(app(Arc::new(graph)), "/read-db-example").await;

    assert_eq!(status, StatusCode::OK);
    let lines: Vec<String> = serde_json::from_value(body["db-content"].clone()).unwrap();
    assert_eq!(lines[0], "People in the database:");
    assert!(lines.contains(&" - Alice (age 31)".to_string()));
    assert!(lines.contains(&" - Bob (age unknown)".to_string()));
    assert!(lines.contains(&" - Alice -[KNOWS]-> Bob".to_string()));
}

#[tokio::test]
async fn test_similarity_search_before_index_build() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/similarity-search?query=harbor",
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], json!("INDEX_NOT_READY"));
}

#[tokio::test]
async fn test_similarity_search_rejects_empty_query() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/similarity-search?query=%20",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_sequence_view_passes_repeated_event_ids() {
    let graph = Arc::new(ScriptedGraph::default().with(
        "UNION",
        vec![json!({
            "event_id": "Event_1",
            "timestamp": "2040-10-01T08:39:00",
            "source": "Nadia Conti",
            "target": "Haacklee Harbor",
            "content": "Permit ready",
            "sub_type": "Communication"
        })],
    ));

    let (status, body) = get(
        app(graph.clone()),
        "/massive-sequence-view?event_ids=Event_1&event_ids=Event_2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["event_id"], json!("Event_1"));
    assert_eq!(body["data"][0]["source"], json!("Nadia Conti"));

    let params = graph.params_for("UNION").expect("messages query issued");
    assert_eq!(params["event_ids"], json!(["Event_1", "Event_2"]));
    assert_eq!(params["keyword"], JsonValue::Null);
}

#[tokio::test]
async fn test_sequence_view_rejects_inverted_range() {
    let (status, _) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/massive-sequence-view?start_date=2040-10-05&end_date=2040-10-01",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_group_by_requires_members() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/group-by?group_id=Crew",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_unknown_job_status() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/loading-status?job_id=01JUNKNOWN",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], json!("NOT_FOUND"));
}

#[tokio::test]
async fn test_loading_status_requires_job_id() {
    let (status, _) = get(app(Arc::new(ScriptedGraph::default())), "/loading-status").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_loading_jobs_starts_empty() {
    let (status, body) = get(app(Arc::new(ScriptedGraph::default())), "/loading-jobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_read_graph_on_empty_database() {
    let (status, body) = get(app(Arc::new(ScriptedGraph::default())), "/read-db-graph").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("The database is empty!"));
}

#[tokio::test]
async fn test_read_graph_flattens_nodes_and_links() {
    let graph = ScriptedGraph::default()
        .with(
            "RETURN labels(n)[0] AS label, properties(n) AS props",
            vec![
                json!({"label": "Entity", "props": {"id": "Nadia Conti", "sub_type": "Person"}}),
                json!({"label": "Entity", "props": {"id": "Mako", "sub_type": "Vessel"}}),
                json!({"label": "Entity", "props": {"id": "Rio", "sub_type": "Person"}}),
            ],
        )
        .with(
            "MATCH (a)-[r]->(b)",
            vec![json!({
                "source": "Nadia Conti",
                "target": "Mako",
                "type": "COMMUNICATION",
                "props": {"event_id": "Event_1", "timestamp": "2040-10-01T08:39:00"}
            })],
        );

    let (status, body) = get(app(Arc::new(graph)), "/read-db-graph").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(body["nodes"][0]["id"], json!("Nadia Conti"));
    assert_eq!(body["nodes"][0]["degree"], json!(1));
    assert_eq!(body["nodes"][2]["degree"], json!(0));
    assert_eq!(body["links"][0]["type"], json!("COMMUNICATION"));
    assert_eq!(body["links"][0]["value"], json!(1));
    assert_eq!(body["links"][0]["event_id"], json!("Event_1"));
}

#[tokio::test]
async fn test_sankey_marks_outgoing_side() {
    let message = |source: &str, target: &str, id: &str| {
        json!({
            "event_id": id,
            "timestamp": "2040-10-01T08:00:00",
            "source": source,
            "target": target,
            "content": null,
            "sub_type": "Communication"
        })
    };
    let graph = ScriptedGraph::default().with(
        "UNION",
        vec![
            message("Nadia Conti", "Haacklee Harbor", "Event_1"),
            message("Nadia Conti", "Haacklee Harbor", "Event_2"),
            message("Haacklee Harbor", "Nadia Conti", "Event_3"),
        ],
    );

    let (status, body) = get(
        app(Arc::new(graph)),
        "/sankey-communication-flows?entity_id=Haacklee%20Harbor",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["links"],
        json!([
            {"source": "Nadia Conti", "target": "Haacklee Harbor", "value": 2},
            {"source": "Haacklee Harbor", "target": "Nadia Conti (out)", "value": 1}
        ])
    );
}

#[tokio::test]
async fn test_sankey_requires_entity() {
    let (status, _) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/sankey-communication-flows",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_to_same_airport() {
    let graph = ScriptedGraph::default().with(
        "MATCH (a:Airport {id: $id})",
        vec![json!({"props": {"id": "JFK", "name": "John F Kennedy"}})],
    );

    let (status, body) = get(app(Arc::new(graph)), "/airports/route?from=JFK&to=JFK").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hops"], json!(0));
    assert_eq!(body["total_distance"], json!(0.0));
    assert_eq!(body["airports"][0]["id"], json!("JFK"));
    assert_eq!(body["links"], json!([]));
}

#[tokio::test]
async fn test_route_from_unknown_airport() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/airports/route?from=XXX&to=JFK",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Airport not found: XXX"));
}

#[tokio::test]
async fn test_neighborhood_of_unknown_airport() {
    let (status, _) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/airports/neighborhood?airport_id=XXX&hops=2",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_number_is_rejected() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/search-content?keyword=reef&limit=many",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_evidence_for_unknown_event() {
    let (status, body) = get(
        app(Arc::new(ScriptedGraph::default())),
        "/evidence-for-event?event_id=Event_404",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Event not found: Event_404"));
}

#[tokio::test]
async fn test_evidence_without_messages() {
    let graph = ScriptedGraph::default()
        .with(
            "RETURN properties(e) AS props LIMIT 1",
            vec![json!({"props": {"id": "Event_7", "sub_type": "Monitoring"}})],
        )
        .with(
            "MATCH (n:Entity)-[r]->(e {id: $id})",
            vec![json!({"props": {"id": "Mako", "relation": "participant"}})],
        );

    let (status, body) = get(
        app(Arc::new(graph)),
        "/evidence-for-event?event_id=Event_7",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["info"]["event"]["sub_type"], json!("Monitoring"));
    assert_eq!(body["info"]["sources"][0]["id"], json!("Mako"));
    assert_eq!(body["info"]["targets"], json!([]));
}

#[tokio::test]
async fn test_graph_summary_totals() {
    let graph = ScriptedGraph::default()
        .with(
            "n.sub_type AS sub_type, count(*) AS count",
            vec![
                json!({"label": "Entity", "sub_type": "Person", "count": 3}),
                json!({"label": "Event", "sub_type": "Communication", "count": 5}),
            ],
        )
        .with(
            "RETURN type(r) AS type, count(*) AS count",
            vec![json!({"type": "sent", "count": 5})],
        );

    let (status, body) = get(app(Arc::new(graph)), "/graph-summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_nodes"], json!(8));
    assert_eq!(body["total_edges"], json!(5));
    assert_eq!(body["edges"][0]["type"], json!("sent"));
}

#[tokio::test]
async fn test_graph_schema_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("MC3_schema.json"),
        r#"{"node_types": {"Entity": ["Person", "Vessel"]}}"#,
    )
    .unwrap();
    let mut config = Config::default();
    config.data.dir = dir.path().to_path_buf();

    let app = app_with(Arc::new(ScriptedGraph::default()), config);
    let (status, body) = get(app, "/graph-schema").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schema"]["node_types"]["Entity"][1], json!("Vessel"));
}

#[tokio::test]
async fn test_graph_schema_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.data.dir = dir.path().to_path_buf();

    let app = app_with(Arc::new(ScriptedGraph::default()), config);
    let (status, body) = get(app, "/graph-schema").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!("DATASET_ERROR"));
}

#[tokio::test]
async fn test_airport_graph_includes_distances() {
    let graph = ScriptedGraph::default()
        .with(
            "MATCH (a:Airport) RETURN properties(a) AS props",
            vec![
                json!({"props": {"id": "JFK", "name": "John F Kennedy"}}),
                json!({"props": {"id": "LHR", "name": "Heathrow"}}),
            ],
        )
        .with(
            "MATCH (a:Airport)-[r:CONNECTED_TO]->(b:Airport)",
            vec![json!({
                "source": "JFK",
                "target": "LHR",
                "type": "CONNECTED_TO",
                "props": {"distance": 5540.0}
            })],
        );

    let (status, body) = get(app(Arc::new(graph)), "/graph-data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"][0]["label"], json!("John F Kennedy"));
    assert_eq!(body["nodes"][1]["degree"], json!(1));
    assert_eq!(body["links"][0]["distance"], json!(5540.0));
}

#[tokio::test]
async fn test_route_beyond_hop_bound() {
    let graph = ScriptedGraph::default().with(
        "MATCH (a:Airport {id: $id})",
        vec![json!({"props": {"id": "JFK"}})],
    );

    let (status, body) = get(app(Arc::new(graph)), "/airports/route?from=JFK&to=NCE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        json!(format!(
            "Route not found: JFK -> NCE within {} hops",
            commgraph::repositories::MAX_ROUTE_HOPS
        ))
    );
}

#[tokio::test]
async fn test_pass_with_nothing_to_do_writes_nothing() {
    let graph = Arc::new(ScriptedGraph::default());

    let (status, body) = get(app(graph.clone()), "/flatten-communications").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["pass"], json!("flatten_communications"));
    assert_eq!(body["report"]["created"], json!(0));
    assert_eq!(body["report"]["deleted"], json!(0));
    assert!(graph.writes().is_empty());
}

#[tokio::test]
async fn test_flatten_pass_writes_new_edges_in_batches() {
    let message = |id: &str, source: &str, target: &str| {
        json!({
            "event_id": id,
            "source": source,
            "target": target,
            "timestamp": "2040-10-01 08:39:00",
            "content": "Mako leaves at dawn"
        })
    };
    let graph = Arc::new(
        ScriptedGraph::default()
            .with(
                "RETURN e.id AS event_id, s.id AS source",
                vec![
                    message("Event_1", "Nadia Conti", "Mako"),
                    message("Event_2", "Mako", "Nadia Conti"),
                    message("Event_3", "Rio", "Rio"),
                ],
            )
            .with(
                "RETURN c.event_id AS event_id, a.id AS source",
                vec![json!({"event_id": "Event_1", "source": "Nadia Conti", "target": "Mako"})],
            ),
    );
    let mut config = Config::default();
    config.data.batch_size = 1;

    let (status, body) = get(app_with(graph.clone(), config), "/flatten-communications").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["created"], json!(2));
    let writes = graph.writes();
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().all(|(cypher, _)| cypher.contains("MERGE (a)-[c:COMMUNICATION")));
    assert_eq!(writes[0].1["rows"][0]["event_id"], json!("Event_2"));
    assert_eq!(writes[1].1["rows"][0]["source"], json!("Rio"));
}

#[tokio::test]
async fn test_group_by_returns_folded_graph() {
    let graph = Arc::new(
        ScriptedGraph::default()
            .with(
                "WHERE n.id IN $ids RETURN n.id AS id",
                vec![json!({"id": "Mako"}), json!({"id": "Remora"})],
            )
            .with(
                "RETURN 'Entity' AS label, properties(n) AS props",
                vec![
                    json!({"label": "Entity", "props": {"id": "Mako", "sub_type": "Vessel"}}),
                    json!({"label": "Entity", "props": {"id": "Remora", "sub_type": "Vessel"}}),
                    json!({"label": "Entity", "props": {"id": "Nadia Conti", "sub_type": "Person"}}),
                ],
            )
            .with(
                "WHERE type(r) IN $types",
                vec![
                    json!({"source": "Mako", "target": "Nadia Conti", "type": "INTERACTS_WITH",
                           "props": {"count": 2}}),
                    json!({"source": "Remora", "target": "Nadia Conti", "type": "INTERACTS_WITH",
                           "props": {"count": 3}}),
                    json!({"source": "Mako", "target": "Remora", "type": "INTERACTS_WITH",
                           "props": {"count": 4}}),
                ],
            ),
    );

    let (status, body) = get(
        app(graph.clone()),
        "/group-by?group_id=Fleet&entity_ids=Mako,Remora",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let ids: Vec<&str> = body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["Nadia Conti", "Fleet"]);
    assert_eq!(body["links"].as_array().unwrap().len(), 1);
    assert_eq!(body["links"][0]["value"], json!(5));
    assert_eq!(body["group_node"]["id"], json!("Fleet"));
    assert_eq!(body["group_node"]["degree"], json!(1));
    assert_eq!(body["group_edges"][0]["source"], json!("Fleet"));
    assert_eq!(body["group_edges"][0]["target"], json!("Nadia Conti"));

    let writes = graph.writes();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0].1["members"], json!(["Mako", "Remora"]));
}
