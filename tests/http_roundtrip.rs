// Exercises the real HTTP stack against an in-process mock of the records API.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use userdeck::api::{Record, RecordClient, RecordId, RecordInput, Transport, UreqTransport};
use userdeck::app::worker::execute_job;
use userdeck::app::{Job, Outcome};
use userdeck::error::ApiError;

#[derive(Default)]
struct Store {
    next_id: u64,
    records: Vec<Record>,
}

type Db = Arc<RwLock<Store>>;

fn app(db: Db) -> Router {
    Router::new()
        .route("/Books", get(list).post(create))
        .route("/Books/{id}", put(update).delete(remove))
        .with_state(db)
}

async fn list(State(db): State<Db>) -> Json<Vec<Record>> {
    Json(db.read().await.records.clone())
}

async fn create(
    State(db): State<Db>,
    Json(input): Json<RecordInput>,
) -> (StatusCode, Json<Record>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let record = Record {
        id: RecordId::new(store.next_id.to_string()),
        name: input.name,
        avatar: input.avatar,
    };
    store.records.push(record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<RecordInput>,
) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    let record = store
        .records
        .iter_mut()
        .find(|r| r.id.as_str() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    record.name = input.name;
    record.avatar = input.avatar;
    Ok(Json(record.clone()))
}

async fn remove(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Record>, StatusCode> {
    let mut store = db.write().await;
    let pos = store
        .records
        .iter()
        .position(|r| r.id.as_str() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(store.records.remove(pos)))
}

/// Serve the mock on an ephemeral port from a background thread; returns its base URL.
fn spawn_server() -> String {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app(Db::default())).await.unwrap();
        });
    });
    let addr = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    format!("http://{addr}")
}

fn listed(outcome: Outcome) -> Vec<Record> {
    match outcome {
        Outcome::Listed(Ok(records)) => records,
        other => panic!("expected a list, got {other:?}"),
    }
}

#[test]
fn create_update_delete_against_live_server() {
    let client = RecordClient::new(&spawn_server(), "Books");
    let transport = UreqTransport::new(Duration::from_secs(5));

    assert!(listed(execute_job(&client, &transport, Job::List)).is_empty());

    let carol = Job::Create(RecordInput::new("Carol", "http://x/c.png"));
    assert_eq!(
        execute_job(&client, &transport, carol.clone()),
        Outcome::Mutated(carol, Ok(()))
    );
    let records = listed(execute_job(&client, &transport, Job::List));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Carol");
    let id = records[0].id.clone();

    let rename = Job::Update(id.clone(), RecordInput::new("Caroline", "http://x/c2.png"));
    assert!(matches!(
        execute_job(&client, &transport, rename),
        Outcome::Mutated(_, Ok(()))
    ));
    let records = listed(execute_job(&client, &transport, Job::List));
    assert_eq!(records[0].name, "Caroline");
    assert_eq!(records[0].avatar, "http://x/c2.png");

    assert!(matches!(
        execute_job(&client, &transport, Job::Delete(id)),
        Outcome::Mutated(_, Ok(()))
    ));
    assert!(listed(execute_job(&client, &transport, Job::List)).is_empty());
}

#[test]
fn missing_record_reports_status() {
    let client = RecordClient::new(&spawn_server(), "Books");
    let transport = UreqTransport::new(Duration::from_secs(5));

    let outcome = execute_job(&client, &transport, Job::Delete(RecordId::new("404")));
    assert!(matches!(
        outcome,
        Outcome::Mutated(_, Err(ApiError::Status { status: 404, .. }))
    ));
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // bind then drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = RecordClient::new(&format!("http://127.0.0.1:{port}"), "Books");
    let transport = UreqTransport::new(Duration::from_secs(2));

    let result = transport.execute(client.build_list());
    assert!(matches!(result, Err(ApiError::Transport(_))));
}
