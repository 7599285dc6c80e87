//! Tests for the `#[contract]` attribute macro.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use cirrus::{
    CallArgs, CirrusError, CirrusServer, ClientConfig, HttpMethod, MethodPolicy, contract,
    make_server_router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    id: u64,
    title: String,
    pinned: bool,
}

#[contract]
pub trait Notes {
    /// Fetch one note.
    #[get("/notes/{id}")]
    async fn get_note(&self, id: u64) -> Result<Note, CirrusError>;

    /// Store a new note.
    #[post("/notes", body)]
    async fn create_note(
        &self,
        title: String,
        #[default(false)] pinned: bool,
    ) -> Result<Note, CirrusError>;

    #[delete("/notes/{id}")]
    async fn delete_note(&self, id: u64) -> Result<bool, CirrusError>;

    #[get("/notes")]
    async fn list_notes(&self) -> Result<Vec<Note>, CirrusError>;
}

#[derive(Default)]
struct NoteStore {
    notes: Mutex<Vec<Note>>,
}

impl Notes for NoteStore {
    async fn get_note(&self, id: u64) -> Result<Note, CirrusError> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| CirrusError::handler(404, format!("no note {id}")))
    }

    async fn create_note(&self, title: String, pinned: bool) -> Result<Note, CirrusError> {
        let mut notes = self.notes.lock().unwrap();
        let note = Note {
            id: notes.len() as u64 + 1,
            title,
            pinned,
        };
        notes.push(note.clone());
        Ok(note)
    }

    async fn delete_note(&self, id: u64) -> Result<bool, CirrusError> {
        let mut notes = self.notes.lock().unwrap();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        Ok(notes.len() != before)
    }

    async fn list_notes(&self) -> Result<Vec<Note>, CirrusError> {
        Ok(self.notes.lock().unwrap().clone())
    }
}

async fn spawn_notes() -> SocketAddr {
    let implementation = NotesContract::server(NoteStore::default()).unwrap();
    let bound = make_server_router(&implementation).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(CirrusServer::new(bound).serve(listener));
    addr
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(format!("http://{addr}/api"))
}

#[test]
fn test_definition_from_trait() {
    let definition = NotesContract::definition().unwrap();

    assert_eq!(definition.name(), "Notes");
    assert_eq!(definition.len(), 4);
    let names: Vec<&str> = definition.routes().iter().map(|r| r.name()).collect();
    assert_eq!(names, ["get_note", "create_note", "delete_note", "list_notes"]);

    let create = definition.route("create_note").unwrap();
    assert_eq!(create.method(), HttpMethod::Post);
    assert!(create.has_body());
    assert_eq!(create.signature().param("pinned").unwrap().default(), Some(&json!(false)));

    assert!(Arc::ptr_eq(
        &definition,
        &NotesContract::definition().unwrap()
    ));
}

#[test]
fn test_server_entries() {
    let implementation = NotesContract::server(NoteStore::default()).unwrap();
    assert_eq!(implementation.name(), "NotesServer");

    let bound = make_server_router(&implementation).unwrap();
    let entries: Vec<(HttpMethod, &str)> = bound
        .entries()
        .iter()
        .map(|e| (e.method, e.path.as_str()))
        .collect();
    assert_eq!(
        entries,
        [
            (HttpMethod::Get, "/notes/{id}"),
            (HttpMethod::Post, "/notes"),
            (HttpMethod::Delete, "/notes/{id}"),
            (HttpMethod::Get, "/notes"),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_typed_client_round_trip() {
    let addr = spawn_notes().await;
    let client = NotesContract::client(config(addr)).unwrap();

    let note = client.create_note("groceries".into(), true).await.unwrap();
    assert_eq!(
        note,
        Note {
            id: 1,
            title: "groceries".into(),
            pinned: true,
        }
    );

    assert_eq!(client.get_note(1).await.unwrap(), note);
    assert_eq!(client.list_notes().await.unwrap(), vec![note]);

    let err = client.get_note(9).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    assert!(client.delete_note(1).await.unwrap());
    assert!(!client.delete_note(1).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_untyped_call_uses_defaults() {
    let addr = spawn_notes().await;
    let client = NotesContract::client(config(addr)).unwrap();

    let note = client
        .implementation()
        .call("create_note", CallArgs::new().arg("errands"))
        .await
        .unwrap();
    assert_eq!(note, json!({"id": 1, "title": "errands", "pinned": false}));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_typed_blocking_client() {
    let addr = spawn_notes().await;

    let notes = tokio::task::spawn_blocking(move || {
        let client = NotesContract::blocking_client(config(addr)).unwrap();
        client.create_note("from a thread".into(), false).unwrap();
        client.list_notes().unwrap()
    })
    .await
    .unwrap();

    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "from a thread");
}

#[contract]
trait Catalog {
    #[get("/catalog")]
    async fn browse(&self, tag: Option<String>) -> Result<Vec<String>, CirrusError>;
}

struct CatalogStore;

impl Catalog for CatalogStore {
    async fn browse(&self, tag: Option<String>) -> Result<Vec<String>, CirrusError> {
        Ok(match tag {
            Some(tag) => vec![format!("{tag}-lamp")],
            None => vec!["lamp".into(), "desk".into()],
        })
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_optional_query_argument() {
    let bound = make_server_router(&CatalogContract::server(CatalogStore).unwrap()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(CirrusServer::new(bound).serve(listener));

    let client = CatalogContract::client(config(addr)).unwrap();
    assert_eq!(client.browse(None).await.unwrap(), ["lamp", "desk"]);
    assert_eq!(client.browse(Some("red".into())).await.unwrap(), ["red-lamp"]);
}

#[contract(permissive)]
trait Probe {
    #[route("OPTIONS", "/probe")]
    async fn probe(&self) -> Result<String, CirrusError>;
}

struct Prober;

impl Probe for Prober {
    async fn probe(&self) -> Result<String, CirrusError> {
        Ok("alive".into())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_permissive_contract() {
    let definition = ProbeContract::definition().unwrap();
    assert_eq!(definition.policy(), MethodPolicy::Permissive);
    assert_eq!(
        definition.route("probe").unwrap().method(),
        HttpMethod::Options
    );

    let bound = make_server_router(&ProbeContract::server(Prober).unwrap()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(CirrusServer::new(bound).serve(listener));

    let client = ProbeContract::client(config(addr)).unwrap();
    assert_eq!(client.probe().await.unwrap(), "alive");
}
