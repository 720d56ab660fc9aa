//! In-memory JSON resource server for exercising the protocol core.
//!
//! Serves a single collection of notes with the wire conventions the client
//! expects: `Location` on 201, a strong `ETag` on every representation,
//! `If-Match` checked on writes (412 on mismatch), 204 on delete.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub body: String,
}

/// Incoming representation for both create and full-replace update. Unknown
/// fields (such as a client echoing the id) are ignored.
#[derive(Deserialize)]
pub struct NotePayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// The collection resource returned at `/notes`.
#[derive(Serialize, Deserialize)]
pub struct NoteFolder {
    pub notes: Vec<Note>,
}

#[derive(Clone)]
pub struct Stored {
    pub note: Note,
    pub rev: u64,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Stored>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn etag_for(id: Uuid, rev: u64) -> String {
    format!("\"{}-{rev}\"", id.simple())
}

/// `If-Match` passes when absent, `*`, or equal to the current tag.
fn if_match_ok(headers: &HeaderMap, current: &str) -> bool {
    match headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok()) {
        Some("*") => true,
        Some(tag) => tag == current,
        None => true,
    }
}

fn request_host(headers: &HeaderMap) -> &str {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
}

async fn list_notes(State(db): State<Db>) -> Json<NoteFolder> {
    let notes = db.read().await;
    Json(NoteFolder {
        notes: notes.values().map(|s| s.note.clone()).collect(),
    })
}

async fn create_note(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NotePayload>,
) -> (StatusCode, [(HeaderName, String); 2], Json<Note>) {
    let note = Note {
        id: Uuid::new_v4(),
        title: input.title,
        body: input.body,
    };
    let location = format!("http://{}/notes/{}", request_host(&headers), note.id);
    let etag = etag_for(note.id, 1);
    db.write().await.insert(
        note.id,
        Stored {
            note: note.clone(),
            rev: 1,
        },
    );
    (
        StatusCode::CREATED,
        [(header::LOCATION, location), (header::ETAG, etag)],
        Json(note),
    )
}

async fn get_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<([(HeaderName, String); 1], Json<Note>), StatusCode> {
    let notes = db.read().await;
    let stored = notes.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok((
        [(header::ETAG, etag_for(id, stored.rev))],
        Json(stored.note.clone()),
    ))
}

async fn update_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<NotePayload>,
) -> Result<([(HeaderName, String); 1], Json<Note>), StatusCode> {
    let mut notes = db.write().await;
    let stored = notes.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if !if_match_ok(&headers, &etag_for(id, stored.rev)) {
        return Err(StatusCode::PRECONDITION_FAILED);
    }
    stored.note.title = input.title;
    stored.note.body = input.body;
    stored.rev += 1;
    Ok((
        [(header::ETAG, etag_for(id, stored.rev))],
        Json(stored.note.clone()),
    ))
}

async fn delete_note(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, StatusCode> {
    let mut notes = db.write().await;
    let rev = notes.get(&id).ok_or(StatusCode::NOT_FOUND)?.rev;
    if !if_match_ok(&headers, &etag_for(id, rev)) {
        return Err(StatusCode::PRECONDITION_FAILED);
    }
    notes.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_serializes_to_json() {
        let note = Note {
            id: Uuid::nil(),
            title: "Test".to_string(),
            body: "text".to_string(),
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["title"], "Test");
        assert_eq!(json["body"], "text");
    }

    #[test]
    fn payload_defaults_body_to_empty() {
        let input: NotePayload = serde_json::from_str(r#"{"title":"No body"}"#).unwrap();
        assert_eq!(input.title, "No body");
        assert!(input.body.is_empty());
    }

    #[test]
    fn payload_rejects_missing_title() {
        let result: Result<NotePayload, _> = serde_json::from_str(r#"{"body":"text"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn payload_ignores_unknown_fields() {
        let input: NotePayload =
            serde_json::from_str(r#"{"title":"t","id":"00000000-0000-0000-0000-000000000000"}"#)
                .unwrap();
        assert_eq!(input.title, "t");
    }

    #[test]
    fn etag_changes_with_revision() {
        let id = Uuid::new_v4();
        assert_ne!(etag_for(id, 1), etag_for(id, 2));
    }

    #[test]
    fn if_match_rules() {
        let id = Uuid::nil();
        let current = etag_for(id, 1);

        let empty = HeaderMap::new();
        assert!(if_match_ok(&empty, &current));

        let mut star = HeaderMap::new();
        star.insert(header::IF_MATCH, "*".parse().unwrap());
        assert!(if_match_ok(&star, &current));

        let mut matching = HeaderMap::new();
        matching.insert(header::IF_MATCH, current.parse().unwrap());
        assert!(if_match_ok(&matching, &current));

        let mut stale = HeaderMap::new();
        stale.insert(header::IF_MATCH, etag_for(id, 2).parse().unwrap());
        assert!(!if_match_ok(&stale, &current));
    }
}
