// src/models.rs

use serde::{Deserialize, Serialize};

/// A note as returned by list and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: String,
    pub content: String,
    pub modified: i64, // seconds since the epoch, taken from file mtime
}

#[derive(Debug, Serialize)]
pub struct NoteList {
    pub files: Vec<Note>,
}

#[derive(Debug, Serialize)]
pub struct StatusReply {
    pub status: &'static str,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WriteRequest {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameRequest {
    pub name: String,
    pub new_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
}
