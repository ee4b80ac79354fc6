// src/store.rs

use crate::error::{KeepError, Result};
use crate::models::Note;
use crate::sanitize::{sanitize_name, NOTE_SUFFIX};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Notes kept as one `.txt` file each inside a data directory.
///
/// Mutations are serialized by a store-wide lock; reads never take it and
/// instead tolerate files vanishing underneath them.
#[derive(Debug)]
pub struct NoteStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl NoteStore {
    /// Open the store, creating the data directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All notes, most recently modified first.
    pub fn list(&self) -> Result<Vec<Note>> {
        self.collect(|_| true)
    }

    /// Notes whose name or content contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Result<Vec<Note>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list();
        }
        self.collect(|note| {
            note.name.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
    }

    /// Write a new note and return its sanitized name.
    pub fn create(&self, name: &str, content: &str) -> Result<String> {
        let name = sanitize_name(name)?;
        let _guard = self.lock();

        let path = self.dir.join(&name);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(KeepError::AlreadyExists)
            }
            Err(e) => return Err(e.into()),
        };
        fill_or_discard(file, &path, content.as_bytes())?;

        debug!(%name, "note created");
        Ok(name)
    }

    /// Replace the whole content of an existing note.
    pub fn update(&self, name: &str, content: &str) -> Result<String> {
        let name = sanitize_name(name)?;
        let _guard = self.lock();

        let path = self.dir.join(&name);
        if !path.is_file() {
            return Err(KeepError::NoteNotFound);
        }
        fs::write(&path, content)?;

        debug!(%name, "note updated");
        Ok(name)
    }

    pub fn delete(&self, name: &str) -> Result<String> {
        let name = sanitize_name(name)?;
        let _guard = self.lock();

        let path = self.dir.join(&name);
        if !path.is_file() {
            return Err(KeepError::NoteNotFound);
        }
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(KeepError::NoteNotFound),
            Err(e) => return Err(e.into()),
        }

        debug!(%name, "note deleted");
        Ok(name)
    }

    /// Move a note to a new name in one filesystem rename.
    pub fn rename(&self, from: &str, to: &str) -> Result<String> {
        let from = sanitize_name(from)?;
        let to = sanitize_name(to)?;
        let _guard = self.lock();

        let source = self.dir.join(&from);
        if !source.is_file() {
            return Err(KeepError::NoteNotFound);
        }
        if from == to {
            return Ok(to);
        }
        let target = self.dir.join(&to);
        if target.exists() {
            return Err(KeepError::AlreadyExists);
        }
        fs::rename(&source, &target)?;

        debug!(%from, %to, "note renamed");
        Ok(to)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is (), so a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn collect(&self, keep: impl Fn(&Note) -> bool) -> Result<Vec<Note>> {
        let mut notes = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !name.ends_with(NOTE_SUFFIX) {
                continue;
            }
            match read_note(&entry.path(), name) {
                Ok(Some(note)) if keep(&note) => notes.push(note),
                Ok(_) => {}
                // Removed between read_dir and the read
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        notes.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(notes)
    }
}

/// Write a freshly created note, removing it again if the write fails so
/// the name does not stay taken by a truncated file.
fn fill_or_discard(mut out: impl Write, path: &Path, content: &[u8]) -> io::Result<()> {
    let written = out.write_all(content).and_then(|()| out.flush());
    if written.is_err() {
        drop(out);
        if let Err(e) = fs::remove_file(path) {
            debug!("could not discard {}: {e}", path.display());
        }
    }
    written
}

fn read_note(path: &Path, name: String) -> io::Result<Option<Note>> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Ok(None);
    }
    let modified = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let bytes = fs::read(path)?;

    Ok(Some(Note {
        name,
        content: String::from_utf8_lossy(&bytes).into_owned(),
        modified,
    }))
}
