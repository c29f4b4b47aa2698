use crate::error::StoreError;
use crate::session::{self, SessionId, WorkSession};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// In-memory session list mirrored to a plain text log.
///
/// Every mutation rewrites the whole file. Mutations are applied in memory
/// first, so a failed write leaves the list changed and reports the error.
pub struct SessionLog {
    path: PathBuf,
    sessions: Vec<WorkSession>,
    next_id: u64,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sessions: Vec::new(),
            next_id: 1,
        }
    }

    /// Opens `path` and loads it. A missing file yields an empty log.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut log = Self::new(path);
        log.load()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sessions(&self) -> &[WorkSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn total_minutes(&self) -> f64 {
        self.sessions.iter().map(WorkSession::duration_in_minutes).sum()
    }

    pub fn get(&self, id: SessionId) -> Option<&WorkSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<SessionId> {
        self.sessions.get(index).map(|s| s.id)
    }

    fn next_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Replaces the in-memory list with the file's contents.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "work log not found, starting empty");
                self.sessions.clear();
                return Ok(());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut sessions = session::parse_log(&text);
        for s in &mut sessions {
            s.id = self.next_id();
        }
        info!(path = %self.path.display(), count = sessions.len(), "loaded work log");
        self.sessions = sessions;
        Ok(())
    }

    /// Rewrites the whole file. Sessions without a date get the current time,
    /// both on disk and in memory.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let now = session::now_string();
        for s in &mut self.sessions {
            if s.date_string.is_empty() {
                s.date_string = now.clone();
            }
        }
        let text = session::format_log(&self.sessions, &now);
        self.write(&text).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), count = self.sessions.len(), "rewrote work log");
        Ok(())
    }

    fn write(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp);
        })
    }

    /// Adds a session at the end and persists. The returned id stays valid
    /// until the session is deleted.
    pub fn append(&mut self, mut session: WorkSession) -> Result<SessionId, StoreError> {
        let id = self.next_id();
        session.id = id;
        info!(name = %session.name, minutes = session.duration_in_minutes(), "appending session");
        self.sessions.push(session);
        self.persist()?;
        Ok(id)
    }

    /// Renames a session. Returns `Ok(false)` without writing for an unknown id.
    pub fn update(&mut self, id: SessionId, name: &str, description: &str) -> Result<bool, StoreError> {
        match self.position(id) {
            Some(index) => self.update_at(index, name, description),
            None => Ok(false),
        }
    }

    pub fn update_at(&mut self, index: usize, name: &str, description: &str) -> Result<bool, StoreError> {
        let Some(session) = self.sessions.get_mut(index) else {
            return Ok(false);
        };
        session.name = name.to_string();
        session.description = description.to_string();
        info!(index, name, "updated session");
        self.persist()?;
        Ok(true)
    }

    pub fn delete(&mut self, id: SessionId) -> Result<bool, StoreError> {
        match self.position(id) {
            Some(index) => self.delete_at(index),
            None => Ok(false),
        }
    }

    pub fn delete_at(&mut self, index: usize) -> Result<bool, StoreError> {
        if index >= self.sessions.len() {
            return Ok(false);
        }
        let removed = self.sessions.remove(index);
        info!(index, name = %removed.name, "deleted session");
        self.persist()?;
        Ok(true)
    }
}
