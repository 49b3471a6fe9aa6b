//! Per-user output slots.
//!
//! Each session owns two independent slots, resume and cover letter. A slot is only
//! ever replaced wholesale by a finished generation; failed generations never reach
//! the store, so the previous document survives them. Sessions live in memory and
//! are pruned once idle longer than the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{DocumentKind, GeneratedDocument};

/// Ten years; keeps the TTL inside chrono's representable range.
const MAX_TTL_SECS: u64 = 10 * 365 * 86_400;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resume: Option<GeneratedDocument>,
    pub cover_letter: Option<GeneratedDocument>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            updated_at: now,
            resume: None,
            cover_letter: None,
        }
    }

    pub fn slot(&self, kind: DocumentKind) -> Option<&GeneratedDocument> {
        match kind {
            DocumentKind::Resume => self.resume.as_ref(),
            DocumentKind::CoverLetter => self.cover_letter.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: DocumentKind) -> &mut Option<GeneratedDocument> {
        match kind {
            DocumentKind::Resume => &mut self.resume,
            DocumentKind::CoverLetter => &mut self.cover_letter,
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.insert(id, Session::new(id));
        id
    }

    /// Fails with `NotFound` when `id` names a session that does not exist.
    /// `None` is accepted: a session is only created once a document is stored.
    pub async fn check(&self, id: Option<Uuid>) -> Result<(), AppError> {
        let Some(id) = id else {
            return Ok(());
        };
        if self.sessions.read().await.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Session {id} not found")))
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn document(
        &self,
        id: Uuid,
        kind: DocumentKind,
    ) -> Result<GeneratedDocument, AppError> {
        self.get(id).await?.slot(kind).cloned().ok_or_else(|| {
            AppError::NotFound(format!(
                "No {} has been generated in session {id}",
                kind.title_suffix().to_lowercase()
            ))
        })
    }

    /// Replaces the slot for `doc.kind` and returns the session id. With `id` of
    /// `None`, a new session is created holding just this document.
    pub async fn store(&self, id: Option<Uuid>, doc: GeneratedDocument) -> Result<Uuid, AppError> {
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        let session = match id {
            Some(id) => sessions
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?,
            None => {
                let id = Uuid::new_v4();
                sessions.entry(id).or_insert_with(|| Session::new(id))
            }
        };
        session.updated_at = Utc::now();
        let kind = doc.kind;
        *session.slot_mut(kind) = Some(doc);
        Ok(session.id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, Session>) {
        let cutoff = Utc::now() - self.ttl;
        let before = sessions.len();
        sessions.retain(|_, s| s.updated_at >= cutoff);
        if sessions.len() < before {
            debug!("Pruned {} idle sessions", before - sessions.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(kind: DocumentKind, markdown: &str) -> GeneratedDocument {
        GeneratedDocument::new(kind, markdown.to_string(), "Amulya Goli")
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let store = SessionStore::new(3600);
        let id = store.create().await;

        store.store(Some(id), doc(DocumentKind::Resume, "# Resume")).await.unwrap();
        store
            .store(Some(id), doc(DocumentKind::CoverLetter, "# Letter"))
            .await
            .unwrap();

        let session = store.get(id).await.unwrap();
        assert_eq!(session.resume.unwrap().markdown, "# Resume");
        assert_eq!(session.cover_letter.unwrap().markdown, "# Letter");
    }

    #[tokio::test]
    async fn test_store_overwrites_slot() {
        let store = SessionStore::new(3600);
        let id = store.create().await;
        store.store(Some(id), doc(DocumentKind::Resume, "v1")).await.unwrap();
        store.store(Some(id), doc(DocumentKind::Resume, "v2")).await.unwrap();

        let resume = store.document(id, DocumentKind::Resume).await.unwrap();
        assert_eq!(resume.markdown, "v2");
    }

    #[tokio::test]
    async fn test_missing_slot_is_not_found() {
        let store = SessionStore::new(3600);
        let id = store.create().await;
        let result = store.document(id, DocumentKind::CoverLetter).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_check_accepts_none_and_known_ids() {
        let store = SessionStore::new(3600);
        let id = store.create().await;
        assert!(store.check(None).await.is_ok());
        assert!(store.check(Some(id)).await.is_ok());
        assert!(matches!(
            store.check(Some(Uuid::new_v4())).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_without_id_creates_session() {
        let store = SessionStore::new(3600);
        let id = store
            .store(None, doc(DocumentKind::Resume, "# Resume"))
            .await
            .unwrap();
        assert_eq!(store.len().await, 1);
        let resume = store.document(id, DocumentKind::Resume).await.unwrap();
        assert_eq!(resume.markdown, "# Resume");
    }

    #[tokio::test]
    async fn test_store_to_unknown_session_is_not_found() {
        let store = SessionStore::new(3600);
        let result = store
            .store(Some(Uuid::new_v4()), doc(DocumentKind::Resume, "x"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_pruned() {
        let store = SessionStore::new(0);
        let stale = store.create().await;
        {
            let mut sessions = store.sessions.write().await;
            sessions.get_mut(&stale).unwrap().updated_at = Utc::now() - Duration::seconds(10);
        }

        store.create().await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(stale).await.is_err());
    }
}
