use crate::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub const ENV_TOKEN: &str = "COMMANDLY_TOKEN";

const TOKEN_KEY: &str = "bearer";

const TOKEN_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS auth_tokens (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Read-only capability handed to anything that calls the backend. The
/// layout subsystem never manages the token lifecycle, it only reads.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> AppResult<Option<String>>;
}

/// Layered bearer-token store: environment override, then the in-memory
/// session layer written by the auth flow, then the durable local store.
pub struct TokenStore {
    session: Mutex<Option<String>>,
    conn: Mutex<Connection>,
}

impl TokenStore {
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        fs::create_dir_all(data_dir).map_err(|err| AppError::Io(err.to_string()))?;
        let conn = Connection::open(data_dir.join("auth.sqlite3"))?;
        conn.execute_batch(TOKEN_SCHEMA)?;
        Ok(Self {
            session: Mutex::new(None),
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self) -> AppResult<Option<String>> {
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            if !token.is_empty() {
                return Ok(Some(token));
            }
        }

        let session = self
            .session
            .lock()
            .map_err(|_| AppError::Internal("token session mutex poisoned".to_string()))?;
        if let Some(token) = session.as_ref() {
            return Ok(Some(token.clone()));
        }
        drop(session);

        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("token store mutex poisoned".to_string()))?;
        let stored = conn
            .query_row(
                "SELECT value FROM auth_tokens WHERE key = ?1",
                [TOKEN_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(stored)
    }

    pub fn set(&self, token: &str) -> AppResult<()> {
        if token.is_empty() {
            return Err(AppError::Auth("refusing to store an empty token".to_string()));
        }

        {
            let mut session = self
                .session
                .lock()
                .map_err(|_| AppError::Internal("token session mutex poisoned".to_string()))?;
            *session = Some(token.to_string());
        }

        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("token store mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO auth_tokens (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![TOKEN_KEY, token, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove(&self) -> AppResult<()> {
        {
            let mut session = self
                .session
                .lock()
                .map_err(|_| AppError::Internal("token session mutex poisoned".to_string()))?;
            *session = None;
        }

        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("token store mutex poisoned".to_string()))?;
        conn.execute("DELETE FROM auth_tokens WHERE key = ?1", [TOKEN_KEY])?;
        Ok(())
    }

    pub fn is_present(&self) -> AppResult<bool> {
        Ok(self.get()?.is_some())
    }
}

impl TokenSource for TokenStore {
    fn token(&self) -> AppResult<Option<String>> {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TokenStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = TokenStore::open(dir.path()).expect("open token store");
        (dir, store)
    }

    #[test]
    fn starts_without_a_token() {
        let (_dir, store) = store();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.is_present().unwrap());
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_dir, store) = store();
        store.set("cmdly-abc123").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("cmdly-abc123"));
        assert!(store.is_present().unwrap());
    }

    #[test]
    fn token_survives_reopen() {
        let dir = TempDir::new().expect("temp dir");
        {
            let store = TokenStore::open(dir.path()).expect("open token store");
            store.set("cmdly-durable").unwrap();
        }
        let reopened = TokenStore::open(dir.path()).expect("reopen token store");
        assert_eq!(reopened.get().unwrap().as_deref(), Some("cmdly-durable"));
    }

    #[test]
    fn remove_clears_both_layers() {
        let (_dir, store) = store();
        store.set("cmdly-gone").unwrap();
        store.remove().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn empty_token_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(store.set(""), Err(AppError::Auth(_))));
    }
}
