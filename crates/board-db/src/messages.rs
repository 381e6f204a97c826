use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Message, MessagePage};
use crate::{Database, StoreError};

// LEFT JOIN so a message whose owner row is gone still shows up.
const SELECT_MESSAGE: &str = "
    SELECT m.id, m.title, m.content, m.owner_id, u.username, m.created_at, m.updated_at
    FROM messages m
    LEFT JOIN users u ON m.owner_id = u.id";

/// The message store. Title and content must already be trimmed and within
/// the board's length limits; see `board_types::MessageInput`.
impl Database {
    /// Newest-first page of messages. `page` is 1-indexed.
    pub fn list_messages(&self, page: u32, per_page: u32) -> Result<MessagePage, StoreError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);

        self.with_conn(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;

            let mut stmt = conn.prepare(&format!(
                "{SELECT_MESSAGE} ORDER BY m.created_at DESC, m.id DESC LIMIT ?1 OFFSET ?2"
            ))?;
            let messages = stmt
                .query_map(rusqlite::params![per_page, offset], map_message)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(MessagePage {
                messages,
                total: total.max(0) as u64,
            })
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Message, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(&format!("{SELECT_MESSAGE} WHERE m.id = ?1"), [id], map_message)
                .optional()?
                .ok_or(StoreError::NotFound)
        })
    }

    /// Insert a message and return its id.
    pub fn create_message(&self, title: &str, content: &str, owner_id: Uuid) -> Result<i64, StoreError> {
        let now = Utc::now();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (title, content, owner_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![title, content, owner_id, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Replace title and content. Only the owner may do this.
    pub fn update_message(
        &self,
        id: i64,
        title: &str,
        content: &str,
        requester_id: Uuid,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            check_owner(conn, id, requester_id)?;

            let affected = conn.execute(
                "UPDATE messages SET title = ?1, content = ?2, updated_at = ?3
                 WHERE id = ?4 AND owner_id = ?5",
                rusqlite::params![title, content, Utc::now(), id, requester_id],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// Remove a message. Only the owner may do this.
    pub fn delete_message(&self, id: i64, requester_id: Uuid) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            check_owner(conn, id, requester_id)?;

            let affected = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id, requester_id],
            )?;
            if affected == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }

    /// Case-insensitive substring match on title or content, newest first.
    /// `term` must be non-empty.
    pub fn search_messages(&self, term: &str) -> Result<Vec<Message>, StoreError> {
        let needle = term.to_lowercase();

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_MESSAGE}
                 WHERE instr(board_lower(m.title), ?1) > 0 OR instr(board_lower(m.content), ?1) > 0
                 ORDER BY m.created_at DESC, m.id DESC"
            ))?;
            let messages = stmt
                .query_map([&needle], map_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
    }
}

fn check_owner(conn: &Connection, id: i64, requester_id: Uuid) -> Result<(), StoreError> {
    let owner: Uuid = conn
        .query_row("SELECT owner_id FROM messages WHERE id = ?1", [id], |row| row.get(0))
        .optional()?
        .ok_or(StoreError::NotFound)?;

    if owner != requester_id {
        warn!("User {} attempted to modify message {} owned by {}", requester_id, id, owner);
        return Err(StoreError::Unauthorized);
    }
    Ok(())
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        owner_id: row.get(3)?,
        owner_username: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
