//! Document Repository
//!
//! SQLite-backed implementation of `Repository` shared by every collection.
//! Documents are stored whole as JSON; the key and, for indexed
//! collections, `updated_at` are kept in their own columns.

use std::marker::PhantomData;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use super::db::{open_connection, storage_error, SharedConnection};
use super::traits::Repository;
use crate::domain::{Collection, DomainResult, Entity};

/// SQLite implementation of a document collection
pub struct DocumentRepository<T> {
    pub(super) conn: SharedConnection,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DocumentRepository<T> {
    pub fn new(conn: SharedConnection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn write(&self, conn: &Connection, entity: &T, verb: &str) -> DomainResult<()> {
        let collection = T::COLLECTION;
        let document = serde_json::to_string(entity)?;

        let written = if collection.is_indexed() {
            let sql = format!(
                "{} INTO {} ({}, updated_at, document) VALUES (?1, ?2, ?3)",
                verb,
                collection.table(),
                collection.key_path()
            );
            conn.execute(&sql, params![entity.key(), entity.updated_at(), document])
        } else {
            let sql = format!(
                "{} INTO {} ({}, document) VALUES (?1, ?2)",
                verb,
                collection.table(),
                collection.key_path()
            );
            conn.execute(&sql, params![entity.key(), document])
        };
        written.map_err(storage_error)?;

        Ok(())
    }
}

fn order_clause(collection: Collection) -> String {
    if collection.is_indexed() {
        format!("ORDER BY updated_at ASC, {} ASC", collection.key_path())
    } else {
        format!("ORDER BY {} ASC", collection.key_path())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for DocumentRepository<T> {
    async fn create(&self, entity: &T) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;
        self.write(conn, entity, "INSERT")
    }

    async fn find_by_id(&self, key: &str) -> DomainResult<Option<T>> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;
        let collection = T::COLLECTION;

        let sql = format!(
            "SELECT document FROM {} WHERE {} = ?1",
            collection.table(),
            collection.key_path()
        );
        let document: Option<String> = conn
            .query_row(&sql, params![key], |row| row.get(0))
            .optional()
            .map_err(storage_error)?;

        match document {
            Some(document) => Ok(Some(serde_json::from_str(&document)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<T>> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;
        let collection = T::COLLECTION;

        let sql = format!(
            "SELECT document FROM {} {}",
            collection.table(),
            order_clause(collection)
        );
        let mut stmt = conn.prepare(&sql).map_err(storage_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(storage_error)?;

        let mut documents = Vec::new();
        for row in rows {
            let document = row.map_err(storage_error)?;
            documents.push(serde_json::from_str(&document)?);
        }
        Ok(documents)
    }

    async fn put(&self, entity: &T) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;
        self.write(conn, entity, "INSERT OR REPLACE")
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;
        let collection = T::COLLECTION;

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            collection.table(),
            collection.key_path()
        );
        conn.execute(&sql, params![key]).map_err(storage_error)?;
        Ok(())
    }
}
