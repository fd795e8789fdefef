//! Defines the category model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::CategoryId, transaction_type::TransactionType};

/// A label for what a transaction was for, fixed to either expenses or
/// income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: String,
    /// The type of transaction the category records.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// Create the categories table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_categories_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                type TEXT NOT NULL CHECK(type IN ('expense', 'income'))
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Category].
pub fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

/// Create a new category in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if a category with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: &str,
    kind: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO categories (name, type) VALUES (?1, ?2)
             RETURNING id, name, type",
        )?
        .query_row(params![name, kind], map_row_to_category)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve a category from the database by its unique `name`.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if `name` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_category_by_name(name: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, type FROM categories WHERE name = :name")?
        .query_row(&[(":name", &name)], map_row_to_category)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound(name.to_owned()),
            error => error.into(),
        })
}

/// Retrieve categories, optionally restricted to one transaction type,
/// ordered by name.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_categories(
    kind: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let results: Result<Vec<Category>, Error> = match kind {
        Some(kind) => connection
            .prepare("SELECT id, name, type FROM categories WHERE type = ?1 ORDER BY name ASC")?
            .query_map([kind], map_row_to_category)?
            .map(|category_result| category_result.map_err(Error::SqlError))
            .collect(),
        None => connection
            .prepare("SELECT id, name, type FROM categories ORDER BY name ASC")?
            .query_map([], map_row_to_category)?
            .map(|category_result| category_result.map_err(Error::SqlError))
            .collect(),
    };

    results
}

/// Delete a category that no transactions reference.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryInUse] if transactions still reference the category,
/// - [Error::NotFound] if `id` does not refer to a valid category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let references: i64 = connection.query_row(
        "SELECT COUNT(id) FROM transactions WHERE category_id = ?1",
        params![id],
        |row| row.get(0),
    )?;

    if references > 0 {
        return Err(Error::CategoryInUse(id));
    }

    let rows_affected = connection.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
