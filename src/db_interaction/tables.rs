use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::Utc;
use diesel::{Connection, OptionalExtension};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use diesel::prelude::AsChangeset;
use thiserror::Error;

use crate::{models::{DiningTable, NewTable, TableStatus}, schema::tables, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

/// Batch status overwrite used by the order and reservation lifecycles.
/// Runs inside the caller's transaction. Ids that don't resolve are
/// skipped rather than failing the whole batch; the skipped ids are logged
/// so data drift stays visible to operators.
pub fn set_status_for_tables(
    conn: &mut DbConnection,
    table_ids: &[i32],
    new_status: TableStatus
) -> Result<(), diesel::result::Error>{
    if table_ids.is_empty() {
        return Ok(())
    }

    let resolved: Vec<i32> = diesel::update(
            tables::table.filter(tables::table_id.eq_any(table_ids.to_vec()))
        )
        .set((
            tables::status.eq(new_status.as_str()),
            tables::last_update.eq(Utc::now())
        ))
        .returning(tables::table_id)
        .get_results(conn)?;

    if resolved.len() != table_ids.len() {
        let skipped: Vec<i32> = table_ids.iter()
            .filter(|id| !resolved.contains(id))
            .copied()
            .collect();

        tracing::warn!(
            ?skipped,
            status = new_status.as_str(),
            "Skipped table ids that did not resolve during batch status update"
        );
    }

    Ok(())
}

// First id in the list with no matching table row, if any
pub fn first_missing_table(
    conn: &mut DbConnection,
    table_ids: &[i32]
) -> Result<Option<i32>, diesel::result::Error>{
    let known: Vec<i32> = tables::table
        .filter(tables::table_id.eq_any(table_ids.to_vec()))
        .select(tables::table_id)
        .load(conn)?;

    Ok(table_ids.iter().find(|id| !known.contains(id)).copied())
}

/// First id in the list whose table is not currently `empty`. Only
/// consulted when the availability guard is switched on.
pub fn first_claimed_table(
    conn: &mut DbConnection,
    table_ids: &[i32]
) -> Result<Option<i32>, diesel::result::Error>{
    let claimed: Vec<i32> = tables::table
        .filter(tables::table_id.eq_any(table_ids.to_vec()))
        .filter(tables::status.ne(TableStatus::Empty.as_str()))
        .select(tables::table_id)
        .load(conn)?;

    Ok(claimed.into_iter().next())
}

#[tracing::instrument(
    "Getting all tables",
    skip_all
)]
pub async fn get_all_tables(
    mut conn: DbConnection
) -> Result<Vec<DiningTable>, anyhow::Error>{
    Ok(spawn_blocking_with_tracing(move || {
        tables::table
            .order(tables::table_id.asc())
            .load::<DiningTable>(&mut conn)
            .context("Failed to load tables")
    })
    .await
    .context("Failed due to threadpool error")??)
}

// Error associated with looking up / mutating a single table
#[derive(Error)]
pub enum TableLookupError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("table_id: {0} doesn't exist")]
    NoTableIdError(i32)
}

impl Debug for TableLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Getting table by id",
    skip(conn)
)]
pub async fn get_table_by_id(
    mut conn: DbConnection,
    table_id: i32
) -> Result<DiningTable, TableLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        tables::table
            .filter(tables::table_id.eq(table_id))
            .get_result::<DiningTable>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(TableLookupError::NoTableIdError(table_id))
}

#[tracing::instrument(
    "Inserting new table",
    skip_all
)]
pub async fn insert_table(
    mut conn: DbConnection,
    new_table: NewTable
) -> Result<DiningTable, anyhow::Error>{
    Ok(spawn_blocking_with_tracing(move || {
        diesel::insert_into(tables::table)
            .values(new_table)
            .get_result::<DiningTable>(&mut conn)
            .context("Failed to insert table")
    })
    .await
    .context("Failed due to threadpool error")??)
}

// Direct administrative override of table fields. Bypasses the
// order/reservation lifecycles, so it can desynchronize `status` from
// what those entities believe; that is accepted for back-office repair.
#[derive(AsChangeset)]
#[diesel(table_name = tables)]
pub struct TableChangeset{
    pub table_number: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<String>
}

impl TableChangeset {
    fn is_empty(&self) -> bool{
        self.table_number.is_none() && self.capacity.is_none() && self.status.is_none()
    }
}

#[tracing::instrument(
    "Updating table fields",
    skip(conn, changes)
)]
pub async fn update_table(
    mut conn: DbConnection,
    table_id: i32,
    changes: TableChangeset
) -> Result<DiningTable, TableLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Option<DiningTable>, diesel::result::Error, _>(|conn| {
            if changes.is_empty() {
                return tables::table
                    .filter(tables::table_id.eq(table_id))
                    .get_result::<DiningTable>(conn)
                    .optional()
            }

            diesel::update(tables::table.filter(tables::table_id.eq(table_id)))
                .set((changes, tables::last_update.eq(Utc::now())))
                .get_result::<DiningTable>(conn)
                .optional()
        })
    })
    .await??;

    res.ok_or(TableLookupError::NoTableIdError(table_id))
}

#[tracing::instrument(
    "Deleting table",
    skip(conn)
)]
pub async fn delete_table(
    mut conn: DbConnection,
    table_id: i32
) -> Result<DiningTable, TableLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        diesel::delete(tables::table.filter(tables::table_id.eq(table_id)))
            .get_result::<DiningTable>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(TableLookupError::NoTableIdError(table_id))
}
