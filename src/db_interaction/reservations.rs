use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{Connection, OptionalExtension};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{models::{NewReservation, Reservation, ReservationStatus}, schema::{reservations, users}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, local_midnight, DbConnection}};

use super::tables::{first_claimed_table, first_missing_table, set_status_for_tables};

// Struct to represent the customer snippet attached to a reservation
#[derive(Serialize, Deserialize)]
pub struct CustomerContact {
    pub customer_name: String,
    pub customer_tel: String,
}

// Struct to represent a reservation enriched with its customer contact
#[derive(Serialize, Deserialize)]
pub struct ReservationWithCustomer {
    pub reservation_id: i32,
    pub customer_id: i32,
    pub staff_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub capacity: i32,
    pub reservation_time: DateTime<Utc>,
    pub customer_amount: i32,
    pub reservation_detail: Option<String>,
    pub cancel_detail: Option<String>,
    pub reservation_status: String,
    pub response_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub customer_detail: CustomerContact,
}

#[derive(Debug)]
pub struct ReservationDraft{
    pub table_ids: Vec<i32>,
    pub capacity: i32,
    pub reservation_time: DateTime<Utc>,
    pub customer_amount: i32,
    pub reservation_detail: Option<String>
}

#[derive(Debug)]
pub struct ReservationChanges{
    pub reservation_status: ReservationStatus,
    pub response_at: Option<DateTime<Utc>>,
    pub finish_at: Option<DateTime<Utc>>,
    pub cancel_detail: Option<String>
}

fn customer_contact_for(
    conn: &mut DbConnection,
    customer_id: i32
) -> Result<CustomerContact, diesel::result::Error>{
    let row: Option<(Option<String>, Option<String>)> = users::table
        .filter(users::user_id.eq(customer_id))
        .select((users::name, users::tel))
        .get_result(conn)
        .optional()?;

    // Defensive against a dangling customer reference
    let contact = match row {
        Some((name, tel)) => CustomerContact{
            customer_name: name.unwrap_or_else(|| "-".to_string()),
            customer_tel: tel.unwrap_or_else(|| "-".to_string())
        },
        None => CustomerContact{
            customer_name: "-".to_string(),
            customer_tel: "-".to_string()
        }
    };

    Ok(contact)
}

fn enrich_with_customer(
    conn: &mut DbConnection,
    reservation: Reservation
) -> Result<ReservationWithCustomer, diesel::result::Error>{
    let customer_detail = customer_contact_for(conn, reservation.customer_id)?;

    Ok(ReservationWithCustomer{
        reservation_id: reservation.reservation_id,
        customer_id: reservation.customer_id,
        staff_id: reservation.staff_id,
        table_ids: reservation.table_ids,
        capacity: reservation.capacity,
        reservation_time: reservation.reservation_time,
        customer_amount: reservation.customer_amount,
        reservation_detail: reservation.reservation_detail,
        cancel_detail: reservation.cancel_detail,
        reservation_status: reservation.reservation_status,
        response_at: reservation.response_at,
        finish_at: reservation.finish_at,
        created_at: reservation.created_at,
        customer_detail
    })
}

#[tracing::instrument(
    "Getting today's reservations",
    skip_all
)]
pub async fn get_todays_reservations(
    mut conn: DbConnection
) -> Result<Vec<ReservationWithCustomer>, anyhow::Error> {
    let cutoff = local_midnight();

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<ReservationWithCustomer>, anyhow::Error, _>(|conn|{
            let todays: Vec<Reservation> = reservations::table
                .filter(reservations::created_at.ge(cutoff))
                .order(reservations::created_at.desc())
                .load(conn)
                .context("Failed to load reservations")?;

            let mut ret = Vec::new();
            for reservation in todays {
                ret.push(
                    enrich_with_customer(conn, reservation)
                        .context("Failed to enrich reservation with customer contact")?
                );
            }

            Ok(ret)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with getting a single reservation
#[derive(Error)]
pub enum GetReservationError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("reservation_id: {0} doesn't exist")]
    NoReservationIdError(i32)
}

impl Debug for GetReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Getting reservation by id",
    skip(conn)
)]
pub async fn get_reservation_by_id(
    mut conn: DbConnection,
    reservation_id: i32
) -> Result<ReservationWithCustomer, GetReservationError>{
    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Option<ReservationWithCustomer>, diesel::result::Error, _>(|conn| {
            let reservation: Option<Reservation> = reservations::table
                .filter(reservations::reservation_id.eq(reservation_id))
                .get_result(conn)
                .optional()?;

            match reservation {
                Some(reservation) => Ok(Some(enrich_with_customer(conn, reservation)?)),
                None => Ok(None)
            }
        })
    })
    .await??;

    res.ok_or(GetReservationError::NoReservationIdError(reservation_id))
}

/// The caller's most recent reservation created today, if any. "None" is
/// an ordinary answer here, not an error.
#[tracing::instrument(
    "Getting current reservation for customer",
    skip(conn)
)]
pub async fn get_current_reservation_for(
    mut conn: DbConnection,
    customer_id: i32
) -> Result<Option<ReservationWithCustomer>, anyhow::Error>{
    let cutoff = local_midnight();

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Option<ReservationWithCustomer>, anyhow::Error, _>(|conn| {
            let reservation: Option<Reservation> = reservations::table
                .filter(reservations::customer_id.eq(customer_id))
                .filter(reservations::created_at.ge(cutoff))
                .order(reservations::created_at.desc())
                .first(conn)
                .optional()
                .context("Failed to load current reservation")?;

            match reservation {
                Some(reservation) => Ok(Some(
                    enrich_with_customer(conn, reservation)
                        .context("Failed to enrich reservation with customer contact")?
                )),
                None => Ok(None)
            }
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with creating a reservation and holding its tables
#[derive(Error)]
pub enum CreateReservationError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("table_id: {0} doesn't exist")]
    NoTableIdError(i32),
    #[error("table_id: {0} already holds a claim")]
    TableClaimedError(i32)
}

impl Debug for CreateReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Creating reservation and putting tables on hold",
    skip(conn, draft)
)]
pub async fn create_reservation(
    mut conn: DbConnection,
    customer_id: i32,
    draft: ReservationDraft,
    enforce_table_availability: bool
) -> Result<ReservationWithCustomer, CreateReservationError> {

    let ret = spawn_blocking_with_tracing(move || {
        conn.transaction::<ReservationWithCustomer, CreateReservationError, _>(|conn|{
            // Unlike the batch status update, creation refuses unknown
            // table ids outright, before anything is written.
            if let Some(table_id) = first_missing_table(conn, &draft.table_ids)? {
                return Err(CreateReservationError::NoTableIdError(table_id))
            }

            if enforce_table_availability {
                if let Some(table_id) = first_claimed_table(conn, &draft.table_ids)? {
                    return Err(CreateReservationError::TableClaimedError(table_id))
                }
            }

            let reservation: Reservation = diesel::insert_into(reservations::table)
                .values(NewReservation{
                    customer_id,
                    table_ids: draft.table_ids,
                    capacity: draft.capacity,
                    reservation_time: draft.reservation_time,
                    customer_amount: draft.customer_amount,
                    reservation_detail: draft.reservation_detail,
                    reservation_status: ReservationStatus::Pending.as_str().to_string()
                })
                .get_result(conn)?;

            set_status_for_tables(
                conn,
                &reservation.table_ids,
                ReservationStatus::Pending.table_status()
            )?;

            enrich_with_customer(conn, reservation)
                .map_err(CreateReservationError::RunQueryError)
        })
    })
    .await??;

    Ok(ret)
}

// Error associated with updating a reservation
#[derive(Error)]
pub enum UpdateReservationError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("reservation_id: {0} doesn't exist")]
    NoReservationIdError(i32)
}

impl Debug for UpdateReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating reservation and propagating table status",
    skip(conn, changes)
)]
pub async fn update_reservation(
    mut conn: DbConnection,
    reservation_id: i32,
    staff_id: i32,
    changes: ReservationChanges
) -> Result<ReservationWithCustomer, UpdateReservationError> {

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<ReservationWithCustomer, UpdateReservationError, _>(|conn| {
            let reservation: Reservation = reservations::table
                .filter(reservations::reservation_id.eq(reservation_id))
                .get_result(conn)
                .optional()?
                .ok_or(UpdateReservationError::NoReservationIdError(reservation_id))?;

            // Whoever responds last owns the reservation
            diesel::update(reservations::table.filter(reservations::reservation_id.eq(reservation_id)))
                .set((
                    reservations::reservation_status.eq(changes.reservation_status.as_str()),
                    reservations::staff_id.eq(staff_id)
                ))
                .execute(conn)?;

            if let Some(response_at) = changes.response_at {
                diesel::update(reservations::table.filter(reservations::reservation_id.eq(reservation_id)))
                    .set(reservations::response_at.eq(response_at))
                    .execute(conn)?;
            }

            if let Some(finish_at) = changes.finish_at {
                diesel::update(reservations::table.filter(reservations::reservation_id.eq(reservation_id)))
                    .set(reservations::finish_at.eq(finish_at))
                    .execute(conn)?;
            }

            if let Some(cancel_detail) = changes.cancel_detail {
                diesel::update(reservations::table.filter(reservations::reservation_id.eq(reservation_id)))
                    .set(reservations::cancel_detail.eq(cancel_detail))
                    .execute(conn)?;
            }

            // Re-derive and re-apply the table effect on every update,
            // whether or not the status actually changed.
            set_status_for_tables(
                conn,
                &reservation.table_ids,
                changes.reservation_status.table_status()
            )?;

            let updated: Reservation = reservations::table
                .filter(reservations::reservation_id.eq(reservation_id))
                .get_result(conn)?;

            enrich_with_customer(conn, updated)
                .map_err(UpdateReservationError::RunQueryError)
        })
    })
    .await??;

    Ok(res)
}
