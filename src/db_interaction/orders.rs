use std::collections::HashMap;
use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{Connection, OptionalExtension};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{models::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, TableStatus}, schema::{order_items, orders, products, users}, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, local_midnight, DbConnection}};

use super::tables::{first_claimed_table, set_status_for_tables};

// Struct to represent the customer snippet attached to an order
#[derive(Serialize, Deserialize)]
pub struct CustomerDetail {
    pub customer_name: String,
    pub point: i32,
}

// Struct to represent an order (with associated items and customer detail)
#[derive(Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order_id: i32,
    pub customer_id: Option<i32>,
    pub staff_id: i32,
    pub reservation_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub order_status: String,
    pub net_price: i32,
    pub finish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub customer_detail: Option<CustomerDetail>,
}

// One requested line of a new order
#[derive(Deserialize, Debug)]
pub struct OrderItemDraft{
    pub product_id: i32,
    pub quantity: i32,
    pub sweetness: Option<String>,
    pub milk_type: Option<String>,
    pub product_type: Option<String>,
    pub note: Option<String>
}

#[derive(Debug)]
pub struct OrderDraft{
    pub customer_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub reservation_id: Option<i32>,
    pub items: Vec<OrderItemDraft>
}

#[derive(Debug)]
pub struct OrderChanges{
    pub order_status: Option<OrderStatus>,
    pub finish_at: Option<DateTime<Utc>>
}

/// Net price of an order as the fold over its (quantity, unit price)
/// lines. Prices are whatever the catalog says right now; nothing is
/// snapshotted per item.
pub fn sum_line_totals(lines: &[(i32, i32)]) -> i32{
    lines.iter().map(|(quantity, price)| quantity * price).sum()
}

fn customer_detail_for(
    conn: &mut DbConnection,
    customer_id: Option<i32>
) -> Result<Option<CustomerDetail>, diesel::result::Error>{
    let customer_id = match customer_id {
        Some(id) => id,
        None => return Ok(None)
    };

    let row: Option<(Option<String>, i32)> = users::table
        .filter(users::user_id.eq(customer_id))
        .select((users::name, users::point))
        .get_result(conn)
        .optional()?;

    // A dangling customer id degrades to placeholder detail, it never
    // fails the read.
    let detail = match row {
        Some((name, point)) => CustomerDetail{
            customer_name: name.unwrap_or_else(|| "-".to_string()),
            point
        },
        None => CustomerDetail{
            customer_name: "-".to_string(),
            point: 0
        }
    };

    Ok(Some(detail))
}

fn load_order_with_items(
    conn: &mut DbConnection,
    target_order_id: i32
) -> Result<Option<OrderWithItems>, diesel::result::Error>{
    let order: Option<Order> = orders::table
        .filter(orders::order_id.eq(target_order_id))
        .get_result::<Order>(conn)
        .optional()?;

    let order = match order {
        Some(order) => order,
        None => return Ok(None)
    };

    let items = order_items::table
        .filter(order_items::order_id.eq(target_order_id))
        .order(order_items::id.asc())
        .load::<OrderItem>(conn)?;

    let customer_detail = customer_detail_for(conn, order.customer_id)?;

    Ok(Some(OrderWithItems{
        order_id: order.order_id,
        customer_id: order.customer_id,
        staff_id: order.staff_id,
        reservation_id: order.reservation_id,
        table_ids: order.table_ids,
        order_status: order.order_status,
        net_price: order.net_price,
        finish_at: order.finish_at,
        created_at: order.created_at,
        items,
        customer_detail
    }))
}

#[tracing::instrument(
    "Getting today's orders along with associated order_items",
    skip_all
)]
pub async fn get_todays_orders(
    mut conn: DbConnection
) -> Result<Vec<OrderWithItems>, anyhow::Error> {
    let cutoff = local_midnight();

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<Vec<OrderWithItems>, anyhow::Error, _>(|conn|{
            let order_ids: Vec<i32> = orders::table
                .filter(orders::created_at.ge(cutoff))
                .order(orders::created_at.desc())
                .select(orders::order_id)
                .load(conn)
                .context("Failed to load order_ids")?;

            let mut ret: Vec<OrderWithItems> = Vec::new();

            for order_id in order_ids{
                let curr = load_order_with_items(conn, order_id)
                    .context("Failed to load order with items")?
                    .context("Order disappeared while listing")?;
                ret.push(curr);
            }

            Ok(ret)
        })
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with getting a single order
#[derive(Error)]
pub enum GetOrderError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("order_id: {0} doesn't exist")]
    NoOrderIdError(i32)
}

impl Debug for GetOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Getting order by id",
    skip(conn)
)]
pub async fn get_order_by_id(
    mut conn: DbConnection,
    order_id: i32
) -> Result<OrderWithItems, GetOrderError>{
    let res = spawn_blocking_with_tracing(move || {
        load_order_with_items(&mut conn, order_id)
    })
    .await??;

    res.ok_or(GetOrderError::NoOrderIdError(order_id))
}

// Error associated with creating an order and claiming its tables
#[derive(Error)]
pub enum CreateOrderError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("customer_id: {0} doesn't exist")]
    NoCustomerIdError(i32),
    #[error("product_id: {0} doesn't exist")]
    NoProductIdError(i32),
    #[error("table_id: {0} already holds a claim")]
    TableClaimedError(i32)
}

impl Debug for CreateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

// Each distinct product is priced once per order; repeated lines of the
// same product reuse the cached price.
fn resolve_net_price(
    conn: &mut DbConnection,
    items: &[OrderItemDraft]
) -> Result<i32, CreateOrderError>{
    let mut price_cache: HashMap<i32, i32> = HashMap::new();
    let mut lines: Vec<(i32, i32)> = Vec::with_capacity(items.len());

    for item in items {
        let price = match price_cache.get(&item.product_id) {
            Some(price) => *price,
            None => {
                let price = products::table
                    .filter(products::product_id.eq(item.product_id))
                    .select(products::price)
                    .get_result::<i32>(conn)
                    .optional()?
                    .ok_or(CreateOrderError::NoProductIdError(item.product_id))?;

                price_cache.insert(item.product_id, price);
                price
            }
        };

        lines.push((item.quantity, price));
    }

    Ok(sum_line_totals(&lines))
}

#[tracing::instrument(
    "Creating order with items and claiming tables",
    skip(conn, draft)
)]
pub async fn create_order(
    mut conn: DbConnection,
    staff_id: i32,
    draft: OrderDraft,
    enforce_table_availability: bool
) -> Result<OrderWithItems, CreateOrderError> {

    let ret = spawn_blocking_with_tracing(move || {
        conn.transaction::<OrderWithItems, CreateOrderError, _>(|conn|{
            if let Some(customer_id) = draft.customer_id {
                let known: Option<i32> = users::table
                    .filter(users::user_id.eq(customer_id))
                    .select(users::user_id)
                    .get_result(conn)
                    .optional()?;

                if known.is_none() {
                    return Err(CreateOrderError::NoCustomerIdError(customer_id))
                }
            }

            let net_price = resolve_net_price(conn, &draft.items)?;

            if enforce_table_availability && !draft.table_ids.is_empty() {
                if let Some(table_id) = first_claimed_table(conn, &draft.table_ids)? {
                    return Err(CreateOrderError::TableClaimedError(table_id))
                }
            }

            let order: Order = diesel::insert_into(orders::table)
                .values(NewOrder{
                    customer_id: draft.customer_id,
                    staff_id,
                    reservation_id: draft.reservation_id,
                    table_ids: draft.table_ids,
                    order_status: OrderStatus::Pending.as_str().to_string(),
                    net_price
                })
                .get_result(conn)?;

            for item in draft.items.iter(){
                diesel::insert_into(order_items::table)
                    .values(NewOrderItem{
                        order_id: order.order_id,
                        product_id: item.product_id,
                        quantity: item.quantity,
                        sweetness: item.sweetness.clone(),
                        milk_type: item.milk_type.clone(),
                        product_type: item.product_type.clone(),
                        note: item.note.clone()
                    })
                    .execute(conn)?;
            }

            // Every dine-in order claims its tables outright; an order
            // fulfilling a reservation is treated no differently from a
            // walk-in here.
            if !order.table_ids.is_empty() {
                set_status_for_tables(conn, &order.table_ids, TableStatus::Full)?;
            }

            let order_id = order.order_id;
            load_order_with_items(conn, order_id)?
                .ok_or(CreateOrderError::RunQueryError(diesel::result::Error::NotFound))
        })
    })
    .await??;

    Ok(ret)
}

// Error associated with updating order status / finishing an order
#[derive(Error)]
pub enum UpdateOrderError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("order_id: {0} doesn't exist")]
    NoOrderIdError(i32)
}

impl Debug for UpdateOrderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating order and releasing tables on finish",
    skip(conn)
)]
pub async fn update_order(
    mut conn: DbConnection,
    order_id: i32,
    changes: OrderChanges
) -> Result<OrderWithItems, UpdateOrderError> {

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<OrderWithItems, UpdateOrderError, _>(|conn| {
            let order: Order = orders::table
                .filter(orders::order_id.eq(order_id))
                .get_result(conn)
                .optional()?
                .ok_or(UpdateOrderError::NoOrderIdError(order_id))?;

            if let Some(status) = changes.order_status {
                diesel::update(orders::table.filter(orders::order_id.eq(order_id)))
                    .set(orders::order_status.eq(status.as_str()))
                    .execute(conn)?;
            }

            // Setting finish_at is the only thing that ever releases
            // tables; a status change alone leaves them untouched.
            if let Some(finish_at) = changes.finish_at {
                diesel::update(orders::table.filter(orders::order_id.eq(order_id)))
                    .set(orders::finish_at.eq(finish_at))
                    .execute(conn)?;

                if !order.table_ids.is_empty() {
                    set_status_for_tables(conn, &order.table_ids, TableStatus::Empty)?;
                }
            }

            load_order_with_items(conn, order_id)?
                .ok_or(UpdateOrderError::NoOrderIdError(order_id))
        })
    })
    .await??;

    Ok(res)
}
