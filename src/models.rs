use chrono::{DateTime, Utc};
use diesel::prelude::{Insertable, Queryable};
use serde::Deserialize;
use serde::Serialize;

use crate::schema::order_items;
use crate::schema::orders;
use crate::schema::products;
use crate::schema::reservations;
use crate::schema::tables;
use crate::schema::users;

#[derive(Queryable, Clone)]
pub struct User{
    pub user_id: i32,
    pub username: String,
    pub password: String,
    pub user_role: String,
    pub is_verified: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub tel: Option<String>,
    pub birth_date: Option<DateTime<Utc>>,
    pub point: i32,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser{
    pub username: String,
    pub password: String,
    pub user_role: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub tel: Option<String>
}

#[derive(Queryable, Serialize, Deserialize, Clone)]
pub struct Product{
    pub product_id: i32,
    pub product_name: String,
    pub price: i32,
    pub sweetness_options: Vec<String>,
    pub milk_type_options: Vec<String>,
    pub type_options: Vec<String>,
    pub image: Option<String>
}

#[derive(Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct{
    pub product_name: String,
    pub price: i32,
    pub sweetness_options: Vec<String>,
    pub milk_type_options: Vec<String>,
    pub type_options: Vec<String>,
    pub image: Option<String>
}

// Named DiningTable so it doesn't shadow the schema's `tables::table`
#[derive(Queryable, Serialize, Deserialize, Clone)]
pub struct DiningTable{
    pub table_id: i32,
    pub table_number: String,
    pub capacity: i32,
    pub status: String,
    pub last_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>
}

#[derive(Insertable)]
#[diesel(table_name = tables)]
pub struct NewTable{
    pub table_number: String,
    pub capacity: i32,
    pub status: String
}

#[derive(Queryable, Serialize, Deserialize, Clone)]
pub struct Order{
    pub order_id: i32,
    pub customer_id: Option<i32>,
    pub staff_id: i32,
    pub reservation_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub order_status: String,
    pub net_price: i32,
    pub finish_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>
}

#[derive(Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder{
    pub customer_id: Option<i32>,
    pub staff_id: i32,
    pub reservation_id: Option<i32>,
    pub table_ids: Vec<i32>,
    pub order_status: String,
    pub net_price: i32
}

#[derive(Queryable, Serialize, Deserialize, Clone)]
pub struct OrderItem{
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sweetness: Option<String>,
    pub milk_type: Option<String>,
    pub product_type: Option<String>,
    pub note: Option<String>
}

#[derive(Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItem{
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sweetness: Option<String>,
    pub milk_type: Option<String>,
    pub product_type: Option<String>,
    pub note: Option<String>
}

#[derive(Queryable, Serialize, Deserialize, Clone)]
pub struct Reservation{
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
    pub created_at: DateTime<Utc>
}

#[derive(Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation{
    pub customer_id: i32,
    pub table_ids: Vec<i32>,
    pub capacity: i32,
    pub reservation_time: DateTime<Utc>,
    pub customer_amount: i32,
    pub reservation_detail: Option<String>,
    pub reservation_status: String
}

/// The four states a table can be in. Stored as text; only the order and
/// reservation lifecycles are supposed to move a table between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableStatus{
    Empty,
    OnHold,
    Reserved,
    Full
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str{
        match self {
            TableStatus::Empty => "empty",
            TableStatus::OnHold => "onHold",
            TableStatus::Reserved => "reserved",
            TableStatus::Full => "full"
        }
    }
}

/// Closed set of reservation states. Anything else is rejected at the
/// request boundary, so the table-status fallback below is a typed
/// `Pending` arm instead of a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus{
    Pending,
    Accepted,
    Arrive,
    Cancel
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str{
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Arrive => "arrive",
            ReservationStatus::Cancel => "cancel"
        }
    }

    /// The table-status effect each reservation state carries. Applied to
    /// every table the reservation references, on creation and on every
    /// update, regardless of the table's prior status.
    pub fn table_status(&self) -> TableStatus{
        match self {
            ReservationStatus::Accepted => TableStatus::Reserved,
            ReservationStatus::Arrive => TableStatus::Full,
            ReservationStatus::Cancel => TableStatus::Empty,
            ReservationStatus::Pending => TableStatus::OnHold
        }
    }
}

/// Workflow labels staff can put on an order. Deliberately has no effect
/// on table status; releasing tables is keyed on `finish_at` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus{
    Pending,
    Preparing,
    Served,
    Completed,
    Cancelled
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str{
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled"
        }
    }
}
