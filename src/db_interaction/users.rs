use std::{error::Error, fmt::Debug};

use anyhow::Context;
use chrono::{DateTime, Utc};
use diesel::{Connection, OptionalExtension};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use diesel::prelude::Queryable;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::jwt::UserRole, models::{NewUser, User}, password::compute_password_hash, schema::users, telemetry::spawn_blocking_with_tracing, utils::{error_fmt_chain, DbConnection}};

// Full profile view, returned to the user themself and to admins
#[derive(Queryable, Serialize, Deserialize)]
pub struct UserProfile{
    pub user_id: i32,
    pub username: String,
    pub user_role: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub tel: Option<String>,
    pub birth_date: Option<DateTime<Utc>>,
    pub point: i32
}

// Condensed row for the admin user listing
#[derive(Queryable, Serialize, Deserialize)]
pub struct UserSummary{
    pub user_id: i32,
    pub username: String,
    pub user_role: String,
    pub name: Option<String>,
    pub email: Option<String>
}

type ProfileColumns = (
    users::user_id,
    users::username,
    users::user_role,
    users::name,
    users::email,
    users::tel,
    users::birth_date,
    users::point
);

const PROFILE_COLUMNS: ProfileColumns = (
    users::user_id,
    users::username,
    users::user_role,
    users::name,
    users::email,
    users::tel,
    users::birth_date,
    users::point
);

// Function to query user from username
pub async fn get_user_by_username(
    mut conn: DbConnection,
    username: String
) -> Result<Option<User>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        users::table
            .filter(users::username.eq(username))
            .get_result::<User>(&mut conn)
            .optional()
            .context("Failed to query user by username")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Function to query user from id
pub async fn get_user_by_id(
    mut conn: DbConnection,
    user_id: i32
) -> Result<Option<User>, anyhow::Error> {
    let res = spawn_blocking_with_tracing(move || {
        users::table
            .filter(users::user_id.eq(user_id))
            .get_result::<User>(&mut conn)
            .optional()
            .context("Failed to query user by id")
    })
    .await
    .context("Failed due to threadpool error")??;

    Ok(res)
}

// Error associated with inserting user to users table
#[derive(Error)]
pub enum UserInsertError{
    #[error("username is already taken")]
    UsernameTakenError,
    #[error("email is already taken")]
    EmailTakenError,
    #[error("unexpected database / hashing error occured")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for UserInsertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl From<diesel::result::Error> for UserInsertError {
    fn from(e: diesel::result::Error) -> Self {
        UserInsertError::UnexpectedError(anyhow::Error::new(e))
    }
}

#[tracing::instrument(
    "Inserting user into the database",
    skip(conn, password)
)]
pub async fn insert_user(
    mut conn: DbConnection,
    username: String,
    password: SecretString,
    role: UserRole,
    name: Option<String>,
    email: Option<String>,
    tel: Option<String>
) -> Result<User, UserInsertError> {

    let password_hash = spawn_blocking_with_tracing(move || {
        compute_password_hash(password)
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(UserInsertError::UnexpectedError)?
    .map_err(UserInsertError::UnexpectedError)?;

    let user = spawn_blocking_with_tracing(move || {
        conn.transaction::<User, UserInsertError, _>(|conn| {
            // The unique indexes are the backstop; checking up front keeps
            // the two conflict cases distinguishable for the caller.
            let username_taken: Option<i32> = users::table
                .filter(users::username.eq(&username))
                .select(users::user_id)
                .get_result(conn)
                .optional()
                .context("Failed to check username uniqueness")?;

            if username_taken.is_some() {
                return Err(UserInsertError::UsernameTakenError)
            }

            if let Some(email) = email.as_deref() {
                let email_taken: Option<i32> = users::table
                    .filter(users::email.eq(email))
                    .select(users::user_id)
                    .get_result(conn)
                    .optional()
                    .context("Failed to check email uniqueness")?;

                if email_taken.is_some() {
                    return Err(UserInsertError::EmailTakenError)
                }
            }

            let user: User = diesel::insert_into(users::table)
                .values(NewUser{
                    username,
                    password: password_hash.expose_secret().to_string(),
                    user_role: role.as_str().to_string(),
                    name,
                    email,
                    tel
                })
                .get_result(conn)
                .context("Failed to insert user")?;

            Ok(user)
        })
    })
    .await
    .context("Failed due to threadpool error")
    .map_err(UserInsertError::UnexpectedError)??;

    Ok(user)
}

// Error associated with looking up a user profile
#[derive(Error)]
pub enum UserLookupError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("user_id: {0} doesn't exist")]
    NoUserIdError(i32)
}

impl Debug for UserLookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Get profile data of user",
    skip(conn)
)]
pub async fn get_user_profile(
    mut conn: DbConnection,
    user_id: i32
) -> Result<UserProfile, UserLookupError>{
    let res = spawn_blocking_with_tracing(move || {
        users::table
            .select(PROFILE_COLUMNS)
            .filter(users::user_id.eq(user_id))
            .get_result::<UserProfile>(&mut conn)
            .optional()
    })
    .await??;

    res.ok_or(UserLookupError::NoUserIdError(user_id))
}

#[tracing::instrument(
    "Getting all users",
    skip_all
)]
pub async fn get_all_users(
    mut conn: DbConnection
) -> Result<Vec<UserSummary>, anyhow::Error>{
    Ok(spawn_blocking_with_tracing(move || {
        users::table
            .select((
                users::user_id,
                users::username,
                users::user_role,
                users::name,
                users::email
            ))
            .order(users::user_id.asc())
            .load::<UserSummary>(&mut conn)
            .context("Failed to load users")
    })
    .await
    .context("Failed due to threadpool error")??)
}

#[derive(Debug)]
pub struct ProfileChanges{
    pub name: Option<String>,
    pub tel: Option<String>,
    pub email: Option<String>,
    pub new_password_hash: Option<String>
}

// Errors associated with updating a user profile
#[derive(Error)]
pub enum ProfileUpdateError{
    #[error("Tokio threadpool error occured")]
    ThreadpoolError(#[from] tokio::task::JoinError),
    #[error("Failed to run query")]
    RunQueryError(#[from] diesel::result::Error),
    #[error("email is already taken")]
    EmailTakenError
}

impl Debug for ProfileUpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

#[tracing::instrument(
    "Updating user profile in db",
    skip(conn, changes)
)]
pub async fn update_user_profile(
    mut conn: DbConnection,
    user_id: i32,
    changes: ProfileChanges
) -> Result<UserProfile, ProfileUpdateError>{

    let res = spawn_blocking_with_tracing(move || {
        conn.transaction::<UserProfile, ProfileUpdateError, _>(|conn| {
            if let Some(name) = changes.name {
                diesel::update(users::table.filter(users::user_id.eq(user_id)))
                    .set(users::name.eq(name))
                    .execute(conn)?;
            }

            if let Some(tel) = changes.tel {
                diesel::update(users::table.filter(users::user_id.eq(user_id)))
                    .set(users::tel.eq(tel))
                    .execute(conn)?;
            }

            if let Some(email) = changes.email {
                let email_taken: Option<i32> = users::table
                    .filter(users::email.eq(&email))
                    .filter(users::user_id.ne(user_id))
                    .select(users::user_id)
                    .get_result(conn)
                    .optional()?;

                if email_taken.is_some() {
                    return Err(ProfileUpdateError::EmailTakenError)
                }

                diesel::update(users::table.filter(users::user_id.eq(user_id)))
                    .set(users::email.eq(email))
                    .execute(conn)?;
            }

            if let Some(password_hash) = changes.new_password_hash {
                diesel::update(users::table.filter(users::user_id.eq(user_id)))
                    .set(users::password.eq(password_hash))
                    .execute(conn)?;
            }

            let profile = users::table
                .select(PROFILE_COLUMNS)
                .filter(users::user_id.eq(user_id))
                .get_result::<UserProfile>(conn)?;

            Ok(profile)
        })
    })
    .await??;

    Ok(res)
}
