//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain types and back.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{comments, loads, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Profile update; a `None` hash leaves the stored one untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
    pub password_hash: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoadRow {
    pub id: Uuid,
    pub client_name: String,
    pub client_number: String,
    pub status: String,
    pub employee_count: i32,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full row used for both insert and last-write-wins update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = loads)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LoadRecordRow<'a> {
    pub id: Uuid,
    pub client_name: &'a str,
    pub client_number: &'a str,
    pub status: &'a str,
    pub employee_count: i32,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub load_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub load_id: Uuid,
    pub user_id: Uuid,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}
