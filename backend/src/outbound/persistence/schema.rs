//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts and their Argon2 PHC password hashes.
    users (id) {
        id -> Uuid,
        /// Lower-cased, unique.
        email -> Varchar,
        name -> Varchar,
        /// One of `admin`, `supervisor`, `allocator`, `employee`.
        role -> Varchar,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Units of work tracked on the board.
    loads (id) {
        id -> Uuid,
        client_name -> Varchar,
        client_number -> Varchar,
        /// Snake-case status token.
        status -> Varchar,
        employee_count -> Int4,
        /// Nulled when the assignee is deleted.
        assigned_to -> Nullable<Uuid>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only discussion thread per load.
    comments (id) {
        id -> Uuid,
        load_id -> Uuid,
        user_id -> Uuid,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(comments -> loads (load_id));
diesel::allow_tables_to_appear_in_same_query!(users, loads, comments);
