//! Diesel table definitions for the user and group collections.
//!
//! Kept in sync with `backend/migrations` by hand.

diesel::table! {
    /// Registered users with credential material and group memberships.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login name.
        username -> Varchar,
        /// Informational given name.
        first_name -> Varchar,
        /// Informational family name.
        last_name -> Varchar,
        /// Unique normalised phone number.
        phone_number -> Varchar,
        /// Hex Argon2id digest.
        password_hash -> Varchar,
        /// Hex salt the digest was computed with.
        password_salt -> Varchar,
        /// Creation timestamp.
        inserted_at -> Timestamptz,
        /// Groups the user belongs to.
        group_ids -> Array<Uuid>,
    }
}

diesel::table! {
    /// Groups and their member sets.
    groups (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique group name.
        name -> Varchar,
        /// Provisioned phone number, unique when present.
        phone_number -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Members of the group.
        user_ids -> Array<Uuid>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, groups);
