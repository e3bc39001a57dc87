//! Diesel schema for task persistence.

diesel::table! {
    /// Task records and their processing status.
    tasks (id) {
        /// Store-assigned task identifier.
        id -> Int8,
        /// Opaque task title.
        title -> Text,
        /// Opaque task description.
        description -> Text,
        /// Task lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
