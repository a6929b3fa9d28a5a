//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Task records stored as a serialized aggregate plus indexed scalars.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning property identifier.
        property_id -> Uuid,
        /// Work lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Offer/acceptance state.
        #[max_length = 50]
        assignment -> Varchar,
        /// Serialized task aggregate.
        record -> Jsonb,
        /// Optimistic-concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
