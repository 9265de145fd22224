//! Diesel schema for assembly task persistence.

diesel::table! {
    /// Assembly tasks: indexed lookup columns plus the full task document.
    assembly_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Insertion sequence; defines store order.
        seq -> Int8,
        /// Owning job identifier.
        #[max_length = 255]
        job_id -> Varchar,
        /// Role identifier.
        #[max_length = 255]
        role_id -> Varchar,
        /// Stage identifier.
        #[max_length = 255]
        stage_id -> Varchar,
        /// Assigned crew identifier.
        #[max_length = 255]
        team_id -> Nullable<Varchar>,
        /// Task status.
        #[max_length = 50]
        status -> Varchar,
        /// Planned date as supplied; byte-wise collation.
        planned_date -> Nullable<Text>,
        /// Serialized task aggregate.
        document -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
