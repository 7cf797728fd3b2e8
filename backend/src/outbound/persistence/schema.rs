//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. `diesel print-schema` regenerates them from a live database.

diesel::table! {
    /// Ordered catalogue of lifecycle phases.
    phases (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        /// Position in the catalogue; ties are broken by `created_at`.
        sort_order -> Int4,
        /// Always positive; enforced by a check constraint.
        default_days_to_complete -> Int4,
        color -> Varchar,
        icon_name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vehicle shipments.
    ///
    /// `tracking_number` carries a unique index. `current_phase_id`
    /// references `phases.id` with `ON DELETE RESTRICT`.
    transports (id) {
        id -> Uuid,
        tracking_number -> Varchar,
        customer_name -> Varchar,
        customer_email -> Varchar,
        vehicle_make -> Varchar,
        vehicle_model -> Varchar,
        vehicle_year -> Nullable<Int4>,
        vehicle_vin -> Nullable<Varchar>,
        origin_location -> Varchar,
        destination_location -> Varchar,
        estimated_delivery -> Nullable<Timestamptz>,
        current_phase_id -> Uuid,
        phase_started_at -> Timestamptz,
        days_to_complete_phase -> Int4,
        /// One of `active`, `completed`, `cancelled`.
        status -> Varchar,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only log of phase transitions.
    ///
    /// `phase_id` has no foreign key; rows outlive the phase they name and
    /// keep its `phase_name` snapshot.
    phase_history (id) {
        id -> Uuid,
        transport_id -> Uuid,
        phase_id -> Uuid,
        phase_name -> Varchar,
        changed_at -> Timestamptz,
        days_in_phase -> Nullable<Int4>,
        notes -> Nullable<Text>,
    }
}

diesel::table! {
    /// Operator account. The `singleton` column is unique and always true,
    /// so at most one row exists.
    admins (id) {
        id -> Uuid,
        singleton -> Bool,
        username -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(transports -> phases (current_phase_id));
diesel::joinable!(phase_history -> transports (transport_id));

diesel::allow_tables_to_appear_in_same_query!(phases, transports, phase_history, admins);
