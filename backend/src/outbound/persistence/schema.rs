//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Per-user ledger accounts.
    ///
    /// The `email` column is the primary key: the stable identifier the
    /// identity provider hands us.
    users (email) {
        /// Primary key: account email.
        email -> Text,
        /// Display name from the provider, when known.
        name -> Nullable<Text>,
        /// Current balance; only mutated via relative adjustments.
        coins -> Int8,
        /// Grants access to the admin adjustment interface.
        is_admin -> Bool,
        /// Account creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only transaction log.
    ///
    /// Rows are inserted in the same database transaction as the balance
    /// adjustment they explain, and never updated or deleted.
    coin_transactions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Email of the account the entry belongs to.
        user_id -> Text,
        /// Signed delta: positive credits, negative debits.
        amount -> Int8,
        /// Free-text cause of the change.
        reason -> Text,
        /// Back-reference to the redeemed coupon, if any.
        coupon_id -> Nullable<Uuid>,
        /// Email of the acting admin, if any.
        admin_id -> Nullable<Text>,
        /// Entry creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Single-use coupon codes.
    coupons (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique unguessable token.
        code -> Text,
        /// Coin value credited on redemption.
        coins -> Int8,
        /// Redemption state; transitions to true exactly once via a
        /// conditional update.
        is_redeemed -> Bool,
        /// Email of the redeemer.
        redeemed_by -> Nullable<Text>,
        /// Redemption timestamp.
        redeemed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Expiry; redemption requires this to be strictly in the future.
        expires_at -> Timestamptz,
        /// Email of the generating admin.
        created_by -> Text,
    }
}

diesel::table! {
    /// Transfer requests handed to the rewrite worker.
    transfer_requests (id) {
        /// Primary key, shared with the worker for out-of-band updates.
        id -> Uuid,
        /// Email of the requesting account.
        user_id -> Text,
        /// Source repository URL.
        source_repo -> Text,
        /// Credential-embedded destination URL; never served by read
        /// endpoints.
        dest_repo -> Text,
        /// Clean destination URL for display and audit.
        original_dest_repo -> Text,
        /// Optional rewrite range start.
        start_date -> Nullable<Text>,
        /// Optional rewrite range end.
        end_date -> Nullable<Text>,
        /// Whether original commit dates are preserved.
        keep_original_dates -> Bool,
        /// Contributor names as submitted.
        contributors -> Array<Text>,
        /// Exact amount debited for the request.
        coin_cost -> Int8,
        /// Human-readable premium feature labels.
        features -> Array<Text>,
        /// Worker-owned lifecycle state; `pending` at creation.
        status -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, coin_transactions, coupons, transfer_requests);
