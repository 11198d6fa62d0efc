//! # Order Number Generator
//!
//! Allocates `PREFIX-PERIOD<N>` codes from a counter row per prefix + period.
//!
//! ## Allocation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout transaction (BEGIN)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE order_number_sequences          ◄── first statement: takes the  │
//! │  SET last_value = last_value + 1            write lock even when no row │
//! │  WHERE prefix = 'PQ' AND period = '2024'    matches                     │
//! │  RETURNING last_value                                                   │
//! │       │                                                                 │
//! │       ├── row ──────────────────────────────────────────┐               │
//! │       │                                                 │               │
//! │       └── no row: first use of this prefix + period     │               │
//! │             │                                           │               │
//! │             ▼                                           │               │
//! │           latest order in scope ──► parse_sequence      │               │
//! │             │                        │                  │               │
//! │             │ none                   └─ malformed: error│               │
//! │             ▼                                           │               │
//! │           INSERT counter row (seed + 1)                 │               │
//! │             │                                           │               │
//! │             ▼                                           ▼               │
//! │           "PQ-2024" + N ◄───────────────────────────────┘               │
//! │       │                                                                 │
//! │       ├── COMMIT   ──► counter advance is kept with the order           │
//! │       └── ROLLBACK ──► counter advance disappears with the order        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The seed is the numeric suffix of the most recently created order (highest
//! row id) in that scope, or 0. Databases that already hold orders numbered
//! without a counter continue from where they left off. A latest order whose
//! suffix is not a positive integer fails the allocation, and with it the
//! checkout, instead of silently restarting the sequence.
//!
//! SQLite allows one writer at a time, so two transactions can never read the
//! same `last_value`: the second waits (busy timeout) until the first commits
//! or rolls back.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use storefront_core::order::validate_prefix;
use storefront_core::OrderNumberScope;

/// Hands out order numbers for one prefix.
#[derive(Debug, Clone)]
pub struct OrderNumberGenerator {
    prefix: String,
}

impl OrderNumberGenerator {
    /// Rejects an empty or non-alphanumeric prefix.
    pub fn new(prefix: impl Into<String>) -> DbResult<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(OrderNumberGenerator { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Scope for an order placed at `at`.
    pub fn scope_for(&self, at: DateTime<Utc>) -> DbResult<OrderNumberScope> {
        Ok(OrderNumberScope::for_time(&self.prefix, at)?)
    }

    /// Allocates the next code for an order placed at `at`.
    ///
    /// Must run on the connection holding the order's transaction so the
    /// counter advance commits or rolls back with the order.
    pub async fn next(&self, conn: &mut SqliteConnection, at: DateTime<Utc>) -> DbResult<String> {
        let scope = self.scope_for(at)?;
        next_in_scope(conn, &scope, at).await
    }
}

/// Advances the counter for `scope` and returns the formatted code.
pub async fn next_in_scope(
    conn: &mut SqliteConnection,
    scope: &OrderNumberScope,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let advanced: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE order_number_sequences
        SET last_value = last_value + 1, updated_at = ?3
        WHERE prefix = ?1 AND period = ?2
        RETURNING last_value
        "#,
    )
    .bind(scope.prefix())
    .bind(scope.period())
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    let sequence = match advanced {
        Some(value) => value,
        None => {
            let seed = seed_from_orders(conn, scope).await?;
            sqlx::query_scalar(
                r#"
                INSERT INTO order_number_sequences (prefix, period, last_value, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                RETURNING last_value
                "#,
            )
            .bind(scope.prefix())
            .bind(scope.period())
            .bind(seed + 1)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?
        }
    };

    let code = scope.format(sequence);
    debug!(code = %code, sequence, "Allocated order number");
    Ok(code)
}

/// Sequence of the most recently created order in `scope`, or 0 when there is none.
async fn seed_from_orders(conn: &mut SqliteConnection, scope: &OrderNumberScope) -> DbResult<i64> {
    let stem = scope.stem();
    let latest: Option<String> = sqlx::query_scalar(
        r#"
        SELECT order_number FROM orders
        WHERE substr(order_number, 1, length(?1)) = ?1
        ORDER BY id DESC
        LIMIT 1
        "#,
    )
    .bind(&stem)
    .fetch_optional(&mut *conn)
    .await?;

    match latest {
        Some(code) => {
            let seed = scope.parse_sequence(&code)?;
            debug!(code = %code, seed, "Seeded order number counter");
            Ok(seed)
        }
        None => Ok(0),
    }
}

/// Last value handed out for `scope`, if any. Read-only.
pub async fn current_value(pool: &SqlitePool, scope: &OrderNumberScope) -> DbResult<Option<i64>> {
    let value: Option<i64> = sqlx::query_scalar(
        "SELECT last_value FROM order_number_sequences WHERE prefix = ?1 AND period = ?2",
    )
    .bind(scope.prefix())
    .bind(scope.period())
    .fetch_optional(pool)
    .await?;

    Ok(value)
}
