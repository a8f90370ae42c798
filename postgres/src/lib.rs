//! `PostgreSQL` registration store for the fest admission service.
//!
//! Implements [`RegistrationStore`] from `fest-admission-core` on top of a sqlx
//! connection pool:
//!
//! - Occupancy computed from committed rows on every read (no cached counters)
//! - Email uniqueness enforced by a unique index, surfaced as [`StoreError::Conflict`]
//! - Team and members written in one transaction, so a failed write leaves nothing behind
//!
//! # Example
//!
//! ```ignore
//! use fest_admission_postgres::PostgresRegistrationStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresRegistrationStore::new("postgres://localhost/fest").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use fest_admission_core::category::TicketCategory;
use fest_admission_core::pool::{OccupancySnapshot, PoolKey};
use fest_admission_core::store::{
    BoxFuture, IncompleteRegistration, RegistrationStore, StoreError, TeamWriteFailure,
};
use fest_admission_core::types::{
    FoodPreference, ParticipantId, PaymentDetails, RegistrationStatus, StartupPitch, TeamId,
    TeamMember, TeamRegistration,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Executor, PgPool, Postgres, Row};
use std::time::Duration;
use uuid::Uuid;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum open connections
    pub max_connections: u32,
    /// Connections kept open when idle
    pub min_connections: u32,
    /// How long to wait for a connection
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// `PostgreSQL`-backed registration store.
#[derive(Clone, Debug)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    /// Connect with default pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the connection fails.
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        Self::connect(database_url, &PoolSettings::default()).await
    }

    /// Connect with explicit pool settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if the connection fails.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Failed to connect: {e}")))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }
}

fn map_write_error(e: &sqlx::Error, what: &str) -> StoreError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => StoreError::Conflict(format!("{what}: {db}")),
        _ => StoreError::DatabaseError(format!("Failed to insert {what}: {e}")),
    }
}

fn to_i32(value: u32, field: &str) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::DatabaseError(format!("{field} out of range: {value}")))
}

async fn insert_registration_row<'e, E>(executor: E, team: &TeamRegistration) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    let total_amount = i64::try_from(team.total_amount).map_err(|_| {
        StoreError::DatabaseError(format!("total_amount out of range: {}", team.total_amount))
    })?;

    sqlx::query(
        r"
        INSERT INTO team_registrations (
            id, organization, team_size, ticket_category, workshop_track, competition_track,
            total_amount, transaction_id, screenshot_url, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ",
    )
    .bind(team.id.as_uuid())
    .bind(&team.organization)
    .bind(to_i32(team.team_size, "team_size")?)
    .bind(team.category.as_str())
    .bind(team.workshop_track.map(|t| t.as_str()))
    .bind(team.competition_track.map(|t| t.as_str()))
    .bind(total_amount)
    .bind(&team.payment.transaction_id)
    .bind(team.payment.screenshot_url.as_deref())
    .bind(team.status.as_str())
    .bind(team.created_at)
    .bind(team.updated_at)
    .execute(executor)
    .await
    .map_err(|e| map_write_error(&e, "registration"))?;

    Ok(())
}

async fn insert_member_row<'e, E>(executor: E, member: &TeamMember) -> Result<(), StoreError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r"
        INSERT INTO team_members (
            id, registration_id, name, email, phone, whatsapp, gender, college_year,
            department, food_preference, accommodation, workshop_track, competition_track,
            startup_pitch, passkey_hash, attended, submitted, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        ",
    )
    .bind(member.id.as_uuid())
    .bind(member.registration_id.as_uuid())
    .bind(&member.name)
    .bind(&member.email)
    .bind(&member.phone)
    .bind(member.whatsapp.as_deref())
    .bind(member.gender.as_deref())
    .bind(member.college_year.as_deref())
    .bind(member.department.as_deref())
    .bind(member.food_preference.as_str())
    .bind(member.accommodation)
    .bind(member.workshop_track.map(|t| t.as_str()))
    .bind(member.competition_track.map(|t| t.as_str()))
    .bind(member.startup_pitch.as_ref().map(Json))
    .bind(&member.passkey_hash)
    .bind(member.attended)
    .bind(member.submitted)
    .bind(member.created_at)
    .execute(executor)
    .await
    .map_err(|e| map_write_error(&e, &format!("member {}", member.email)))?;

    Ok(())
}

fn column<T>(row: &PgRow, name: &str) -> Result<T, StoreError>
where
    T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::CorruptRecord(format!("column {name}: {e}")))
}

fn parse_optional<T: std::str::FromStr<Err = String>>(
    value: Option<String>,
) -> Result<Option<T>, StoreError> {
    value
        .map(|s| s.parse().map_err(StoreError::CorruptRecord))
        .transpose()
}

fn registration_from_row(row: &PgRow) -> Result<TeamRegistration, StoreError> {
    let team_size: i32 = column(row, "team_size")?;
    let total_amount: i64 = column(row, "total_amount")?;
    let category: String = column(row, "ticket_category")?;
    let status: String = column(row, "status")?;

    Ok(TeamRegistration {
        id: TeamId::from_uuid(column(row, "id")?),
        organization: column(row, "organization")?,
        team_size: u32::try_from(team_size)
            .map_err(|_| StoreError::CorruptRecord(format!("negative team_size {team_size}")))?,
        category: category
            .parse::<TicketCategory>()
            .map_err(StoreError::CorruptRecord)?,
        workshop_track: parse_optional(column(row, "workshop_track")?)?,
        competition_track: parse_optional(column(row, "competition_track")?)?,
        total_amount: u64::try_from(total_amount).map_err(|_| {
            StoreError::CorruptRecord(format!("negative total_amount {total_amount}"))
        })?,
        payment: PaymentDetails {
            transaction_id: column(row, "transaction_id")?,
            screenshot_url: column(row, "screenshot_url")?,
        },
        status: RegistrationStatus::parse(&status)
            .ok_or_else(|| StoreError::CorruptRecord(format!("unknown status {status}")))?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

fn member_from_row(row: &PgRow) -> Result<TeamMember, StoreError> {
    let food: String = column(row, "food_preference")?;
    let pitch: Option<Json<StartupPitch>> = column(row, "startup_pitch")?;

    Ok(TeamMember {
        id: ParticipantId::from_uuid(column(row, "id")?),
        registration_id: TeamId::from_uuid(column(row, "registration_id")?),
        name: column(row, "name")?,
        email: column(row, "email")?,
        phone: column(row, "phone")?,
        whatsapp: column(row, "whatsapp")?,
        gender: column(row, "gender")?,
        college_year: column(row, "college_year")?,
        department: column(row, "department")?,
        food_preference: FoodPreference::parse(&food)
            .ok_or_else(|| StoreError::CorruptRecord(format!("unknown food preference {food}")))?,
        accommodation: column(row, "accommodation")?,
        workshop_track: parse_optional(column(row, "workshop_track")?)?,
        competition_track: parse_optional(column(row, "competition_track")?)?,
        startup_pitch: pitch.map(|Json(pitch)| pitch),
        passkey_hash: column(row, "passkey_hash")?,
        attended: column(row, "attended")?,
        submitted: column(row, "submitted")?,
        created_at: column(row, "created_at")?,
    })
}

/// Seats held per (workshop, competition) combination.
type TrackTotals = Vec<(Option<String>, Option<String>, i64)>;

fn occupancy_from_totals(totals: &TrackTotals, pools: &[PoolKey]) -> OccupancySnapshot {
    pools.iter().fold(OccupancySnapshot::new(), |snapshot, pool| {
        let occupied: i64 = totals
            .iter()
            .filter(|(workshop, competition, _)| match pool {
                PoolKey::Overall => true,
                PoolKey::Workshop(track) => workshop.as_deref() == Some(track.as_str()),
                PoolKey::Competition(track) => competition.as_deref() == Some(track.as_str()),
            })
            .map(|(_, _, seats)| *seats)
            .sum();
        snapshot.with(*pool, u32::try_from(occupied).unwrap_or(u32::MAX))
    })
}

impl RegistrationStore for PostgresRegistrationStore {
    fn occupancy<'a>(
        &'a self,
        pools: &'a [PoolKey],
    ) -> BoxFuture<'a, Result<OccupancySnapshot, StoreError>> {
        Box::pin(async move {
            let totals: TrackTotals = sqlx::query_as(
                r"
                SELECT workshop_track, competition_track, COALESCE(SUM(team_size), 0)::BIGINT
                FROM team_registrations
                WHERE status <> 'rejected'
                GROUP BY workshop_track, competition_track
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Failed to read occupancy: {e}")))?;

            Ok(occupancy_from_totals(&totals, pools))
        })
    }

    fn existing_emails<'a>(
        &'a self,
        emails: &'a [String],
    ) -> BoxFuture<'a, Result<Vec<String>, StoreError>> {
        Box::pin(async move {
            if emails.is_empty() {
                return Ok(Vec::new());
            }
            let rows: Vec<(String,)> =
                sqlx::query_as("SELECT email FROM team_members WHERE email = ANY($1)")
                    .bind(emails)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| {
                        StoreError::DatabaseError(format!("Failed to look up emails: {e}"))
                    })?;

            let found: Vec<String> = rows.into_iter().map(|(email,)| email).collect();
            Ok(emails
                .iter()
                .filter(|email| found.contains(email))
                .cloned()
                .collect())
        })
    }

    fn insert_registration<'a>(
        &'a self,
        team: &'a TeamRegistration,
    ) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(insert_registration_row(&self.pool, team))
    }

    fn insert_member<'a>(&'a self, member: &'a TeamMember) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(insert_member_row(&self.pool, member))
    }

    fn write_team<'a>(
        &'a self,
        team: &'a TeamRegistration,
        members: &'a [TeamMember],
    ) -> BoxFuture<'a, Result<(), TeamWriteFailure>> {
        Box::pin(async move {
            let rolled_back = |source: StoreError| {
                tracing::warn!(
                    team_id = %team.id,
                    error = %source,
                    "Team write rolled back"
                );
                metrics::counter!("registration_store.write_rollbacks").increment(1);
                TeamWriteFailure {
                    team_written: false,
                    members_written: 0,
                    source,
                }
            };

            let mut tx = self.pool.begin().await.map_err(|e| {
                rolled_back(StoreError::DatabaseError(format!(
                    "Failed to start transaction: {e}"
                )))
            })?;

            insert_registration_row(&mut *tx, team)
                .await
                .map_err(rolled_back)?;
            for member in members {
                insert_member_row(&mut *tx, member)
                    .await
                    .map_err(rolled_back)?;
            }

            tx.commit().await.map_err(|e| {
                rolled_back(StoreError::DatabaseError(format!(
                    "Failed to commit transaction: {e}"
                )))
            })?;

            tracing::debug!(team_id = %team.id, members = members.len(), "Team written");
            Ok(())
        })
    }

    fn list_registrations(&self) -> BoxFuture<'_, Result<Vec<TeamRegistration>, StoreError>> {
        Box::pin(async move {
            let rows = sqlx::query("SELECT * FROM team_registrations ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    StoreError::DatabaseError(format!("Failed to list registrations: {e}"))
                })?;
            rows.iter().map(registration_from_row).collect()
        })
    }

    fn members_of(&self, team_id: TeamId) -> BoxFuture<'_, Result<Vec<TeamMember>, StoreError>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT * FROM team_members WHERE registration_id = $1 ORDER BY created_at, email",
            )
            .bind(team_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Failed to load members: {e}")))?;
            rows.iter().map(member_from_row).collect()
        })
    }

    fn incomplete_registrations(
        &self,
    ) -> BoxFuture<'_, Result<Vec<IncompleteRegistration>, StoreError>> {
        Box::pin(async move {
            let rows: Vec<(Uuid, String, i32, i64, DateTime<Utc>)> = sqlx::query_as(
                r"
                SELECT r.id, r.organization, r.team_size, COUNT(m.id)::BIGINT, r.created_at
                FROM team_registrations r
                LEFT JOIN team_members m ON m.registration_id = r.id
                GROUP BY r.id
                HAVING COUNT(m.id) < r.team_size
                ORDER BY r.created_at
                ",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                StoreError::DatabaseError(format!("Failed to find incomplete registrations: {e}"))
            })?;

            rows.into_iter()
                .map(|(id, organization, team_size, present, created_at)| {
                    Ok(IncompleteRegistration {
                        team_id: TeamId::from_uuid(id),
                        organization,
                        team_size: u32::try_from(team_size).map_err(|_| {
                            StoreError::CorruptRecord(format!("negative team_size {team_size}"))
                        })?,
                        members_present: u32::try_from(present).unwrap_or(u32::MAX),
                        created_at,
                    })
                })
                .collect()
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::DatabaseError(format!("Ping failed: {e}")))?;
            Ok(())
        })
    }
}
