// 🗄️ Mock Applications API - in-memory SQLite store
//
// Stands in for the remote service that owns applications. Data lives in an
// in-memory database for the lifetime of the process; `reset` restores the
// seed.

use crate::types::{Application, ApplicationPatch, ApplicationStatus};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure reported by the applications API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No application with this id
    NotFound(String),
    /// Transport/storage failure
    Storage(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(id) => write!(f, "Application {} not found", id),
            ApiError::Storage(message) => write!(f, "Storage error: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

// ============================================================================
// API TRAIT
// ============================================================================

/// Operations the back office needs from the applications service
pub trait ApplicationsApi {
    /// Current list of applications, in seed order
    fn fetch_applications(&self) -> Result<Vec<Application>, ApiError>;

    /// Apply a partial update and return the stored record
    fn update_application(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> Result<Application, ApiError>;
}

// ============================================================================
// SEED DATA
// ============================================================================

/// Demo applications loaded when no seed file is given
pub fn demo_applications() -> Vec<Application> {
    let app = |id: &str,
               name: &str,
               account: &str,
               current_limit: u64,
               requested_limit: u64,
               status: ApplicationStatus| Application {
        id: id.to_string(),
        name: name.to_string(),
        account: account.to_string(),
        current_limit,
        requested_limit,
        currency: "RUB".to_string(),
        status,
    };

    vec![
        app("7b2f-4a12", "Ivan Ivanovich Ivanov", "40817810500000001234", 50_000, 150_000, ApplicationStatus::New),
        app("1c9d-8b34", "Alexander Vladimirovich Konstantinopolsky", "40817810500000005678", 1_500_000, 2_000_000, ApplicationStatus::Approved),
        app("9a5e-2f11", "Anna Sergeevna Sidorova", "40817840300000009999", 5_000, 10_000, ApplicationStatus::Rejected),
        app("mock-101", "Dmitry Alexandrovich Petrov", "40817810900000004567", 300_000, 800_000, ApplicationStatus::New),
        app("mock-102", "Maria Pavlovna Kozlova", "40817810200000007890", 100_000, 500_000, ApplicationStatus::New),
    ]
}

/// Load applications from a CSV file with camelCase headers
/// (id,name,account,currentLimit,requestedLimit,currency,status).
/// Rows without an id get a fresh UUID.
pub fn load_csv(csv_path: &Path) -> Result<Vec<Application>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open seed file {}", csv_path.display()))?;

    let mut applications = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let mut app: Application =
            result.with_context(|| format!("Failed to parse application on row {}", line + 1))?;
        if app.id.trim().is_empty() {
            app.id = uuid::Uuid::new_v4().to_string();
        }
        applications.push(app);
    }

    Ok(applications)
}

// ============================================================================
// MOCK API
// ============================================================================

pub struct MockApi {
    conn: Connection,
    seed: Vec<Application>,
}

impl MockApi {
    /// Open an in-memory store holding `seed`
    pub fn new(seed: Vec<Application>) -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        setup_database(&conn)?;
        let api = MockApi { conn, seed };
        api.reset()?;
        Ok(api)
    }

    /// Store seeded with the demo applications
    pub fn with_demo_data() -> Result<Self> {
        Self::new(demo_applications())
    }

    /// Drop every change and restore the seed
    pub fn reset(&self) -> Result<()> {
        self.conn.execute("DELETE FROM applications", [])?;
        let inserted = insert_applications(&self.conn, &self.seed)?;
        tracing::debug!(inserted, "mock store seeded");
        Ok(())
    }
}

impl ApplicationsApi for MockApi {
    fn fetch_applications(&self) -> Result<Vec<Application>, ApiError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, account, current_limit, requested_limit, currency, status
             FROM applications
             ORDER BY seq",
        )?;

        let applications = stmt
            .query_map([], row_to_application)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(applications)
    }

    fn update_application(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> Result<Application, ApiError> {
        let current = find_application(&self.conn, id)?
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let updated = current.patched(patch);

        self.conn.execute(
            "UPDATE applications
             SET current_limit = ?1, requested_limit = ?2, status = ?3
             WHERE id = ?4",
            params![
                to_sql_limit(updated.current_limit)?,
                to_sql_limit(updated.requested_limit)?,
                updated.status.as_str(),
                updated.id,
            ],
        )?;

        Ok(updated)
    }
}

// ============================================================================
// SQL HELPERS
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS applications (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            account TEXT NOT NULL,
            current_limit INTEGER NOT NULL CHECK (current_limit >= 0),
            requested_limit INTEGER NOT NULL CHECK (requested_limit >= 0),
            currency TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('New', 'Approved', 'Rejected'))
        )",
        [],
    )?;

    Ok(())
}

pub fn insert_applications(conn: &Connection, applications: &[Application]) -> Result<usize> {
    let mut inserted = 0;

    for app in applications {
        conn.execute(
            "INSERT INTO applications (
                id, name, account, current_limit, requested_limit, currency, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                app.id,
                app.name,
                app.account,
                to_sql_limit(app.current_limit)?,
                to_sql_limit(app.requested_limit)?,
                app.currency,
                app.status.as_str(),
            ],
        )
        .with_context(|| format!("Failed to insert application {}", app.id))?;
        inserted += 1;
    }

    Ok(inserted)
}

fn find_application(conn: &Connection, id: &str) -> Result<Option<Application>, ApiError> {
    let app = conn
        .query_row(
            "SELECT id, name, account, current_limit, requested_limit, currency, status
             FROM applications
             WHERE id = ?1",
            [id],
            row_to_application,
        )
        .optional()?;

    Ok(app)
}

fn row_to_application(row: &rusqlite::Row<'_>) -> rusqlite::Result<Application> {
    let current_limit: i64 = row.get(3)?;
    let requested_limit: i64 = row.get(4)?;
    let status: String = row.get(6)?;

    Ok(Application {
        id: row.get(0)?,
        name: row.get(1)?,
        account: row.get(2)?,
        current_limit: from_sql_limit(3, current_limit)?,
        requested_limit: from_sql_limit(4, requested_limit)?,
        currency: row.get(5)?,
        status: status.parse().map_err(|_| {
            rusqlite::Error::InvalidColumnType(6, "status".to_string(), rusqlite::types::Type::Text)
        })?,
    })
}

// SQLite integers are signed
fn to_sql_limit(limit: u64) -> Result<i64, ApiError> {
    i64::try_from(limit).map_err(|_| ApiError::Storage(format!("Limit {} out of range", limit)))
}

fn from_sql_limit(column: usize, value: i64) -> rusqlite::Result<u64> {
    u64::try_from(value).map_err(|_| {
        rusqlite::Error::IntegralValueOutOfRange(column, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_fetch_returns_seed_in_order() {
        let api = MockApi::with_demo_data().unwrap();
        let apps = api.fetch_applications().unwrap();

        assert_eq!(apps.len(), 5);
        assert_eq!(apps[0].id, "7b2f-4a12");
        assert_eq!(apps[0].current_limit, 50_000);
        assert_eq!(apps[4].id, "mock-102");
        assert_eq!(apps, demo_applications());
    }

    #[test]
    fn test_update_applies_partial_patch() {
        let api = MockApi::with_demo_data().unwrap();

        let updated = api
            .update_application(
                "7b2f-4a12",
                &ApplicationPatch {
                    current_limit: Some(150_000),
                    status: Some(ApplicationStatus::Approved),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.current_limit, 150_000);
        assert_eq!(updated.status, ApplicationStatus::Approved);
        assert_eq!(updated.requested_limit, 150_000);

        let stored = api.fetch_applications().unwrap();
        assert_eq!(stored[0], updated);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let api = MockApi::with_demo_data().unwrap();
        let err = api
            .update_application("nope", &ApplicationPatch::default())
            .unwrap_err();

        assert_eq!(err, ApiError::NotFound("nope".to_string()));
        assert_eq!(err.to_string(), "Application nope not found");
    }

    #[test]
    fn test_reset_restores_seed() {
        let api = MockApi::with_demo_data().unwrap();
        api.update_application(
            "9a5e-2f11",
            &ApplicationPatch {
                status: Some(ApplicationStatus::New),
                ..Default::default()
            },
        )
        .unwrap();

        api.reset().unwrap();

        assert_eq!(api.fetch_applications().unwrap(), demo_applications());
    }

    #[test]
    fn test_fetch_returns_independent_copies() {
        let api = MockApi::with_demo_data().unwrap();
        let mut apps = api.fetch_applications().unwrap();
        apps[0].current_limit = 1;

        assert_eq!(api.fetch_applications().unwrap()[0].current_limit, 50_000);
    }

    #[test]
    fn test_load_csv_fills_missing_ids() {
        let path = std::env::temp_dir().join(format!("credit-limits-{}.csv", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "id,name,account,currentLimit,requestedLimit,currency,status").unwrap();
            writeln!(file, "a-1,Jane Roe,40817810500000000001,1000,5000,USD,New").unwrap();
            writeln!(file, ",John Doe,40817810500000000002,2000,2500,EUR,Rejected").unwrap();
        }

        let apps = load_csv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].id, "a-1");
        assert_eq!(apps[1].status, ApplicationStatus::Rejected);
        assert!(!apps[1].id.is_empty());

        let api = MockApi::new(apps).unwrap();
        assert_eq!(api.fetch_applications().unwrap().len(), 2);
    }

    #[test]
    fn test_load_csv_rejects_bad_status() {
        let path = std::env::temp_dir().join(format!("credit-limits-{}.csv", uuid::Uuid::new_v4()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "id,name,account,currentLimit,requestedLimit,currency,status").unwrap();
            writeln!(file, "a-1,Jane Roe,4081,1000,5000,USD,Pending").unwrap();
        }

        let result = load_csv(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
