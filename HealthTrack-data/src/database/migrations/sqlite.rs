use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_blood_pressure_table(conn)?;
    create_heart_rate_table(conn)?;
    create_diet_table(conn)?;
    create_goals_table(conn)?;
    create_habit_tables(conn)?;
    create_device_credentials_table(conn)?;
    create_recommendations_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

fn apply(conn: &Connection, name: &str, sql: &str) -> Result<(), DatabaseError> {
    conn.execute_batch(sql)
        .map_err(|e| DatabaseError::Migration(format!("{}: {}", name, e)))
}

fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            name TEXT,
            gender TEXT,
            birth_date TEXT,
            height_cm REAL,
            roles TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
}

/// Readings are looked up per user by time, and by source when deduplicating device imports
fn create_blood_pressure_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "blood_pressure_readings",
        "CREATE TABLE IF NOT EXISTS blood_pressure_readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            systolic INTEGER NOT NULL,
            diastolic INTEGER NOT NULL,
            pulse INTEGER,
            notes TEXT,
            timestamp TEXT NOT NULL,
            position TEXT,
            arm TEXT,
            device_id TEXT,
            source TEXT NOT NULL DEFAULT 'manual'
        );
        CREATE INDEX IF NOT EXISTS idx_blood_pressure_user_timestamp
        ON blood_pressure_readings (user_id, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_blood_pressure_user_source
        ON blood_pressure_readings (user_id, source, timestamp);",
    )
}

fn create_heart_rate_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "heart_rate_readings",
        "CREATE TABLE IF NOT EXISTS heart_rate_readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            bpm INTEGER NOT NULL,
            context TEXT,
            notes TEXT,
            timestamp TEXT NOT NULL,
            device_id TEXT,
            source TEXT NOT NULL DEFAULT 'manual'
        );
        CREATE INDEX IF NOT EXISTS idx_heart_rate_user_timestamp
        ON heart_rate_readings (user_id, timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_heart_rate_user_source
        ON heart_rate_readings (user_id, source, timestamp);",
    )
}

fn create_diet_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "diet_records",
        "CREATE TABLE IF NOT EXISTS diet_records (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            meal_type TEXT NOT NULL,
            food_name TEXT NOT NULL,
            calories REAL NOT NULL,
            protein_g REAL,
            carbs_g REAL,
            fat_g REAL,
            notes TEXT,
            recorded_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_diet_user_recorded
        ON diet_records (user_id, recorded_at DESC);",
    )
}

fn create_goals_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "goals",
        "CREATE TABLE IF NOT EXISTS goals (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            metric TEXT NOT NULL,
            target_value REAL NOT NULL,
            current_value REAL NOT NULL DEFAULT 0,
            unit TEXT,
            deadline TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_goals_user_status
        ON goals (user_id, status);",
    )
}

/// One check-in row per habit and calendar day
fn create_habit_tables(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "habits",
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            archived INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_habits_user
        ON habits (user_id);
        CREATE TABLE IF NOT EXISTS habit_checkins (
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            checkin_date TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 1,
            note TEXT,
            created_at TEXT NOT NULL,
            PRIMARY KEY (habit_id, checkin_date)
        );",
    )
}

fn create_device_credentials_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "device_credentials",
        "CREATE TABLE IF NOT EXISTS device_credentials (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            provider TEXT NOT NULL,
            account TEXT NOT NULL,
            secret TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'connected',
            last_sync_at TEXT,
            last_sync_message TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, provider)
        );",
    )
}

fn create_recommendations_table(conn: &Connection) -> Result<(), DatabaseError> {
    apply(
        conn,
        "recommendations",
        "CREATE TABLE IF NOT EXISTS recommendations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            source TEXT NOT NULL,
            advice TEXT NOT NULL,
            period_days INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_recommendations_user_created
        ON recommendations (user_id, created_at DESC);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 9);
    }
}
