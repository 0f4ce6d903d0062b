//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Students table schema.
#[derive(Iden, Clone, Copy)]
pub enum Students {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "version"]
    Version,
    #[iden = "student_data"]
    StudentData,
}

/// Leads table schema.
#[derive(Iden, Clone, Copy)]
pub enum Leads {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "version"]
    Version,
    #[iden = "lead_data"]
    LeadData,
}

/// Consumption events ("records") table schema.
#[derive(Iden, Clone, Copy)]
pub enum ConsumptionEvents {
    Table,
    #[iden = "seq"]
    Seq,
    #[iden = "id"]
    Id,
    #[iden = "student_id"]
    StudentId,
    #[iden = "recorded_at"]
    RecordedAt,
    #[iden = "event_data"]
    EventData,
}

/// Replenishment events ("renewals") table schema.
#[derive(Iden, Clone, Copy)]
pub enum ReplenishmentEvents {
    Table,
    #[iden = "seq"]
    Seq,
    #[iden = "id"]
    Id,
    #[iden = "student_id"]
    StudentId,
    #[iden = "recorded_at"]
    RecordedAt,
    #[iden = "event_data"]
    EventData,
}

/// SQL for creating the students table.
pub const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    id TEXT PRIMARY KEY NOT NULL,
    version INTEGER NOT NULL,
    student_data TEXT NOT NULL
);
"#;

/// SQL for creating the leads table.
pub const CREATE_LEADS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY NOT NULL,
    version INTEGER NOT NULL,
    lead_data TEXT NOT NULL
);
"#;

/// SQL for creating the consumption events table.
pub const CREATE_CONSUMPTION_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS consumption_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    student_id TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    event_data TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_consumption_events_student ON consumption_events(student_id);
"#;

/// SQL for creating the replenishment events table.
pub const CREATE_REPLENISHMENT_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS replenishment_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    student_id TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    event_data TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_replenishment_events_student ON replenishment_events(student_id);
"#;
