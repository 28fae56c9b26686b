//! Queries on the `back_checks` table. There is no update path: a record is
//! inserted once and may later be deleted.

use crate::error::BackCheckError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use common::model::back_check::{
    BackCheckMetadata, BackCheckRecord, Fenced, NewBackCheck, SpeciesResult,
};
use common::model::species::Species;
use log::warn;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};

const METADATA_COLUMNS: [&str; 7] = [
    "woreda",
    "kebele",
    "accounting_code",
    "checker_fa_name",
    "checker_cbe_name",
    "checker_phone",
    "fenced",
];

const TRAILING_COLUMNS: [&str; 4] = ["auto_remark", "general_remark", "photo", "timestamp"];

/// Storage columns of one species: beds, length, sockets across width, total.
pub fn species_columns(species: Species) -> [String; 4] {
    let key = species.key();
    [
        format!("{key}_beds"),
        format!("{key}_length"),
        format!("{key}_sockets"),
        format!("total_{key}_sockets"),
    ]
}

fn record_columns() -> Vec<String> {
    let mut columns: Vec<String> = METADATA_COLUMNS.iter().map(|c| c.to_string()).collect();
    for species in Species::ALL {
        columns.extend(species_columns(species));
    }
    columns.extend(TRAILING_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

fn select_sql(filter: &str) -> String {
    format!(
        "SELECT id, {} FROM back_checks {}",
        record_columns().join(", "),
        filter
    )
}

fn to_db_total(total: u64) -> Result<i64, BackCheckError> {
    i64::try_from(total)
        .map_err(|_| BackCheckError::InvalidReading(format!("socket total {} is too large", total)))
}

/// Inserts an assembled back check and returns its id.
pub fn insert(conn: &Connection, record: &NewBackCheck) -> Result<i64, BackCheckError> {
    let meta = &record.metadata;
    let fenced = meta.fenced.map(Fenced::as_str);
    let timestamp = record
        .created_at
        .to_rfc3339_opts(SecondsFormat::Micros, true);
    let totals = record
        .species
        .iter()
        .map(|r| to_db_total(r.total_sockets))
        .collect::<Result<Vec<_>, _>>()?;

    let mut values: Vec<&dyn ToSql> = vec![
        &meta.woreda,
        &meta.kebele,
        &meta.accounting_code,
        &meta.checker_fa_name,
        &meta.checker_cbe_name,
        &meta.checker_phone,
        &fenced,
    ];
    for (result, total) in record.species.iter().zip(&totals) {
        values.push(&result.bed_count);
        values.push(&result.bed_length_meters);
        values.push(&result.sockets_across_width);
        values.push(total);
    }
    values.push(&record.auto_remark);
    values.push(&record.general_remark);
    values.push(&record.photo);
    values.push(&timestamp);

    let columns = record_columns();
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO back_checks ({}) VALUES ({})",
        columns.join(", "),
        placeholders
    );

    conn.execute(&sql, values.as_slice())?;
    Ok(conn.last_insert_rowid())
}

/// All records, oldest first.
pub fn list(conn: &Connection) -> Result<Vec<BackCheckRecord>, BackCheckError> {
    let mut stmt = conn.prepare(&select_sql("ORDER BY id"))?;
    let records = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<BackCheckRecord>, BackCheckError> {
    let record = conn
        .query_row(&select_sql("WHERE id = ?1"), params![id], record_from_row)
        .optional()?;
    Ok(record)
}

/// Returns `false` when no record had this id.
pub fn delete(conn: &Connection, id: i64) -> Result<bool, BackCheckError> {
    let removed = conn.execute("DELETE FROM back_checks WHERE id = ?1", params![id])?;
    Ok(removed > 0)
}

fn text(row: &Row, column: &str) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(column)?.unwrap_or_default())
}

fn optional_text(row: &Row, column: &str) -> rusqlite::Result<Option<String>> {
    Ok(row
        .get::<_, Option<String>>(column)?
        .filter(|v| !v.is_empty()))
}

fn species_from_row(row: &Row, species: Species) -> rusqlite::Result<SpeciesResult> {
    let [beds, length, sockets, total] = species_columns(species);
    let bed_count = row.get::<_, Option<u32>>(beds.as_str())?.unwrap_or(0);
    let bed_length_meters = row.get::<_, Option<f64>>(length.as_str())?.unwrap_or(0.0);
    let sockets_across_width = row.get::<_, Option<u32>>(sockets.as_str())?.unwrap_or(0);
    let stored_total = row
        .get::<_, Option<i64>>(total.as_str())?
        .and_then(|t| u64::try_from(t).ok());

    Ok(SpeciesResult {
        species,
        bed_count,
        bed_length_meters,
        sockets_across_width,
        // Rows written before the column existed report the derived value.
        total_sockets: stored_total
            .unwrap_or(u64::from(bed_count) * u64::from(sockets_across_width)),
    })
}

fn record_from_row(row: &Row) -> rusqlite::Result<BackCheckRecord> {
    let id: i64 = row.get("id")?;

    // Unanswered or unreadable values stay absent rather than defaulting to an answer.
    let fenced = optional_text(row, "fenced")?.and_then(|raw| match raw.parse::<Fenced>() {
        Ok(fenced) => Some(fenced),
        Err(_) => {
            warn!("Back check {}: unrecognised fenced value '{}'", id, raw);
            None
        }
    });

    let metadata = BackCheckMetadata {
        woreda: text(row, "woreda")?,
        kebele: text(row, "kebele")?,
        accounting_code: optional_text(row, "accounting_code")?,
        checker_fa_name: text(row, "checker_fa_name")?,
        checker_cbe_name: text(row, "checker_cbe_name")?,
        checker_phone: text(row, "checker_phone")?,
        fenced,
    };

    let species = [
        species_from_row(row, Species::Guava)?,
        species_from_row(row, Species::Gesho)?,
        species_from_row(row, Species::Lemon)?,
        species_from_row(row, Species::Grevillea)?,
    ];

    let created_at = match row.get::<_, Option<String>>("timestamp")? {
        Some(raw) => {
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warn!("Back check {}: unreadable timestamp '{}'", id, raw);
            }
            parsed
        }
        None => None,
    };

    Ok(BackCheckRecord {
        id,
        metadata,
        species,
        auto_remark: row.get("auto_remark")?,
        general_remark: row.get("general_remark")?,
        photo: optional_text(row, "photo")?,
        created_at,
    })
}

/// Accepts RFC 3339 as written by this service and the naive UTC
/// `YYYY-MM-DD HH:MM:SS[.ffffff]` form found in older stores.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use chrono::TimeZone;
    use common::model::back_check::SpeciesReading;

    fn migrated() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        migrations::apply(&mut conn).unwrap();
        conn
    }

    fn sample() -> NewBackCheck {
        let reading = |species, bed_count, sockets_across_width| SpeciesReading {
            species,
            bed_count,
            bed_length_meters: 10.5,
            sockets_across_width,
        };
        NewBackCheck {
            metadata: BackCheckMetadata {
                woreda: "Jimma".to_string(),
                kebele: "Bore".to_string(),
                accounting_code: Some("AC-7".to_string()),
                checker_fa_name: "Abebe".to_string(),
                checker_cbe_name: "Kebede".to_string(),
                checker_phone: "0911000000".to_string(),
                fenced: Some(Fenced::No),
            },
            species: [
                SpeciesResult::from_reading(&reading(Species::Guava, 4, 13)),
                SpeciesResult::from_reading(&reading(Species::Gesho, 2, 17)),
                SpeciesResult::from_reading(&reading(Species::Lemon, 0, 0)),
                SpeciesResult::from_reading(&reading(Species::Grevillea, 5, 16)),
            ],
            auto_remark: "Guava: Correct | Gesho: +1 | Grevillea: Correct".to_string(),
            general_remark: "Watering schedule ok".to_string(),
            photo: Some("aGVsbG8=".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn insert_then_get() {
        let conn = migrated();
        let new = sample();
        let id = insert(&conn, &new).unwrap();

        let stored = get(&conn, id).unwrap().expect("record should exist");
        assert_eq!(stored.id, id);
        assert_eq!(stored.metadata, new.metadata);
        assert_eq!(stored.species, new.species);
        assert_eq!(stored.auto_remark.as_deref(), Some(new.auto_remark.as_str()));
        assert_eq!(stored.photo, new.photo);
        assert_eq!(stored.created_at, Some(new.created_at));
    }

    #[test]
    fn list_is_ordered_by_id() {
        let conn = migrated();
        let first = insert(&conn, &sample()).unwrap();
        let second = insert(&conn, &sample()).unwrap();
        let ids: Vec<i64> = list(&conn).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn delete_reports_missing_rows() {
        let conn = migrated();
        let id = insert(&conn, &sample()).unwrap();
        assert!(delete(&conn, id).unwrap());
        assert!(!delete(&conn, id).unwrap());
        assert!(get(&conn, id).unwrap().is_none());
    }

    #[test]
    fn empty_remark_is_kept_as_empty_string() {
        let conn = migrated();
        let mut new = sample();
        new.auto_remark = String::new();
        let id = insert(&conn, &new).unwrap();
        let stored = get(&conn, id).unwrap().unwrap();
        assert_eq!(stored.auto_remark.as_deref(), Some(""));
    }

    #[test]
    fn reads_legacy_rows() {
        let conn = migrated();
        conn.execute(
            "INSERT INTO back_checks (woreda, checker_fa_name, fenced, lemon_beds, lemon_sockets, \
             total_lemon_sockets, guava_beds, guava_sockets, timestamp) \
             VALUES ('Agaro', 'Almaz', 'Yes', 3, 13, 39, 2, 12, '2025-11-02 08:15:42.123456')",
            [],
        )
        .unwrap();

        let records = list(&conn).unwrap();
        assert_eq!(records.len(), 1);
        let legacy = &records[0];
        assert_eq!(legacy.metadata.kebele, "");
        assert_eq!(legacy.metadata.accounting_code, None);
        assert_eq!(legacy.auto_remark, None);
        assert_eq!(legacy.photo, None);
        assert_eq!(legacy.result(Species::Lemon).total_sockets, 39);
        // No stored total: derived from the stored inputs.
        assert_eq!(legacy.result(Species::Guava).total_sockets, 24);
        assert_eq!(legacy.result(Species::Gesho).total_sockets, 0);
        assert!(legacy.created_at.is_some());
    }

    #[test]
    fn fenced_is_never_invented_for_legacy_rows() {
        let conn = migrated();
        for (woreda, fenced) in [
            ("A", None),
            ("B", Some("አዎ")),
            ("C", Some("No ")),
            ("D", Some("maybe")),
            ("E", Some("")),
        ] {
            conn.execute(
                "INSERT INTO back_checks (woreda, fenced) VALUES (?1, ?2)",
                params![woreda, fenced],
            )
            .unwrap();
        }

        let fenced: Vec<Option<Fenced>> = list(&conn)
            .unwrap()
            .iter()
            .map(|r| r.metadata.fenced)
            .collect();
        assert_eq!(
            fenced,
            vec![None, Some(Fenced::Yes), Some(Fenced::No), None, None]
        );
    }

    #[test]
    fn unanswered_fenced_is_stored_as_null() {
        let conn = migrated();
        let mut new = sample();
        new.metadata.fenced = None;
        let id = insert(&conn, &new).unwrap();
        let raw: Option<String> = conn
            .query_row("SELECT fenced FROM back_checks WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(raw, None);
        assert_eq!(get(&conn, id).unwrap().unwrap().metadata.fenced, None);
    }

    #[test]
    fn parses_both_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp("2025-01-02T03:04:05Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-01-02 03:04:05"), Some(expected));
        assert!(parse_timestamp("yesterday").is_none());
    }
}
