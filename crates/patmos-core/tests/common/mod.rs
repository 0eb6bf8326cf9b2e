//! Shared fixtures: temporary `avhrr.sqlite` stores with known coefficients.

#![allow(dead_code)]

use std::path::PathBuf;

use rusqlite::{Connection, params_from_iter};
use tempfile::TempDir;

pub const COLUMNS: [&str; 25] = [
    "id_patmos",
    "ch1_low_gain_s0",
    "ch1_low_gain_s1",
    "ch1_low_gain_s2",
    "ch1_high_gain_s0",
    "ch1_high_gain_s1",
    "ch1_high_gain_s2",
    "ch1_c0",
    "ch1_gain_switch",
    "ch2_low_gain_s0",
    "ch2_low_gain_s1",
    "ch2_low_gain_s2",
    "ch2_high_gain_s0",
    "ch2_high_gain_s1",
    "ch2_high_gain_s2",
    "ch2_c0",
    "ch2_gain_switch",
    "ch3a_low_gain_s0",
    "ch3a_low_gain_s1",
    "ch3a_low_gain_s2",
    "ch3a_high_gain_s0",
    "ch3a_high_gain_s1",
    "ch3a_high_gain_s2",
    "ch3a_c0",
    "ch3a_gain_switch",
];

/// One fixture row: identifier plus the 24 numeric columns in `COLUMNS` order.
pub struct Row {
    pub id: &'static str,
    pub values: [Option<f64>; 24],
}

impl Row {
    /// Distinct, recognisable values: channel n, slot k → n + k/100.
    pub fn patterned(id: &'static str, bias: f64) -> Self {
        let mut values = [None; 24];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = Some(bias + (i / 8 + 1) as f64 + (i % 8) as f64 / 100.0);
        }
        Self { id, values }
    }

    pub fn m02() -> Self {
        let mut row = Self::patterned("m02", 0.0);
        row.values[0] = Some(0.1234);
        row.values[1] = Some(0.5678);
        row.values[2] = Some(0.9012);
        row.values[6] = Some(40.0);
        row.values[7] = Some(500.0);
        row.values[22] = Some(39.5);
        row.values[23] = Some(496.0);
        row
    }

    pub fn with_null(mut self, column: &str) -> Self {
        let index = COLUMNS.iter().position(|c| *c == column).expect("known column") - 1;
        self.values[index] = None;
        self
    }
}

/// Temp directory holding `avhrr.sqlite`.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("avhrr.sqlite")
    }

    /// Create a view table and fill it, rows inserted in the given order.
    pub fn with_view(self, view: &str, rows: &[Row]) -> Self {
        let conn = Connection::open(self.db_path()).expect("open DB");
        let defs = COLUMNS
            .iter()
            .map(|c| {
                if *c == "id_patmos" {
                    format!("{c} TEXT")
                } else {
                    format!("{c} REAL")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute_batch(&format!("CREATE TABLE \"{view}\" ({defs});"))
            .expect("create view table");

        let placeholders = (1..=COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO \"{view}\" VALUES ({placeholders})");
        for row in rows {
            let mut values: Vec<rusqlite::types::Value> = vec![row.id.to_string().into()];
            values.extend(row.values.iter().map(|v| match v {
                Some(v) => rusqlite::types::Value::Real(*v),
                None => rusqlite::types::Value::Null,
            }));
            conn.execute(&sql, params_from_iter(values))
                .expect("insert row");
        }
        drop(conn);
        self
    }

    /// The usual two-vintage store.
    pub fn standard() -> Self {
        Self::new()
            .with_view(
                "patmos.2013",
                &[
                    Row::patterned("n19", 0.5),
                    Row::m02(),
                    Row::patterned("n15", 0.25),
                ],
            )
            .with_view("patmos.2017", &[Row::m02(), Row::patterned("m01", 1.0)])
    }
}
