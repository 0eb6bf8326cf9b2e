//! PATMOS coefficient model and store lookups.
//!
//! A view is one table of the store (`"patmos.2013"`, `"patmos.2017"`), one
//! row per satellite keyed by `id_patmos`. Coefficients are fetched in the
//! grouped lookups the legacy readers expect: one for the dark-count/gain
//! switch pairs of all channels, then one per channel for its six gain
//! values.

use std::fmt;

use rusqlite::OptionalExtension;
use rusqlite::types::Value;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result, StorageError};
use crate::store::{CoeffStore, quote_identifier};

/// Identifier column shared by every view
pub const ID_COLUMN: &str = "id_patmos";

/// Dark count and gain switch columns, fetched in one lookup.
pub const SWITCH_COLUMNS: [&str; 6] = [
    "ch1_c0",
    "ch1_gain_switch",
    "ch2_c0",
    "ch2_gain_switch",
    "ch3a_c0",
    "ch3a_gain_switch",
];

/// A dataset view (calibration epoch) inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct View(String);

impl View {
    pub const PATMOS_2013: &'static str = "patmos.2013";
    pub const PATMOS_2017: &'static str = "patmos.2017";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `patmos.<year>`
    #[must_use]
    pub fn epoch(year: u16) -> Self {
        Self(format!("patmos.{year}"))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for View {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// AVHRR reflective channels carrying dual-gain coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3a,
}

impl Channel {
    /// Output order of the coefficient block
    pub const ALL: [Self; 3] = [Self::Ch1, Self::Ch2, Self::Ch3a];

    /// Column prefix and annotation name
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Ch1 => "ch1",
            Self::Ch2 => "ch2",
            Self::Ch3a => "ch3a",
        }
    }

    /// Position of this channel's pair inside [`SWITCH_COLUMNS`]
    const fn switch_offset(self) -> usize {
        match self {
            Self::Ch1 => 0,
            Self::Ch2 => 2,
            Self::Ch3a => 4,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Amplification mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gain {
    Low,
    High,
}

impl Gain {
    pub const ALL: [Self; 2] = [Self::Low, Self::High];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

/// `<channel>_<gain>_gain_s0..s2`
#[must_use]
pub fn triple_columns(channel: Channel, gain: Gain) -> [String; 3] {
    let base = format!("{}_{}_gain", channel.prefix(), gain.label());
    [format!("{base}_s0"), format!("{base}_s1"), format!("{base}_s2")]
}

/// Low triple then high triple for one channel
#[must_use]
pub fn gain_columns(channel: Channel) -> Vec<String> {
    Gain::ALL
        .iter()
        .flat_map(|gain| triple_columns(channel, *gain))
        .collect()
}

/// Coefficients of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelCoefficients {
    pub low: [f64; 3],
    pub high: [f64; 3],
    /// `<ch>_c0`
    pub dark_count: f64,
    /// `<ch>_gain_switch`
    pub gain_switch: f64,
}

impl ChannelCoefficients {
    #[must_use]
    pub fn triple(&self, gain: Gain) -> &[f64; 3] {
        match gain {
            Gain::Low => &self.low,
            Gain::High => &self.high,
        }
    }

    /// The pair in store column order: dark count, then gain switch.
    #[must_use]
    pub fn switch_pair(&self) -> [f64; 2] {
        [self.dark_count, self.gain_switch]
    }
}

/// Full coefficient record for one satellite in one view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteCoefficients {
    pub id: String,
    pub view: View,
    pub ch1: ChannelCoefficients,
    pub ch2: ChannelCoefficients,
    pub ch3a: ChannelCoefficients,
}

impl SatelliteCoefficients {
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &ChannelCoefficients {
        match channel {
            Channel::Ch1 => &self.ch1,
            Channel::Ch2 => &self.ch2,
            Channel::Ch3a => &self.ch3a,
        }
    }
}

/// Satellite identifiers of a view, in the table's row order.
pub fn list_satellite_ids(store: &CoeffStore, view: &View) -> Result<Vec<String>> {
    let sql = format!("SELECT {ID_COLUMN} FROM {}", quote_identifier(view.name()));
    let mut stmt = store.conn().prepare(&sql)?;
    let ids = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(view = %view, count = ids.len(), "listed satellite ids");
    Ok(ids)
}

/// Column names of a view, in table order.
pub fn list_columns(store: &CoeffStore, view: &View) -> Result<Vec<String>> {
    let sql = format!("SELECT * FROM {}", quote_identifier(view.name()));
    let stmt = store.conn().prepare(&sql)?;
    Ok(stmt.column_names().into_iter().map(str::to_string).collect())
}

/// Fetch named numeric columns of one satellite's row.
///
/// Zero matching rows is `RecordNotFound`; a NULL or non-numeric cell is
/// `IncompleteRecord`. Integers are widened to `f64`.
pub fn lookup<S: AsRef<str>>(
    store: &CoeffStore,
    view: &View,
    id: &str,
    columns: &[S],
) -> Result<Vec<f64>> {
    let column_list = columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(",");
    let sql = format!(
        "SELECT {column_list} FROM {} WHERE {ID_COLUMN} = ?1",
        quote_identifier(view.name())
    );

    let row = store
        .conn()
        .query_row(&sql, [id], |row| {
            (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .optional()?;

    let Some(values) = row else {
        return Err(StorageError::RecordNotFound {
            view: view.name().to_string(),
            id: id.to_string(),
        }
        .into());
    };

    values
        .into_iter()
        .zip(columns)
        .map(|(value, column)| match value {
            Value::Real(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            _ => Err(Error::from(StorageError::IncompleteRecord {
                view: view.name().to_string(),
                id: id.to_string(),
                column: column.as_ref().to_string(),
            })),
        })
        .collect()
}

/// One gain triple, fetched on its own.
pub fn read_triple(
    store: &CoeffStore,
    view: &View,
    id: &str,
    channel: Channel,
    gain: Gain,
) -> Result<[f64; 3]> {
    let values = lookup(store, view, id, &triple_columns(channel, gain))?;
    Ok([values[0], values[1], values[2]])
}

/// Read the full record with four grouped lookups.
pub fn read_coefficients(
    store: &CoeffStore,
    view: &View,
    id: &str,
) -> Result<SatelliteCoefficients> {
    let switches = lookup(store, view, id, &SWITCH_COLUMNS)?;

    let read_channel = |channel: Channel| -> Result<ChannelCoefficients> {
        let gains = lookup(store, view, id, &gain_columns(channel))?;
        let offset = channel.switch_offset();
        Ok(ChannelCoefficients {
            low: [gains[0], gains[1], gains[2]],
            high: [gains[3], gains[4], gains[5]],
            dark_count: switches[offset],
            gain_switch: switches[offset + 1],
        })
    };

    let record = SatelliteCoefficients {
        id: id.to_string(),
        view: view.clone(),
        ch1: read_channel(Channel::Ch1)?,
        ch2: read_channel(Channel::Ch2)?,
        ch3a: read_channel(Channel::Ch3a)?,
    };
    debug!(view = %view, sat_id = id, "read coefficients");
    Ok(record)
}
