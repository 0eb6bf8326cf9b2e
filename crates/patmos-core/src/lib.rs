//! patmos-core: PATMOS AVHRR calibration coefficients
//!
//! Reads per-satellite gain and dark-count coefficients from the
//! `avhrr.sqlite` store and renders them in the fixed namelist layout
//! consumed by legacy calibration code.
//!
//! # Architecture
//!
//! ```text
//! Config → CoeffStore (read-only SQLite) → coeffs lookups → render → stdout
//! ```
//!
//! # Modules
//!
//! - `config`: store location (`DB_DIR` / `VTT_DATA` / TOML) and defaults
//! - `store`: read-only connection handle
//! - `coeffs`: views, channels and the grouped row lookups
//! - `render`: `%6.4f` formatting and block layout
//! - `logging`: tracing subscriber set-up
//! - `error`: error taxonomy with remediation hints

#![forbid(unsafe_code)]

pub mod coeffs;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod store;

pub use coeffs::{
    Channel, ChannelCoefficients, Gain, SatelliteCoefficients, View, list_columns,
    list_satellite_ids, read_coefficients,
};
pub use config::Config;
pub use error::{ConfigError, Error, Result, StorageError};
pub use render::{dump_view, render, render_block, render_gain_lines};
pub use store::CoeffStore;
