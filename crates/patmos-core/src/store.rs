//! Read-only connection to the coefficient store (`avhrr.sqlite`).

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, StorageError};

/// Open handle on the coefficient store.
///
/// The connection is released when the handle is dropped; [`CoeffStore::close`]
/// does the same and reports a failing close.
#[derive(Debug)]
pub struct CoeffStore {
    conn: Connection,
    path: PathBuf,
}

impl CoeffStore {
    /// Open the store file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StorageError::StoreNotFound(path.to_path_buf()).into());
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            StorageError::Database(format!("cannot open {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "opened coefficient store");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Resolve the location from configuration and open it.
    pub fn open_configured(config: &Config, override_dir: Option<&Path>) -> Result<Self> {
        let path = config.resolve_store_path(override_dir)?;
        Self::open(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| StorageError::Database(format!("closing store: {e}")))?;
        debug!(path = %path.display(), "closed coefficient store");
        Ok(())
    }
}

/// Quote a view name as an SQL identifier.
///
/// Views look like `patmos.2013`, so they always need quoting.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
