//! Environment handle.

use crate::diagnostics::Diagnostics;
use crate::handles::Handle;
use std::collections::BTreeSet;

/// `SQL_OV_ODBC3_80`.
pub const ODBC_VERSION_3_80: i32 = 380;

/// Root of the handle tree; owns connections by handle.
#[derive(Debug)]
pub struct Environment {
    /// Requested `SQL_ATTR_ODBC_VERSION`.
    pub odbc_version: i32,
    /// `SQL_ATTR_METADATA_ID`.
    pub metadata_id: bool,
    /// Diagnostic area.
    pub diagnostics: Diagnostics,
    connections: BTreeSet<Handle>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            odbc_version: ODBC_VERSION_3_80,
            metadata_id: false,
            diagnostics: Diagnostics::new(),
            connections: BTreeSet::new(),
        }
    }
}

impl Environment {
    /// Create an environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections allocated in this environment.
    pub fn connections(&self) -> impl Iterator<Item = Handle> + '_ {
        self.connections.iter().copied()
    }

    pub(crate) fn add_connection(&mut self, handle: Handle) {
        self.connections.insert(handle);
    }

    pub(crate) fn remove_connection(&mut self, handle: Handle) {
        self.connections.remove(&handle);
    }
}
