//! Handle arena.
//!
//! Every environment, connection, statement and descriptor lives in the
//! [`Driver`] and is addressed by an opaque [`Handle`]. Children refer to
//! their parent by handle; freeing a handle frees its children first.

use crate::connection::Connection;
use crate::constants::SQL_DESC_ALLOC_USER;
use crate::descriptor::{Descriptor, DescriptorRole, SharedDescriptor};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::statement::Statement;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Opaque handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Wrap a raw handle value.
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    /// Raw handle value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kind of object a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Environment,
    Connection,
    Statement,
    Descriptor,
}

/// `SQLFreeStmt` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeStmtOption {
    /// Close the cursor, discarding pending results.
    Close,
    /// Free the statement.
    Drop,
    /// Unbind all columns.
    Unbind,
    /// Unbind all parameters.
    ResetParams,
}

impl FreeStmtOption {
    /// Map a raw `SQL_CLOSE` / `SQL_DROP` / `SQL_UNBIND` / `SQL_RESET_PARAMS` value.
    pub fn from_raw(option: u16) -> Result<Self> {
        match option {
            0 => Ok(FreeStmtOption::Close),
            1 => Ok(FreeStmtOption::Drop),
            2 => Ok(FreeStmtOption::Unbind),
            3 => Ok(FreeStmtOption::ResetParams),
            _ => Err(Error::UnknownAttribute { id: option as i32 }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DescriptorOwner {
    User { connection: Handle },
    Implicit { statement: Handle, role: DescriptorRole },
}

#[derive(Debug)]
struct DescriptorEntry {
    owner: DescriptorOwner,
    diagnostics: Diagnostics,
}

/// Owner of all handles.
#[derive(Default)]
pub struct Driver {
    next_handle: u64,
    environments: HashMap<Handle, Environment>,
    connections: HashMap<Handle, Connection>,
    statements: HashMap<Handle, Statement>,
    descriptors: HashMap<Handle, DescriptorEntry>,
}

impl Driver {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> Handle {
        self.next_handle += 1;
        Handle(self.next_handle)
    }

    /// Kind of a live handle.
    pub fn handle_kind(&self, handle: Handle) -> Option<HandleKind> {
        if self.environments.contains_key(&handle) {
            Some(HandleKind::Environment)
        } else if self.connections.contains_key(&handle) {
            Some(HandleKind::Connection)
        } else if self.statements.contains_key(&handle) {
            Some(HandleKind::Statement)
        } else if self.descriptors.contains_key(&handle) {
            Some(HandleKind::Descriptor)
        } else {
            None
        }
    }

    /// Allocate an environment.
    pub fn alloc_environment(&mut self) -> Handle {
        let handle = self.next_handle();
        self.environments.insert(handle, Environment::new());
        debug!(%handle, "Allocated environment");
        handle
    }

    /// Allocate a connection in `env`.
    pub fn alloc_connection(&mut self, env: Handle) -> Result<Handle> {
        let handle = self.next_handle();
        let environment = self
            .environments
            .get_mut(&env)
            .ok_or(Error::InvalidHandle { handle: env.0 })?;
        environment.add_connection(handle);
        self.connections.insert(handle, Connection::new(env));
        debug!(%handle, parent = %env, "Allocated connection");
        Ok(handle)
    }

    /// Allocate a statement on `conn`, together with its implicit descriptors.
    pub fn alloc_statement(&mut self, conn: Handle) -> Result<Handle> {
        if !self.connections.contains_key(&conn) {
            return Err(Error::InvalidHandle { handle: conn.0 });
        }

        let handle = self.next_handle();
        let implicit_handles = DescriptorRole::ALL.map(|_| self.next_handle());
        for role in DescriptorRole::ALL {
            self.descriptors.insert(
                implicit_handles[role.index()],
                DescriptorEntry {
                    owner: DescriptorOwner::Implicit {
                        statement: handle,
                        role,
                    },
                    diagnostics: Diagnostics::new(),
                },
            );
        }

        self.statements
            .insert(handle, Statement::new(conn, implicit_handles));
        if let Some(connection) = self.connections.get_mut(&conn) {
            connection.add_statement(handle);
        }
        debug!(%handle, parent = %conn, "Allocated statement");
        Ok(handle)
    }

    /// Allocate an application descriptor on `conn`.
    pub fn alloc_descriptor(&mut self, conn: Handle) -> Result<Handle> {
        let handle = self.next_handle();
        let connection = self
            .connections
            .get_mut(&conn)
            .ok_or(Error::InvalidHandle { handle: conn.0 })?;
        connection.add_descriptor(
            handle,
            Descriptor::new_shared(DescriptorRole::AppRow, SQL_DESC_ALLOC_USER),
        );
        self.descriptors.insert(
            handle,
            DescriptorEntry {
                owner: DescriptorOwner::User { connection: conn },
                diagnostics: Diagnostics::new(),
            },
        );
        debug!(%handle, parent = %conn, "Allocated descriptor");
        Ok(handle)
    }

    /// Free a handle and everything it owns.
    ///
    /// Implicit descriptors are freed with their statement only.
    pub fn free_handle(&mut self, handle: Handle) -> Result<()> {
        let result = match self.handle_kind(handle) {
            Some(HandleKind::Environment) => {
                self.free_environment(handle);
                Ok(())
            }
            Some(HandleKind::Connection) => {
                self.free_connection(handle);
                Ok(())
            }
            Some(HandleKind::Statement) => {
                self.free_statement_handle(handle);
                Ok(())
            }
            Some(HandleKind::Descriptor) => self.free_descriptor(handle),
            None => Err(Error::InvalidHandle { handle: handle.0 }),
        };
        if let Err(e) = &result {
            self.record_error(handle, e);
        }
        result
    }

    fn free_environment(&mut self, handle: Handle) {
        if let Some(env) = self.environments.remove(&handle) {
            for conn in env.connections() {
                self.free_connection(conn);
            }
            debug!(%handle, "Freed environment");
        }
    }

    fn free_connection(&mut self, handle: Handle) {
        let Some(conn) = self.connections.get(&handle) else {
            return;
        };
        let statements: Vec<Handle> = conn.statements().collect();
        let descriptors: Vec<Handle> = conn.descriptors().collect();
        let env = conn.environment();

        for stmt in statements {
            self.free_statement_handle(stmt);
        }
        for desc in descriptors {
            self.descriptors.remove(&desc);
        }
        if let Some(environment) = self.environments.get_mut(&env) {
            environment.remove_connection(handle);
        }
        self.connections.remove(&handle);
        debug!(%handle, "Freed connection");
    }

    fn free_statement_handle(&mut self, handle: Handle) {
        let Some(mut stmt) = self.statements.remove(&handle) else {
            return;
        };
        for desc in stmt.implicit_descriptor_handles() {
            self.descriptors.remove(&desc);
        }
        if let Some(conn) = self.connections.get_mut(&stmt.connection()) {
            stmt.close_cursor(conn);
            conn.remove_statement(handle);
        }
        debug!(%handle, "Freed statement");
    }

    fn free_descriptor(&mut self, handle: Handle) -> Result<()> {
        let owner = match self.descriptors.get(&handle) {
            Some(entry) => entry.owner,
            None => return Err(Error::InvalidHandle { handle: handle.0 }),
        };
        match owner {
            DescriptorOwner::Implicit { .. } => Err(Error::ImplicitDescriptorFree),
            DescriptorOwner::User { connection } => {
                if let Some(conn) = self.connections.get_mut(&connection) {
                    conn.remove_descriptor(handle);
                }
                self.descriptors.remove(&handle);
                debug!(%handle, "Freed descriptor");
                Ok(())
            }
        }
    }

    /// `SQLFreeStmt`.
    pub fn free_statement(&mut self, handle: Handle, option: FreeStmtOption) -> Result<()> {
        match option {
            FreeStmtOption::Drop => self.free_handle(handle),
            FreeStmtOption::Close => self.with_statement(handle, |stmt, conn| {
                stmt.close_cursor(conn);
                Ok(())
            }),
            FreeStmtOption::Unbind => self.with_statement(handle, |stmt, _| {
                stmt.reset_col_bindings();
                Ok(())
            }),
            FreeStmtOption::ResetParams => self.with_statement(handle, |stmt, _| {
                stmt.reset_param_bindings();
                Ok(())
            }),
        }
    }

    fn record_error(&mut self, handle: Handle, err: &Error) {
        if let Some(diag) = self.diagnostics_mut(handle) {
            diag.push_error(err);
        }
    }

    fn diagnostics_mut(&mut self, handle: Handle) -> Option<&mut Diagnostics> {
        if let Some(env) = self.environments.get_mut(&handle) {
            Some(&mut env.diagnostics)
        } else if let Some(conn) = self.connections.get_mut(&handle) {
            Some(&mut conn.diagnostics)
        } else if let Some(stmt) = self.statements.get_mut(&handle) {
            Some(&mut stmt.diagnostics)
        } else {
            self.descriptors
                .get_mut(&handle)
                .map(|entry| &mut entry.diagnostics)
        }
    }

    /// Diagnostic area of a handle.
    pub fn diagnostics(&self, handle: Handle) -> Option<&Diagnostics> {
        if let Some(env) = self.environments.get(&handle) {
            Some(&env.diagnostics)
        } else if let Some(conn) = self.connections.get(&handle) {
            Some(&conn.diagnostics)
        } else if let Some(stmt) = self.statements.get(&handle) {
            Some(&stmt.diagnostics)
        } else {
            self.descriptors.get(&handle).map(|entry| &entry.diagnostics)
        }
    }

    /// Run `f` on an environment, recording a failure in its diagnostics.
    pub fn with_environment<T>(
        &mut self,
        handle: Handle,
        f: impl FnOnce(&mut Environment) -> Result<T>,
    ) -> Result<T> {
        let env = self
            .environments
            .get_mut(&handle)
            .ok_or(Error::InvalidHandle { handle: handle.0 })?;
        env.diagnostics.clear_records();
        let result = f(env);
        if let Err(e) = &result {
            env.diagnostics.push_error(e);
        }
        result
    }

    /// Run `f` on a connection, recording a failure in its diagnostics.
    pub fn with_connection<T>(
        &mut self,
        handle: Handle,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let conn = self
            .connections
            .get_mut(&handle)
            .ok_or(Error::InvalidHandle { handle: handle.0 })?;
        conn.diagnostics.clear_records();
        let result = f(conn);
        if let Err(e) = &result {
            conn.diagnostics.push_error(e);
        }
        result
    }

    /// Run `f` on a statement and its connection, recording a failure in
    /// the statement's diagnostics.
    pub fn with_statement<T>(
        &mut self,
        handle: Handle,
        f: impl FnOnce(&mut Statement, &mut Connection) -> Result<T>,
    ) -> Result<T> {
        let stmt = self
            .statements
            .get_mut(&handle)
            .ok_or(Error::InvalidHandle { handle: handle.0 })?;
        let conn = self
            .connections
            .get_mut(&stmt.connection())
            .ok_or(Error::InvalidHandle {
                handle: stmt.connection().0,
            })?;
        stmt.diagnostics.clear_records();
        let result = f(stmt, conn);
        if let Err(e) = &result {
            stmt.diagnostics.push_error(e);
        }
        result
    }

    fn shared_descriptor(&self, handle: Handle) -> Result<SharedDescriptor> {
        let invalid = Error::InvalidHandle { handle: handle.0 };
        let entry = self.descriptors.get(&handle).ok_or(invalid)?;
        match entry.owner {
            DescriptorOwner::User { connection } => self
                .connections
                .get(&connection)
                .and_then(|conn| conn.descriptor(handle))
                .cloned()
                .ok_or(Error::InvalidHandle { handle: handle.0 }),
            DescriptorOwner::Implicit { statement, role } => self
                .statements
                .get(&statement)
                .map(|stmt| stmt.implicit_descriptor(role))
                .ok_or(Error::InvalidHandle { handle: handle.0 }),
        }
    }

    /// Run `f` on a descriptor, recording a failure in its diagnostics.
    pub fn with_descriptor<T>(
        &mut self,
        handle: Handle,
        f: impl FnOnce(&mut Descriptor) -> Result<T>,
    ) -> Result<T> {
        let descriptor = self.shared_descriptor(handle)?;
        let result = f(&mut *descriptor.borrow_mut());
        if let Some(entry) = self.descriptors.get_mut(&handle) {
            entry.diagnostics.clear_records();
            if let Err(e) = &result {
                entry.diagnostics.push_error(e);
            }
        }
        result
    }

    /// Handle of the descriptor a statement currently uses for `role`.
    pub fn statement_descriptor(&self, stmt: Handle, role: DescriptorRole) -> Result<Handle> {
        self.statements
            .get(&stmt)
            .map(|s| s.effective_descriptor_handle(role))
            .ok_or(Error::InvalidHandle { handle: stmt.0 })
    }

    /// Make a statement use `desc` for `role`; `None` restores the implicit descriptor.
    ///
    /// Only application-allocated descriptors of the statement's connection,
    /// or the statement's own implicit descriptor for that role, are accepted.
    pub fn bind_explicit_descriptor(
        &mut self,
        stmt: Handle,
        role: DescriptorRole,
        desc: Option<Handle>,
    ) -> Result<()> {
        let shared = match desc {
            None => None,
            Some(desc) => {
                let owner = self
                    .descriptors
                    .get(&desc)
                    .map(|entry| entry.owner)
                    .ok_or(Error::InvalidHandle { handle: desc.0 })?;
                let statement = self
                    .statements
                    .get(&stmt)
                    .ok_or(Error::InvalidHandle { handle: stmt.0 })?;
                match owner {
                    DescriptorOwner::Implicit {
                        statement: owner_stmt,
                        role: owner_role,
                    } if owner_stmt == stmt && owner_role == role => None,
                    DescriptorOwner::User { connection } if connection == statement.connection() => {
                        Some((desc, self.shared_descriptor(desc)?))
                    }
                    _ => return Err(Error::InvalidHandle { handle: desc.0 }),
                }
            }
        };

        self.with_statement(stmt, |statement, _| {
            statement.set_explicit_descriptor(role, shared.as_ref().map(|(h, d)| (*h, d)));
            Ok(())
        })
    }
}
