//! Statement: prepare, bind, execute and iterate.
//!
//! A statement moves through these states:
//!
//! ```text
//! Idle --prepare--> Prepared --execute--> HasResultSet --rows--> Exhausted
//!   ^                                          |                    |
//!   +--------------close_cursor----------------+---next param set---+
//! ```
//!
//! Each parameter set of a batch is sent as its own request and produces one
//! result set; [`Statement::advance_to_next_result_set`] moves to the next set.

pub mod decode;
pub mod params;

pub use decode::{SqlDate, SqlTimestamp};
pub use params::{BindingInfo, ParamInfo};

use crate::attributes::{AttrValue, Attributes, FromAttr};
use crate::connection::Connection;
use crate::constants::*;
use crate::descriptor::{DescField, Descriptor, DescriptorRecord, DescriptorRole, SharedDescriptor};
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::escape;
use crate::handles::Handle;
use crate::result_set::{ResultMutator, ResultSet};
use crate::transport::HttpRequest;
use crate::types::sql_type::{
    code_of, interval_code_has_second_component, is_binary_type, is_character_type,
    is_concise_interval_type, is_input_param, is_stream_param,
};
use crate::types::{Column, Row};
use std::cell::RefCell;
use std::ffi::c_void;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Statement attributes (`SQL_ATTR_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtAttr {
    NoScan,
    ParamsetSize,
    ParamBindType,
    ParamBindOffsetPtr,
    ParamsProcessedPtr,
    RowArraySize,
    RowBindType,
}

impl StmtAttr {
    /// Map a raw `SQL_ATTR_*` identifier.
    pub fn from_raw(id: i32) -> Result<Self> {
        let attr = match id {
            2 => StmtAttr::NoScan,
            22 => StmtAttr::ParamsetSize,
            18 => StmtAttr::ParamBindType,
            17 => StmtAttr::ParamBindOffsetPtr,
            21 => StmtAttr::ParamsProcessedPtr,
            27 => StmtAttr::RowArraySize,
            5 => StmtAttr::RowBindType,
            _ => return Err(Error::UnknownAttribute { id }),
        };
        Ok(attr)
    }

    /// Descriptor header field backing this attribute, if any.
    pub fn descriptor_field(self) -> Option<(DescriptorRole, DescField)> {
        match self {
            StmtAttr::NoScan => None,
            StmtAttr::ParamsetSize => Some((DescriptorRole::AppParam, DescField::ArraySize)),
            StmtAttr::ParamBindType => Some((DescriptorRole::AppParam, DescField::BindType)),
            StmtAttr::ParamBindOffsetPtr => {
                Some((DescriptorRole::AppParam, DescField::BindOffsetPtr))
            }
            StmtAttr::ParamsProcessedPtr => {
                Some((DescriptorRole::ImpParam, DescField::RowsProcessedPtr))
            }
            StmtAttr::RowArraySize => Some((DescriptorRole::AppRow, DescField::ArraySize)),
            StmtAttr::RowBindType => Some((DescriptorRole::AppRow, DescField::BindType)),
        }
    }
}

/// Buffers and declared type of one bound parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamBinding {
    /// Parameter direction.
    pub io_type: i16,
    /// C type of the buffer.
    pub c_type: i16,
    /// Declared SQL type.
    pub sql_type: i16,
    /// Declared column size.
    pub column_size: u64,
    /// Declared decimal digits.
    pub decimal_digits: i16,
    /// Value buffer (array base for batches).
    pub value: *mut c_void,
    /// Capacity of one value element in bytes.
    pub buffer_length: u64,
    /// Length/indicator buffer.
    pub len_ind: *mut i64,
}

impl Default for ParamBinding {
    fn default() -> Self {
        Self {
            io_type: SQL_PARAM_INPUT,
            c_type: SQL_C_DEFAULT,
            sql_type: SQL_UNKNOWN_TYPE,
            column_size: 0,
            decimal_digits: 0,
            value: std::ptr::null_mut(),
            buffer_length: 0,
            len_ind: std::ptr::null_mut(),
        }
    }
}

#[derive(Debug)]
struct ExplicitDescriptor {
    handle: Handle,
    descriptor: Weak<RefCell<Descriptor>>,
}

#[derive(Debug)]
struct DescriptorSlot {
    implicit: SharedDescriptor,
    implicit_handle: Handle,
    explicit: Option<ExplicitDescriptor>,
}

impl DescriptorSlot {
    fn effective(&self) -> SharedDescriptor {
        self.explicit
            .as_ref()
            .and_then(|e| e.descriptor.upgrade())
            .unwrap_or_else(|| Rc::clone(&self.implicit))
    }

    fn effective_handle(&self) -> Handle {
        match &self.explicit {
            Some(e) if e.descriptor.strong_count() > 0 => e.handle,
            _ => self.implicit_handle,
        }
    }
}

/// A statement handle.
pub struct Statement {
    connection: Handle,
    attrs: Attributes<StmtAttr>,
    /// Diagnostic area.
    pub diagnostics: Diagnostics,
    descriptors: [DescriptorSlot; 4],
    query: String,
    prepared_query: String,
    parameters: Vec<ParamInfo>,
    next_param_set: u64,
    result_set: Option<ResultSet>,
}

impl Statement {
    /// Create a statement with implicit descriptors registered under
    /// `implicit_handles`, indexed by [`DescriptorRole::index`].
    pub fn new(connection: Handle, implicit_handles: [Handle; 4]) -> Self {
        let descriptors = DescriptorRole::ALL.map(|role| DescriptorSlot {
            implicit: Descriptor::new_shared(role, SQL_DESC_ALLOC_AUTO),
            implicit_handle: implicit_handles[role.index()],
            explicit: None,
        });
        Self {
            connection,
            attrs: Attributes::new(),
            diagnostics: Diagnostics::new(),
            descriptors,
            query: String::new(),
            prepared_query: String::new(),
            parameters: Vec::new(),
            next_param_set: 0,
            result_set: None,
        }
    }

    /// Owning connection.
    pub fn connection(&self) -> Handle {
        self.connection
    }

    /// Query text as given to [`Statement::prepare`].
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query text after escape and placeholder rewriting.
    pub fn prepared_query(&self) -> &str {
        &self.prepared_query
    }

    /// Parameters discovered by the last prepare.
    pub fn parameters(&self) -> &[ParamInfo] {
        &self.parameters
    }

    /// Explicit descriptor for `role` while it is alive, else the implicit one.
    pub fn effective_descriptor(&self, role: DescriptorRole) -> SharedDescriptor {
        self.descriptors[role.index()].effective()
    }

    /// Handle of the effective descriptor for `role`.
    pub fn effective_descriptor_handle(&self, role: DescriptorRole) -> Handle {
        self.descriptors[role.index()].effective_handle()
    }

    /// Statement-owned descriptor for `role`.
    pub fn implicit_descriptor(&self, role: DescriptorRole) -> SharedDescriptor {
        Rc::clone(&self.descriptors[role.index()].implicit)
    }

    pub(crate) fn implicit_descriptor_handles(&self) -> [Handle; 4] {
        DescriptorRole::ALL.map(|role| self.descriptors[role.index()].implicit_handle)
    }

    /// Substitute an externally owned descriptor, or restore the implicit one with `None`.
    pub fn set_explicit_descriptor(
        &mut self,
        role: DescriptorRole,
        descriptor: Option<(Handle, &SharedDescriptor)>,
    ) {
        self.descriptors[role.index()].explicit =
            descriptor.map(|(handle, desc)| ExplicitDescriptor {
                handle,
                descriptor: Rc::downgrade(desc),
            });
    }

    /// Set a statement attribute.
    pub fn set_attr(&mut self, attr: StmtAttr, value: impl Into<AttrValue>) -> Result<()> {
        match attr.descriptor_field() {
            Some((role, field)) => self
                .effective_descriptor(role)
                .borrow_mut()
                .set_attr(field, value),
            None => {
                self.attrs.insert(attr, value.into());
                Ok(())
            }
        }
    }

    /// Read a statement attribute, falling back to `default`.
    pub fn get_attr<T: FromAttr>(&self, attr: StmtAttr, default: T) -> Result<T> {
        match attr.descriptor_field() {
            Some((role, field)) => self.effective_descriptor(role).borrow().get_or(field, default),
            None => self.attrs.get_or(attr, default),
        }
    }

    /// Bind a parameter buffer (1-based `number`).
    pub fn bind_parameter(&mut self, number: usize, binding: ParamBinding) -> Result<()> {
        if number == 0 {
            return Err(Error::InvalidDescriptorIndex { index: number });
        }

        {
            let apd = self.effective_descriptor(DescriptorRole::AppParam);
            let mut apd = apd.borrow_mut();
            let rec = apd.record_mut(number, DescriptorRole::AppParam)?;
            rec.set_attr(DescField::ConciseType, binding.c_type)?;
            rec.set_attr(DescField::OctetLength, binding.buffer_length)?;
            rec.set_attr(DescField::OctetLengthPtr, binding.len_ind)?;
            rec.set_attr(DescField::IndicatorPtr, binding.len_ind)?;
            rec.set_attr(DescField::DataPtr, binding.value)?;
        }

        let ipd = self.effective_descriptor(DescriptorRole::ImpParam);
        let mut ipd = ipd.borrow_mut();
        let rec = ipd.record_mut(number, DescriptorRole::ImpParam)?;
        rec.set_attr(DescField::ParameterType, binding.io_type)?;
        rec.set_attr(DescField::ConciseType, binding.sql_type)?;
        set_declared_size(rec, binding.sql_type, binding.column_size, binding.decimal_digits)
    }

    /// Prepare a query: close any open cursor, rewrite escapes unless
    /// `NoScan` is on, and replace `?` placeholders.
    pub fn prepare(&mut self, conn: &mut Connection, query: &str) -> Result<()> {
        self.close_cursor(conn);
        self.query = query.to_string();

        let rewritten = if self.get_attr(StmtAttr::NoScan, SQL_NOSCAN_OFF)? == SQL_NOSCAN_ON {
            query.to_string()
        } else {
            escape::rewrite(query)
        };
        let (prepared, parameters) = params::extract_parameters(&rewritten);
        debug!(query = %prepared, parameters = parameters.len(), "Prepared query");

        self.prepared_query = prepared;
        self.parameters = parameters;
        Ok(())
    }

    /// Execute the prepared query with the first parameter set.
    pub fn execute(
        &mut self,
        conn: &mut Connection,
        mutator: Option<Box<dyn ResultMutator>>,
    ) -> Result<()> {
        self.set_params_processed(0)?;
        self.next_param_set = 0;
        self.request_next_pack_of_result_sets(conn, mutator)
    }

    /// Prepare and execute.
    pub fn execute_direct(
        &mut self,
        conn: &mut Connection,
        query: &str,
        mutator: Option<Box<dyn ResultMutator>>,
    ) -> Result<()> {
        self.prepare(conn, query)?;
        self.execute(conn, mutator)
    }

    fn set_params_processed(&self, value: u64) -> Result<()> {
        let ptr: *mut c_void = self
            .effective_descriptor(DescriptorRole::ImpParam)
            .borrow()
            .get_or(DescField::RowsProcessedPtr, std::ptr::null_mut())?;
        if !ptr.is_null() {
            // SAFETY: the application registered a SQLULEN output buffer.
            unsafe { (ptr as *mut u64).write_unaligned(value) };
        }
        Ok(())
    }

    fn request_next_pack_of_result_sets(
        &mut self,
        conn: &mut Connection,
        mutator: Option<Box<dyn ResultMutator>>,
    ) -> Result<()> {
        let param_set_count: u64 = self
            .effective_descriptor(DescriptorRole::AppParam)
            .borrow()
            .get_or(DescField::ArraySize, 1u64)?;
        if self.next_param_set >= param_set_count {
            return Ok(());
        }

        let bindings = self.params_binding_info(self.next_param_set)?;
        if bindings.len() < self.parameters.len() {
            return Err(Error::CountFieldIncorrect);
        }

        let mut uri = reqwest::Url::parse(&conn.params().url).map_err(|e| {
            Error::InvalidConnectString {
                message: format!("Invalid URL {}: {}", conn.params().url, e),
            }
        })?;
        {
            let mut query = uri.query_pairs_mut();
            query.append_pair("database", &conn.params().database);
            query.append_pair("default_format", "ODBCDriver2");
            for (param, binding) in self.parameters.iter().zip(&bindings) {
                if !is_input_param(binding.io_type) || is_stream_param(binding.io_type) {
                    return Err(Error::UnsupportedParamDirection {
                        io_type: binding.io_type,
                    });
                }
                let value = decode::read_value(binding)?;
                query.append_pair(&format!("param_{}", param.name), &value);
            }
        }

        let final_query = params::build_final_query(&self.prepared_query, &self.parameters, &bindings)?;

        self.diagnostics.reset_row_count();
        self.discard_result_set(conn);
        self.set_params_processed(self.next_param_set)?;

        let request = HttpRequest {
            uri,
            body: final_query,
            authorization: format!("Basic {}", conn.credentials_string()),
            user_agent: conn.user_agent(),
        };

        let retry_count = conn.retry_count();
        let transport = conn.transport_mut()?;
        let mut attempt = 1u32;
        let response = loop {
            match transport.send(&request) {
                Ok(response) => break response,
                Err(e) => {
                    transport.reset();
                    warn!(attempt, retry_count, error = %e, "HTTP request failed");
                    if attempt > retry_count {
                        return Err(Error::Io(e));
                    }
                    attempt += 1;
                }
            }
        };

        if response.status != 200 {
            let status = response.status;
            let body = response.into_text()?;
            warn!(status, body = %body, "Query failed");
            return Err(Error::HttpStatus { status, body });
        }

        self.result_set = Some(ResultSet::new(response.body, mutator)?);
        self.next_param_set += 1;
        Ok(())
    }

    /// Resolve the bound buffers of every parameter for parameter set `param_set`.
    pub fn params_binding_info(&self, param_set: u64) -> Result<Vec<BindingInfo>> {
        let apd = self.effective_descriptor(DescriptorRole::AppParam);
        let ipd = self.effective_descriptor(DescriptorRole::ImpParam);
        let apd = apd.borrow();
        let ipd = ipd.borrow();

        let apd_count = apd.record_count()?;
        let ipd_count = ipd.record_count()?;
        if apd_count > ipd_count {
            return Err(Error::CountFieldIncorrect);
        }

        let bind_type: u64 = apd.get_or(DescField::BindType, SQL_BIND_BY_COLUMN)?;
        let offset_ptr: *mut c_void = apd.get_or(DescField::BindOffsetPtr, std::ptr::null_mut())?;
        let offset = if offset_ptr.is_null() {
            0
        } else {
            // SAFETY: the application registered a SQLLEN offset buffer.
            unsafe { (offset_ptr as *const i64).read_unaligned() }
        };

        let k = param_set as i64;
        let empty = DescriptorRecord::new();
        let mut bindings = Vec::with_capacity(apd_count);

        for i in 1..=apd_count {
            let apd_rec = apd.record(i).unwrap_or(&empty);
            let ipd_rec = ipd.record(i).unwrap_or(&empty);

            let c_type = apd_rec.get_or(DescField::ConciseType, SQL_C_DEFAULT)?;
            let sql_type = ipd_rec.concise_type()?;
            let value_max_size: u64 = apd_rec.get_or(DescField::OctetLength, 0u64)?;

            let (value_stride, length_stride) = if bind_type > 0 {
                (bind_type as i64, bind_type as i64)
            } else {
                let element = if value_max_size > 0 {
                    value_max_size
                } else if c_type == SQL_C_DEFAULT {
                    decode::c_type_width(decode::default_c_type(sql_type))
                } else {
                    decode::c_type_width(c_type)
                };
                (element as i64, SQL_LEN_SIZE as i64)
            };

            let data_ptr = apd_rec.data_ptr()?;
            let size_ptr: *mut c_void = apd_rec.get_or(DescField::OctetLengthPtr, std::ptr::null_mut())?;
            let ind_ptr: *mut c_void = apd_rec.get_or(DescField::IndicatorPtr, std::ptr::null_mut())?;

            bindings.push(BindingInfo {
                io_type: ipd_rec.get_or(DescField::ParameterType, SQL_PARAM_INPUT)?,
                c_type,
                sql_type,
                column_size: ipd_rec.column_size()?.unwrap_or(0),
                decimal_digits: ipd_rec.decimal_digits()?.unwrap_or(0),
                value_max_size,
                value: decode::offset_ptr(data_ptr, k * value_stride + offset),
                value_size: decode::offset_ptr(size_ptr, k * length_stride + offset),
                indicator: decode::offset_ptr(ind_ptr, k * length_stride + offset),
            });
        }

        Ok(bindings)
    }

    /// Drop the current result set and request the one of the next parameter set.
    ///
    /// Returns whether a result set is available afterwards.
    pub fn advance_to_next_result_set(&mut self, conn: &mut Connection) -> Result<bool> {
        self.diagnostics.reset_row_count();
        let mutator = self
            .result_set
            .as_mut()
            .and_then(ResultSet::release_mutator);
        self.discard_result_set(conn);
        self.request_next_pack_of_result_sets(conn, mutator)?;
        Ok(self.has_result_set())
    }

    fn discard_result_set(&mut self, conn: &mut Connection) {
        if let Some(rs) = self.result_set.take() {
            if !rs.is_drained() {
                conn.reset_session();
            }
        }
    }

    /// Check if a result set is active.
    pub fn has_result_set(&self) -> bool {
        self.result_set.is_some()
    }

    /// Active result set.
    pub fn result_set(&self) -> Option<&ResultSet> {
        self.result_set.as_ref()
    }

    /// Number of columns of the active result set, 0 without one.
    pub fn num_columns(&self) -> usize {
        self.result_set.as_ref().map_or(0, ResultSet::num_columns)
    }

    /// Column metadata by 0-based index.
    pub fn column(&self, index: usize) -> Result<&Column> {
        let rs = self.result_set.as_ref().ok_or(Error::NoResultSet)?;
        rs.column_info()
            .get(index)
            .ok_or(Error::ColumnIndexOutOfBounds {
                index,
                count: rs.num_columns(),
            })
    }

    /// Check if a row is positioned.
    pub fn has_current_row(&self) -> bool {
        self.result_set.as_ref().is_some_and(ResultSet::has_current_row)
    }

    /// Positioned row.
    pub fn current_row(&self) -> Option<&Row> {
        self.result_set.as_ref().and_then(ResultSet::current_row)
    }

    /// 1-based number of the positioned row, 0 without one.
    pub fn current_row_num(&self) -> usize {
        self.result_set.as_ref().map_or(0, ResultSet::current_row_num)
    }

    /// Move to the next row; records the row count once the result set is exhausted.
    pub fn advance_to_next_row(&mut self) -> Result<bool> {
        let Some(rs) = self.result_set.as_mut() else {
            return Ok(false);
        };
        let advanced = rs.advance_to_next_row()?;
        if !advanced {
            self.diagnostics.row_count = rs.row_count() as i64;
        }
        Ok(advanced)
    }

    /// Close the cursor, forgetting the result set, parameters and query.
    pub fn close_cursor(&mut self, conn: &mut Connection) {
        self.discard_result_set(conn);
        self.parameters.clear();
        self.query.clear();
        self.prepared_query.clear();
    }

    /// Unbind all columns.
    pub fn reset_col_bindings(&mut self) {
        self.effective_descriptor(DescriptorRole::AppRow)
            .borrow_mut()
            .set_count(0);
    }

    /// Unbind all parameters.
    pub fn reset_param_bindings(&mut self) {
        self.effective_descriptor(DescriptorRole::AppParam)
            .borrow_mut()
            .set_count(0);
    }
}

fn set_declared_size(
    rec: &mut DescriptorRecord,
    sql_type: i16,
    column_size: u64,
    decimal_digits: i16,
) -> Result<()> {
    let precision = i16::try_from(column_size).unwrap_or(i16::MAX);
    match sql_type {
        _ if is_character_type(sql_type) || is_binary_type(sql_type) => {
            rec.set_attr(DescField::Length, column_size)
        }
        SQL_DECIMAL | SQL_NUMERIC => {
            rec.set_attr(DescField::Precision, precision)?;
            rec.set_attr(DescField::Scale, decimal_digits)
        }
        SQL_TYPE_TIME | SQL_TYPE_TIMESTAMP => rec.set_attr(DescField::Precision, decimal_digits),
        _ if is_concise_interval_type(sql_type)
            && interval_code_has_second_component(code_of(sql_type)) =>
        {
            rec.set_attr(DescField::Precision, decimal_digits)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> Statement {
        let handles = [1, 2, 3, 4].map(Handle::from_raw);
        Statement::new(Handle::from_raw(100), handles)
    }

    #[test]
    fn test_attrs_route_to_descriptors() {
        let mut stmt = statement();
        stmt.set_attr(StmtAttr::ParamsetSize, 3u64).unwrap();
        assert_eq!(
            stmt.implicit_descriptor(DescriptorRole::AppParam)
                .borrow()
                .get_or(DescField::ArraySize, 0u64)
                .unwrap(),
            3
        );
        stmt.set_attr(StmtAttr::NoScan, SQL_NOSCAN_ON).unwrap();
        assert_eq!(stmt.get_attr(StmtAttr::NoScan, SQL_NOSCAN_OFF).unwrap(), SQL_NOSCAN_ON);
    }

    #[test]
    fn test_effective_descriptor_falls_back() {
        let mut stmt = statement();
        let explicit = Descriptor::new_shared(DescriptorRole::AppParam, SQL_DESC_ALLOC_USER);
        stmt.set_explicit_descriptor(
            DescriptorRole::AppParam,
            Some((Handle::from_raw(50), &explicit)),
        );
        assert!(Rc::ptr_eq(&stmt.effective_descriptor(DescriptorRole::AppParam), &explicit));
        assert_eq!(
            stmt.effective_descriptor_handle(DescriptorRole::AppParam),
            Handle::from_raw(50)
        );

        drop(explicit);
        let implicit = stmt.implicit_descriptor(DescriptorRole::AppParam);
        assert!(Rc::ptr_eq(&stmt.effective_descriptor(DescriptorRole::AppParam), &implicit));
        assert_eq!(
            stmt.effective_descriptor_handle(DescriptorRole::AppParam),
            Handle::from_raw(2)
        );
    }

    #[test]
    fn test_binding_addresses_column_wise() {
        let mut stmt = statement();
        let values = [10i32, 20, 30];
        let lens = [0i64; 3];
        stmt.bind_parameter(
            1,
            ParamBinding {
                c_type: SQL_C_SLONG,
                sql_type: SQL_INTEGER,
                value: values.as_ptr() as *mut c_void,
                len_ind: lens.as_ptr() as *mut i64,
                ..Default::default()
            },
        )
        .unwrap();

        let b = stmt.params_binding_info(2).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].value as usize, values.as_ptr() as usize + 8);
        assert_eq!(b[0].indicator as usize, lens.as_ptr() as usize + 16);
        assert_eq!(decode::read_value(&b[0]).unwrap(), "30");
    }

    #[test]
    fn test_binding_addresses_row_wise_with_offset() {
        #[repr(C)]
        struct Pair {
            value: i64,
            ind: i64,
        }
        let rows = [Pair { value: 1, ind: 0 }, Pair { value: 2, ind: 0 }];
        let offset = 0i64;

        let mut stmt = statement();
        stmt.set_attr(StmtAttr::ParamBindType, std::mem::size_of::<Pair>()).unwrap();
        stmt.set_attr(StmtAttr::ParamBindOffsetPtr, &offset as *const i64 as *mut i64)
            .unwrap();
        stmt.bind_parameter(
            1,
            ParamBinding {
                c_type: SQL_C_SBIGINT,
                sql_type: SQL_BIGINT,
                value: &rows[0].value as *const i64 as *mut c_void,
                len_ind: &rows[0].ind as *const i64 as *mut i64,
                ..Default::default()
            },
        )
        .unwrap();

        let b = stmt.params_binding_info(1).unwrap();
        assert_eq!(decode::read_value(&b[0]).unwrap(), "2");
        assert_eq!(b[0].indicator as usize, &rows[1].ind as *const i64 as usize);
    }

    #[test]
    fn test_apd_ipd_count_mismatch() {
        let stmt = statement();
        stmt.effective_descriptor(DescriptorRole::AppParam)
            .borrow_mut()
            .record_mut(2, DescriptorRole::AppParam)
            .unwrap();
        let err = stmt.params_binding_info(0).unwrap_err();
        assert_eq!(err.sql_state(), "07002");
    }

    #[test]
    fn test_declared_size_lands_on_ipd() {
        let mut stmt = statement();
        let text = b"abc\0";
        stmt.bind_parameter(
            1,
            ParamBinding {
                c_type: SQL_C_CHAR,
                sql_type: SQL_VARCHAR,
                column_size: 3,
                value: text.as_ptr() as *mut c_void,
                buffer_length: 4,
                ..Default::default()
            },
        )
        .unwrap();
        stmt.bind_parameter(
            2,
            ParamBinding {
                c_type: SQL_C_CHAR,
                sql_type: SQL_DECIMAL,
                column_size: 12,
                decimal_digits: 2,
                value: text.as_ptr() as *mut c_void,
                ..Default::default()
            },
        )
        .unwrap();

        let b = stmt.params_binding_info(0).unwrap();
        assert_eq!(b[0].column_size, 3);
        assert_eq!(b[0].value_max_size, 4);
        assert_eq!(b[1].column_size, 12);
        assert_eq!(b[1].decimal_digits, 2);
        assert_eq!(b[1].typed_reference("odbc_2").unwrap(), "{odbc_2:Decimal(12, 2)}");
    }

    #[test]
    fn test_bind_parameter_zero_is_rejected() {
        let mut stmt = statement();
        let err = stmt.bind_parameter(0, ParamBinding::default()).unwrap_err();
        assert_eq!(err.sql_state(), "07009");
    }
}
