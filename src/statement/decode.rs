//! Textual rendering of bound parameter buffers.
//!
//! Every value is sent to the server as a `param_<name>` query-string
//! parameter, so each supported C type is read from the caller's buffer and
//! formatted as text.

use crate::constants::*;
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::ffi::{c_void, CStr};
use std::fmt::Display;

use super::params::BindingInfo;

/// `SQL_DATE_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlDate {
    pub year: i16,
    pub month: u16,
    pub day: u16,
}

/// `SQL_TIMESTAMP_STRUCT`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTimestamp {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Nanoseconds.
    pub fraction: u32,
}

/// Size in bytes of one element of a fixed-width C type, 0 for variable-width types.
pub fn c_type_width(c_type: i16) -> u64 {
    let width = match c_type {
        SQL_C_BIT | SQL_C_TINYINT | SQL_C_STINYINT | SQL_C_UTINYINT => 1,
        SQL_C_SHORT | SQL_C_SSHORT | SQL_C_USHORT => 2,
        SQL_C_LONG | SQL_C_SLONG | SQL_C_ULONG | SQL_C_FLOAT => 4,
        SQL_C_SBIGINT | SQL_C_UBIGINT | SQL_C_DOUBLE => 8,
        SQL_C_TYPE_DATE => std::mem::size_of::<SqlDate>(),
        SQL_C_TYPE_TIMESTAMP => std::mem::size_of::<SqlTimestamp>(),
        _ => 0,
    };
    width as u64
}

/// Default C type for a SQL type, used for `SQL_C_DEFAULT` bindings.
pub fn default_c_type(sql_type: i16) -> i16 {
    match sql_type {
        SQL_WCHAR | SQL_WVARCHAR | SQL_WLONGVARCHAR => SQL_C_WCHAR,
        SQL_BINARY | SQL_VARBINARY | SQL_LONGVARBINARY => SQL_C_BINARY,
        SQL_BIT => SQL_C_BIT,
        SQL_TINYINT => SQL_C_STINYINT,
        SQL_SMALLINT => SQL_C_SSHORT,
        SQL_INTEGER => SQL_C_SLONG,
        SQL_BIGINT => SQL_C_SBIGINT,
        SQL_REAL => SQL_C_FLOAT,
        SQL_FLOAT | SQL_DOUBLE => SQL_C_DOUBLE,
        SQL_TYPE_DATE => SQL_C_TYPE_DATE,
        SQL_TYPE_TIMESTAMP => SQL_C_TYPE_TIMESTAMP,
        _ => SQL_C_CHAR,
    }
}

/// What the indicator says about the bound value.
enum Presence {
    Value,
    Null,
    Default,
}

fn presence(binding: &BindingInfo) -> Result<Presence> {
    if binding.indicator.is_null() {
        return Ok(Presence::Value);
    }
    // SAFETY: a non-null indicator points at the caller's SQLLEN for this parameter set.
    let ind = unsafe { binding.indicator.read_unaligned() };
    match ind {
        SQL_NULL_DATA => Ok(Presence::Null),
        SQL_DEFAULT_PARAM => Ok(Presence::Default),
        0 | SQL_NTS => Ok(Presence::Value),
        n if n < 0 => Err(Error::DataAtExecution),
        _ => Ok(Presence::Value),
    }
}

/// Render the bound value of one parameter as text.
pub fn read_value(binding: &BindingInfo) -> Result<String> {
    let c_type = if binding.c_type == SQL_C_DEFAULT {
        default_c_type(binding.sql_type)
    } else {
        binding.c_type
    };

    match c_type {
        SQL_C_CHAR | SQL_C_BINARY => read_narrow(binding),
        SQL_C_WCHAR => read_wide(binding),
        SQL_C_SHORT | SQL_C_SSHORT => read_scalar::<i16>(binding),
        SQL_C_USHORT => read_scalar::<u16>(binding),
        SQL_C_LONG | SQL_C_SLONG => read_scalar::<i32>(binding),
        SQL_C_ULONG => read_scalar::<u32>(binding),
        SQL_C_FLOAT => read_scalar::<f32>(binding),
        SQL_C_DOUBLE => read_scalar::<f64>(binding),
        SQL_C_BIT | SQL_C_UTINYINT => read_scalar::<u8>(binding),
        SQL_C_TINYINT | SQL_C_STINYINT => read_scalar::<i8>(binding),
        SQL_C_SBIGINT => read_scalar::<i64>(binding),
        SQL_C_UBIGINT => read_scalar::<u64>(binding),
        SQL_C_TYPE_DATE => read_date(binding),
        SQL_C_TYPE_TIMESTAMP => read_timestamp(binding),
        _ => Err(Error::UnsupportedCType { c_type }),
    }
}

fn read_scalar<T: Copy + Default + Display>(binding: &BindingInfo) -> Result<String> {
    if binding.value.is_null() {
        return Ok(String::new());
    }
    match presence(binding)? {
        Presence::Null => Ok(String::new()),
        Presence::Default => Ok(T::default().to_string()),
        Presence::Value => {
            // SAFETY: the caller bound a buffer of this C type at this address.
            let value = unsafe { (binding.value as *const T).read_unaligned() };
            Ok(value.to_string())
        }
    }
}

/// Length in bytes given by the octet length buffer, `None` for NUL-terminated data.
fn explicit_length(binding: &BindingInfo) -> Option<usize> {
    if binding.value_size.is_null() {
        return None;
    }
    // SAFETY: a non-null length pointer refers to the caller's SQLLEN.
    let size = unsafe { binding.value_size.read_unaligned() };
    usize::try_from(size).ok()
}

fn read_narrow(binding: &BindingInfo) -> Result<String> {
    if binding.value.is_null() {
        return Ok(String::new());
    }
    let ind = if binding.indicator.is_null() {
        None
    } else {
        // SAFETY: see `presence`.
        Some(unsafe { binding.indicator.read_unaligned() })
    };

    let length = match ind {
        Some(0) | Some(SQL_NTS) => None,
        Some(SQL_NULL_DATA) | Some(SQL_DEFAULT_PARAM) => return Ok(String::new()),
        Some(n) if n < 0 => return Err(Error::DataAtExecution),
        _ => explicit_length(binding),
    };

    let bytes = match length {
        // SAFETY: the caller bound at least `len` readable bytes.
        Some(len) => unsafe { std::slice::from_raw_parts(binding.value as *const u8, len) },
        // SAFETY: without a length the buffer holds a NUL-terminated string.
        None => unsafe { CStr::from_ptr(binding.value as *const std::ffi::c_char) }.to_bytes(),
    };
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

fn read_wide(binding: &BindingInfo) -> Result<String> {
    if binding.value.is_null() {
        return Ok(String::new());
    }
    let ind = if binding.indicator.is_null() {
        None
    } else {
        // SAFETY: see `presence`.
        Some(unsafe { binding.indicator.read_unaligned() })
    };

    let length = match ind {
        Some(0) | Some(SQL_NTS) => None,
        Some(SQL_NULL_DATA) | Some(SQL_DEFAULT_PARAM) => return Ok(String::new()),
        Some(n) if n < 0 => return Err(Error::DataAtExecution),
        _ => explicit_length(binding),
    };

    let units = binding.value as *const u16;
    let count = match length {
        Some(len) => len / std::mem::size_of::<u16>(),
        None => {
            let mut n = 0;
            // SAFETY: without a length the buffer holds a NUL-terminated UTF-16 string.
            while unsafe { units.add(n).read_unaligned() } != 0 {
                n += 1;
            }
            n
        }
    };
    let wide: Vec<u16> = (0..count)
        // SAFETY: `count` units are within the caller's buffer.
        .map(|i| unsafe { units.add(i).read_unaligned() })
        .collect();
    Ok(String::from_utf16_lossy(&wide))
}

fn read_struct<T: Copy + Default>(binding: &BindingInfo) -> Result<Option<T>> {
    if binding.value.is_null() {
        return Ok(None);
    }
    match presence(binding)? {
        Presence::Null => Ok(None),
        Presence::Default => Ok(Some(T::default())),
        // SAFETY: the caller bound a buffer of this C type at this address.
        Presence::Value => Ok(Some(unsafe { (binding.value as *const T).read_unaligned() })),
    }
}

fn read_date(binding: &BindingInfo) -> Result<String> {
    let Some(d) = read_struct::<SqlDate>(binding)? else {
        return Ok(String::new());
    };
    let date = NaiveDate::from_ymd_opt(d.year as i32, d.month as u32, d.day as u32).ok_or_else(
        || Error::type_conversion(format!("invalid date {}-{}-{}", d.year, d.month, d.day)),
    )?;
    Ok(date.format("%Y-%m-%d").to_string())
}

fn read_timestamp(binding: &BindingInfo) -> Result<String> {
    let Some(ts) = read_struct::<SqlTimestamp>(binding)? else {
        return Ok(String::new());
    };
    let datetime = NaiveDate::from_ymd_opt(ts.year as i32, ts.month as u32, ts.day as u32)
        .and_then(|d| d.and_hms_opt(ts.hour as u32, ts.minute as u32, ts.second as u32))
        .ok_or_else(|| {
            Error::type_conversion(format!(
                "invalid timestamp {}-{}-{} {}:{}:{}",
                ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second
            ))
        })?;
    Ok(format_timestamp(&datetime))
}

fn format_timestamp(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Pointer `bytes` past `base`, keeping null pointers null.
pub(crate) fn offset_ptr<T>(base: *mut c_void, bytes: i64) -> *const T {
    if base.is_null() {
        std::ptr::null()
    } else {
        (base as *const u8).wrapping_offset(bytes as isize) as *const T
    }
}
