//! Descriptor record and its type attribute state machine.
//!
//! A record describes one column or parameter. The type-related fields
//! (`Type`, `ConciseType`, `DatetimeIntervalCode`, `Length`, `Precision`,
//! `Scale`, `DatetimeIntervalPrecision`) must stay mutually consistent: every
//! write through [`DescriptorRecord::set_attr`] runs
//! [`DescriptorRecord::on_attr_change`], which derives the dependent fields
//! with [`DescriptorRecord::set_attr_silent`]. Silent writes never re-enter
//! the state machine.

use crate::attributes::{AttrValue, Attributes, FromAttr};
use crate::constants::*;
use crate::error::{Error, Result};
use crate::types::sql_type::*;
use std::ffi::c_void;

use super::field::DescField;
use super::DescriptorRole;

/// Default precision for `SQL_DECIMAL` / `SQL_NUMERIC`.
pub const DEFAULT_DECIMAL_PRECISION: i16 = 38;
/// Default precision for `SQL_FLOAT` / `SQL_DOUBLE`.
pub const DEFAULT_DOUBLE_PRECISION: i16 = 15;
/// Default precision for `SQL_REAL`.
pub const DEFAULT_REAL_PRECISION: i16 = 7;
/// Fractional seconds precision of timestamps and second-carrying intervals.
pub const DEFAULT_SECONDS_PRECISION: i16 = 6;
/// Leading precision of interval types.
pub const DEFAULT_INTERVAL_PRECISION: i16 = 2;

/// A single descriptor record.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRecord {
    attrs: Attributes<DescField>,
}

impl DescriptorRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the record and apply the defaults of a descriptor role.
    pub fn init_for_role(&mut self, role: DescriptorRole) -> Result<()> {
        *self = Self::new();
        match role {
            DescriptorRole::AppRow | DescriptorRole::AppParam => {
                self.set_attr(DescField::Type, SQL_C_DEFAULT)?;
                self.set_attr_silent(DescField::DataPtr, AttrValue::null_ptr());
                self.set_attr_silent(DescField::IndicatorPtr, AttrValue::null_ptr());
                self.set_attr_silent(DescField::OctetLengthPtr, AttrValue::null_ptr());
                self.set_attr_silent(DescField::OctetLength, 0u64);
            }
            DescriptorRole::ImpRow => {
                self.set_attr_silent(DescField::Unnamed, SQL_UNNAMED);
            }
            DescriptorRole::ImpParam => {
                self.set_attr_silent(DescField::ParameterType, SQL_PARAM_INPUT);
                self.set_attr_silent(DescField::Nullable, SQL_NULLABLE);
                self.set_attr_silent(DescField::Unnamed, SQL_UNNAMED);
            }
        }
        Ok(())
    }

    /// Check whether a field has been set.
    pub fn contains(&self, field: DescField) -> bool {
        self.attrs.contains(field)
    }

    /// Read a field as `T`; `Ok(None)` when unset.
    pub fn get<T: FromAttr>(&self, field: DescField) -> Result<Option<T>> {
        self.attrs.get(field)
    }

    /// Read a field as `T`, falling back to `default` when unset.
    pub fn get_or<T: FromAttr>(&self, field: DescField, default: T) -> Result<T> {
        self.attrs.get_or(field, default)
    }

    /// Concise type, `SQL_UNKNOWN_TYPE` when unset.
    pub fn concise_type(&self) -> Result<i16> {
        self.get_or(DescField::ConciseType, SQL_UNKNOWN_TYPE)
    }

    /// Bound data buffer, null when unset.
    pub fn data_ptr(&self) -> Result<*mut c_void> {
        self.get_or(DescField::DataPtr, std::ptr::null_mut())
    }

    /// Write a field and run the consistency state machine.
    ///
    /// A rejected assignment leaves the record untouched.
    pub fn set_attr(&mut self, field: DescField, value: impl Into<AttrValue>) -> Result<()> {
        let value = value.into();
        self.check_assignment(field, &value)?;

        let previous = self.attrs.insert(field, value);
        if let Err(e) = self.on_attr_change(field) {
            match previous {
                Some(previous) => self.attrs.insert(field, previous),
                None => self.attrs.remove(field),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Write a field without running the state machine.
    pub fn set_attr_silent(&mut self, field: DescField, value: impl Into<AttrValue>) {
        self.attrs.insert(field, value.into());
    }

    fn check_assignment(&self, field: DescField, value: &AttrValue) -> Result<()> {
        let as_type = |value: &AttrValue| {
            i16::from_attr(value).ok_or_else(|| Error::AttributeType {
                attribute: format!("{:?}", field),
                expected: i16::TYPE_NAME,
            })
        };
        match field {
            DescField::Type => {
                let sql_type = as_type(value)?;
                if is_concise_datetime_interval_type(sql_type) {
                    return Err(Error::inconsistent(format!(
                        "concise type {} assigned as verbose type",
                        sql_type
                    )));
                }
            }
            DescField::ConciseType => {
                let concise = as_type(value)?;
                // Also the legacy SQL_C_DATE and SQL_C_TIME values.
                if is_verbose_type(concise) {
                    return Err(Error::UnsupportedCType { c_type: concise });
                }
            }
            DescField::DatetimeIntervalCode => {
                let code = as_type(value)?;
                let sql_type = self.get_or(DescField::Type, SQL_UNKNOWN_TYPE)?;
                if code != 0 && is_verbose_type(sql_type) && !is_code_of(code, sql_type) {
                    return Err(Error::inconsistent(format!(
                        "subcode {} is not valid for type {}",
                        code, sql_type
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Derive dependent fields after `field` was written.
    pub fn on_attr_change(&mut self, field: DescField) -> Result<()> {
        match field {
            DescField::Type => {
                let sql_type = self.get_or(DescField::Type, SQL_UNKNOWN_TYPE)?;
                if is_concise_datetime_interval_type(sql_type) {
                    return Err(Error::inconsistent(format!(
                        "concise type {} assigned as verbose type",
                        sql_type
                    )));
                }

                if is_verbose_type(sql_type) {
                    let code = self.get_or(DescField::DatetimeIntervalCode, 0i16)?;
                    // The concise type stays pending until a matching subcode arrives.
                    if is_code_of(code, sql_type) {
                        let concise = concise_type_from_code(code, sql_type)?;
                        self.set_attr_silent(DescField::ConciseType, concise);
                        self.clear_data_ptr()?;
                    }
                } else {
                    self.set_attr_silent(DescField::ConciseType, sql_type);
                    self.set_attr_silent(DescField::DatetimeIntervalCode, 0i16);
                    self.clear_data_ptr()?;
                }

                self.apply_type_defaults(sql_type)?;
            }
            DescField::ConciseType => {
                let concise = self.concise_type()?;
                if is_concise_datetime_interval_type(concise) {
                    self.set_attr_silent(DescField::DatetimeIntervalCode, code_of(concise));
                    self.set_attr(DescField::Type, verbose_type_of(concise))?;
                    self.clear_data_ptr()?;
                } else if !is_verbose_type(concise) {
                    self.set_attr_silent(DescField::DatetimeIntervalCode, 0i16);
                    self.set_attr(DescField::Type, concise)?;
                    self.clear_data_ptr()?;
                }
            }
            DescField::DatetimeIntervalCode => {
                let code = self.get_or(DescField::DatetimeIntervalCode, 0i16)?;
                let sql_type = self.get_or(DescField::Type, SQL_UNKNOWN_TYPE)?;
                if code != 0 && is_verbose_type(sql_type) {
                    let concise = concise_type_from_code(code, sql_type)?;
                    self.set_attr_silent(DescField::ConciseType, concise);
                    self.clear_data_ptr()?;
                }
            }
            DescField::DataPtr => {
                if !self.data_ptr()?.is_null() {
                    self.consistency_check()?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn clear_data_ptr(&mut self) -> Result<()> {
        if !self.data_ptr()?.is_null() {
            self.set_attr_silent(DescField::DataPtr, AttrValue::null_ptr());
        }
        Ok(())
    }

    fn apply_type_defaults(&mut self, sql_type: i16) -> Result<()> {
        match sql_type {
            SQL_CHAR | SQL_VARCHAR | SQL_WCHAR | SQL_WVARCHAR => {
                self.set_attr_silent(DescField::Length, 1u64);
                self.set_attr_silent(DescField::Precision, 0i16);
            }
            SQL_DECIMAL | SQL_NUMERIC => {
                self.set_attr_silent(DescField::Scale, 0i16);
                self.set_attr_silent(DescField::Precision, DEFAULT_DECIMAL_PRECISION);
            }
            SQL_FLOAT | SQL_DOUBLE => {
                self.set_attr_silent(DescField::Precision, DEFAULT_DOUBLE_PRECISION);
            }
            SQL_REAL => {
                self.set_attr_silent(DescField::Precision, DEFAULT_REAL_PRECISION);
            }
            SQL_DATETIME => match self.get_or(DescField::DatetimeIntervalCode, 0i16)? {
                SQL_CODE_DATE | SQL_CODE_TIME => {
                    self.set_attr_silent(DescField::Precision, 0i16);
                }
                SQL_CODE_TIMESTAMP => {
                    self.set_attr_silent(DescField::Precision, DEFAULT_SECONDS_PRECISION);
                }
                _ => {}
            },
            SQL_INTERVAL => {
                let code = self.get_or(DescField::DatetimeIntervalCode, 0i16)?;
                if is_interval_code(code) {
                    self.set_attr_silent(
                        DescField::DatetimeIntervalPrecision,
                        DEFAULT_INTERVAL_PRECISION,
                    );
                }
                if interval_code_has_second_component(code) {
                    self.set_attr_silent(DescField::Precision, DEFAULT_SECONDS_PRECISION);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate the type triple once a buffer is bound.
    pub fn consistency_check(&self) -> Result<()> {
        if !self.contains(DescField::Type) {
            return Ok(());
        }

        let sql_type = self.get_or(DescField::Type, SQL_UNKNOWN_TYPE)?;
        let concise = self.concise_type()?;
        let code = self.get_or(DescField::DatetimeIntervalCode, 0i16)?;

        if is_verbose_type(sql_type) {
            if !is_code_of(code, sql_type) {
                return Err(Error::inconsistent(format!(
                    "type {} requires a datetime/interval subcode, got {}",
                    sql_type, code
                )));
            }
            if concise != concise_type_from_code(code, sql_type)? {
                return Err(Error::inconsistent(format!(
                    "concise type {} does not match type {} with subcode {}",
                    concise, sql_type, code
                )));
            }
        } else if concise != sql_type {
            return Err(Error::inconsistent(format!(
                "concise type {} does not match type {}",
                concise, sql_type
            )));
        }
        Ok(())
    }

    /// Column size of the described value, when the type defines one.
    pub fn column_size(&self) -> Result<Option<u64>> {
        let concise = self.concise_type()?;
        if is_character_type(concise) || is_binary_type(concise) {
            self.get(DescField::Length)
        } else if is_numeric_type(concise) || is_concise_datetime_interval_type(concise) {
            Ok(self.get::<i16>(DescField::Precision)?.map(|p| p.max(0) as u64))
        } else {
            Ok(None)
        }
    }

    /// Decimal digits of the described value, when the type defines them.
    pub fn decimal_digits(&self) -> Result<Option<i16>> {
        let concise = self.concise_type()?;
        match concise {
            SQL_DECIMAL | SQL_NUMERIC => self.get(DescField::Scale),
            SQL_TINYINT | SQL_SMALLINT | SQL_INTEGER | SQL_BIGINT | SQL_BIT => Ok(Some(0)),
            SQL_TYPE_TIME | SQL_TYPE_TIMESTAMP => self.get(DescField::Precision),
            _ if is_concise_interval_type(concise)
                && interval_code_has_second_component(code_of(concise)) =>
            {
                self.get(DescField::Precision)
            }
            _ => Ok(None),
        }
    }
}
