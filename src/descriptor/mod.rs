//! Descriptors: ordered collections of descriptor records.
//!
//! Record 0 is reserved for the bookmark column; parameters and columns are
//! addressed from 1. The `Count` header field always equals the highest
//! record index that has been requested or initialized.

mod field;
mod record;

pub use field::DescField;
pub use record::{
    DescriptorRecord, DEFAULT_DECIMAL_PRECISION, DEFAULT_DOUBLE_PRECISION,
    DEFAULT_INTERVAL_PRECISION, DEFAULT_REAL_PRECISION, DEFAULT_SECONDS_PRECISION,
};

use crate::attributes::{AttrValue, Attributes, FromAttr};
use crate::constants::*;
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Descriptor shared between its owner and statements that reference it.
pub type SharedDescriptor = Rc<RefCell<Descriptor>>;

/// Role a descriptor plays for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRole {
    /// Application row descriptor (ARD).
    AppRow,
    /// Application parameter descriptor (APD).
    AppParam,
    /// Implementation row descriptor (IRD).
    ImpRow,
    /// Implementation parameter descriptor (IPD).
    ImpParam,
}

impl DescriptorRole {
    /// All roles, in `SQL_ATTR_*_DESC` order.
    pub const ALL: [DescriptorRole; 4] = [
        DescriptorRole::AppRow,
        DescriptorRole::AppParam,
        DescriptorRole::ImpRow,
        DescriptorRole::ImpParam,
    ];

    /// Map a raw `SQL_ATTR_*_DESC` statement attribute.
    pub fn from_raw(attr: i32) -> Result<Self> {
        match attr {
            10010 => Ok(DescriptorRole::AppRow),
            10011 => Ok(DescriptorRole::AppParam),
            10012 => Ok(DescriptorRole::ImpRow),
            10013 => Ok(DescriptorRole::ImpParam),
            _ => Err(Error::UnknownAttribute { id: attr }),
        }
    }

    /// Index into per-role arrays.
    pub fn index(self) -> usize {
        match self {
            DescriptorRole::AppRow => 0,
            DescriptorRole::AppParam => 1,
            DescriptorRole::ImpRow => 2,
            DescriptorRole::ImpParam => 3,
        }
    }

    /// Check whether this is an application descriptor role.
    pub fn is_application(self) -> bool {
        matches!(self, DescriptorRole::AppRow | DescriptorRole::AppParam)
    }
}

/// A descriptor: header fields plus records.
#[derive(Debug, Clone)]
pub struct Descriptor {
    header: Attributes<DescField>,
    records: Vec<DescriptorRecord>,
}

impl Descriptor {
    /// Create a descriptor with the header defaults of `role`.
    ///
    /// `alloc_type` is `SQL_DESC_ALLOC_AUTO` for statement-owned descriptors
    /// and `SQL_DESC_ALLOC_USER` for explicitly allocated ones.
    pub fn new(role: DescriptorRole, alloc_type: i16) -> Self {
        let mut header = Attributes::new();
        header.insert(DescField::AllocType, AttrValue::from(alloc_type));
        header.insert(DescField::Count, AttrValue::from(0u64));
        if role.is_application() {
            header.insert(DescField::ArraySize, AttrValue::from(1u64));
            header.insert(DescField::BindType, AttrValue::from(SQL_BIND_BY_COLUMN));
        }
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// Create a shared descriptor.
    pub fn new_shared(role: DescriptorRole, alloc_type: i16) -> SharedDescriptor {
        Rc::new(RefCell::new(Self::new(role, alloc_type)))
    }

    /// Read a header field as `T`; `Ok(None)` when unset.
    pub fn get<T: FromAttr>(&self, field: DescField) -> Result<Option<T>> {
        self.header.get(field)
    }

    /// Read a header field as `T`, falling back to `default`.
    pub fn get_or<T: FromAttr>(&self, field: DescField, default: T) -> Result<T> {
        self.header.get_or(field, default)
    }

    /// Write a header field.
    pub fn set_attr(&mut self, field: DescField, value: impl Into<AttrValue>) -> Result<()> {
        if !field.is_header_field() {
            return Err(Error::UnknownAttribute {
                id: field.id() as i32,
            });
        }
        let value = value.into();
        if field == DescField::Count {
            let count = usize::from_attr(&value).ok_or(Error::AttributeType {
                attribute: "Count".to_string(),
                expected: usize::TYPE_NAME,
            })?;
            self.set_count(count);
            return Ok(());
        }
        self.header.insert(field, value);
        Ok(())
    }

    /// Number of records, not counting the bookmark record.
    pub fn record_count(&self) -> Result<usize> {
        self.get_or(DescField::Count, 0usize)
    }

    /// Set the record count; records above it become stale and are
    /// re-initialized when requested again.
    pub fn set_count(&mut self, count: usize) {
        self.header.insert(DescField::Count, AttrValue::from(count));
    }

    /// Check whether the descriptor was allocated by the application.
    pub fn is_user_allocated(&self) -> Result<bool> {
        Ok(self.get_or(DescField::AllocType, SQL_DESC_ALLOC_AUTO)? == SQL_DESC_ALLOC_USER)
    }

    /// Get an initialized record, if within the record count.
    pub fn record(&self, index: usize) -> Option<&DescriptorRecord> {
        let count = self.record_count().ok()?;
        if index > count {
            return None;
        }
        self.records.get(index)
    }

    /// Get a record, growing the descriptor with the default initializer of `role`.
    pub fn record_mut(&mut self, index: usize, role: DescriptorRole) -> Result<&mut DescriptorRecord> {
        self.record_mut_with(index, role, |record, role| record.init_for_role(role))
    }

    /// Get a record, growing the descriptor as needed.
    ///
    /// Every record between the previous count and `index` is initialized
    /// exactly once with `init`; the count is raised to `index` if lower.
    pub fn record_mut_with<F>(
        &mut self,
        index: usize,
        role: DescriptorRole,
        mut init: F,
    ) -> Result<&mut DescriptorRecord>
    where
        F: FnMut(&mut DescriptorRecord, DescriptorRole) -> Result<()>,
    {
        let count = self.record_count()?;

        // Stale records left behind by a truncated count.
        for i in (count + 1)..=index {
            if let Some(record) = self.records.get_mut(i) {
                init(record, role)?;
            }
        }

        while self.records.len() <= index.max(count) {
            let mut record = DescriptorRecord::new();
            init(&mut record, role)?;
            self.records.push(record);
        }

        if index > count {
            trace!(from = count, to = index, ?role, "Growing descriptor");
            self.set_count(index);
        }

        Ok(&mut self.records[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_defaults() {
        let desc = Descriptor::new(DescriptorRole::AppParam, SQL_DESC_ALLOC_AUTO);
        assert_eq!(desc.record_count().unwrap(), 0);
        assert_eq!(desc.get_or(DescField::ArraySize, 0u64).unwrap(), 1);
        assert!(!desc.is_user_allocated().unwrap());

        let desc = Descriptor::new(DescriptorRole::ImpRow, SQL_DESC_ALLOC_USER);
        assert!(!desc.header.contains(DescField::ArraySize));
        assert!(desc.is_user_allocated().unwrap());
    }

    #[test]
    fn test_growth_initializes_each_record_once() {
        let mut desc = Descriptor::new(DescriptorRole::AppParam, SQL_DESC_ALLOC_AUTO);
        let mut inits = 0;
        desc.record_mut_with(5, DescriptorRole::AppParam, |rec, role| {
            inits += 1;
            rec.init_for_role(role)
        })
        .unwrap();
        // Records 0 (bookmark) through 5.
        assert_eq!(inits, 6);
        assert_eq!(desc.record_count().unwrap(), 5);

        let mut inits = 0;
        desc.record_mut_with(3, DescriptorRole::AppParam, |rec, role| {
            inits += 1;
            rec.init_for_role(role)
        })
        .unwrap();
        assert_eq!(inits, 0);
        assert_eq!(desc.record_count().unwrap(), 5);
    }

    #[test]
    fn test_truncated_records_are_reinitialized() {
        let mut desc = Descriptor::new(DescriptorRole::AppParam, SQL_DESC_ALLOC_AUTO);
        desc.record_mut(2, DescriptorRole::AppParam)
            .unwrap()
            .set_attr(DescField::ConciseType, SQL_C_SLONG)
            .unwrap();
        desc.set_attr(DescField::Count, 0usize).unwrap();
        assert!(desc.record(2).is_none());

        let rec = desc.record_mut(2, DescriptorRole::AppParam).unwrap();
        assert_eq!(rec.concise_type().unwrap(), SQL_C_DEFAULT);
        assert_eq!(desc.record_count().unwrap(), 2);
    }

    #[test]
    fn test_record_fields_rejected_on_header() {
        let mut desc = Descriptor::new(DescriptorRole::AppRow, SQL_DESC_ALLOC_AUTO);
        assert!(desc.set_attr(DescField::ConciseType, SQL_C_CHAR).is_err());
    }

    #[test]
    fn test_role_from_raw() {
        assert_eq!(DescriptorRole::from_raw(10011).unwrap(), DescriptorRole::AppParam);
        assert!(DescriptorRole::from_raw(1).is_err());
    }
}
