//! Descriptor field identifiers.

use crate::error::{Error, Result};

/// Descriptor header and record fields (`SQL_DESC_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescField {
    // Header fields
    AllocType,
    ArraySize,
    ArrayStatusPtr,
    BindOffsetPtr,
    BindType,
    Count,
    RowsProcessedPtr,

    // Record fields
    ConciseType,
    DataPtr,
    DatetimeIntervalCode,
    DatetimeIntervalPrecision,
    IndicatorPtr,
    Length,
    Name,
    Nullable,
    OctetLength,
    OctetLengthPtr,
    ParameterType,
    Precision,
    Scale,
    Type,
    TypeName,
    Unnamed,
    Unsigned,
}

impl DescField {
    /// Map a raw `SQL_DESC_*` identifier.
    pub fn from_raw(id: i16) -> Result<Self> {
        let field = match id {
            1099 => DescField::AllocType,
            20 => DescField::ArraySize,
            21 => DescField::ArrayStatusPtr,
            24 => DescField::BindOffsetPtr,
            25 => DescField::BindType,
            1001 => DescField::Count,
            34 => DescField::RowsProcessedPtr,
            2 => DescField::ConciseType,
            1010 => DescField::DataPtr,
            1007 => DescField::DatetimeIntervalCode,
            26 => DescField::DatetimeIntervalPrecision,
            1009 => DescField::IndicatorPtr,
            1003 => DescField::Length,
            1011 => DescField::Name,
            1008 => DescField::Nullable,
            1013 => DescField::OctetLength,
            1004 => DescField::OctetLengthPtr,
            33 => DescField::ParameterType,
            1005 => DescField::Precision,
            1006 => DescField::Scale,
            1002 => DescField::Type,
            14 => DescField::TypeName,
            1012 => DescField::Unnamed,
            8 => DescField::Unsigned,
            _ => return Err(Error::UnknownAttribute { id: id as i32 }),
        };
        Ok(field)
    }

    /// Raw `SQL_DESC_*` identifier.
    pub fn id(self) -> i16 {
        match self {
            DescField::AllocType => 1099,
            DescField::ArraySize => 20,
            DescField::ArrayStatusPtr => 21,
            DescField::BindOffsetPtr => 24,
            DescField::BindType => 25,
            DescField::Count => 1001,
            DescField::RowsProcessedPtr => 34,
            DescField::ConciseType => 2,
            DescField::DataPtr => 1010,
            DescField::DatetimeIntervalCode => 1007,
            DescField::DatetimeIntervalPrecision => 26,
            DescField::IndicatorPtr => 1009,
            DescField::Length => 1003,
            DescField::Name => 1011,
            DescField::Nullable => 1008,
            DescField::OctetLength => 1013,
            DescField::OctetLengthPtr => 1004,
            DescField::ParameterType => 33,
            DescField::Precision => 1005,
            DescField::Scale => 1006,
            DescField::Type => 1002,
            DescField::TypeName => 14,
            DescField::Unnamed => 1012,
            DescField::Unsigned => 8,
        }
    }

    /// Check whether the field lives in the descriptor header.
    pub fn is_header_field(self) -> bool {
        matches!(
            self,
            DescField::AllocType
                | DescField::ArraySize
                | DescField::ArrayStatusPtr
                | DescField::BindOffsetPtr
                | DescField::BindType
                | DescField::Count
                | DescField::RowsProcessedPtr
        )
    }
}
