//! Descriptor attribute state machine tests.

use clickhouse_odbc::constants::*;
use clickhouse_odbc::descriptor::{
    DEFAULT_DECIMAL_PRECISION, DEFAULT_INTERVAL_PRECISION, DEFAULT_SECONDS_PRECISION,
};
use clickhouse_odbc::{DescField, Descriptor, DescriptorRecord, DescriptorRole};
use std::ffi::c_void;

const CONCISE_DATETIME_INTERVAL_TYPES: [(i16, i16, i16); 16] = [
    (SQL_TYPE_DATE, SQL_DATETIME, SQL_CODE_DATE),
    (SQL_TYPE_TIME, SQL_DATETIME, SQL_CODE_TIME),
    (SQL_TYPE_TIMESTAMP, SQL_DATETIME, SQL_CODE_TIMESTAMP),
    (SQL_INTERVAL_YEAR, SQL_INTERVAL, SQL_CODE_YEAR),
    (SQL_INTERVAL_MONTH, SQL_INTERVAL, SQL_CODE_MONTH),
    (SQL_INTERVAL_DAY, SQL_INTERVAL, SQL_CODE_DAY),
    (SQL_INTERVAL_HOUR, SQL_INTERVAL, SQL_CODE_HOUR),
    (SQL_INTERVAL_MINUTE, SQL_INTERVAL, SQL_CODE_MINUTE),
    (SQL_INTERVAL_SECOND, SQL_INTERVAL, SQL_CODE_SECOND),
    (SQL_INTERVAL_YEAR_TO_MONTH, SQL_INTERVAL, SQL_CODE_YEAR_TO_MONTH),
    (SQL_INTERVAL_DAY_TO_HOUR, SQL_INTERVAL, SQL_CODE_DAY_TO_HOUR),
    (SQL_INTERVAL_DAY_TO_MINUTE, SQL_INTERVAL, SQL_CODE_DAY_TO_MINUTE),
    (SQL_INTERVAL_DAY_TO_SECOND, SQL_INTERVAL, SQL_CODE_DAY_TO_SECOND),
    (SQL_INTERVAL_HOUR_TO_MINUTE, SQL_INTERVAL, SQL_CODE_HOUR_TO_MINUTE),
    (SQL_INTERVAL_HOUR_TO_SECOND, SQL_INTERVAL, SQL_CODE_HOUR_TO_SECOND),
    (SQL_INTERVAL_MINUTE_TO_SECOND, SQL_INTERVAL, SQL_CODE_MINUTE_TO_SECOND),
];

fn triple(rec: &DescriptorRecord) -> (i16, i16, i16) {
    (
        rec.get_or(DescField::Type, SQL_UNKNOWN_TYPE).unwrap(),
        rec.concise_type().unwrap(),
        rec.get_or(DescField::DatetimeIntervalCode, 0i16).unwrap(),
    )
}

#[test]
fn test_concise_type_derives_verbose_type_and_code() {
    for (concise, verbose, code) in CONCISE_DATETIME_INTERVAL_TYPES {
        let mut rec = DescriptorRecord::new();
        rec.set_attr(DescField::ConciseType, concise).unwrap();
        assert_eq!(triple(&rec), (verbose, concise, code), "concise type {}", concise);
        rec.consistency_check().unwrap();
    }
}

#[test]
fn test_verbose_type_then_code_derives_concise_type() {
    for (concise, verbose, code) in CONCISE_DATETIME_INTERVAL_TYPES {
        let mut rec = DescriptorRecord::new();
        rec.set_attr(DescField::Type, verbose).unwrap();
        rec.set_attr(DescField::DatetimeIntervalCode, code).unwrap();
        assert_eq!(triple(&rec), (verbose, concise, code), "subcode {}", code);
    }
}

#[test]
fn test_plain_types_clear_subcode() {
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::ConciseType, SQL_TYPE_TIMESTAMP).unwrap();
    rec.set_attr(DescField::ConciseType, SQL_VARCHAR).unwrap();
    assert_eq!(triple(&rec), (SQL_VARCHAR, SQL_VARCHAR, 0));

    rec.set_attr(DescField::Type, SQL_INTEGER).unwrap();
    assert_eq!(triple(&rec), (SQL_INTEGER, SQL_INTEGER, 0));
}

#[test]
fn test_concise_type_as_verbose_type_is_rejected() {
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::Type, SQL_BIGINT).unwrap();

    let err = rec.set_attr(DescField::Type, SQL_TYPE_DATE).unwrap_err();
    assert_eq!(err.sql_state(), "HY021");
    assert_eq!(triple(&rec), (SQL_BIGINT, SQL_BIGINT, 0));
}

#[test]
fn test_subcode_of_wrong_family_is_rejected() {
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::Type, SQL_DATETIME).unwrap();
    let err = rec
        .set_attr(DescField::DatetimeIntervalCode, SQL_CODE_MINUTE_TO_SECOND)
        .unwrap_err();
    assert_eq!(err.sql_state(), "HY021");
}

#[test]
fn test_type_change_unbinds_data_pointer() {
    let mut buffer = [0u8; 16];
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::ConciseType, SQL_CHAR).unwrap();
    rec.set_attr(DescField::DataPtr, buffer.as_mut_ptr()).unwrap();
    assert_eq!(rec.data_ptr().unwrap(), buffer.as_mut_ptr() as *mut c_void);

    rec.set_attr(DescField::ConciseType, SQL_TYPE_DATE).unwrap();
    assert!(rec.data_ptr().unwrap().is_null());
}

#[test]
fn test_binding_pending_verbose_type_fails_consistency() {
    let mut buffer = 0u64;
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::Type, SQL_INTERVAL).unwrap();

    let err = rec
        .set_attr(DescField::DataPtr, &mut buffer as *mut u64)
        .unwrap_err();
    assert_eq!(err.sql_state(), "HY021");
    assert!(rec.data_ptr().unwrap().is_null());
}

#[test]
fn test_type_defaults() {
    let mut rec = DescriptorRecord::new();
    rec.set_attr(DescField::ConciseType, SQL_DECIMAL).unwrap();
    assert_eq!(rec.get_or(DescField::Precision, 0i16).unwrap(), DEFAULT_DECIMAL_PRECISION);
    assert_eq!(rec.get_or(DescField::Scale, -1i16).unwrap(), 0);

    rec.set_attr(DescField::ConciseType, SQL_VARCHAR).unwrap();
    assert_eq!(rec.get_or(DescField::Length, 0u64).unwrap(), 1);

    rec.set_attr(DescField::ConciseType, SQL_TYPE_TIMESTAMP).unwrap();
    assert_eq!(rec.get_or(DescField::Precision, 0i16).unwrap(), DEFAULT_SECONDS_PRECISION);

    rec.set_attr(DescField::ConciseType, SQL_INTERVAL_DAY_TO_SECOND).unwrap();
    assert_eq!(
        rec.get_or(DescField::DatetimeIntervalPrecision, 0i16).unwrap(),
        DEFAULT_INTERVAL_PRECISION
    );
    assert_eq!(rec.decimal_digits().unwrap(), Some(DEFAULT_SECONDS_PRECISION));
}

#[test]
fn test_record_growth_and_truncation() {
    let mut desc = Descriptor::new(DescriptorRole::AppParam, SQL_DESC_ALLOC_AUTO);
    assert_eq!(desc.record_count().unwrap(), 0);
    assert_eq!(desc.get_or(DescField::ArraySize, 0u64).unwrap(), 1);

    desc.record_mut(3, DescriptorRole::AppParam)
        .unwrap()
        .set_attr(DescField::ConciseType, SQL_C_SLONG)
        .unwrap();
    assert_eq!(desc.record_count().unwrap(), 3);
    assert_eq!(desc.record(2).unwrap().concise_type().unwrap(), SQL_C_DEFAULT);

    desc.set_attr(DescField::Count, 1u64).unwrap();
    assert!(desc.record(3).is_none());

    let rec = desc.record_mut(3, DescriptorRole::AppParam).unwrap();
    assert_eq!(rec.concise_type().unwrap(), SQL_C_DEFAULT);
    assert_eq!(desc.record_count().unwrap(), 3);
}

#[test]
fn test_record_fields_rejected_on_header() {
    let mut desc = Descriptor::new(DescriptorRole::ImpRow, SQL_DESC_ALLOC_AUTO);
    assert!(desc.set_attr(DescField::ConciseType, SQL_INTEGER).is_err());
    assert!(desc.get::<u64>(DescField::ArraySize).unwrap().is_none());
}

#[test]
fn test_mismatched_attribute_representation() {
    let mut rec = DescriptorRecord::new();
    let err = rec.set_attr(DescField::ConciseType, "INTEGER").unwrap_err();
    assert_eq!(err.sql_state(), "HY024");
    assert!(!rec.contains(DescField::ConciseType));
}
