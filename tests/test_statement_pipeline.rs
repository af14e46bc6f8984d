//! Statement pipeline tests against a scripted in-memory transport.

use clickhouse_odbc::constants::*;
use clickhouse_odbc::{
    ConnectParams, DescriptorRole, Driver, Error, Handle, HttpRequest, HttpResponse, ParamBinding,
    StmtAttr, Transport, Value,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::c_void;
use std::io;
use std::rc::Rc;

enum Reply {
    Fail(io::ErrorKind),
    Respond(u16, Vec<u8>),
}

#[derive(Default)]
struct Script {
    replies: VecDeque<Reply>,
    requests: Vec<HttpRequest>,
    resets: usize,
}

#[derive(Clone, Default)]
struct ScriptedTransport(Rc<RefCell<Script>>);

impl ScriptedTransport {
    fn push(&self, reply: Reply) -> &Self {
        self.0.borrow_mut().replies.push_back(reply);
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.0.borrow().requests.clone()
    }

    fn resets(&self) -> usize {
        self.0.borrow().resets
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, request: &HttpRequest) -> io::Result<HttpResponse> {
        let mut script = self.0.borrow_mut();
        script.requests.push(request.clone());
        match script.replies.pop_front() {
            Some(Reply::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            Some(Reply::Respond(status, body)) => Ok(HttpResponse::from_bytes(status, body)),
            None => Err(io::Error::new(io::ErrorKind::NotConnected, "script exhausted")),
        }
    }

    fn reset(&mut self) {
        self.0.borrow_mut().resets += 1;
    }
}

fn cell(out: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(v) => {
            out.extend_from_slice(&(v.len() as i32).to_le_bytes());
            out.extend_from_slice(v.as_bytes());
        }
        None => out.extend_from_slice(&(-1i32).to_le_bytes()),
    }
}

fn body(columns: &[(&str, &str)], rows: &[&[Option<&str>]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&2i32.to_le_bytes());
    out.extend_from_slice(&(columns.len() as i32 + 1).to_le_bytes());
    cell(&mut out, Some("name"));
    for (name, _) in columns {
        cell(&mut out, Some(name));
    }
    out.extend_from_slice(&(columns.len() as i32 + 1).to_le_bytes());
    cell(&mut out, Some("type"));
    for (_, type_name) in columns {
        cell(&mut out, Some(type_name));
    }
    for row in rows {
        for v in row.iter() {
            cell(&mut out, *v);
        }
    }
    out
}

fn one_row(value: &str) -> Vec<u8> {
    body(&[("x", "Int32")], &[&[Some(value)]])
}

fn setup(retry_count: u32) -> (Driver, Handle, Handle, ScriptedTransport) {
    let mut driver = Driver::new();
    let env = driver.alloc_environment();
    let dbc = driver.alloc_connection(env).unwrap();
    let transport = ScriptedTransport::default();
    let params = ConnectParams::new("http://localhost:8123/")
        .with_credentials("default", "")
        .with_database("test")
        .with_retry_count(retry_count);
    let boxed = Box::new(transport.clone());
    driver
        .with_connection(dbc, |conn| {
            conn.connect_with_transport(params, boxed);
            Ok(())
        })
        .unwrap();
    let stmt = driver.alloc_statement(dbc).unwrap();
    (driver, dbc, stmt, transport)
}

fn query_param(request: &HttpRequest, key: &str) -> Option<String> {
    request
        .uri
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[test]
fn test_select_rows_and_row_count() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport.push(Reply::Respond(
        200,
        body(
            &[("n", "UInt64"), ("s", "Nullable(String)")],
            &[&[Some("1"), Some("a")], &[Some("2"), None]],
        ),
    ));

    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.execute_direct(conn, "SELECT n, s FROM t", None)?;
            assert_eq!(stmt.num_columns(), 2);
            assert_eq!(stmt.column(1)?.name, "s");

            assert!(stmt.advance_to_next_row()?);
            assert_eq!(stmt.current_row_num(), 1);
            assert_eq!(stmt.current_row().unwrap().get(0), Some(&Value::UInt(1)));

            assert!(stmt.advance_to_next_row()?);
            assert!(stmt.current_row().unwrap().get(1).unwrap().is_null());

            assert!(!stmt.advance_to_next_row()?);
            assert_eq!(stmt.diagnostics.row_count, 2);
            assert_eq!(stmt.current_row_num(), 0);
            Ok(())
        })
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, "SELECT n, s FROM t");
    assert_eq!(query_param(&requests[0], "database").as_deref(), Some("test"));
    assert_eq!(
        query_param(&requests[0], "default_format").as_deref(),
        Some("ODBCDriver2")
    );
    assert_eq!(requests[0].authorization, "Basic ZGVmYXVsdDo=");
}

#[test]
fn test_retry_resets_session_once() {
    let (mut driver, _, stmt, transport) = setup(3);
    transport
        .push(Reply::Fail(io::ErrorKind::ConnectionReset))
        .push(Reply::Respond(200, one_row("7")));

    driver
        .with_statement(stmt, |stmt, conn| stmt.execute_direct(conn, "SELECT 7", None))
        .unwrap();

    assert_eq!(transport.requests().len(), 2);
    assert_eq!(transport.resets(), 1);
}

#[test]
fn test_retries_exhausted_returns_last_io_error() {
    let (mut driver, _, stmt, transport) = setup(2);
    for _ in 0..3 {
        transport.push(Reply::Fail(io::ErrorKind::TimedOut));
    }

    let err = driver
        .with_statement(stmt, |stmt, conn| stmt.execute_direct(conn, "SELECT 1", None))
        .unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
        other => panic!("Expected I/O error, got {:?}", other),
    }
    assert_eq!(transport.requests().len(), 3);
    assert_eq!(transport.resets(), 3);
    assert_eq!(
        driver.diagnostics(stmt).unwrap().records()[0].sql_state,
        "08S01"
    );
}

#[test]
fn test_http_error_status() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport.push(Reply::Respond(
        500,
        b"Code: 62. DB::Exception: Syntax error".to_vec(),
    ));

    let err = driver
        .with_statement(stmt, |stmt, conn| stmt.execute_direct(conn, "SELEC 1", None))
        .unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Syntax error"));
        }
        other => panic!("Expected HTTP status error, got {:?}", other),
    }
}

#[test]
fn test_parameters_sent_as_typed_references() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport.push(Reply::Respond(200, one_row("42")));

    let id = 42i32;
    let name = b"it's\0";
    let name_ind = SQL_NTS;
    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.prepare(conn, "SELECT x FROM t WHERE id = ? AND name = ? AND tag = '?'")?;
            assert_eq!(stmt.parameters().len(), 2);
            stmt.bind_parameter(
                1,
                ParamBinding {
                    c_type: SQL_C_SLONG,
                    sql_type: SQL_INTEGER,
                    value: &id as *const i32 as *mut c_void,
                    ..Default::default()
                },
            )?;
            stmt.bind_parameter(
                2,
                ParamBinding {
                    c_type: SQL_C_CHAR,
                    sql_type: SQL_VARCHAR,
                    column_size: 16,
                    value: name.as_ptr() as *mut c_void,
                    buffer_length: name.len() as u64,
                    len_ind: &name_ind as *const i64 as *mut i64,
                    ..Default::default()
                },
            )?;
            stmt.execute(conn, None)
        })
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(
        request.body,
        "SELECT x FROM t WHERE id = {odbc_1:Int32} AND name = {odbc_2:String} AND tag = '?'"
    );
    assert_eq!(query_param(request, "param_odbc_1").as_deref(), Some("42"));
    assert_eq!(query_param(request, "param_odbc_2").as_deref(), Some("it's"));
}

#[test]
fn test_null_parameter_sends_empty_value() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport.push(Reply::Respond(200, one_row("0")));

    let value = 0i64;
    let ind = SQL_NULL_DATA;
    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.prepare(conn, "SELECT ?")?;
            stmt.bind_parameter(
                1,
                ParamBinding {
                    c_type: SQL_C_SBIGINT,
                    sql_type: SQL_BIGINT,
                    value: &value as *const i64 as *mut c_void,
                    len_ind: &ind as *const i64 as *mut i64,
                    ..Default::default()
                },
            )?;
            stmt.execute(conn, None)
        })
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(query_param(request, "param_odbc_1").as_deref(), Some(""));
}

#[test]
fn test_parameter_sets_produce_one_result_set_each() {
    let (mut driver, _, stmt, transport) = setup(0);
    for v in ["10", "20", "30"] {
        transport.push(Reply::Respond(200, one_row(v)));
    }

    let values = [10i32, 20, 30];
    let processed = std::cell::Cell::new(u64::MAX);
    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.set_attr(StmtAttr::ParamsetSize, 3u64)?;
            stmt.set_attr(StmtAttr::ParamsProcessedPtr, processed.as_ptr())?;
            stmt.prepare(conn, "SELECT ?")?;
            stmt.bind_parameter(
                1,
                ParamBinding {
                    c_type: SQL_C_SLONG,
                    sql_type: SQL_INTEGER,
                    value: values.as_ptr() as *mut c_void,
                    ..Default::default()
                },
            )?;

            stmt.execute(conn, None)?;
            assert_eq!(processed.get(), 0);
            for expected in [10, 20, 30] {
                assert!(stmt.advance_to_next_row()?);
                assert_eq!(stmt.current_row().unwrap().get(0), Some(&Value::Int(expected)));
                assert!(!stmt.advance_to_next_row()?);
                let more = stmt.advance_to_next_result_set(conn)?;
                assert_eq!(more, expected != 30);
            }
            Ok(())
        })
        .unwrap();

    let sent: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| query_param(r, "param_odbc_1").unwrap())
        .collect();
    assert_eq!(sent, ["10", "20", "30"]);
    assert_eq!(processed.get(), 2);
    assert_eq!(transport.resets(), 0);
}

#[test]
fn test_unbound_parameter_fails_before_sending() {
    let (mut driver, _, stmt, transport) = setup(3);

    let err = driver
        .with_statement(stmt, |stmt, conn| stmt.execute_direct(conn, "SELECT ?, ?", None))
        .unwrap_err();
    assert!(matches!(err, Error::CountFieldIncorrect));
    assert!(transport.requests().is_empty());
    assert_eq!(transport.resets(), 0);
}

#[test]
fn test_output_parameter_rejected() {
    let (mut driver, _, stmt, transport) = setup(0);
    let value = 1i32;

    let err = driver
        .with_statement(stmt, |stmt, conn| {
            stmt.prepare(conn, "SELECT ?")?;
            stmt.bind_parameter(
                1,
                ParamBinding {
                    io_type: SQL_PARAM_OUTPUT,
                    c_type: SQL_C_SLONG,
                    sql_type: SQL_INTEGER,
                    value: &value as *const i32 as *mut c_void,
                    ..Default::default()
                },
            )?;
            stmt.execute(conn, None)
        })
        .unwrap_err();
    assert_eq!(err.sql_state(), "HYC00");
    assert!(transport.requests().is_empty());
}

#[test]
fn test_escape_sequences_rewritten_unless_noscan() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport
        .push(Reply::Respond(200, one_row("1")))
        .push(Reply::Respond(200, one_row("1")));

    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.execute_direct(conn, "SELECT {fn UCASE(s)} FROM t WHERE d = {d '2024-01-31'}", None)?;
            stmt.set_attr(StmtAttr::NoScan, SQL_NOSCAN_ON)?;
            stmt.execute_direct(conn, "SELECT {d '2024-01-31'}", None)
        })
        .unwrap();

    let requests = transport.requests();
    assert!(!requests[0].body.contains("{fn"));
    assert!(!requests[0].body.contains("{d"));
    assert_eq!(requests[1].body, "SELECT {d '2024-01-31'}");
}

#[test]
fn test_close_cursor_on_unread_result_resets_session() {
    let (mut driver, _, stmt, transport) = setup(0);
    transport.push(Reply::Respond(
        200,
        body(&[("x", "Int32")], &[&[Some("1")], &[Some("2")]]),
    ));

    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.execute_direct(conn, "SELECT x FROM t", None)?;
            assert!(stmt.advance_to_next_row()?);
            stmt.close_cursor(conn);
            assert!(!stmt.has_result_set());
            Ok(())
        })
        .unwrap();
    assert_eq!(transport.resets(), 1);
}

#[test]
fn test_explicit_descriptor_drives_binding_until_freed() {
    let (mut driver, dbc, stmt, transport) = setup(0);
    transport
        .push(Reply::Respond(200, one_row("5")))
        .push(Reply::Respond(200, one_row("0")));

    let apd = driver.alloc_descriptor(dbc).unwrap();
    driver
        .bind_explicit_descriptor(stmt, DescriptorRole::AppParam, Some(apd))
        .unwrap();

    let value = 5i32;
    driver
        .with_statement(stmt, |stmt, conn| {
            stmt.prepare(conn, "SELECT ?")?;
            stmt.bind_parameter(
                1,
                ParamBinding {
                    c_type: SQL_C_SLONG,
                    sql_type: SQL_INTEGER,
                    value: &value as *const i32 as *mut c_void,
                    ..Default::default()
                },
            )?;
            stmt.execute(conn, None)
        })
        .unwrap();
    let count = driver
        .with_descriptor(apd, |desc| desc.record_count())
        .unwrap();
    assert_eq!(count, 1);

    // The implicit APD has no bound records.
    driver.free_handle(apd).unwrap();
    let err = driver
        .with_statement(stmt, |stmt, conn| {
            stmt.prepare(conn, "SELECT ?")?;
            stmt.execute(conn, None)
        })
        .unwrap_err();
    assert!(matches!(err, Error::CountFieldIncorrect));
    assert_eq!(transport.requests().len(), 1);
}
