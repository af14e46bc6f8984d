//! Placeholder extraction and final query construction.

use crate::error::{Error, Result};
use crate::types::catalog;
use rand::Rng;
use std::ffi::c_void;

/// A positional parameter discovered in the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// Generated parameter name, `odbc_<n>`.
    pub name: String,
    /// Temporary token standing in for the `?` in the rewritten query.
    pub tmp_placeholder: String,
}

/// Resolved view into the buffers bound for one parameter in one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct BindingInfo {
    /// Parameter direction.
    pub io_type: i16,
    /// C type of the application buffer.
    pub c_type: i16,
    /// Declared SQL type.
    pub sql_type: i16,
    /// Declared column size.
    pub column_size: u64,
    /// Declared decimal digits.
    pub decimal_digits: i16,
    /// Capacity of the value buffer in bytes.
    pub value_max_size: u64,
    /// Value buffer.
    pub value: *const c_void,
    /// Octet length buffer (`SQLLEN`).
    pub value_size: *const i64,
    /// Indicator buffer (`SQLLEN`).
    pub indicator: *const i64,
}

impl BindingInfo {
    /// Inline typed reference, `{odbc_1:Int32}`.
    pub fn typed_reference(&self, name: &str) -> Result<String> {
        let data_source_type = catalog::data_source_type(
            self.sql_type,
            self.c_type,
            self.column_size,
            self.decimal_digits,
        )?;
        Ok(format!("{{{}:{}}}", name, data_source_type))
    }
}

fn generate_placeholder(query: &str, taken: &[ParamInfo]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = format!("@{:032x}", rng.gen::<u128>());
        if !query.contains(&candidate) && taken.iter().all(|p| p.tmp_placeholder != candidate) {
            return candidate;
        }
    }
}

/// Replace every unquoted `?` with a unique placeholder token.
///
/// A backslash escapes the next character. Single and double quotes open a
/// quoted run closed by the same character; a doubled quote inside the run
/// is a literal quote.
pub fn extract_parameters(query: &str) -> (String, Vec<ParamInfo>) {
    let bytes = query.as_bytes();
    let mut out = String::with_capacity(query.len());
    let mut params: Vec<ParamInfo> = Vec::new();
    let mut quoted_by: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let curr = bytes[i];
        let next = bytes.get(i + 1).copied();
        match curr {
            b'\\' => i += 1,
            b'"' | b'\'' => match quoted_by {
                Some(q) if q == curr => {
                    if next == Some(curr) {
                        i += 1;
                    } else {
                        quoted_by = None;
                    }
                }
                Some(_) => {}
                None => quoted_by = Some(curr),
            },
            b'?' if quoted_by.is_none() => {
                let placeholder = generate_placeholder(query, &params);
                out.push_str(&query[start..i]);
                out.push_str(&placeholder);
                start = i + 1;
                params.push(ParamInfo {
                    name: format!("odbc_{}", params.len() + 1),
                    tmp_placeholder: placeholder,
                });
            }
            _ => {}
        }
        i += 1;
    }
    out.push_str(&query[start.min(query.len())..]);

    (out, params)
}

/// Substitute each placeholder with its typed reference.
pub fn build_final_query(
    query: &str,
    params: &[ParamInfo],
    bindings: &[BindingInfo],
) -> Result<String> {
    if params.len() < bindings.len() || bindings.len() < params.len() {
        return Err(Error::CountFieldIncorrect);
    }

    let mut final_query = query.to_string();
    for (param, binding) in params.iter().zip(bindings) {
        let pos = final_query
            .find(&param.tmp_placeholder)
            .ok_or(Error::CountFieldIncorrect)?;
        let reference = binding.typed_reference(&param.name)?;
        final_query.replace_range(pos..pos + param.tmp_placeholder.len(), &reference);
    }
    Ok(final_query)
}
