// src/db/functions.rs
//
// SQL functions registered on every relational connection.

use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registers `regexp(pattern, text)`, which backs `text REGEXP pattern`.
///
/// Patterns use the `regex` crate syntax, so `(?i)` folds Unicode case the
/// same way the document store's filters do. The compiled pattern is cached
/// per statement. A NULL text never matches.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex = ctx.get_or_create_aux(0, |pattern| -> Result<Regex, BoxError> {
                Ok(Regex::new(pattern.as_str()?)?)
            })?;

            match ctx.get_raw(1) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map(|text| regex.is_match(text))
                    .map_err(|e| rusqlite::Error::UserFunctionError(e.into())),
                _ => Ok(false),
            }
        },
    )
}
