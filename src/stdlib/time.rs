//==================================================
// File: stdlib/time.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: `time` host module
// Objective: Represent instants as hashes and expose clock, calendar,
//            formatting and sleep helpers backed by chrono
//==================================================

use crate::stdlib::nil;
use crate::interpreter::value::arg;
use crate::interpreter::{HashKey, HashRef, HostReturn, NativeArity, RuntimeError, Value};
use crate::stdlib_registry::HostModule;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Timelike, Utc};
use std::collections::HashMap;
use std::fmt::Write as _;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

//==================================================
// Conversions
//==================================================

/// Break an instant into the hash shape scripts see:
/// year, month, day, hour, minute, second, nsec and location.
pub(crate) fn time_to_hash<Tz: TimeZone>(instant: &DateTime<Tz>, location: &str) -> Value {
    let mut entries = HashMap::new();
    let mut put = |key: &str, value: Value| {
        entries.insert(HashKey::from(key), value);
    };
    put("year", Value::Number(f64::from(instant.year())));
    put("month", Value::Number(f64::from(instant.month())));
    put("day", Value::Number(f64::from(instant.day())));
    put("hour", Value::Number(f64::from(instant.hour())));
    put("minute", Value::Number(f64::from(instant.minute())));
    put("second", Value::Number(f64::from(instant.second())));
    put("nsec", Value::Number(f64::from(instant.nanosecond())));
    put("location", Value::String(location.to_string()));
    Value::hash(entries)
}

fn field(entries: &HashRef, key: &str, default: i64) -> Result<i64, RuntimeError> {
    let entries = entries.borrow();
    match entries.get(&HashKey::from(key)) {
        None | Some(Value::Nil) => Ok(default),
        Some(Value::Number(n)) if n.fract() == 0.0 && n.is_finite() => Ok(*n as i64),
        Some(other) => Err(RuntimeError::type_error(format!(
            "time: field {key} must be an integer, found {other}"
        ))),
    }
}

fn narrow(value: i64, key: &str) -> Result<u32, RuntimeError> {
    u32::try_from(value).map_err(|_| RuntimeError::host(format!("time: {key} {value} is out of range")))
}

/// Rebuild a UTC instant from a time hash. Missing month and day default to 1,
/// the remaining fields to 0.
fn hash_to_time(entries: &HashRef) -> Result<DateTime<Utc>, RuntimeError> {
    let year = field(entries, "year", 0)?;
    let month = field(entries, "month", 1)?;
    let day = field(entries, "day", 1)?;
    let hour = field(entries, "hour", 0)?;
    let minute = field(entries, "minute", 0)?;
    let second = field(entries, "second", 0)?;
    let nsec = field(entries, "nsec", 0)?;
    build_utc([year, month, day, hour, minute, second, nsec])
}

fn build_utc(parts: [i64; 7]) -> Result<DateTime<Utc>, RuntimeError> {
    let [year, month, day, hour, minute, second, nsec] = parts;
    let year = i32::try_from(year)
        .map_err(|_| RuntimeError::host(format!("time: year {year} is out of range")))?;
    let invalid = || {
        RuntimeError::host(format!(
            "time: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid date"
        ))
    };
    let date = NaiveDate::from_ymd_opt(year, narrow(month, "month")?, narrow(day, "day")?)
        .ok_or_else(invalid)?;
    let moment = date
        .and_hms_nano_opt(
            narrow(hour, "hour")?,
            narrow(minute, "minute")?,
            narrow(second, "second")?,
            narrow(nsec, "nsec")?,
        )
        .ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&moment))
}

fn time_arg(args: &[Value], index: usize, function: &str) -> Result<DateTime<Utc>, RuntimeError> {
    let entries: HashRef = arg(args, index, function)?;
    hash_to_time(&entries)
}

//==================================================
// Module
//==================================================

pub(super) fn module() -> HostModule {
    let mut time = HostModule::new("time")
        .function(
            "now",
            NativeArity::Exact(0),
            "The current local time as a time hash.",
            |_, _| Ok(HostReturn::Single(time_to_hash(&Local::now(), "Local"))),
        )
        .function(
            "unix",
            NativeArity::Exact(0),
            "Seconds elapsed since the Unix epoch.",
            |_, _| Ok(HostReturn::single(Utc::now().timestamp())),
        )
        .function(
            "from_unix",
            NativeArity::Exact(1),
            "The UTC time hash for a count of seconds since the Unix epoch.",
            |_, args| {
                let seconds: i64 = arg(&args, 0, "time.from_unix")?;
                let instant = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                    RuntimeError::host(format!("time.from_unix: {seconds} is out of range"))
                })?;
                Ok(HostReturn::Single(time_to_hash(&instant, "UTC")))
            },
        )
        .function(
            "from",
            NativeArity::Range { min: 1, max: Some(7) },
            "Builds a UTC time hash from year[, month[, day[, hour, minute, second[, nsec]]]].",
            |_, args| {
                if matches!(args.len(), 4 | 5) {
                    return Err(RuntimeError::arity_mismatch(
                        "time.from: expected 1, 2, 3, 6 or 7 arguments",
                    ));
                }
                let mut parts = [0, 1, 1, 0, 0, 0, 0];
                for index in 0..args.len() {
                    parts[index] = arg(&args, index, "time.from")?;
                }
                Ok(HostReturn::Single(time_to_hash(&build_utc(parts)?, "UTC")))
            },
        )
        .function(
            "diff",
            NativeArity::Exact(2),
            "Elapsed time from a to b as whole hours, minutes, seconds, mills and nsec.",
            |_, args| {
                let start = time_arg(&args, 0, "time.diff")?;
                let end = time_arg(&args, 1, "time.diff")?;
                let elapsed = end.signed_duration_since(start);
                let nanos = elapsed.num_nanoseconds().map(|n| n as f64).unwrap_or_else(|| {
                    elapsed.num_milliseconds() as f64 * 1_000_000.0
                });
                let mut entries = HashMap::new();
                entries.insert(HashKey::from("hours"), Value::Number((nanos / 3.6e12).trunc()));
                entries.insert(HashKey::from("minutes"), Value::Number((nanos / 6e10).trunc()));
                entries.insert(HashKey::from("seconds"), Value::Number((nanos / 1e9).trunc()));
                entries.insert(
                    HashKey::from("mills"),
                    Value::Number(elapsed.num_milliseconds() as f64),
                );
                entries.insert(HashKey::from("nsec"), Value::Number(nanos));
                Ok(HostReturn::Single(Value::hash(entries)))
            },
        )
        .function(
            "format",
            NativeArity::Exact(2),
            "Renders a time hash through a strftime layout such as \"%Y-%m-%d\".",
            |_, args| {
                let layout: String = arg(&args, 0, "time.format")?;
                let instant = time_arg(&args, 1, "time.format")?;
                let mut text = String::new();
                write!(text, "{}", instant.format(&layout)).map_err(|_| {
                    RuntimeError::host(format!("time.format: invalid layout {layout:?}"))
                })?;
                Ok(HostReturn::single(text))
            },
        )
        .function(
            "str",
            NativeArity::Exact(1),
            "Renders a time hash in a fixed, sortable layout.",
            |_, args| {
                let instant = time_arg(&args, 0, "time.str")?;
                Ok(HostReturn::single(
                    instant.format("%Y-%m-%d %H:%M:%S%.f %z").to_string(),
                ))
            },
        )
        .function(
            "sleep",
            NativeArity::Exact(1),
            "Pauses the script for the given number of milliseconds.",
            |_, args| {
                let millis: i64 = arg(&args, 0, "time.sleep")?;
                if millis > 0 {
                    std::thread::sleep(std::time::Duration::from_millis(millis.unsigned_abs()));
                }
                nil()
            },
        );

    for (index, name) in MONTHS.iter().enumerate() {
        time = time.constant(name, index + 1, "Month number.");
    }
    time
}
