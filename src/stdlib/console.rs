//==================================================
// File: stdlib/console.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Output host functions
// Objective: print, println, printf and sprintf over the interpreter's sink
//==================================================

use super::nil;
use crate::interpreter::value::arg;
use crate::interpreter::{HostReturn, Interpreter, NativeArity, RuntimeError, Value};
use crate::stdlib_registry::HostRegistry;
use std::fmt::Write as _;

pub(super) fn register(registry: &mut HostRegistry) {
    registry.register_fn(
        "print",
        NativeArity::at_least(0),
        "Writes the arguments to standard output; a space separates two adjacent non-strings.",
        builtin_print,
    );
    registry.register_fn(
        "println",
        NativeArity::at_least(0),
        "Writes the arguments separated by spaces, followed by a newline.",
        builtin_println,
    );
    registry.register_fn(
        "printf",
        NativeArity::at_least(1),
        "Writes the arguments rendered through a format string.",
        builtin_printf,
    );
    registry.register_fn(
        "sprintf",
        NativeArity::at_least(1),
        "Returns the arguments rendered through a format string.",
        builtin_sprintf,
    );
}

fn builtin_print(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let mut text = String::new();
    for (i, value) in args.iter().enumerate() {
        let both_plain = i > 0
            && !matches!(value, Value::String(_))
            && !matches!(args[i - 1], Value::String(_));
        if both_plain {
            text.push(' ');
        }
        let _ = write!(text, "{value}");
    }
    interp.output().write_all(text.as_bytes())?;
    nil()
}

fn builtin_println(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(interp.output(), "{line}")?;
    nil()
}

fn builtin_printf(interp: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let format: String = arg(&args, 0, "printf")?;
    let text = format_values(&format, &args[1..]);
    interp.output().write_all(text.as_bytes())?;
    nil()
}

fn builtin_sprintf(_: &mut Interpreter, args: Vec<Value>) -> Result<HostReturn, RuntimeError> {
    let format: String = arg(&args, 0, "sprintf")?;
    Ok(HostReturn::single(format_values(&format, &args[1..])))
}

//==================================================
// Format Verbs
//==================================================

#[derive(Debug, Default)]
struct Directive {
    left: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Directive {
    fn parse(raw: &str) -> Self {
        let left = raw.starts_with('-');
        let raw = raw.trim_start_matches('-');
        let (width, precision) = match raw.split_once('.') {
            Some((width, precision)) => (width, Some(precision.parse().unwrap_or(0))),
            None => (raw, None),
        };
        Self {
            left,
            width: width.parse().ok(),
            precision,
        }
    }

    fn pad(&self, text: String) -> String {
        match self.width {
            Some(width) if self.left => format!("{text:<width$}"),
            Some(width) => format!("{text:>width$}"),
            None => text,
        }
    }
}

/// Render `format` with `%v %s %d %f %t %q %x %%`, accepting `-`, width and
/// `.precision`. Problems are reported inline as `%!verb(...)`.
pub fn format_values(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut chars = format.chars().peekable();
    let mut remaining = args.iter();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut raw = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_digit() || next == '.' || next == '-' {
                raw.push(next);
                chars.next();
            } else {
                break;
            }
        }
        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(value) = remaining.next() else {
            let _ = write!(out, "%!{verb}(MISSING)");
            continue;
        };
        let directive = Directive::parse(&raw);
        out.push_str(&directive.pad(render_verb(verb, &directive, value)));
    }

    for extra in remaining {
        let _ = write!(out, "%!(EXTRA {}={extra})", extra.type_name());
    }
    out
}

fn render_verb(verb: char, directive: &Directive, value: &Value) -> String {
    match (verb, value) {
        ('v', _) => value.to_string(),
        ('s', _) => {
            let text = value.to_string();
            match directive.precision {
                Some(limit) => text.chars().take(limit).collect(),
                None => text,
            }
        }
        ('d', Value::Number(n)) => format!("{}", n.trunc() as i64),
        ('f', Value::Number(n)) => {
            let precision = directive.precision.unwrap_or(6);
            format!("{n:.precision$}")
        }
        ('t', Value::Bool(b)) => b.to_string(),
        ('q', Value::String(s)) => format!("{s:?}"),
        ('x', Value::Number(n)) => format!("{:x}", n.trunc() as i64),
        ('x', Value::String(s)) => s.bytes().map(|b| format!("{b:02x}")).collect(),
        _ => format!("%!{verb}({}={value})", value.type_name()),
    }
}
