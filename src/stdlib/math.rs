//==================================================
// File: stdlib/math.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: `math` host module
// Objective: Expose f64 functions and constants as a hash of natives
//==================================================

use crate::interpreter::value::arg;
use crate::interpreter::{HostReturn, NativeArity};
use crate::stdlib_registry::HostModule;

fn unary(module: HostModule, name: &'static str, doc: &str, op: fn(f64) -> f64) -> HostModule {
    module.function(name, NativeArity::Exact(1), doc, move |_, args| {
        let x: f64 = arg(&args, 0, name)?;
        Ok(HostReturn::single(op(x)))
    })
}

fn binary(
    module: HostModule,
    name: &'static str,
    doc: &str,
    op: fn(f64, f64) -> f64,
) -> HostModule {
    module.function(name, NativeArity::Exact(2), doc, move |_, args| {
        let x: f64 = arg(&args, 0, name)?;
        let y: f64 = arg(&args, 1, name)?;
        Ok(HostReturn::single(op(x, y)))
    })
}

/// IEEE 754 remainder: `x - n*y` with `n` the quotient rounded half to even.
fn ieee_remainder(x: f64, y: f64) -> f64 {
    if x.is_nan() || y.is_nan() || x.is_infinite() || y == 0.0 {
        return f64::NAN;
    }
    if y.is_infinite() {
        return x;
    }
    x - (x / y).round_ties_even() * y
}

pub(super) fn module() -> HostModule {
    let mut math = HostModule::new("math");

    let unaries: [(&'static str, &str, fn(f64) -> f64); 25] = [
        ("abs", "Absolute value of x.", f64::abs),
        ("acos", "Arccosine of x.", f64::acos),
        ("acosh", "Inverse hyperbolic cosine of x.", f64::acosh),
        ("asin", "Arcsine of x.", f64::asin),
        ("asinh", "Inverse hyperbolic sine of x.", f64::asinh),
        ("atan", "Arctangent of x.", f64::atan),
        ("atanh", "Inverse hyperbolic tangent of x.", f64::atanh),
        ("cbrt", "Cube root of x.", f64::cbrt),
        ("ceil", "Smallest integer not below x.", f64::ceil),
        ("cos", "Cosine of x.", f64::cos),
        ("cosh", "Hyperbolic cosine of x.", f64::cosh),
        ("exp", "e raised to x.", f64::exp),
        ("exp2", "2 raised to x.", f64::exp2),
        ("floor", "Largest integer not above x.", f64::floor),
        ("log", "Natural logarithm of x.", f64::ln),
        ("log10", "Base 10 logarithm of x.", f64::log10),
        ("log2", "Base 2 logarithm of x.", f64::log2),
        ("round", "x rounded to the nearest integer, halves away from zero.", f64::round),
        ("sin", "Sine of x.", f64::sin),
        ("sinh", "Hyperbolic sine of x.", f64::sinh),
        ("sqrt", "Square root of x.", f64::sqrt),
        ("tan", "Tangent of x.", f64::tan),
        ("tanh", "Hyperbolic tangent of x.", f64::tanh),
        ("trunc", "Integer part of x.", f64::trunc),
        ("pow10", "10 raised to n.", |n| 10f64.powf(n)),
    ];
    for (name, doc, op) in unaries {
        math = unary(math, name, doc, op);
    }

    let binaries: [(&'static str, &str, fn(f64, f64) -> f64); 8] = [
        ("atan2", "Arctangent of y/x using the signs of both.", f64::atan2),
        ("copysign", "x with the sign of y.", f64::copysign),
        ("hypot", "Square root of x*x + y*y.", f64::hypot),
        ("max", "Larger of x and y.", f64::max),
        ("min", "Smaller of x and y.", f64::min),
        ("mod", "Floating point remainder of x/y, signed like x.", |x, y| x % y),
        ("pow", "x raised to y.", f64::powf),
        ("remainder", "IEEE 754 remainder of x/y.", ieee_remainder),
    ];
    for (name, doc, op) in binaries {
        math = binary(math, name, doc, op);
    }

    math.function(
        "inf",
        NativeArity::Exact(1),
        "Positive infinity when sign >= 0, negative infinity otherwise.",
        |_, args| {
            let sign: f64 = arg(&args, 0, "inf")?;
            let value = if sign >= 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
            Ok(HostReturn::single(value))
        },
    )
    .function("nan", NativeArity::Exact(0), "A quiet NaN.", |_, _| {
        Ok(HostReturn::single(f64::NAN))
    })
    .function(
        "signbit",
        NativeArity::Exact(1),
        "Whether x is negative or negative zero.",
        |_, args| {
            let x: f64 = arg(&args, 0, "signbit")?;
            Ok(HostReturn::single(x.is_sign_negative()))
        },
    )
    .constant(
        "epsilon",
        f64::from_bits(1),
        "Smallest positive value a number can hold.",
    )
    .constant("pi", std::f64::consts::PI, "Ratio of a circle's circumference to its diameter.")
    .constant("e", std::f64::consts::E, "Base of the natural logarithm.")
}
