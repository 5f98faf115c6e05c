//==================================================
// File: tests/errors.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Error reporting across lexing, parsing and execution
// Objective: Check error codes, positions and fail-fast behaviour
//==================================================

mod common;

use clam::interpreter::{ErrorCode, Interpreter, RuntimeErrorKind};
use clam::parse_source;
use common::{error_of, run_clam};
use std::thread;

#[test]
fn lexical_errors_use_e002() {
    for source in ["my s = \"open;", "my a = 1 @ 2;", "println(1); # no newline"] {
        let err = error_of(source);
        assert_eq!(err.code, ErrorCode::Lexical, "source: {source}");
        assert_eq!(err.code_str(), "E002");
        assert!(err.position.is_some());
    }
}

#[test]
fn syntax_errors_use_e001_with_position() {
    let err = error_of("println(1);\nmy = 3;\n");
    assert_eq!(err.code, ErrorCode::Syntax);
    assert_eq!(err.position.map(|p| p.line), Some(2));

    let err = error_of("f() = 1;\n");
    assert_eq!(err.code, ErrorCode::Syntax);
    assert!(err.message.contains("invalid assignment target"));
}

#[test]
fn type_errors_use_e003() {
    for source in [
        "println(1 + \"a\");",
        "my a = [1]; a[0.5] = 2;",
        "my n = 3; n();",
        "my s = -\"x\";",
        "for x in 5 { }",
    ] {
        assert_eq!(error_of(source).code, ErrorCode::TypeMismatch, "source: {source}");
    }
}

#[test]
fn invalid_operations_use_e004() {
    for source in [
        "my x = 1; my x = 2;",
        "x = 1;",
        "my a = [1, 2, 3]; println(a[5]);",
        "my h = [:]; h[1] = 2;",
        "sub f(a, b) { return a; } f(1);",
        "my z = 1 % 0;",
    ] {
        assert_eq!(error_of(source).code, ErrorCode::InvalidOperation, "source: {source}");
    }
}

#[test]
fn control_flow_misuse_and_overflow_use_e005() {
    assert_eq!(error_of("return 1;").code, ErrorCode::RuntimePanic);
    assert_eq!(error_of("break;").code, ErrorCode::RuntimePanic);
    assert_eq!(
        error_of("sub f() { next; } while true { f(); }").code,
        ErrorCode::RuntimePanic
    );

    let err = error_of("sub down(n) { return down(n + 1); }\ndown(0);\n");
    assert_eq!(err.code, ErrorCode::RuntimePanic);
    assert!(err.message.contains("stack overflow"), "{}", err.message);
}

#[test]
fn deep_recursion_on_a_small_stack_reports_overflow() {
    // Default 2 MB thread with a body nested deep enough to make every call level costly.
    let kind = thread::spawn(|| {
        let program = parse_source(
            "sub f(n) { if n >= 0 { while true { unless false { return f(n + 1); } } } }\nf(0);\n",
        )
        .expect("parse");
        let mut interpreter = Interpreter::with_output(std::io::sink());
        interpreter.set_max_call_depth(2_000);
        interpreter.run(&program).expect_err("unbounded recursion").kind
    })
    .join()
    .expect("interpreter thread should not crash");
    assert_eq!(kind, RuntimeErrorKind::StackOverflow);
}

#[test]
fn runtime_errors_point_at_the_innermost_node() {
    let err = error_of("sub f() {\n    return missing;\n}\nf();\n");
    assert_eq!(err.code, ErrorCode::InvalidOperation);
    assert_eq!(err.position.map(|p| p.line), Some(2));
    assert!(err.message.contains("'missing' is not defined"));
}

#[test]
fn output_before_a_failure_is_kept() {
    let (result, output) = run_clam("println(\"before\");\nboom();\nprintln(\"after\");\n");
    assert!(result.is_err());
    assert_eq!(output, "before\n");
}
