//==================================================
// File: tests/language.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: End-to-end language behaviour
// Objective: Run whole scripts through the lexer, parser and interpreter
//            and check what they print
//==================================================

mod common;

use common::output_of;

#[test]
fn subs_return_values_to_callers() {
    let output = output_of(
        r#"
sub add(a, b) { return a + b; }
println(add(2, 3));
"#,
    );
    assert_eq!(output, "5\n");
}

#[test]
fn recursion_reaches_a_result() {
    let output = output_of(
        r#"
sub fib(n) {
    if n < 2 { return n; }
    return fib(n - 1) + fib(n - 2);
}
println(fib(15));
"#,
    );
    assert_eq!(output, "610\n");
}

#[test]
fn subs_without_parameters() {
    let output = output_of(
        r#"
sub hello { println("hello"); }
hello();
"#,
    );
    assert_eq!(output, "hello\n");
}

#[test]
fn loops_and_do_loops() {
    let output = output_of(
        r#"
my i = 0;
while i < 3 { i = i + 1; }
my j = 5;
do { j = j + 1; } while (j < 0);
my k = 10;
until k <= 7 { dec k; }
println(i, j, k);
"#,
    );
    assert_eq!(output, "3 6 7\n");
}

#[test]
fn for_loops_print_in_order() {
    let output = output_of(
        r#"
for x in [1, 2, 3] { println(x); }
for ["b": 2, "a": 1] { println(it[0] + "=" + it[1]); }
"#,
    );
    assert_eq!(output, "1\n2\n3\na=1\nb=2\n");
}

#[test]
fn break_and_next_with_modifiers() {
    let output = output_of(
        r#"
for x in [1, 2, 3, 4, 5] {
    next if x == 2;
    break if x == 4;
    print(x);
}
println();
"#,
    );
    assert_eq!(output, "13\n");
}

#[test]
fn trailing_modifiers_wrap_simple_statements() {
    let output = output_of(
        r#"
println("shown") if true;
println("hidden") unless true;
my i = 0;
inc i while i < 3;
println(i);
"#,
    );
    assert_eq!(output, "shown\n3\n");
}

#[test]
fn call_statements_take_spaced_arguments() {
    let output = output_of(
        r#"
println "a" 1;
println("b") 2 3;
"#,
    );
    assert_eq!(output, "a 1\nb 2 3\n");
}

#[test]
fn whitespace_before_calls_and_indexes_inside_expressions() {
    let output = output_of(
        r#"
sub add(a, b) { return a + b; }
my r = add (2, 3);
my a = [1, 2];
a [0] = 7;
my v = a [0];
println(r, v, a);
print [r, v];
"#,
    );
    assert_eq!(output, "5 7 [7, 2]
[5, 7]");
}

#[test]
fn conditional_chains_run_one_branch() {
    let output = output_of(
        r#"
my n = 5;
if n < 0 { println("negative"); }
else unless n > 3 { println("small"); }
else { println("big"); }

unless n == 5 { println("not five"); }
else if n > 1 { println("five"); }
"#,
    );
    assert_eq!(output, "big\nfive\n");
}

#[test]
fn when_and_when_match() {
    let output = output_of(
        r#"
my lang = "clam";
when lang {
    case "perl" { println("camel"); }
    case "clam" { println("shell"); }
    else { println("unknown"); }
}
when {
    case lang == "perl" { println("no"); }
    else { println("fallback"); }
}
"#,
    );
    assert_eq!(output, "shell\nfallback\n");
}

#[test]
fn hashes_support_members_and_indexes() {
    let output = output_of(
        r#"
my h = [:];
h.x = 1;
h.y = 2;
h["x"] = 10;
println(h.x, h["y"], len(h));
println(["b": 2, "a": 1]);
"#,
    );
    assert_eq!(output, "10 2 2\n[a: 1, b: 2]\n");
}

#[test]
fn arrays_are_shared_by_reference() {
    let output = output_of(
        r#"
my a = [1, 2];
my b = a;
b[0] = 9;
println(a, a == b, a == [9, 2]);
"#,
    );
    assert_eq!(output, "[9, 2] true false\n");
}

#[test]
fn operators_follow_their_coercion_rules() {
    let output = output_of(
        r#"
println("a" + 1, 7 % 3, 7.9 % 2.5, 1 / 0, -(2 * 3));
println(0 || "x", nil | "y", false && boom, 1 & 2);
println(!nil, !0, 2 <= 2, "a" == "a", 1 == "1");
"#,
    );
    assert_eq!(
        output,
        "a1 1 1 +Inf -6\n0 y false 2\ntrue false true true false\n"
    );
}

#[test]
fn numbers_print_without_trailing_zeros() {
    let output = output_of("println(1. + 0.5, 2.0, 10 / 4, 3);\n");
    assert_eq!(output, "1.5 2 2.5 3\n");
}

#[test]
fn strings_substitute_escapes() {
    let output = output_of(
        r#"
println("tab\there");
println('it\'s');
println("say \"hi\"");
"#,
    );
    assert_eq!(output, "tab\there\nit's\nsay \"hi\"\n");
}

#[test]
fn comments_are_skipped() {
    let output = output_of("# heading\nprintln(1); # trailing\nprintln(2);\n");
    assert_eq!(output, "1\n2\n");
}

#[test]
fn blocks_bind_it() {
    let output = output_of(
        r#"
my scale = 10;
my times = { it * scale };
println(times(4), map([1, 2, 3], { it + 1 }));
"#,
    );
    assert_eq!(output, "40 [2, 3, 4]\n");
}

#[test]
fn inc_and_dec_as_expressions() {
    let output = output_of(
        r#"
my n = 1;
my m = inc n by 2;
my counts = ["hits": 0];
inc counts.hits;
inc counts["hits"] by 5;
dec n;
println(m, n, counts.hits);
"#,
    );
    assert_eq!(output, "3 2 6\n");
}

#[test]
fn nil_and_uninitialised_variables() {
    let output = output_of(
        r#"
my empty;
println(empty, type(empty), nil == empty);
"#,
    );
    assert_eq!(output, "nil nil true\n");
}

#[test]
fn host_multiple_returns_arrive_as_arrays() {
    let output = output_of(
        r#"
my parts = pop([1, 2, 3]);
println(parts[0], parts[1]);
"#,
    );
    assert_eq!(output, "3 [1, 2]\n");
}

#[test]
fn self_referencing_values_print_without_looping() {
    let output = output_of(
        r#"
my a = [0];
a[0] = a;
println(a);
my h = [:];
h.self = h;
println(h, "x" + a);
"#,
    );
    assert_eq!(output, "[[...]]\n[self: [...]] x[[...]]\n");
}
