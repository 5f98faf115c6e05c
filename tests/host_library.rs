//==================================================
// File: tests/host_library.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Standard host library exercised from scripts
// Objective: Cover output, conversion, collection, math, json, time, file
//            and os bindings through the public call path
//==================================================

mod common;

use clam::interpreter::ErrorCode;
use clam::stdlib_registry::HostRegistry;
use common::{error_of, output_of};

#[test]
fn print_spaces_only_between_non_strings() {
    let output = output_of("print(\"a\", 1, 2, \"b\", 3);\nprintln();\n");
    assert_eq!(output, "a1 2b3\n");
}

#[test]
fn printf_and_sprintf_share_verbs() {
    let output = output_of(
        r#"
printf("%s has %d items\n", "cart", 3);
println(sprintf("pi=%.2f [%-3s] %t %v", 3.14159, "x", true, [1, 2]));
"#,
    );
    assert_eq!(output, "cart has 3 items\npi=3.14 [x  ] true [1, 2]\n");
}

#[test]
fn conversions() {
    let output = output_of(
        r#"
println(type(1), type("s"), type([]), type([:]), type(println), type(nil));
println(num(" 42 ") + 1, num("nope"), num(true), str(12) + "!");
"#,
    );
    assert_eq!(
        output,
        "number string array hash function nil\n43 nil 1 12!\n"
    );
}

#[test]
fn array_helpers_do_not_mutate_their_input() {
    let output = output_of(
        r#"
my a = [1, 2, 3];
my b = push(a, 4);
my front = shift(b);
println(a, b, front[0], front[1]);
println(unshift(a, 0), reverse(a), slice(b, 1, 3), index(a, 3), index(a, 9));
"#,
    );
    assert_eq!(
        output,
        "[1, 2, 3] [1, 2, 3, 4] 1 [2, 3, 4]\n[0, 1, 2, 3] [3, 2, 1] [2, 3] 2 -1\n"
    );
}

#[test]
fn callbacks_drive_map_filter_and_reduce() {
    let output = output_of(
        r#"
sub add(acc, x) { return acc + x; }
my nums = [1, 2, 3, 4, 5, 6];
my evens = filter(nums, { it % 2 == 0 });
println(evens, map(evens, { it * it }), reduce(nums, add), reduce(nums, add, 100));
"#,
    );
    assert_eq!(output, "[2, 4, 6] [4, 16, 36] 21 121\n");
}

#[test]
fn strings_split_and_join() {
    let output = output_of(
        r#"
my words = split("a,b,c", ",");
println(len(words), join(words, "-"), join(split("hey", ""), "."), len("héllo"));
"#,
    );
    assert_eq!(output, "3 a-b-c h.e.y 5\n");
}

#[test]
fn hash_keys_and_values_are_sorted() {
    let output = output_of(
        r#"
my h = ["pear": 3, "apple": 1, "fig": 2];
println(keys(h), values(h));
"#,
    );
    assert_eq!(output, "[apple, fig, pear] [1, 2, 3]\n");
}

#[test]
fn math_module() {
    let output = output_of(
        r#"
println(math.sqrt(16), math.max(2, 7), math.floor(-1.5), math.pow(2, 10), math.pi > 3);
println(math.inf(1), math.inf(-1), math.signbit(-0.0), math.remainder(5, 2));
"#,
    );
    assert_eq!(output, "4 7 -2 1024 true\n+Inf -Inf true 1\n");
}

#[test]
fn json_round_trips_through_strings() {
    let output = output_of(
        r#"
println(json.to(["b": [1, 2.5], "a": nil]));
my doc = json.from("{\"name\": \"clam\", \"tags\": [\"x\", \"y\"]}");
println(doc.name, doc.tags[1], json.valid("{"), json.valid("[1]"));
"#,
    );
    assert_eq!(output, "{\"a\":null,\"b\":[1,2.5]}\nclam y false true\n");
}

#[test]
fn json_rejects_functions() {
    assert_eq!(error_of("json.to(println);").code, ErrorCode::TypeMismatch);
    assert_eq!(error_of("json.from(\"{\");").code, ErrorCode::RuntimePanic);
}

#[test]
fn time_hashes_format_and_diff() {
    let output = output_of(
        r#"
my t = time.from(2024, 3, 9, 14, 5, 0);
println(time.format("%Y-%m-%d %H:%M", t), t.month == time.March, t.location);
my d = time.diff(time.from(2024, 1, 1), time.from(2024, 1, 2));
println(d.hours, d.minutes, d.seconds);
println(time.from_unix(0).year, time.unix() > 1700000000);
"#,
    );
    assert_eq!(
        output,
        "2024-03-09 14:05 true UTC\n24 1440 86400\n1970 true\n"
    );
}

#[test]
fn time_rejects_impossible_dates() {
    assert_eq!(error_of("time.from(2023, 2, 30);").code, ErrorCode::RuntimePanic);
    assert_eq!(error_of("time.from(2023, 2, 3, 4);").code, ErrorCode::InvalidOperation);
}

#[test]
fn file_module_reads_writes_and_persists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let notes = dir.path().join("notes.txt");
    let state = dir.path().join("state.json");
    let renamed = dir.path().join("moved.txt");
    let source = format!(
        r#"
my notes = "{notes}";
file.write(notes, "line one");
println(file.read(notes), file.exists(notes), file.stat(notes).size);
my first = file.persist("{state}", ["runs": 1]);
my second = file.persist("{state}", ["runs": 99]);
println(first.runs, second.runs);
file.rename(notes, "{renamed}");
println(file.exists(notes), file.exists("{renamed}"));
file.remove("{renamed}");
println(file.exists("{renamed}"));
"#,
        notes = notes.display(),
        state = state.display(),
        renamed = renamed.display(),
    );
    let output = output_of(&source);
    assert_eq!(output, "line one true 8\n1 1\nfalse true\nfalse\n");
}

#[test]
fn os_module_exposes_arguments_and_environment() {
    let output = output_of(
        r#"
println(os.args(), os.env("CLAM_SURELY_UNSET_VARIABLE") == "", len(os.getwd()) > 0, type(os.os));
"#,
    );
    assert_eq!(output, "[test.clam] true true string\n");
}

#[test]
fn os_exit_stops_the_script() {
    let (result, output) = common::run_clam("println(\"one\");\nos.exit(4);\nprintln(\"two\");\n");
    let err = result.expect_err("exit unwinds");
    assert!(err.message.contains("status 4"));
    assert_eq!(output, "one\n");
}

#[test]
fn docs_list_functions_and_module_members() {
    let docs = HostRegistry::with_stdlib(Vec::new()).docs();
    assert!(docs.contains("println (any number of arguments)"));
    assert!(docs.contains("  math.sqrt (1 argument)"));
    assert!(docs.contains("  time.January - Month number."));
    assert!(docs.contains("json - JSON encoding and decoding."));
}
