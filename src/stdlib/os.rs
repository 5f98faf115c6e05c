//==================================================
// File: stdlib/os.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: `os` host module
// Objective: Script arguments, environment, working directory,
//            directory and copy helpers, and process exit
//==================================================

use super::nil;
use crate::interpreter::value::arg;
use crate::interpreter::{HostReturn, NativeArity, RuntimeError};
use crate::stdlib_registry::HostModule;
use std::env;
use std::fs;

fn path_failure(function: &str, path: &str, err: std::io::Error) -> RuntimeError {
    RuntimeError::host(format!("{function} {path}: {err}"))
}

/// Build the module. `script_args` is what `os.args()` returns: the script
/// path followed by any trailing command line arguments.
pub(super) fn module(script_args: Vec<String>) -> HostModule {
    HostModule::new("os")
        .function(
            "args",
            NativeArity::Exact(0),
            "The script path followed by its command line arguments.",
            move |_, _| Ok(HostReturn::single(script_args.clone())),
        )
        .function(
            "env",
            NativeArity::Exact(1),
            "The value of an environment variable, or \"\" when unset.",
            |_, args| {
                let key: String = arg(&args, 0, "os.env")?;
                Ok(HostReturn::single(env::var(&key).unwrap_or_default()))
            },
        )
        .function(
            "getwd",
            NativeArity::Exact(0),
            "The current working directory.",
            |_, _| {
                let dir = env::current_dir()
                    .map_err(|err| RuntimeError::host(format!("os.getwd: {err}")))?;
                Ok(HostReturn::single(dir.to_string_lossy().into_owned()))
            },
        )
        .function(
            "chdir",
            NativeArity::Exact(1),
            "Changes the current working directory.",
            |_, args| {
                let dir: String = arg(&args, 0, "os.chdir")?;
                env::set_current_dir(&dir).map_err(|err| path_failure("os.chdir", &dir, err))?;
                nil()
            },
        )
        .function(
            "mkdir",
            NativeArity::Exact(1),
            "Creates a directory.",
            |_, args| {
                let dir: String = arg(&args, 0, "os.mkdir")?;
                fs::create_dir(&dir).map_err(|err| path_failure("os.mkdir", &dir, err))?;
                nil()
            },
        )
        .function(
            "mkdir_all",
            NativeArity::Exact(1),
            "Creates a directory along with any missing parents.",
            |_, args| {
                let dir: String = arg(&args, 0, "os.mkdir_all")?;
                fs::create_dir_all(&dir).map_err(|err| path_failure("os.mkdir_all", &dir, err))?;
                nil()
            },
        )
        .function(
            "cp",
            NativeArity::Exact(2),
            "Copies a file's contents to a new path.",
            |_, args| {
                let from: String = arg(&args, 0, "os.cp")?;
                let to: String = arg(&args, 1, "os.cp")?;
                fs::copy(&from, &to).map_err(|err| path_failure("os.cp", &from, err))?;
                nil()
            },
        )
        .function(
            "mv",
            NativeArity::Exact(2),
            "Moves a file or directory.",
            |_, args| {
                let from: String = arg(&args, 0, "os.mv")?;
                let to: String = arg(&args, 1, "os.mv")?;
                fs::rename(&from, &to).map_err(|err| path_failure("os.mv", &from, err))?;
                nil()
            },
        )
        .function(
            "exit",
            NativeArity::Exact(1),
            "Stops the script and ends the process with the given status.",
            |interp, args| {
                let status: i64 = arg(&args, 0, "os.exit")?;
                let status = i32::try_from(status)
                    .map_err(|_| RuntimeError::host(format!("os.exit: status {status} is out of range")))?;
                interp.output().flush()?;
                Err(RuntimeError::exit(status))
            },
        )
        .constant("os", env::consts::OS, "Name of the host operating system.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Interpreter, RuntimeErrorKind, Value};

    fn member(module: &HostModule, name: &str) -> Value {
        module
            .members()
            .iter()
            .find(|member| member.name == name)
            .map(|member| member.value.clone())
            .expect("member present")
    }

    #[test]
    fn args_are_returned_as_an_array() {
        let os = module(vec!["script.clam".into(), "--fast".into()]);
        let mut interp = Interpreter::new();
        let args = interp.call_value(&member(&os, "args"), Vec::new()).expect("call");
        assert_eq!(args.to_string(), "[script.clam, --fast]");
    }

    #[test]
    fn exit_unwinds_with_its_status() {
        let os = module(Vec::new());
        let mut interp = Interpreter::with_output(Vec::new());
        let err = interp
            .call_value(&member(&os, "exit"), vec![Value::Number(3.0)])
            .expect_err("exit unwinds");
        assert_eq!(err.kind, RuntimeErrorKind::Exit(3));
        assert_eq!(err.exit_status(), Some(3));
    }

    #[test]
    fn mkdir_all_then_cp() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b");
        let os = module(Vec::new());
        let mut interp = Interpreter::with_output(Vec::new());

        let nested_str = Value::String(nested.to_string_lossy().into_owned());
        interp
            .call_value(&member(&os, "mkdir_all"), vec![nested_str])
            .expect("mkdir_all");
        assert!(nested.is_dir());

        let source = dir.path().join("src.txt");
        fs::write(&source, "copy me").expect("write");
        let target = nested.join("dst.txt");
        interp
            .call_value(
                &member(&os, "cp"),
                vec![
                    Value::String(source.to_string_lossy().into_owned()),
                    Value::String(target.to_string_lossy().into_owned()),
                ],
            )
            .expect("cp");
        assert_eq!(fs::read_to_string(target).expect("read"), "copy me");
    }
}
