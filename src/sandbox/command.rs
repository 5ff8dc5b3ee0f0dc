//! Builds the shell invocation that materializes and runs user code.
//!
//! Pure transform, no I/O and no Docker contact. The returned argv is
//! `["/bin/sh", "-c", script]` so the container's own shell is the only
//! thing that ever parses the script; nothing on the host interprets it.

use super::Language;

const C_SOURCE: &str = "/tmp/main.c";
const C_BINARY: &str = "/tmp/main";
const PYTHON_SOURCE: &str = "/tmp/main.py";

/// Quote `s` for a POSIX shell.
///
/// Every embedded single quote closes the quoted region, emits an escaped
/// literal quote, and reopens the region, so the shell reproduces `s` byte
/// for byte. Getting this wrong is command injection, not just a bug.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Build the argv for one run, or `None` when the executor image has no
/// toolchain for the language.
///
/// C: write the source, compile with gcc (diagnostics folded into stdout),
/// then run the binary. Python: write the source and hand it to the
/// interpreter. `printf '%s'` is used instead of `echo` so that leading
/// dashes and backslashes in the code survive unmangled.
pub fn build_command(code: &str, language: &Language) -> Option<Vec<String>> {
    let quoted = shell_quote(code);
    let script = match language {
        Language::C => format!(
            "printf '%s' {quoted} > {C_SOURCE} && gcc {C_SOURCE} -o {C_BINARY} 2>&1 && {C_BINARY}"
        ),
        Language::Python => {
            format!("printf '%s' {quoted} > {PYTHON_SOURCE} && python3 {PYTHON_SOURCE}")
        }
        Language::Other(_) => return None,
    };
    Some(vec!["/bin/sh".to_string(), "-c".to_string(), script])
}
