//! Code Introspector: shallow, regex-based extraction of a function's
//! name and (for Java) its return type from untrusted submission source.
//!
//! The introspector deliberately does not parse the source. A submission
//! malformed in a way the patterns below miss will fail later, at
//! compilation inside the sandbox, not here — this module only needs to
//! extract enough to generate a harness that *calls* the submission.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

fn python_def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"def\s+(\w+)\s*\(.*\)\s*:").unwrap())
}

fn java_static_return_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"public\s+static\s+([a-zA-Z0-9\[\]]+)\s+\w+\(").unwrap())
}

fn java_public_return_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"public\s+([a-zA-Z0-9\[\]]+)\s+\w+\(").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Extracts the function name from a Python submission's first top-level
/// `def`. Fails with [`Error::Extract`] if no `def` header matches.
pub fn function_name_python(src: &str) -> Result<String> {
    let caps = python_def_re()
        .captures(src)
        .ok_or_else(|| Error::Extract("Could not find function name in the provided code".into()))?;
    let name = caps[1].to_string();
    debug!(function = %name, "extracted python function name");
    Ok(name)
}

/// Python has no declared return type; this is a no-op sentinel kept so
/// the dispatch table in [`crate::language`] has a uniform shape across
/// languages.
pub fn return_type_python(_src: &str) -> &'static str {
    "python"
}

/// Extracts a Java submission's return type, preferring `public static T`
/// over `public T` when both would match. Collapses runs of whitespace
/// to a single space first, so a signature split across lines still
/// matches. Fails with [`Error::Extract`] if neither form matches.
pub fn return_type_java(src: &str) -> Result<String> {
    let collapsed = whitespace_re().replace_all(src, " ");
    if let Some(caps) = java_static_return_re().captures(&collapsed) {
        let ty = caps[1].to_string();
        debug!(return_type = %ty, "extracted java return type (static)");
        return Ok(ty);
    }
    if let Some(caps) = java_public_return_re().captures(&collapsed) {
        let ty = caps[1].to_string();
        debug!(return_type = %ty, "extracted java return type");
        return Ok(ty);
    }
    Err(Error::Extract("Could not find return type in the code".into()))
}

/// Extracts the Java function name immediately following the given
/// return type and preceding `(`. Fails with [`Error::Extract`] if no
/// match is found.
pub fn function_name_java(src: &str, return_type: &str) -> Result<String> {
    let pattern = format!(r"{}\s+(\w+)\s*\(", regex::escape(return_type));
    let re = Regex::new(&pattern)
        .map_err(|e| Error::Extract(format!("invalid return type pattern: {e}")))?;
    let caps = re.captures(src).ok_or_else(|| {
        Error::Extract(format!(
            "Could not find function name after return type '{return_type}' in the code"
        ))
    })?;
    let name = caps[1].to_string();
    debug!(function = %name, %return_type, "extracted java function name");
    Ok(name)
}
