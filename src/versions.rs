//! Version Constraints

use semver::{Version, VersionReq};

use crate::registry::FuncMap;
use crate::value::Value;

/// Whether `version` satisfies `constraint`. Unparseable input never matches.
pub fn semver_compare(constraint: &str, version: &str) -> bool {
    let version = version.trim().trim_start_matches('v');
    match (VersionReq::parse(constraint.trim()), Version::parse(version)) {
        (Ok(req), Ok(v)) => req.matches(&v),
        _ => false,
    }
}

pub(crate) fn register(funcs: &mut FuncMap) {
    funcs.define("semverCompare", |a| {
        a.exactly(2)?;
        Ok(Value::Bool(semver_compare(&a.string(0), &a.string(1))))
    });
}
