use crate::error::{GuardError, Result};

/// Resolve a package-relative reference to an absolute component path.
///
/// `package` is the package the referencing component lives in. Level 1 is
/// the package itself, each further level climbs one parent. An empty `name`
/// refers to the resolved package (`from . import x`).
pub fn resolve_relative(name: &str, package: &str, level: u32) -> Result<String> {
    if level == 0 {
        return Ok(name.to_string());
    }

    let mut parts: Vec<&str> = package.split('.').filter(|p| !p.is_empty()).collect();
    let climb = (level - 1) as usize;
    if parts.is_empty() || climb >= parts.len() {
        return Err(GuardError::RelativeImportBeyondTopLevel {
            name: name.to_string(),
            package: package.to_string(),
            level,
        });
    }
    parts.truncate(parts.len() - climb);

    if !name.is_empty() {
        parts.push(name);
    }
    Ok(parts.join("."))
}
