use std::path::{Component, Path, PathBuf};

/// Normalize `path` to an absolute, lexically cleaned form.
///
/// Relative paths are resolved against `base`; `.` and `..` components
/// are folded away without touching the filesystem. Diagnostic scoping
/// compares paths with this normalization applied to both sides, so
/// spelling differences (`./a.mica` vs `a.mica`) never cause a
/// diagnostic to be dropped.
pub fn normalize_path(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_resolved_against_base() {
        let normalized = normalize_path(Path::new("/work"), Path::new("pkg/a.mica"));
        assert_eq!(normalized, PathBuf::from("/work/pkg/a.mica"));
    }

    #[test]
    fn test_absolute_ignores_base() {
        let normalized = normalize_path(Path::new("/work"), Path::new("/other/a.mica"));
        assert_eq!(normalized, PathBuf::from("/other/a.mica"));
    }

    #[test]
    fn test_dot_components_folded() {
        let normalized = normalize_path(Path::new("/work"), Path::new("./pkg/../a.mica"));
        assert_eq!(normalized, PathBuf::from("/work/a.mica"));
    }

    #[test]
    fn test_spelling_differences_agree() {
        let base = Path::new("/work");
        assert_eq!(
            normalize_path(base, Path::new("./a.mica")),
            normalize_path(base, Path::new("a.mica"))
        );
    }
}
