//! File name resolution under the documents root

use std::path::{Component, Path, PathBuf};

use crate::error::{SheetError, SheetResult};

/// Extensions listed as documents.
const DOCUMENT_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Join a caller-supplied file name onto `root`.
///
/// Absolute paths, drive prefixes and `..` components are rejected so the
/// result always stays inside `root`. `.` components are dropped.
pub fn resolve(root: &Path, filename: &str) -> SheetResult<PathBuf> {
    if filename.trim().is_empty() {
        return Err(SheetError::InvalidArgument(
            "filename must not be empty".to_string(),
        ));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(filename).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SheetError::PathOutsideRoot(filename.to_string()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(SheetError::InvalidArgument(format!(
            "filename '{}' does not name a file",
            filename
        )));
    }

    Ok(root.join(relative))
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            DOCUMENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Sorted names of the spreadsheet files directly inside `root`.
pub fn list_files(root: &Path) -> SheetResult<Vec<String>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_document(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_plain_and_nested() {
        let root = Path::new("/data/books");
        assert_eq!(
            resolve(root, "report.xlsx").unwrap(),
            PathBuf::from("/data/books/report.xlsx")
        );
        assert_eq!(
            resolve(root, "./reports/q1.xlsx").unwrap(),
            PathBuf::from("/data/books/reports/q1.xlsx")
        );
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let root = Path::new("/data/books");
        for bad in ["../x.xlsx", "/etc/x.xlsx", "a/../../x.xlsx", "a/../b.xlsx"] {
            let err = resolve(root, bad).unwrap_err();
            assert!(matches!(err, SheetError::PathOutsideRoot(_)), "{}", bad);
        }
    }

    #[test]
    fn test_resolve_rejects_empty() {
        let root = Path::new("/data/books");
        assert!(matches!(
            resolve(root, ""),
            Err(SheetError::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve(root, "./"),
            Err(SheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_list_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xlsx", "a.XLSM", "notes.txt", "c.xls"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        assert_eq!(list_files(dir.path()).unwrap(), vec!["a.XLSM", "b.xlsx"]);
    }

    #[test]
    fn test_list_files_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_files(&dir.path().join("missing")).unwrap().is_empty());
    }
}
