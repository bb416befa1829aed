use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Write `bytes` to a sibling temp file, then rename it over `path`, so a
/// crash never leaves a truncated file under the final name.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&tmp, bytes)?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "download".to_string(),
    };
    p.set_file_name(format!(".{file_name}.part"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("abc.mp3");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!tmp_path(&target).exists());
    }
}
