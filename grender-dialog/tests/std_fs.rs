use std::path::Path;

use grender_dialog::{FileSystem, StdFileSystem};

#[test]
fn std_fs_lists_direct_children_only() {
    let fs = StdFileSystem;
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("deep.txt"), b"x").unwrap();
    std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();

    let mut entries = fs.read_dir(dir.path()).unwrap();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let summary: Vec<(String, bool)> = entries
        .iter()
        .map(|e| (e.name.clone(), e.is_dir))
        .collect();
    assert_eq!(
        summary,
        vec![("a.txt".to_string(), false), ("sub".to_string(), true)]
    );
    assert!(entries.iter().all(|e| e.path.parent() == Some(dir.path())));
}

#[test]
fn std_fs_metadata_and_existence() {
    let fs = StdFileSystem;
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("a.txt");
    std::fs::write(&file, b"hello").unwrap();

    assert!(fs.metadata(dir.path()).unwrap().is_dir);
    assert!(!fs.metadata(&file).unwrap().is_dir);
    assert!(fs.exists(&file));
    assert!(!fs.is_dir(&file));
    assert!(!fs.exists(&dir.path().join("missing")));
    assert!(fs.read_dir(&dir.path().join("missing")).is_err());
}

#[cfg(unix)]
#[test]
fn std_fs_follows_directory_symlinks() {
    let fs = StdFileSystem;
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("real")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let entries = fs.read_dir(dir.path()).unwrap();
    let link = entries.iter().find(|e| e.name == "link").unwrap();
    assert!(link.is_dir);
    assert!(fs.is_dir(Path::new(&link.path)));
}
