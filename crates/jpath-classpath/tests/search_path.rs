use std::fs::File;
use std::io::Write;
use std::path::Path;

use jpath_classpath::{ClasspathError, PathEntry, SearchPath, PATH_SEPARATOR};
use tempfile::TempDir;
use zip::write::FileOptions;

fn write_file(root: &Path, name: &str, contents: &[u8]) {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn write_jar(path: &Path, files: &[(&str, &str)]) {
    let mut jar = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in files {
        jar.start_file(*name, FileOptions::<()>::default()).unwrap();
        jar.write_all(contents.as_bytes()).unwrap();
    }
    jar.finish().unwrap();
}

/// One stored entry, `p/Big.class` = `x`, whose central directory record
/// claims a zip64 uncompressed size close to `i64::MAX`.
fn write_oversized_jar(path: &Path) {
    const NAME: &[u8] = b"p/Big.class";
    const CRC_OF_X: u32 = 0x8cdc_1683;

    let u16s = |out: &mut Vec<u8>, values: &[u16]| {
        values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
    };
    let u32s = |out: &mut Vec<u8>, values: &[u32]| {
        values.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes()))
    };

    let mut out = Vec::new();
    u32s(&mut out, &[0x0403_4b50]);
    u16s(&mut out, &[20, 0, 0, 0, 0x21]);
    u32s(&mut out, &[CRC_OF_X, 1, 1]);
    u16s(&mut out, &[NAME.len() as u16, 0]);
    out.extend_from_slice(NAME);
    out.push(b'x');

    let central_start = out.len() as u32;
    u32s(&mut out, &[0x0201_4b50]);
    u16s(&mut out, &[45, 45, 0, 0, 0, 0x21]);
    u32s(&mut out, &[CRC_OF_X, 1, u32::MAX]);
    u16s(&mut out, &[NAME.len() as u16, 12, 0, 0, 0]);
    u32s(&mut out, &[0, 0]);
    out.extend_from_slice(NAME);
    u16s(&mut out, &[1, 8]);
    out.extend_from_slice(&0x7FFF_FFFF_FFFF_FF00u64.to_le_bytes());
    let central_len = out.len() as u32 - central_start;

    u32s(&mut out, &[0x0605_4b50]);
    u16s(&mut out, &[0, 0, 1, 1]);
    u32s(&mut out, &[central_len, central_start]);
    u16s(&mut out, &[0]);

    std::fs::write(path, out).unwrap();
}

fn join_path(segments: &[&Path]) -> String {
    segments
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(&PATH_SEPARATOR.to_string()[..])
}

#[test]
fn resolves_from_directory_and_jar() {
    let tmp = TempDir::new().unwrap();
    let dir_a = tmp.path().join("dirA");
    let jar_b = tmp.path().join("libB.jar");
    write_file(&dir_a, "com/x/Foo.class", b"foo");
    write_jar(&jar_b, &[("com/x/Bar.class", "bar")]);

    let path = SearchPath::new(&join_path(&[&dir_a, &jar_b]), None);
    assert_eq!(path.len(), 2);
    assert!(matches!(path.entries()[0], PathEntry::Dir(_)));
    assert!(matches!(path.entries()[1], PathEntry::Archive(_)));

    let foo = path.find_file("com/x/Foo.class").unwrap();
    assert_eq!(foo.name(), "Foo.class");
    assert!(!foo.is_archived());
    assert_eq!(foo.local_path(), Some(dir_a.join("com/x/Foo.class").as_path()));

    let bar = path.find_file("com/x/Bar.class").unwrap();
    assert_eq!(bar.name(), "Bar.class");
    assert!(bar.is_archived());
    assert_eq!(bar.read_bytes().unwrap(), b"bar");

    assert!(path.find_file("com/x/Missing.class").is_none());
    path.close();
}

#[test]
fn missing_directory_segment_never_errors() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");

    let path = SearchPath::new(&missing.display().to_string(), None);
    assert!(path.find_file("com/x/Foo.class").is_none());
    assert!(path.find_file("Foo.class").is_none());
    assert!(path.find_directory("com/x").is_none());
    assert!(path.list_files("com/x", ".class").is_empty());
    path.close();
}

#[test]
fn earlier_segment_wins() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first");
    let jar = tmp.path().join("second.jar");
    write_file(&first, "p/Dup.class", b"from-dir");
    write_jar(&jar, &[("p/Dup.class", "from-jar")]);

    let dir_first = SearchPath::new(&join_path(&[&first, &jar]), None);
    assert_eq!(
        dir_first.find_file("p/Dup.class").unwrap().read_bytes().unwrap(),
        b"from-dir"
    );

    let jar_first = SearchPath::new(&join_path(&[&jar, &first]), None);
    assert_eq!(
        jar_first.find_file("p/Dup.class").unwrap().read_bytes().unwrap(),
        b"from-jar"
    );
}

#[test]
fn repeated_lookups_agree() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "p/A.class", b"abc");
    let path = SearchPath::from_segments(&[tmp.path().to_str().unwrap()], None);

    let first = path.find_file("p/A.class").unwrap();
    let second = path.find_file("p/A.class").unwrap();
    assert_eq!(first.length(), second.length());
    assert_eq!(first.last_modified(), second.last_modified());
    assert_eq!(first.path(), second.path());
}

#[test]
fn list_files_deduplicates_by_name() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("classes");
    let jar = tmp.path().join("lib.jar");
    write_file(&dir, "p/A.class", b"dir-a");
    write_file(&dir, "p/B.class", b"dir-b");
    write_file(&dir, "p/readme.txt", b"text");
    write_jar(
        &jar,
        &[
            ("p/B.class", "jar-b"),
            ("p/C.class", "jar-c"),
            ("p/sub/D.class", "jar-d"),
        ],
    );

    let path = SearchPath::new(&join_path(&[&dir, &jar]), None);
    let files = path.list_files("p", ".class");
    let names: Vec<String> = files.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["A.class", "B.class", "C.class"]);

    // The collision on `p/B.class` resolves to the directory, like find_file.
    assert_eq!(files[1].read_bytes().unwrap(), b"dir-b");
    assert!(path.has_files("p", ".class"));
    assert!(!path.has_files("p", ".java"));
}

#[test]
fn directories_resolve_with_or_without_trailing_separator() {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "com/x/Foo.class", b"foo");
    let path = SearchPath::from_segments(&[tmp.path().to_str().unwrap()], None);

    assert!(path.find_directory("com/x").unwrap().is_directory());
    assert!(path.find_directory("com/x/").unwrap().is_directory());
    assert!(path.find_directory("com/y").is_none());
    assert!(path.find_directory("com/x/Foo.class").is_none());
}

#[test]
fn close_without_queries() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("lib.jar");
    write_jar(&jar, &[("A.class", "a")]);

    SearchPath::new(&join_path(&[tmp.path(), &jar]), None).close();
    SearchPath::new("", None).close();
}

#[test]
fn reading_after_close_fails() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("lib.jar");
    write_jar(&jar, &[("A.class", "a")]);

    let path = SearchPath::new(&jar.display().to_string(), None);
    let resource = path.find_file("A.class").unwrap();
    path.close();

    let err = resource.read_bytes().unwrap_err();
    assert!(matches!(err, ClasspathError::ArchiveClosed { .. }), "{err}");
}

#[test]
fn malformed_archive_falls_back_to_directory() {
    let tmp = TempDir::new().unwrap();
    let bogus = tmp.path().join("bogus.jar");
    std::fs::write(&bogus, b"definitely not a zip").unwrap();

    let path = SearchPath::new(&bogus.display().to_string(), None);
    assert!(matches!(path.entries()[0], PathEntry::Dir(_)));
    assert!(path.find_file("A.class").is_none());
    assert!(path.list_files("", ".class").is_empty());
}

#[cfg(unix)]
mod image {
    use std::os::unix::fs::symlink;
    use std::sync::Arc;

    use jpath_image::{ImageFileSystem, LocalImage};

    use super::*;

    fn fake_image(root: &Path) {
        write_file(root, "modules/java.base/java/lang/Object.class", b"object");
        write_file(root, "modules/java.base/java/lang/String.class", b"string");
        std::fs::create_dir_all(root.join("packages/java.lang")).unwrap();
        symlink(
            "../../modules/java.base",
            root.join("packages/java.lang/java.base"),
        )
        .unwrap();
    }

    #[test]
    fn image_entry_comes_last() {
        let tmp = TempDir::new().unwrap();
        let image_root = tmp.path().join("image");
        let classes = tmp.path().join("classes");
        fake_image(&image_root);
        write_file(&classes, "java/lang/Object.class", b"shadow");

        let image: Arc<dyn ImageFileSystem> = Arc::new(LocalImage::new(&image_root));
        let path = SearchPath::new(&classes.display().to_string(), Some(image));
        assert_eq!(path.len(), 2);
        assert!(matches!(path.entries()[1], PathEntry::Image(_)));

        // The class path shadows the image.
        let object = path.find_file("java/lang/Object.class").unwrap();
        assert_eq!(object.read_bytes().unwrap(), b"shadow");

        let string = path.find_file("java/lang/String.class").unwrap();
        assert_eq!(string.name(), "String.class");
        assert_eq!(string.path(), "jrt:/modules/java.base/java/lang/String.class");
        assert_eq!(string.read_bytes().unwrap(), b"string");

        assert!(path.find_directory("java/lang").is_some());
        assert!(path.find_file("java/util/List.class").is_none());

        let names: Vec<String> = path
            .list_files("java/lang", ".class")
            .iter()
            .map(|f| f.path())
            .collect();
        assert_eq!(
            names,
            vec![
                classes.join("java/lang/Object.class").display().to_string(),
                "jrt:/modules/java.base/java/lang/String.class".to_string(),
            ]
        );
        path.close();
    }
}

#[test]
fn oversized_declared_length_does_not_abort_reads() {
    let tmp = TempDir::new().unwrap();
    let jar = tmp.path().join("big.jar");
    write_oversized_jar(&jar);

    let path = SearchPath::new(&jar.display().to_string(), None);
    let big = path.find_file("p/Big.class").unwrap();
    assert_eq!(big.length(), 0x7FFF_FFFF_FFFF_FF00);

    match big.read_bytes() {
        Ok(bytes) => assert_eq!(bytes, b"x"),
        Err(ClasspathError::Io(_)) | Err(ClasspathError::Archive { .. }) => {}
        Err(err) => panic!("unexpected error: {err}"),
    }
    path.close();
}
