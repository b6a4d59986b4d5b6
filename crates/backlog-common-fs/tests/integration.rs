use backlog_common_fs as fs;
use std::path::PathBuf;

#[test]
fn test_path_normalization() {
    let test_cases = vec![
        ("./a/b/../c", "a/c"),
        ("a/./b", "a/b"),
        ("a/../b", "b"),
        ("../../a/b", "../../a/b"),
        ("", "."),
        (".", "."),
    ];

    for (input, expected) in test_cases {
        let normalized = fs::path::normalize(input);
        assert_eq!(normalized, PathBuf::from(expected), "Failed for input: {}", input);
    }
}

#[test]
fn test_absolutize_relative_and_absolute() {
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(
        fs::path::absolutize("projects/./x/..").unwrap(),
        cwd.join("projects")
    );

    let temp = tempfile::tempdir().unwrap();
    let abs = temp.path().join("projects");
    assert_eq!(fs::path::absolutize(&abs).unwrap(), fs::path::normalize(&abs));
}

#[test]
fn test_write_then_list() {
    let temp = tempfile::tempdir().unwrap();
    fs::write_string_atomic(temp.path().join("issues/2_O_b.md"), "b").unwrap();
    fs::write_string_atomic(temp.path().join("issues/1_O_a.md"), "a").unwrap();

    let files = fs::list_markdown_files(temp.path().join("issues")).unwrap();
    let names: Vec<_> = files.iter().map(fs::file_name).collect();
    assert_eq!(names, vec!["1_O_a.md", "2_O_b.md"]);
    assert_eq!(fs::read_to_string(&files[0]).unwrap(), "a");
}
