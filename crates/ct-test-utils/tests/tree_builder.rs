use std::fs;

use ct_test_utils::{EnvGuard, TreeBuilder, env_lock};

#[test]
fn builds_files_and_empty_dirs() {
    let tree = TreeBuilder::new()
        .expect("tree builder")
        .file("src/catch2/catch_all.hpp", "#include <catch2/catch_test_macros.hpp>\n")
        .dir("src/catch2/empty")
        .build()
        .expect("tree");

    let header = tree.path("src/catch2/catch_all.hpp");
    assert!(
        fs::read_to_string(&header)
            .expect("read header")
            .contains("catch_test_macros")
    );
    assert!(tree.path("src/catch2/empty").is_dir());
}

#[test]
fn rejects_paths_escaping_the_root() {
    let result = TreeBuilder::new()
        .expect("tree builder")
        .file("../outside.hpp", "")
        .build();
    let err = result.err().expect("escaping path should fail");
    assert!(err.to_string().contains("must be relative"), "{err}");
}

#[test]
fn write_and_remove_after_build() {
    let tree = TreeBuilder::new()
        .expect("tree builder")
        .file("a.hpp", "")
        .build()
        .expect("tree");

    tree.write("nested/b.hpp", "// b\n").expect("write");
    assert!(tree.path("nested/b.hpp").is_file());

    tree.remove("a.hpp").expect("remove");
    assert!(!tree.path("a.hpp").exists());
}

#[cfg(unix)]
#[test]
fn scripts_are_executable() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TreeBuilder::new()
        .expect("tree builder")
        .script("bin/SelfTest", "echo hello")
        .build()
        .expect("tree");

    let mode = fs::metadata(tree.path("bin/SelfTest"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn env_guard_restores_previous_value() {
    let _lock = env_lock();
    let key = "CT_TEST_UTILS_GUARD";
    {
        let _outer = EnvGuard::set(key, Some("outer"));
        {
            let _inner = EnvGuard::set(key, Some("inner"));
            assert_eq!(std::env::var(key).as_deref(), Ok("inner"));
        }
        assert_eq!(std::env::var(key).as_deref(), Ok("outer"));
    }
    assert!(std::env::var(key).is_err());
}
