use std::fs;
use std::path::Path;

const REQUIRED_MEMBERS: &[&str] = &[
    "crates/ct-paths",
    "crates/ct-headers",
    "crates/ct-license",
    "crates/ct-runner",
    "crates/ct-test-utils",
    "xtask",
];

#[test]
fn workspace_members_are_present() {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir
        .parent()
        .expect("xtask should live under the workspace root");
    let cargo_toml = workspace_root.join("Cargo.toml");
    let contents = fs::read_to_string(&cargo_toml)
        .unwrap_or_else(|err| panic!("failed to read {cargo_toml:?}: {err}"));

    for member in REQUIRED_MEMBERS {
        let quoted = format!("\"{member}\"");
        assert!(
            contents.contains(&quoted),
            "workspace missing member {member:?}"
        );
        assert!(
            workspace_root.join(member).join("Cargo.toml").is_file(),
            "member {member:?} has no manifest"
        );
    }
}
