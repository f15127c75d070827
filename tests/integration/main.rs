//! Integration tests for Scrapyard

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A project directory and a yard next to it
    struct Sandbox {
        dir: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let sandbox = Self {
                dir: TempDir::new().unwrap(),
            };
            fs::create_dir_all(sandbox.project()).unwrap();
            sandbox
        }

        fn project(&self) -> PathBuf {
            self.dir.path().join("project")
        }

        fn yard(&self) -> PathBuf {
            self.dir.path().join("yard")
        }

        fn write(&self, rel: &str, contents: &str) {
            let path = self.project().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        /// The binary with no yard chosen
        fn bare(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("scrapyard");
            cmd.current_dir(self.project())
                .env("SCRAPYARD_CONFIG", self.dir.path().join("absent.toml"))
                .env_remove("SCRAPYARD_YARD")
                .env_remove("RUST_LOG");
            cmd
        }

        fn scrapyard(&self) -> Command {
            let mut cmd = self.bare();
            cmd.arg("-y").arg(self.yard());
            cmd
        }

        fn broken_config(&self) -> PathBuf {
            let path = self.dir.path().join("broken.toml");
            fs::write(&path, "[yard\npath = ").unwrap();
            path
        }
    }

    fn yard_entries(yard: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(yard)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("scrapyard")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("build artifact cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("scrapyard")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("scrapyard"));
    }

    #[test]
    fn store_then_search_restores_paths() {
        let sandbox = Sandbox::new();
        sandbox.write("VERSION", "1.2.3\n");
        sandbox.write("dist/app.js", "bundle");
        sandbox.write("dist/css/site.css", "body {}");

        sandbox
            .scrapyard()
            .args(["store", "-k", "build-#{./VERSION}", "-p", "dist/"])
            .assert()
            .success();

        assert_eq!(
            yard_entries(&sandbox.yard()),
            vec!["build-7504b4202587c6a675b7b43132954cbdfa403a90.tgz"]
        );

        fs::remove_dir_all(sandbox.project().join("dist")).unwrap();

        sandbox
            .scrapyard()
            .args(["search", "-k", "build-#{./VERSION}", "-p", "dist/"])
            .assert()
            .success();

        let dist = sandbox.project().join("dist");
        assert_eq!(fs::read_to_string(dist.join("app.js")).unwrap(), "bundle");
        assert_eq!(fs::read_to_string(dist.join("css/site.css")).unwrap(), "body {}");
    }

    #[test]
    fn search_falls_back_to_later_key() {
        let sandbox = Sandbox::new();
        sandbox.write("vendor/gem.rb", "gem");

        sandbox
            .scrapyard()
            .args(["dump", "-k", "gems", "--", "vendor"])
            .assert()
            .success();
        fs::remove_dir_all(sandbox.project().join("vendor")).unwrap();

        sandbox
            .scrapyard()
            .args(["search", "-k", "gems-#{Gemfile.lock},gems", "-p", "vendor"])
            .assert()
            .success();

        assert!(sandbox.project().join("vendor/gem.rb").is_file());
    }

    #[test]
    fn search_miss_exits_one() {
        let sandbox = Sandbox::new();

        sandbox
            .scrapyard()
            .args(["search", "-k", "nothing,here"])
            .assert()
            .code(1);

        assert!(sandbox.yard().is_dir());
    }

    #[test]
    fn corrupt_scrap_exits_255() {
        let sandbox = Sandbox::new();
        fs::create_dir_all(sandbox.yard()).unwrap();
        fs::write(sandbox.yard().join("broken.tgz"), "not a tarball").unwrap();

        sandbox
            .scrapyard()
            .args(["search", "-k", "broken"])
            .assert()
            .code(255)
            .stderr(predicate::str::contains("Failed to extract"));
    }

    #[test]
    fn store_without_paths_fails() {
        let sandbox = Sandbox::new();

        sandbox
            .scrapyard()
            .args(["store", "-k", "npm"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("store requires paths"));
    }

    #[test]
    fn store_missing_path_fails() {
        let sandbox = Sandbox::new();

        sandbox
            .scrapyard()
            .args(["store", "-k", "npm", "-p", "node_modules"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Path not found"));

        assert!(yard_entries(&sandbox.yard()).is_empty());
    }

    #[test]
    fn junk_removes_only_named_scrap() {
        let sandbox = Sandbox::new();
        sandbox.write("a.txt", "a");
        for key in ["npm", "npm-old"] {
            sandbox
                .scrapyard()
                .args(["store", "-k", key, "-p", "a.txt"])
                .assert()
                .success();
        }

        sandbox
            .scrapyard()
            .args(["junk", "-k", "npm,missing"])
            .assert()
            .success();

        assert_eq!(yard_entries(&sandbox.yard()), vec!["npm-old.tgz"]);
    }

    #[test]
    fn junk_missing_key_succeeds() {
        let sandbox = Sandbox::new();

        sandbox
            .scrapyard()
            .args(["junk", "-k", "ghost"])
            .assert()
            .success();
    }

    #[test]
    fn crush_keeps_fresh_scrap() {
        let sandbox = Sandbox::new();
        sandbox.write("a.txt", "a");
        sandbox
            .scrapyard()
            .args(["store", "-k", "fresh", "-p", "a.txt"])
            .assert()
            .success();

        sandbox.scrapyard().arg("crush").assert().success();

        assert_eq!(yard_entries(&sandbox.yard()), vec!["fresh.tgz"]);
    }

    #[test]
    fn keys_are_required() {
        let sandbox = Sandbox::new();

        sandbox.scrapyard().arg("search").assert().failure();
    }

    #[test]
    fn store_parent_dir_path_round_trips() {
        let sandbox = Sandbox::new();
        sandbox.write("../shared/notes.txt", "notes");

        sandbox
            .scrapyard()
            .args(["store", "-k", "shared", "-p", "../shared"])
            .assert()
            .success();

        sandbox
            .scrapyard()
            .args(["search", "-k", "shared", "-p", "../shared"])
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(sandbox.project().join("shared/notes.txt")).unwrap(),
            "notes"
        );
    }

    #[test]
    fn keys_keep_surrounding_spaces() {
        let sandbox = Sandbox::new();
        sandbox.write("a.txt", "a");

        sandbox
            .scrapyard()
            .args(["store", "-k", " npm", "-p", "a.txt"])
            .assert()
            .success();

        assert_eq!(yard_entries(&sandbox.yard()), vec![" npm.tgz"]);
    }

    #[test]
    fn junk_and_crush_ignore_invalid_yard() {
        let sandbox = Sandbox::new();

        sandbox
            .bare()
            .args(["junk", "-y", "", "-k", "npm"])
            .assert()
            .success();
        sandbox.bare().args(["crush", "-y", "s3://"]).assert().success();
        sandbox
            .bare()
            .args(["search", "-y", "", "-k", "npm"])
            .assert()
            .code(2);
    }

    #[test]
    fn junk_and_crush_ignore_broken_config() {
        let sandbox = Sandbox::new();
        let config = sandbox.broken_config();

        sandbox
            .scrapyard()
            .env("SCRAPYARD_CONFIG", &config)
            .args(["junk", "-k", "npm"])
            .assert()
            .success();
        sandbox
            .scrapyard()
            .env("SCRAPYARD_CONFIG", &config)
            .arg("crush")
            .assert()
            .success();
        sandbox
            .scrapyard()
            .env("SCRAPYARD_CONFIG", &config)
            .args(["search", "-k", "npm"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
