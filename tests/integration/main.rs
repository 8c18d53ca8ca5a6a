//! Integration tests for relink

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Temp tree with an isolated config and change log
    struct Sandbox {
        temp: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("home/Desktop")).unwrap();
            fs::create_dir_all(temp.path().join("v2/data")).unwrap();
            fs::write(temp.path().join("v2/data/report.docx"), b"report").unwrap();

            let sandbox = Self { temp };
            fs::write(
                sandbox.config(),
                format!(
                    "[general]\nchange_log_path = {:?}\n\n[volumes]\nexclude = []\n",
                    sandbox.path("changes.log").display().to_string()
                ),
            )
            .unwrap();
            sandbox
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.temp.path().join(rel)
        }

        fn config(&self) -> PathBuf {
            self.path("config.toml")
        }

        fn relink(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("relink");
            cmd.env_remove("RELINK_CONFIG")
                .arg("--config")
                .arg(self.config());
            cmd
        }

        fn desktop(&self, name: &str, exec: &Path) -> PathBuf {
            let path = self.path("home/Desktop").join(name);
            fs::write(
                &path,
                format!(
                    "[Desktop Entry]\nType=Application\nName=Report\nExec={}\n",
                    exec.display()
                ),
            )
            .unwrap();
            path
        }
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("relink")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Repair broken shortcuts"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("relink")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("relink"));
    }

    #[test]
    fn locate_finds_file() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["locate", "report.docx", "--volume"])
            .arg(sb.path("v2"))
            .assert()
            .success()
            .stdout(predicate::str::contains(
                sb.path("v2/data/report.docx").display().to_string(),
            ));
    }

    #[test]
    fn locate_reports_missing_file() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["locate", "missing.txt", "--volume"])
            .arg(sb.path("v2"))
            .assert()
            .success()
            .stdout(predicate::str::contains("not found"));
    }

    #[test]
    fn locate_rejects_paths() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["locate", "data/report.docx", "--volume"])
            .arg(sb.path("v2"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid basename"));
    }

    #[test]
    fn locate_without_volumes_fails() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["locate", "report.docx", "--volume"])
            .arg(sb.path("v2"))
            .arg("--exclude")
            .arg(sb.path("v2"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("No volumes to search"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn volumes_plain_lists_configured_roots() {
        let sb = Sandbox::new();
        fs::write(
            sb.config(),
            format!(
                "[volumes]\ninclude = [{:?}, {:?}]\n",
                sb.path("v1").display().to_string(),
                sb.path("v2").display().to_string()
            ),
        )
        .unwrap();

        sb.relink()
            .args(["volumes", "--format", "plain", "--exclude"])
            .arg(sb.path("v1"))
            .assert()
            .success()
            .stdout(predicate::str::contains(sb.path("v2").display().to_string()))
            .stdout(predicate::str::contains(sb.path("v1").display().to_string()).not());
    }

    #[test]
    fn volumes_json_is_parseable() {
        let sb = Sandbox::new();
        let output = sb
            .relink()
            .args(["volumes", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["source"], "discovered");
        assert!(json["searched"].is_array());
    }

    #[test]
    fn fix_dry_run_leaves_shortcuts_alone() {
        let sb = Sandbox::new();
        let shortcut = sb.desktop("report.desktop", &sb.path("old/report.docx"));
        let before = fs::read_to_string(&shortcut).unwrap();

        sb.relink()
            .arg("fix")
            .arg(sb.path("home"))
            .arg("--volume")
            .arg(sb.path("v2"))
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains("would change"));

        assert_eq!(fs::read_to_string(&shortcut).unwrap(), before);
        assert!(!sb.path("changes.log").exists());
    }

    #[test]
    fn fix_repairs_desktop_entry() {
        let sb = Sandbox::new();
        let shortcut = sb.desktop("report.desktop", &sb.path("old/report.docx"));

        sb.relink()
            .arg("fix")
            .arg(sb.path("home"))
            .arg("--volume")
            .arg(sb.path("v2"))
            .arg("-y")
            .assert()
            .success()
            .stdout(predicate::str::contains("Repaired: 1"));

        let content = fs::read_to_string(&shortcut).unwrap();
        assert!(content.contains(&format!(
            "Exec={}",
            sb.path("v2/data/report.docx").display()
        )));

        let log = fs::read_to_string(sb.path("changes.log")).unwrap();
        assert!(log.contains("shortcut.repaired"));
        assert!(log.contains("Changed "));
    }

    #[cfg(unix)]
    #[test]
    fn fix_repairs_dangling_symlink() {
        let sb = Sandbox::new();
        let link = sb.path("home/report.docx");
        std::os::unix::fs::symlink(sb.path("old/report.docx"), &link).unwrap();

        sb.relink()
            .arg("fix")
            .arg(sb.path("home"))
            .arg("--volume")
            .arg(sb.path("v2"))
            .args(["--symlinks", "-y"])
            .assert()
            .success();

        assert_eq!(fs::read_link(&link).unwrap(), sb.path("v2/data/report.docx"));
    }

    #[test]
    fn fix_reports_unresolved() {
        let sb = Sandbox::new();
        sb.desktop("gone.desktop", &sb.path("old/missing.txt"));

        sb.relink()
            .arg("fix")
            .arg(sb.path("home"))
            .arg("--volume")
            .arg(sb.path("v2"))
            .arg("-y")
            .assert()
            .success()
            .stdout(predicate::str::contains("no replacement"));

        let log = fs::read_to_string(sb.path("changes.log")).unwrap();
        assert!(log.contains("shortcut.unresolved"));
    }

    #[test]
    fn fix_missing_root_fails() {
        let sb = Sandbox::new();
        sb.relink()
            .arg("fix")
            .arg(sb.path("nowhere"))
            .arg("--volume")
            .arg(sb.path("v2"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Path not found"));
    }

    #[test]
    fn config_path_follows_flag() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["config", "set", "locate.timeout_secs", "45"])
            .assert()
            .success();

        sb.relink()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_secs = 45"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let sb = Sandbox::new();
        sb.relink()
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn completions_generate() {
        cargo_bin_cmd!("relink")
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("relink"));
    }
}
