//! Binary-level tests for the `hiit` command.
//!
//! Every test points `HIIT_HOME` at its own temporary directory, so no daemon
//! or user data is involved.

use assert_cmd::Command;
use predicates::prelude::*;

fn hiit(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hiit").unwrap();
    cmd.env("HIIT_HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

mod workout_commands {
    use super::*;

    #[test]
    fn test_list_empty_library() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["workout", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("保存されたワークアウトはありません"));
    }

    #[test]
    fn test_create_add_and_show() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["workout", "create", "Legs"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ワークアウト 'Legs' を作成しました"));

        hiit(&home)
            .args([
                "workout",
                "add-exercise",
                "legs",
                "Squat",
                "--sets",
                "2",
                "--work",
                "20",
                "--rest",
                "10",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("エクササイズ 'Squat' を保存しました"));

        hiit(&home)
            .args(["workout", "show", "Legs"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("1. Squat  2セット x ワーク20秒 / レスト10秒  [00:50]")
                    .and(predicate::str::contains("合計 (準備10秒を含む): 01:00")),
            );

        hiit(&home)
            .args(["workout", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Legs (1種目, 01:00)"));

        assert!(home.path().join("workouts.json").exists());
    }

    #[test]
    fn test_create_without_name_uses_default() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["workout", "create"])
            .assert()
            .success()
            .stdout(predicate::str::contains("'New workout'"));
    }

    #[test]
    fn test_rename_and_delete() {
        let home = tempfile::tempdir().unwrap();
        hiit(&home).args(["workout", "create", "Arms"]).assert().success();

        hiit(&home)
            .args(["workout", "rename", "Arms", "Upper body"])
            .assert()
            .success();
        hiit(&home)
            .args(["workout", "delete", "upper body"])
            .assert()
            .success()
            .stdout(predicate::str::contains("'Upper body' を削除しました"));

        hiit(&home)
            .args(["workout", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("保存されたワークアウトはありません"));
    }

    #[test]
    fn test_unknown_workout_fails() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["workout", "show", "nothing"])
            .assert()
            .failure()
            .code(1)
            .stderr(
                predicate::str::contains("エラー: ワークアウト 'nothing' が見つかりません")
                    .and(predicate::str::contains("hiit workout list")),
            );
    }

    #[test]
    fn test_out_of_range_sets_rejected() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["workout", "add-exercise", "Legs", "Squat", "--sets", "51"])
            .assert()
            .failure();
    }
}

mod history_command {
    use super::*;

    #[test]
    fn test_history_month_calendar() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join("history.json"),
            r#"["2026-10-01","2026-10-19","2026-11-02"]"#,
        )
        .unwrap();

        hiit(&home)
            .args(["history", "--month", "2026-10"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("2026年10月")
                    .and(predicate::str::contains(" 19*"))
                    .and(predicate::str::contains("完了日数: 2")),
            );
    }

    #[test]
    fn test_history_invalid_month() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["history", "--month", "2026-13"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("YYYY-MM"));
    }
}

mod daemon_commands {
    use super::*;

    #[test]
    fn test_status_without_daemon_fails() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .arg("status")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("'hiit daemon' を起動してください"));
    }

    #[test]
    fn test_start_workout_conflicts_with_quick_options() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["start", "--workout", "Legs", "--sets", "3"])
            .assert()
            .failure()
            .code(2);
    }
}

mod misc_commands {
    use super::*;

    #[test]
    fn test_completions() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hiit"));
    }

    #[test]
    fn test_no_command_prints_help() {
        let home = tempfile::tempdir().unwrap();

        hiit(&home)
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}
