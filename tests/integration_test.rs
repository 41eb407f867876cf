use serde_json::Value;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Helper struct to manage test environment
struct TestEnv {
    _temp_dir: TempDir,
    work_dir: PathBuf,
    binary_path: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let work_dir = temp_dir.path().to_path_buf();

        Self {
            _temp_dir: temp_dir,
            work_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_sw")),
        }
    }

    /// An initialized environment.
    fn init() -> Self {
        let env = Self::new();
        env.run(&["init"]).expect("Init failed");
        env
    }

    /// Run an sw command and return the output
    fn run(&self, args: &[&str]) -> Result<String, String> {
        let output = Command::new(&self.binary_path)
            .args(args)
            .current_dir(&self.work_dir)
            .env_remove("SHELFWISE_DIR")
            .env_remove("SHELFWISE_OWNER")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute sw command");

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).to_string())
        }
    }

    /// Run a command with `--json` appended and parse stdout.
    fn run_json(&self, args: &[&str]) -> Value {
        let mut args = args.to_vec();
        args.push("--json");
        let output = self
            .run(&args)
            .unwrap_or_else(|e| panic!("{args:?} failed: {e}"));
        serde_json::from_str(&output).expect("Output should be valid JSON")
    }

    /// Add a book and return its ID.
    fn add_book(&self, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["book", "add", title, "--author", "Anon"];
        args.extend_from_slice(extra);
        let json = self.run_json(&args);
        json["book"]["id"]
            .as_str()
            .expect("book id in output")
            .to_string()
    }

    fn data_dir_exists(&self) -> bool {
        self.work_dir.join(".shelfwise").is_dir()
    }
}

#[test]
fn test_init_creates_data_directory() {
    let env = TestEnv::new();

    assert!(!env.data_dir_exists());

    let output = env.run(&["init"]).expect("Init command failed");
    assert!(output.contains("Initialized shelfwise"));
    assert!(env.data_dir_exists());
}

#[test]
fn test_init_is_idempotent() {
    let env = TestEnv::new();

    env.run(&["init"]).expect("First init failed");
    let output = env.run(&["init"]).expect("Second init failed");

    assert!(output.contains("already initialized"));
}

#[test]
fn test_init_stealth_adds_gitignore_entry() {
    let env = TestEnv::new();
    std::fs::create_dir(env.work_dir.join(".git")).unwrap();

    let output = env.run(&["init", "--stealth"]).expect("Init failed");
    assert!(output.contains("Added .shelfwise to .gitignore"));

    let gitignore = std::fs::read_to_string(env.work_dir.join(".gitignore")).unwrap();
    assert!(gitignore.lines().any(|l| l == ".shelfwise"));
}

#[test]
fn test_commands_fail_without_init() {
    let env = TestEnv::new();

    let result = env.run(&["book", "list"]);
    assert!(result.is_err(), "Commands should fail without init");
    assert!(result.unwrap_err().contains("not initialized"));
}

#[test]
fn test_commands_work_from_subdirectory() {
    let env = TestEnv::init();
    env.add_book("Dune", &[]);

    let sub = env.work_dir.join("notes/2024");
    std::fs::create_dir_all(&sub).unwrap();

    let output = Command::new(&env.binary_path)
        .args(["book", "list"])
        .current_dir(&sub)
        .env_remove("SHELFWISE_DIR")
        .env_remove("SHELFWISE_OWNER")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Dune"));
}

#[test]
fn test_add_list_and_search_books() {
    let env = TestEnv::init();

    let output = env.run(&["book", "list"]).expect("List failed");
    assert!(output.contains("No books found"));

    let output = env
        .run(&["book", "add", "Dune", "--author", "Frank Herbert", "--genre", "SF"])
        .expect("Add failed");
    assert!(output.contains("Added book:"));

    let book_id = output
        .lines()
        .find(|line| line.contains("Added book:"))
        .and_then(|line| line.split_whitespace().nth(2))
        .expect("Could not extract book ID");
    assert_eq!(book_id.len(), 8, "Book ID should be 8 characters");

    env.add_book("Emma", &["--genre", "Classic"]);

    let books = env.run_json(&["book", "list"]);
    assert_eq!(books.as_array().unwrap().len(), 2);

    let found = env.run_json(&["book", "search", "herbert"]);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], book_id);
}

#[test]
fn test_duplicate_title_rejected_and_deleted_title_restored() {
    let env = TestEnv::init();
    let id = env.add_book("Dune", &[]);

    let err = env
        .run(&["book", "add", "Dune", "--author", "Anon"])
        .unwrap_err();
    assert!(err.contains("already exists"));

    env.run(&["book", "delete", &id]).expect("Delete failed");
    let deleted = env.run_json(&["book", "list", "--deleted"]);
    assert_eq!(deleted[0]["id"], id.as_str());

    let output = env.run(&["book", "add", "Dune"]).expect("Re-add failed");
    assert!(output.contains("Restored book:"));
    assert!(output.contains(&id));

    let books = env.run_json(&["book", "list"]);
    assert_eq!(books.as_array().unwrap().len(), 1);
}

#[test]
fn test_purge_removes_old_deletions_only() {
    let env = TestEnv::init();
    let id = env.add_book("Dune", &[]);
    env.add_book("Emma", &[]);
    env.run(&["book", "delete", &id]).expect("Delete failed");

    // Deleted moments ago: the default 30-day window keeps it.
    let purged = env.run_json(&["book", "purge"]);
    assert!(purged.as_array().unwrap().is_empty());
    assert_eq!(env.run_json(&["book", "list", "--deleted"]).as_array().unwrap().len(), 1);

    let purged = env.run_json(&["book", "purge", "--days", "0"]);
    assert_eq!(purged[0]["id"], id.as_str());
    assert!(env.run_json(&["book", "list", "--deleted"]).as_array().unwrap().is_empty());
    assert_eq!(env.run_json(&["book", "list"]).as_array().unwrap().len(), 1);
    assert!(!env.work_dir.join(format!(".shelfwise/local/books/{id}.toml")).exists());

    let err = env.run(&["book", "restore", &id]).unwrap_err();
    assert!(err.contains("Book not found"));

    // The title is free again.
    env.add_book("Dune", &[]);
}

#[test]
fn test_rename_to_existing_title_rejected() {
    let env = TestEnv::init();
    env.add_book("Dune", &[]);
    let emma = env.add_book("Emma", &[]);

    let err = env
        .run(&["book", "update", &emma, "--title", "Dune"])
        .unwrap_err();
    assert!(err.contains("already exists"));
}

#[test]
fn test_unknown_book_suggests_similar_id() {
    let env = TestEnv::init();
    let id = env.add_book("Dune", &[]);
    let typo = format!("{}~", &id[..7]);

    let err = env.run(&["book", "finish", &typo]).unwrap_err();
    assert!(err.contains(&format!("Book not found: {typo}")));
    assert!(err.contains(&format!("Did you mean: {id}")));
}

#[test]
fn test_owners_are_isolated() {
    let env = TestEnv::init();
    env.add_book("Dune", &[]);

    let books = env.run_json(&["book", "list", "--owner", "bob"]);
    assert!(books.as_array().unwrap().is_empty());

    let err = env.run(&["book", "list", "--owner", "../evil"]).unwrap_err();
    assert!(err.contains("Invalid owner"));
}

#[test]
fn test_settings_validation() {
    let env = TestEnv::init();

    let settings = env.run_json(&["settings", "show"]);
    assert_eq!(settings["goal_interval"], "yearly");

    let settings = env.run_json(&["settings", "set", "--interval", "weekly", "--excluded-days", "6,0"]);
    assert_eq!(settings["goal_interval"], "weekly");
    assert_eq!(settings["excluded_days"], serde_json::json!([0, 6]));

    assert!(env.run(&["settings", "set", "--interval", "hourly"]).is_err());
    let err = env.run(&["settings", "set", "--excluded-days", "7"]).unwrap_err();
    assert!(err.contains("Invalid excluded day"));
}

#[test]
fn test_reading_goal() {
    let env = TestEnv::init();

    let goal = env.run_json(&["goal", "show"]);
    assert_eq!(goal["reading_goal"], 0);

    let output = env.run(&["goal", "set", "12"]).expect("Set failed");
    assert!(output.contains("Reading goal set: 12"));

    let goal = env.run_json(&["goal", "show"]);
    assert_eq!(goal["reading_goal"], 12);
    assert_eq!(goal["goal_interval"], "yearly");
}

#[test]
fn test_stats_empty() {
    let env = TestEnv::init();

    let stats = env.run_json(&["goal", "stats"]);
    assert_eq!(stats["current_goal_streak"], 0);
    assert_eq!(stats["longest_goal_streak"], 0);
    assert_eq!(stats["total_goals_set"], 0);
    assert_eq!(stats["total_goals_met"], 0);
    assert_eq!(stats["goal_completion_rate"], 0.0);
    assert_eq!(stats["average_overshoot"], 0.0);
    assert_eq!(stats["best_interval"], "");
    assert!(stats["last_goal_met"].is_null());
}

#[test]
fn test_recorded_goals_feed_stats() {
    let env = TestEnv::init();

    let record = |interval: &str, target: &str, achieved: &str, start: &str, end: &str| {
        env.run_json(&[
            "goal", "record", "--interval", interval, "--target", target, "--achieved", achieved,
            "--start", start, "--end", end,
        ])
    };

    let first = record("weekly", "10", "8", "2024-05-01T00:00:00Z", "2024-05-07T00:00:00Z");
    assert_eq!(first["was_completed"], false);
    record("daily", "5", "6", "2024-05-13T00:00:00Z", "2024-05-14T00:00:00Z");
    record("daily", "5", "7", "2024-05-14T00:00:00Z", "2024-05-15T00:00:00Z");

    let history = env.run_json(&["goal", "history"]);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0]["interval"], "weekly");

    let stats = env.run_json(&["goal", "stats"]);
    assert_eq!(stats["current_goal_streak"], 2);
    assert_eq!(stats["longest_goal_streak"], 2);
    assert_eq!(stats["total_goals_set"], 3);
    assert_eq!(stats["total_goals_met"], 2);
    let rate = stats["goal_completion_rate"].as_f64().unwrap();
    assert!((rate - 66.67).abs() < 0.01);
    assert_eq!(stats["best_interval"], "daily");
    assert_eq!(stats["last_goal_met"], "2024-05-15T00:00:00Z");

    let output = env.run(&["goal", "stats"]).expect("Stats failed");
    assert!(output.contains("Current streak: 2"));
    assert!(output.contains("Goals met: 2/3 (66.67%)"));
}

// Same-instant records must not make stats depend on load order.
#[test]
fn test_stats_repeatable_with_shared_end_date() {
    let env = TestEnv::init();
    for achieved in ["1", "0"] {
        env.run(&[
            "goal", "record", "--interval", "daily", "--target", "1", "--achieved", achieved,
            "--start", "2024-01-01T00:00:00Z", "--end", "2024-01-01T23:59:59Z",
        ])
        .expect("Record failed");
    }

    let first = env.run_json(&["goal", "stats"]);
    let history = env.run_json(&["goal", "history"]);
    for _ in 0..10 {
        assert_eq!(env.run_json(&["goal", "stats"]), first);
        assert_eq!(env.run_json(&["goal", "history"]), history);
    }
}

#[test]
fn test_record_rejects_unknown_interval() {
    let env = TestEnv::init();
    let result = env.run(&[
        "goal", "record", "--interval", "fortnightly", "--target", "1", "--achieved", "1",
        "--start", "2024-05-01T00:00:00Z", "--end", "2024-05-02T00:00:00Z",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_finishing_books_records_goal_intervals() {
    let env = TestEnv::init();
    env.run(&["settings", "set", "--interval", "daily"]).unwrap();
    env.run(&["goal", "set", "2"]).unwrap();

    // Day one: one book finished on add, a second finished later that day.
    let added = env.run_json(&[
        "book", "add", "Dune", "--author", "Anon", "--finished-at", "2024-06-01T09:00:00Z",
    ]);
    assert_eq!(added["goal_record"]["achieved"], 1);
    assert_eq!(added["goal_record"]["was_completed"], false);

    let id = env.add_book("Emma", &[]);
    let finished = env.run_json(&["book", "finish", &id, "--at", "2024-06-01T18:00:00Z"]);
    assert_eq!(finished["goal_record"]["interval"], "daily");
    assert_eq!(finished["goal_record"]["achieved"], 2);
    assert_eq!(finished["goal_record"]["was_completed"], true);
    assert_eq!(finished["goal_record"]["start_date"], "2024-06-01T00:00:00Z");

    // Finishing again does not record another interval.
    let again = env.run_json(&["book", "finish", &id, "--at", "2024-06-01T19:00:00Z"]);
    assert!(again["goal_record"].is_null());

    let stats = env.run_json(&["goal", "stats"]);
    assert_eq!(stats["total_goals_set"], 2);
    assert_eq!(stats["total_goals_met"], 1);
    assert_eq!(stats["current_goal_streak"], 1);
    assert_eq!(stats["last_goal_met"], "2024-06-01T18:00:00Z");
}

#[test]
fn test_shelfwise_dir_env_overrides_discovery() {
    let env = TestEnv::new();
    let elsewhere = TempDir::new().unwrap();

    let output = Command::new(&env.binary_path)
        .args(["book", "list"])
        .current_dir(&env.work_dir)
        .env("SHELFWISE_DIR", elsewhere.path())
        .env_remove("SHELFWISE_OWNER")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No books found"));
}

#[test]
fn test_prep_prints_guide() {
    let env = TestEnv::new();
    let output = env.run(&["prep"]).expect("Prep failed");
    assert!(output.contains("## sw preparation"));
}
