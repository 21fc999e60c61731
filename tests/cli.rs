use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const PUZZLE: &str = "1 2 3\n4 5 6\n- 7 8\n";
const MAZE: &str = "X.XXX\nX.XXX\nX...X\nX.X.X\nXXX.X\n";
const NUMBERLINK: &str = "A.B\n...\nA.B\n";

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_parastar"))
}

fn write_instance(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).expect("Failed to write instance");
    path
}

fn run(args: &[&str], file: Option<&Path>) -> Output {
    let mut command = Command::new(get_binary_path());
    command.args(args).env_remove("RUST_LOG");
    if let Some(file) = file {
        command.arg(file);
    }
    command.output().expect("Failed to execute parastar")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_puzzle_sequential() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "puzzle.txt", PUZZLE);

    let stdout = stdout_of(&run(&["puzzle"], Some(&file)));
    assert!(stdout.contains("Method: sequential"));
    assert!(stdout.contains("Result: solution found, cost: 2"));
    assert!(stdout.contains("- States expanded:"));
    assert!(!stdout.contains("Worker #"));
}

#[test]
fn test_puzzle_parallel_reports_workers() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "puzzle.txt", PUZZLE);

    let stdout = stdout_of(&run(&["puzzle", "-n", "3"], Some(&file)));
    assert!(stdout.contains("Method: parallel, best solution"));
    assert!(stdout.contains("Result: solution found, cost: 2"));
    assert!(stdout.contains("Worker #1"));
    assert!(stdout.contains("Worker #3"));
    assert!(!stdout.contains("Worker #4"));

    let stdout = stdout_of(&run(&["puzzle", "-n", "2", "-p"], Some(&file)));
    assert!(stdout.contains("Method: parallel, first solution"));
}

#[test]
fn test_csv_line() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "puzzle.txt", PUZZLE);

    let stdout = stdout_of(&run(&["puzzle", "-r"], Some(&file)));
    let line = stdout.trim_end();
    assert_eq!(line.lines().count(), 1);

    let fields: Vec<&str> = line.split(';').collect();
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[0], "\"yes\"");
    assert_eq!(fields[1], "2");
    assert!(fields[9].parse::<f64>().is_ok());
}

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "maze.txt", MAZE);

    let stdout = stdout_of(&run(&["maze", "--json", "-n", "2"], Some(&file)));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["solution"]["cost"], 6);
    assert_eq!(value["statistics"]["algorithm"], "parallel");
    assert_eq!(value["statistics"]["workers"].as_array().unwrap().len(), 2);
}

#[test]
fn test_maze_show_solution() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "maze.txt", MAZE);

    let stdout = stdout_of(&run(&["maze", "-s"], Some(&file)));
    assert!(stdout.contains("Result: solution found, cost: 6"));
    assert!(stdout.contains("Solution (6 steps):"));
    assert!(stdout.contains("XoXXX\nXoXXX\nXoooX\nX.XoX\nXXXoX\n"));
}

#[test]
fn test_numberlink_show_solution() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "link.txt", NUMBERLINK);

    let stdout = stdout_of(&run(&["numberlink", "-s", "-n", "2"], Some(&file)));
    assert!(stdout.contains("Result: solution found, cost: 4"));
    assert!(stdout.contains("A.B\na.b\nA.B\n"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&["puzzle"], Some(&dir.path().join("missing.txt")));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_instance_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_instance(&dir, "puzzle.txt", "1 2 3\n4 5 6\n7 8 9\n");

    let output = run(&["puzzle"], Some(&file));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_generate_then_solve() {
    let dir = TempDir::new().unwrap();
    let puzzle = dir.path().join("puzzle.txt");
    let maze = dir.path().join("maze.txt");

    let output = run(
        &["generate", "puzzle", "--moves", "20", "--seed", "5", "-o"],
        Some(&puzzle),
    );
    stdout_of(&output);
    let stdout = stdout_of(&run(&["puzzle", "-n", "2"], Some(&puzzle)));
    assert!(stdout.contains("Result: solution found"));

    let output = run(
        &[
            "generate", "maze", "--width", "15", "--height", "9", "--seed", "5", "-o",
        ],
        Some(&maze),
    );
    stdout_of(&output);
    let text = fs::read_to_string(&maze).unwrap();
    assert_eq!(text.lines().count(), 9);
    assert!(text.lines().all(|line| line.len() == 15));

    let stdout = stdout_of(&run(&["maze"], Some(&maze)));
    assert!(stdout.contains("Result: solution found"));
}

#[test]
fn test_generate_to_stdout_is_seeded() {
    let first = stdout_of(&run(&["generate", "puzzle", "--seed", "9"], None));
    let second = stdout_of(&run(&["generate", "puzzle", "--seed", "9"], None));
    assert_eq!(first, second);
    assert_eq!(first.split_whitespace().count(), 9);
}

#[test]
fn test_generate_maze_even_size_rounds_up() {
    let args = [
        "generate", "maze", "--width", "20", "--height", "10", "--seed", "1",
    ];
    let text = stdout_of(&run(&args, None));
    assert_eq!(text.lines().count(), 11);
    assert!(text.lines().all(|line| line.len() == 21));
}
