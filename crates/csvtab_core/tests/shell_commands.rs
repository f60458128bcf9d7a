use csvtab_core::{Command, Shell, ShellControl, Table, TableSlot};
use std::fs;
use std::path::Path;

fn shell() -> Shell<Vec<u8>> {
    Shell::new(4, Vec::new())
}

/// Runs `line` and returns only the output it produced.
fn run(shell: &mut Shell<Vec<u8>>, line: &str) -> String {
    let before = shell.output().len();
    let control = shell.execute_line(line).expect("write to vec");
    assert_eq!(control, ShellControl::Continue, "line `{line}`");
    String::from_utf8(shell.output()[before..].to_vec()).expect("utf-8 output")
}

fn write_sample(dir: &Path) -> String {
    let path = dir.join("people.csv");
    fs::write(&path, "name,team\nana,red\nrui,blue\nines,red\n").expect("write sample");
    path.to_str().expect("utf-8 path").to_string()
}

struct Truncate;

impl Command for Truncate {
    fn name(&self) -> &str {
        "truncate"
    }

    fn description(&self) -> &str {
        "keeps only the first row"
    }

    fn execute(&self, slot: &mut TableSlot, _args: &str) {
        if let Some(table) = slot {
            while table.num_rows() > 1 {
                let last = table.num_rows() - 1;
                let _ = table.delete_row(last);
            }
        }
    }
}

#[test]
fn load_show_and_filter() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_sample(dir.path());
    let mut shell = shell();

    assert_eq!(
        run(&mut shell, &format!("load {path}")),
        "Table loaded successfully (4 rows, 2 columns).\n"
    );
    assert_eq!(run(&mut shell, "show A2:B3"), "ana\tred\nrui\tblue\n");
    assert_eq!(run(&mut shell, "show b4"), "red\n");
    assert_eq!(
        run(&mut shell, "filter B red"),
        "Filter applied. Rows reduced from 4 to 2.\n"
    );
    assert_eq!(run(&mut shell, "show A1:A2"), "ana\nines\n");
}

#[test]
fn filter_value_may_contain_spaces() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("teams.csv");
    fs::write(&path, "team\nred sox\nblue\n").expect("write");
    let mut shell = shell();
    run(&mut shell, &format!("load {}", path.display()));

    assert_eq!(
        run(&mut shell, "filter A red sox"),
        "Filter applied. Rows reduced from 3 to 1.\n"
    );
}

#[test]
fn commands_without_table_report_it() {
    let mut shell = shell();
    for line in ["show A1", "save out.csv", "filter A x"] {
        assert_eq!(
            run(&mut shell, line),
            "Error: No table is currently loaded.\n",
            "line `{line}`"
        );
    }
}

#[test]
fn failed_load_keeps_previous_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_sample(dir.path());
    let mut shell = shell();
    run(&mut shell, &format!("load {path}"));

    let missing = dir.path().join("missing.csv");
    let output = run(&mut shell, &format!("load {}", missing.display()));
    assert!(output.starts_with("Error: cannot open"), "{output}");
    assert_eq!(shell.table().map(Table::num_rows), Some(4));
}

#[test]
fn wide_records_are_loaded_with_a_warning() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("wide.csv");
    fs::write(&path, "a,b\n1,2,3\n4,5\n").expect("write");
    let mut shell = shell();

    assert_eq!(
        run(&mut shell, &format!("load {}", path.display())),
        "Table loaded successfully (3 rows, 2 columns).\n\
         Warning: 1 records had more than 2 fields; extra fields were discarded.\n"
    );
    assert_eq!(run(&mut shell, "show A2:B2"), "1\t2\n");
}

#[test]
fn partial_load_replaces_table_and_warns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let previous = write_sample(dir.path());
    let broken = dir.path().join("broken.csv");
    fs::write(&broken, b"a,b\n1,2,3\n\xff,3\n4,5\n").expect("write");
    let mut shell = shell();
    run(&mut shell, &format!("load {previous}"));

    let output = run(&mut shell, &format!("load {}", broken.display()));
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3, "{output}");
    assert_eq!(lines[0], "Table partially loaded (2 rows, 2 columns).");
    assert_eq!(
        lines[1],
        "Warning: 1 records had more than 2 fields; extra fields were discarded."
    );
    assert!(
        lines[2].starts_with("Warning: loading stopped early (malformed CSV at record 3, field 1"),
        "{output}"
    );
    assert!(lines[2].ends_with("only the rows read before it were kept."));

    assert_eq!(shell.table().map(Table::num_rows), Some(2));
    assert_eq!(run(&mut shell, "show A1:B2"), "a\tb\n1\t2\n");
}

#[test]
fn invalid_coordinates_and_columns_are_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_sample(dir.path());
    let mut shell = shell();
    run(&mut shell, &format!("load {path}"));

    assert!(run(&mut shell, "show B2:A1").starts_with("Error: Invalid coordinates"));
    assert_eq!(
        run(&mut shell, "show A1:C2"),
        "Error: Coordinates out of bounds (table spans A1:B4).\n"
    );
    assert_eq!(run(&mut shell, "filter C red"), "Error: Invalid column 'C'.\n");
    assert!(run(&mut shell, "filter A").starts_with("Error: Usage:"));
    assert_eq!(shell.table().map(Table::num_rows), Some(4));
}

#[test]
fn save_writes_the_active_table() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_sample(dir.path());
    let out = dir.path().join("reds.csv");
    let mut shell = shell();
    run(&mut shell, &format!("load {path}"));
    run(&mut shell, "filter B red");

    assert_eq!(
        run(&mut shell, &format!("save {}", out.display())),
        format!("Table saved to {}\n", out.display())
    );
    assert_eq!(fs::read_to_string(&out).expect("read"), "ana,red\nines,red\n");
}

#[test]
fn unknown_commands_and_plugin_dispatch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_sample(dir.path());
    let mut shell = shell();
    run(&mut shell, &format!("load {path}"));

    assert_eq!(run(&mut shell, "truncate"), "Unknown command: truncate\n");

    shell
        .registry_mut()
        .register(Box::new(Truncate))
        .expect("register plugin command");
    assert_eq!(run(&mut shell, "truncate"), "");
    assert_eq!(shell.table().map(Table::num_rows), Some(1));

    let help = run(&mut shell, "help");
    assert!(help.starts_with("List of available commands:\n"));
    assert!(help.contains("Loaded plugin commands:\ntruncate"));
}

#[test]
fn builtin_names_are_reserved() {
    let mut shell = shell();
    for name in ["help", "exit", "load", "save", "show", "filter", "command"] {
        assert!(shell.registry().is_reserved(name), "{name} should be reserved");
    }
}

#[test]
fn command_with_bad_library_reports_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut shell = shell();
    let output = run(
        &mut shell,
        &format!("command {}", dir.path().join("libnone.so").display()),
    );
    assert!(output.starts_with("Error: cannot load plugin"), "{output}");
    assert!(shell.registry().is_empty());
}

#[test]
fn exit_stops_and_shutdown_releases_everything() {
    let mut shell = shell();
    shell
        .registry_mut()
        .register(Box::new(Truncate))
        .expect("register");
    assert_eq!(run(&mut shell, "   "), "");

    let control = shell.execute_line("exit").expect("write to vec");
    assert_eq!(control, ShellControl::Exit);
    assert!(String::from_utf8_lossy(shell.output()).ends_with("Exiting program\n"));

    assert_eq!(shell.shutdown(), 1);
    assert!(shell.table().is_none());
    assert!(shell.registry().is_empty());
}
