//! `delete_row <n>` command plugin: removes one row by 1-based number.

use csvtab_core::TableSlot;
use std::io::Write;

const USAGE: &str = "Usage: delete_row <row_number>";

/// Deletes row `args` (1-based) from the active table and reports the new size.
pub fn run(slot: &mut TableSlot, args: &str, out: &mut dyn Write) {
    let _ = delete(slot, args, out);
}

fn delete(slot: &mut TableSlot, args: &str, out: &mut dyn Write) -> std::io::Result<()> {
    let Some(table) = slot.as_mut() else {
        return writeln!(out, "Error: No table is currently loaded.");
    };
    if args.is_empty() {
        return writeln!(out, "Error: {USAGE}");
    }
    let Some(row_number) = args.parse::<usize>().ok().filter(|n| *n >= 1) else {
        return writeln!(
            out,
            "Error: Invalid row number '{args}'. Must be a positive integer."
        );
    };

    match table.delete_row(row_number - 1) {
        Ok(_) => writeln!(
            out,
            "Row {row_number} deleted successfully. Table now has {} rows.",
            table.num_rows()
        ),
        Err(_) => writeln!(
            out,
            "Error: Row {row_number} does not exist. Table has {} rows.",
            table.num_rows()
        ),
    }
}

csvtab_core::export_command! {
    name: "delete_row",
    description: "deletes a row from the table by row number",
    run: run,
}

#[cfg(test)]
mod tests {
    use super::run;
    use csvtab_core::{Table, TableSlot};

    fn sample() -> TableSlot {
        Some(Table::from_records([["r1"], ["r2"], ["r3"]]).expect("table"))
    }

    fn output_of(slot: &mut TableSlot, args: &str) -> String {
        let mut out = Vec::new();
        run(slot, args, &mut out);
        String::from_utf8(out).expect("utf-8 output")
    }

    fn first_cells(slot: &TableSlot) -> Vec<String> {
        let table = slot.as_ref().expect("table loaded");
        table
            .rows()
            .iter()
            .map(|row| row.text(0).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn deletes_one_based_row_and_shifts_the_rest() {
        let mut slot = sample();
        assert_eq!(
            output_of(&mut slot, "2"),
            "Row 2 deleted successfully. Table now has 2 rows.\n"
        );
        assert_eq!(first_cells(&slot), vec!["r1", "r3"]);
    }

    #[test]
    fn rejects_non_positive_or_malformed_numbers() {
        let mut slot = sample();
        for args in ["0", "-1", "two", "1.5"] {
            assert_eq!(
                output_of(&mut slot, args),
                format!("Error: Invalid row number '{args}'. Must be a positive integer.\n")
            );
        }
        assert_eq!(
            output_of(&mut slot, ""),
            "Error: Usage: delete_row <row_number>\n"
        );
        assert_eq!(first_cells(&slot).len(), 3);
    }

    #[test]
    fn rejects_rows_past_the_end() {
        let mut slot = sample();
        assert_eq!(
            output_of(&mut slot, "4"),
            "Error: Row 4 does not exist. Table has 3 rows.\n"
        );
        assert_eq!(first_cells(&slot), vec!["r1", "r2", "r3"]);
    }

    #[test]
    fn reports_missing_table() {
        let mut slot: TableSlot = None;
        assert_eq!(
            output_of(&mut slot, "1"),
            "Error: No table is currently loaded.\n"
        );
    }
}
