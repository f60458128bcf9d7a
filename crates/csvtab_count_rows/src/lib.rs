//! `count_rows` command plugin: prints the size of the active table.

use csvtab_core::TableSlot;
use std::io::Write;

/// Writes `Table has R rows and C columns.` for the active table.
pub fn run(slot: &mut TableSlot, _args: &str, out: &mut dyn Write) {
    let _ = report(slot, out);
}

fn report(slot: &TableSlot, out: &mut dyn Write) -> std::io::Result<()> {
    match slot {
        Some(table) => writeln!(
            out,
            "Table has {} rows and {} columns.",
            table.num_rows(),
            table.num_cols()
        ),
        None => writeln!(out, "Error: No table is currently loaded."),
    }
}

csvtab_core::export_command! {
    name: "count_rows",
    description: "displays the number of rows and columns in the table",
    run: run,
}

#[cfg(test)]
mod tests {
    use super::run;
    use csvtab_core::{Table, TableSlot};

    fn output_of(slot: &mut TableSlot) -> String {
        let mut out = Vec::new();
        run(slot, "", &mut out);
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn reports_rows_and_columns() {
        let table = Table::from_records([["a", "b", "c"], ["1", "2", "3"]]).expect("table");
        let mut slot = Some(table);
        assert_eq!(output_of(&mut slot), "Table has 2 rows and 3 columns.\n");
        assert_eq!(slot.as_ref().map(Table::num_rows), Some(2));
    }

    #[test]
    fn reports_missing_table() {
        let mut slot: TableSlot = None;
        assert_eq!(
            output_of(&mut slot),
            "Error: No table is currently loaded.\n"
        );
    }

    #[test]
    fn entry_point_exports_descriptor() {
        let descriptor = unsafe { &*super::plugin_init() };
        let name = unsafe { std::ffi::CStr::from_ptr(descriptor.name) };
        assert_eq!(name.to_str().expect("utf-8 name"), "count_rows");
        assert!(descriptor.handler.is_some());
    }
}
