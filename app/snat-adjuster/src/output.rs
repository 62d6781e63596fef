use std::fmt::Display;

use serde::Serialize;

use crate::cli::OutputFormat;

const COLUMN_SEPARATOR: &str = "   ";

#[derive(Serialize)]
pub struct TableCellOption<T>(Option<T>);

impl<T> From<Option<T>> for TableCellOption<T> {
    fn from(value: Option<T>) -> Self {
        TableCellOption(value)
    }
}

impl<T: Display> Display for TableCellOption<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(value) = &self.0 {
            value.fmt(f)
        } else {
            f.write_str("-")
        }
    }
}

/// Implemented with `#[derive(TableOutputRow)]`
pub trait TableOutputRow {
    fn get_name(&self) -> String;
    fn get_column_names() -> Vec<String>;
    fn get_column_count() -> usize;
    fn get_row(&self) -> Vec<String>;
}

pub trait TableOutputDisplay {
    fn print_names(self);
    fn print_table(self);
    fn print_table_with_headers(self);
}

impl<I: IntoIterator<Item = T>, T: TableOutputRow> TableOutputDisplay for I {
    fn print_names(self) {
        for row in self {
            println!("{}", row.get_name());
        }
    }

    fn print_table(self) {
        for line in render_table::<T>(self, false) {
            println!("{line}");
        }
    }

    fn print_table_with_headers(self) {
        for line in render_table::<T>(self, true) {
            println!("{line}");
        }
    }
}

/// Pads every column to its widest cell, the last one is left ragged.
fn render_table<T: TableOutputRow>(
    rows: impl IntoIterator<Item = T>,
    with_headers: bool,
) -> Vec<String> {
    let mut cells = Vec::new();

    if with_headers {
        cells.push(T::get_column_names());
    }

    cells.extend(rows.into_iter().map(|row| row.get_row()));

    let mut widths = vec![0; T::get_column_count()];
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    cells
        .into_iter()
        .map(|row| {
            let last = row.len().saturating_sub(1);
            row.into_iter()
                .zip(&widths)
                .enumerate()
                .map(|(index, (cell, width))| match index == last {
                    true => cell,
                    false => format!("{cell:<width$}"),
                })
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR)
        })
        .collect()
}

pub trait SerializableOutputDisplay {
    fn print_json(&self) -> Result<(), serde_json::Error>;
    fn print_json_pretty(&self) -> Result<(), serde_json::Error>;
    fn print_yaml(&self) -> Result<(), serde_yaml::Error>;
}

impl<T: ?Sized + Serialize> SerializableOutputDisplay for T {
    fn print_json(&self) -> Result<(), serde_json::Error> {
        let output = serde_json::to_string(self)?;
        println!("{output}");

        Ok(())
    }

    fn print_json_pretty(&self) -> Result<(), serde_json::Error> {
        let output = serde_json::to_string_pretty(self)?;
        println!("{output}");

        Ok(())
    }

    fn print_yaml(&self) -> Result<(), serde_yaml::Error> {
        let output = serde_yaml::to_string(self)?;
        print!("{output}");

        Ok(())
    }
}

pub trait CliPrint {
    fn print(self, format: OutputFormat) -> anyhow::Result<()>;
}

impl<T: Serialize + TableOutputDisplay> CliPrint for T {
    fn print(self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Names => self.print_names(),
            OutputFormat::Table => self.print_table(),
            OutputFormat::TableWithHeaders => self.print_table_with_headers(),
            OutputFormat::Json => self.print_json()?,
            OutputFormat::JsonPretty => self.print_json_pretty()?,
            OutputFormat::Yaml => self.print_yaml()?,
        }

        Ok(())
    }
}
