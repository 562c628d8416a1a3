//! Terminal output: aligned tables, JSON dumps and a few value formatters.

use anyhow::Result;
use dracin_client::{FlashKind, FlashMessage};
use dracin_model::{Page, PageMeta};
use serde::Serialize;

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Human-readable size in powers of 1024, with fewer decimals as the value
/// grows: `1.21 KB`, `12.1 MB`, `121 GB`.
pub fn format_bytes(n: u64) -> String {
    if n == 0 {
        return "0 B".to_string();
    }
    let mut value = n as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let decimals = if value >= 100.0 {
        0
    } else if value >= 10.0 {
        1
    } else {
        2
    };
    format!("{value:.decimals$} {}", BYTE_UNITS[unit])
}

/// `-` for missing values.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_flash(message: &FlashMessage) {
    match message.kind {
        FlashKind::Success => println!("✓ {}", message.message),
        FlashKind::Error => eprintln!("✗ {}", message.message),
    }
}

/// Column-aligned rows under a header.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> =
            self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = join_cells(self.headers.iter().copied(), &widths);
        for row in &self.rows {
            out.push('\n');
            out.push_str(&join_cells(row.iter().map(String::as_str), &widths));
        }
        out
    }

    pub fn print(&self) {
        if self.rows.is_empty() {
            println!("(kosong)");
        } else {
            println!("{}", self.render());
        }
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

pub fn print_meta(meta: &PageMeta) {
    println!(
        "halaman {}/{} · {} total",
        meta.current_page, meta.last_page, meta.total_items
    );
}

/// Print a page as JSON or as a table built by `row`.
pub fn print_page<T: Serialize>(
    json: bool,
    page: &Page<T>,
    headers: &[&'static str],
    row: impl Fn(&T) -> Vec<String>,
) -> Result<()> {
    if json {
        return print_json(page);
    }
    print_list(false, &page.items, headers, row)?;
    print_meta(&page.meta);
    Ok(())
}

pub fn print_list<T: Serialize>(
    json: bool,
    items: &[T],
    headers: &[&'static str],
    row: impl Fn(&T) -> Vec<String>,
) -> Result<()> {
    if json {
        return print_json(items);
    }
    let mut table = Table::new(headers);
    for item in items {
        table.row(row(item));
    }
    table.print();
    Ok(())
}

/// `key: value` lines for a single record.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in fields {
        println!("{key:<width$}  {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_scale_with_shrinking_precision() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(15 * 1024 * 1024), "15.0 MB");
        assert_eq!(format_bytes(123_456_789), "118 MB");
        assert_eq!(format_bytes(u64::MAX), "16384 PB");
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(&["ID", "NAME"]);
        table.row(vec!["7".into(), "Cinta".into()]);
        table.row(vec!["1234".into(), "Dia".into()]);
        assert_eq!(table.render(), "ID    NAME\n7     Cinta\n1234  Dia");
    }

    #[test]
    fn dash_for_missing() {
        assert_eq!(or_dash::<u64>(None), "-");
        assert_eq!(or_dash(Some(3)), "3");
    }
}
