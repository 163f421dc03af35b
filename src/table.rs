//! Plain ASCII grid tables for `ls` and `status` output.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(row.into_iter().map(|cell| cell.to_string()).collect());
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|i| {
                std::iter::once(&self.header)
                    .chain(&self.rows)
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn write_border(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    f.write_str("+")?;
    for width in widths {
        write!(f, "{}+", "-".repeat(width + 2))?;
    }
    writeln!(f)
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], row: &[String]) -> fmt::Result {
    f.write_str("|")?;
    for (i, width) in widths.iter().enumerate() {
        let cell = row.get(i).map(String::as_str).unwrap_or("");
        let pad = width - cell.chars().count();
        write!(f, " {}{} |", cell, " ".repeat(pad))?;
    }
    writeln!(f)
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_border(f, &widths)?;
        write_row(f, &widths, &self.header)?;
        write_border(f, &widths)?;
        for row in &self.rows {
            write_row(f, &widths, row)?;
        }
        if !self.rows.is_empty() {
            write_border(f, &widths)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_grid() {
        let mut table = Table::new(["ID", "NAME"]);
        table.push_row(["723662", "server.en.yml"]);
        table.push_row(["1", "a"]);

        let expected = "\
+--------+---------------+
| ID     | NAME          |
+--------+---------------+
| 723662 | server.en.yml |
| 1      | a             |
+--------+---------------+
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_empty_table_prints_header_only() {
        let table = Table::new(["LOCALE", "#WORDS"]);
        assert!(table.is_empty());
        assert_eq!(
            table.to_string(),
            "+--------+--------+\n| LOCALE | #WORDS |\n+--------+--------+\n"
        );
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(["A", "B"]);
        table.push_row(["x"]);
        assert!(table.to_string().contains("| x |   |"));
    }

    #[test]
    fn test_width_counts_characters() {
        let mut table = Table::new(["N"]);
        table.push_row(["привет"]);
        assert!(table.to_string().contains("| привет |"));
    }
}
