use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::{Column, Sheet, SheetRow, COLUMNS};
use crate::error::StoreError;

/// Sheet persisted in SQLite. One table row per sheet row, keyed by the
/// 1-based row number, plus a side table of per-cell number formats.
pub struct SqliteSheet {
    conn: Connection,
}

impl SqliteSheet {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Open an existing database without creating or migrating anything.
    /// Writes through this handle fail.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }
}

pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS postings (
            row_num    INTEGER PRIMARY KEY CHECK(row_num >= 1),
            company    TEXT NOT NULL DEFAULT '',
            role       TEXT NOT NULL DEFAULT '',
            location   TEXT NOT NULL DEFAULT '',
            link       TEXT NOT NULL DEFAULT '',
            posted     TEXT NOT NULL DEFAULT '',
            written_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS cell_formats (
            row_num INTEGER NOT NULL,
            col     TEXT NOT NULL CHECK(col IN ('A','B','C','D','E')),
            format  TEXT NOT NULL,
            PRIMARY KEY (row_num, col)
        );
        ",
    )?;
    Ok(())
}

fn field(column: Column) -> &'static str {
    match column {
        Column::Company => "company",
        Column::Role => "role",
        Column::Location => "location",
        Column::Link => "link",
        Column::Posted => "posted",
    }
}

fn checked_row(row: usize) -> Result<i64, StoreError> {
    if row == 0 {
        return Err(StoreError::InvalidRow(row));
    }
    Ok(row as i64)
}

impl Sheet for SqliteSheet {
    fn column(&self, column: Column) -> Result<Vec<(usize, String)>, StoreError> {
        let sql = format!(
            "SELECT row_num, {} FROM postings ORDER BY row_num",
            field(column)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let cells = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)? as usize, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cells)
    }

    fn range(&self) -> Result<Vec<SheetRow>, StoreError> {
        let mut formats: HashMap<(i64, Column), String> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT row_num, col, format FROM cell_formats")?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;
            for r in rows {
                let (n, col, format) = r?;
                if let Some(column) = Column::from_letter(&col) {
                    formats.insert((n, column), format);
                }
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT row_num, company, role, location, link, posted
             FROM postings ORDER BY row_num",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let n: i64 = row.get(0)?;
                let mut cells: [String; COLUMNS] = Default::default();
                for (i, cell) in cells.iter_mut().enumerate() {
                    *cell = row.get(i + 1)?;
                }
                Ok((n, cells))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(n, cells)| SheetRow {
                row: n as usize,
                cells,
                formats: Column::ALL.map(|c| formats.remove(&(n, c))),
            })
            .collect())
    }

    fn write_row(&mut self, row: usize, values: &[String; COLUMNS]) -> Result<(), StoreError> {
        let n = checked_row(row)?;
        self.conn.execute(
            "INSERT INTO postings (row_num, company, role, location, link, posted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(row_num) DO UPDATE SET
                company = excluded.company,
                role = excluded.role,
                location = excluded.location,
                link = excluded.link,
                posted = excluded.posted,
                written_at = datetime('now')",
            rusqlite::params![n, values[0], values[1], values[2], values[3], values[4]],
        )?;
        Ok(())
    }

    fn set_number_format(
        &mut self,
        row: usize,
        column: Column,
        format: &str,
    ) -> Result<(), StoreError> {
        let n = checked_row(row)?;
        self.conn.execute(
            "INSERT INTO cell_formats (row_num, col, format) VALUES (?1, ?2, ?3)
             ON CONFLICT(row_num, col) DO UPDATE SET format = excluded.format",
            rusqlite::params![n, column.letter().to_string(), format],
        )?;
        Ok(())
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{high_water_mark, last_filled_row, DATE_FORMAT};

    fn sheet() -> SqliteSheet {
        SqliteSheet::from_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn values(company: &str, posted: &str) -> [String; COLUMNS] {
        [
            company.into(),
            "SWE Intern".into(),
            "NYC".into(),
            "https://x.co".into(),
            posted.into(),
        ]
    }

    #[test]
    fn write_then_read_range() {
        let mut s = sheet();
        s.write_row(1, &values("Acme", "2025-03-01")).unwrap();
        s.set_number_format(1, Column::Posted, DATE_FORMAT).unwrap();

        let rows = s.range().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].cell(Column::Company), "Acme");
        assert_eq!(rows[0].formats[Column::Posted.index()].as_deref(), Some(DATE_FORMAT));
        assert_eq!(rows[0].formats[Column::Company.index()], None);
        assert_eq!(rows[0].display(Column::Posted), "03/01/2025");
    }

    #[test]
    fn column_skips_unwritten_rows() {
        let mut s = sheet();
        s.write_row(2, &values("Acme", "2025-03-01")).unwrap();
        s.write_row(4, &values("Globex", "2025-03-03")).unwrap();
        assert_eq!(
            s.column(Column::Company).unwrap(),
            vec![(2, "Acme".to_string()), (4, "Globex".to_string())]
        );
        assert_eq!(last_filled_row(&s).unwrap(), 4);
        assert_eq!(
            high_water_mark(&s).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 3, 3)
        );
    }

    #[test]
    fn huge_row_number_does_not_blow_up_column_reads() {
        let mut s = sheet();
        s.write_row(1, &values("Acme", "2025-03-01")).unwrap();
        s.write_row(1_000_000_000, &values("Globex", "2025-03-02")).unwrap();
        assert_eq!(s.column(Column::Posted).unwrap().len(), 2);
        assert_eq!(last_filled_row(&s).unwrap(), 1_000_000_000);
    }

    #[test]
    fn rewrite_keeps_format() {
        let mut s = sheet();
        s.write_row(1, &values("Acme", "2025-03-01")).unwrap();
        s.set_number_format(1, Column::Posted, DATE_FORMAT).unwrap();
        s.write_row(1, &values("Acme Corp", "2025-03-02")).unwrap();

        let rows = s.range().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cell(Column::Company), "Acme Corp");
        assert_eq!(rows[0].display(Column::Posted), "03/02/2025");
    }

    #[test]
    fn row_zero_is_rejected() {
        let mut s = sheet();
        assert!(matches!(
            s.write_row(0, &values("Acme", "2025-03-01")),
            Err(StoreError::InvalidRow(0))
        ));
        assert!(s.column(Column::Company).unwrap().is_empty());
    }

    #[test]
    fn read_only_handle_reads_but_cannot_write() {
        let dir = std::env::temp_dir().join(format!("internship_sync_ro_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sheet.sqlite");
        let _ = std::fs::remove_file(&path);
        {
            let mut s = SqliteSheet::open(&path).unwrap();
            s.write_row(1, &values("Acme", "2025-03-01")).unwrap();
        }

        let mut ro = SqliteSheet::open_read_only(&path).unwrap();
        assert_eq!(ro.range().unwrap().len(), 1);
        assert!(matches!(
            ro.write_row(2, &values("Globex", "2025-03-02")),
            Err(StoreError::Database(_))
        ));
        drop(ro);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_created_read_only() {
        let path = std::env::temp_dir().join(format!(
            "internship_sync_missing_{}.sqlite",
            std::process::id()
        ));
        assert!(SqliteSheet::open_read_only(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
    }
}
