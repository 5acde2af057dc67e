use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use rusqlite::types::Value;
use std::path::{Path, PathBuf};

use super::{Handler, TaskReply};

/// Totals Gold ticket revenue in `ticket-sales.db`.
pub struct TicketSalesHandler {
    db: PathBuf,
    output: PathBuf,
}

impl TicketSalesHandler {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            db: data_dir.join("ticket-sales.db"),
            output: data_dir.join("ticket-sales-gold.txt"),
        }
    }
}

/// `SUM(units * price)` over Gold tickets, rendered as text.
///
/// No rows, or a zero total, is `0`.
pub fn gold_sales(conn: &Connection) -> Result<String> {
    let total: Value = conn.query_row(
        "SELECT SUM(units * price) FROM tickets WHERE type = 'Gold'",
        [],
        |row| row.get(0),
    )?;
    Ok(match total {
        Value::Integer(n) => n.to_string(),
        Value::Real(x) if x == 0.0 => "0".to_string(),
        Value::Real(x) => format_real(x),
        _ => "0".to_string(),
    })
}

/// Shortest round-trip form with a signed, two-digit exponent in scientific
/// notation: `25.0`, `1e+16`, `1.5e-05`.
fn format_real(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let repr = format!("{x:?}");
    let Some((mantissa, exp)) = repr.split_once('e') else {
        return repr;
    };
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[async_trait]
impl Handler for TicketSalesHandler {
    fn name(&self) -> &str {
        "ticket-sales"
    }

    fn description(&self) -> &str {
        "total Gold ticket sales from ticket-sales.db"
    }

    async fn run(&self) -> Result<TaskReply> {
        let db = self.db.clone();
        let total = tokio::task::spawn_blocking(move || -> Result<String> {
            let conn = super::sql::open_existing(&db)?;
            gold_sales(&conn)
        })
        .await??;
        tokio::fs::write(&self.output, total)
            .await
            .with_context(|| format!("failed to write {}", self.output.display()))?;
        Ok(TaskReply::ok("Ticket sales queried"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickets_db(rows: &[(&str, i64, f64)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE tickets (type TEXT, units INTEGER, price REAL)")
            .unwrap();
        for (kind, units, price) in rows {
            conn.execute(
                "INSERT INTO tickets (type, units, price) VALUES (?1, ?2, ?3)",
                rusqlite::params![kind, units, price],
            )
            .unwrap();
        }
        conn
    }

    #[test]
    fn sums_only_gold() {
        let conn = tickets_db(&[("Gold", 2, 10.5), ("Silver", 100, 1.0), ("Gold", 1, 4.0)]);
        assert_eq!(gold_sales(&conn).unwrap(), "25.0");
    }

    #[test]
    fn no_gold_rows_is_zero() {
        let conn = tickets_db(&[("Bronze", 3, 2.0)]);
        assert_eq!(gold_sales(&conn).unwrap(), "0");
    }

    #[test]
    fn zero_total_is_plain_zero() {
        let conn = tickets_db(&[("Gold", 0, 10.0)]);
        assert_eq!(gold_sales(&conn).unwrap(), "0");
    }

    #[test]
    fn large_and_small_reals_use_signed_exponent() {
        assert_eq!(format_real(1e16), "1e+16");
        assert_eq!(format_real(1.25e20), "1.25e+20");
        assert_eq!(format_real(1.5e-5), "1.5e-05");
        assert_eq!(format_real(123456.5), "123456.5");
        assert_eq!(format_real(25.0), "25.0");
    }

    #[test]
    fn large_gold_total() {
        let conn = tickets_db(&[("Gold", 1_000_000, 1e10)]);
        assert_eq!(gold_sales(&conn).unwrap(), "1e+16");
    }

    #[test]
    fn missing_table_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(gold_sales(&conn).is_err());
    }
}
