use anyhow::{Context, Result};

use super::connection::DbConn;

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub fn reset_database(conn: &mut DbConn) -> Result<()> {
    let statements = split_sql_statements(SCHEMA_SQL);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::info!("Catalog schema reset successfully");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &mut DbConn, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}
