//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods; it never executes SQL directly.

use rusqlite::{params, Connection};
use crate::{
    error::SimResult,
    event::EventLogEntry,
    transaction::Transaction,
    types::Step,
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the simulation database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, 0i64],
        )?;
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> SimResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM run WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, step, event_type, payload) VALUES (?1, ?2, ?3, ?4)",
            params![entry.run_id, entry.step as i64, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn events_for_step(&self, run_id: &str, step: Step) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, step, event_type, payload
             FROM event_log WHERE run_id = ?1 AND step = ?2 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![run_id, step as i64], |row| {
            Ok(EventLogEntry {
                id: Some(row.get(0)?),
                run_id: row.get(1)?,
                step: row.get::<_, i64>(2)? as Step,
                event_type: row.get(3)?,
                payload: row.get(4)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Transactions ───────────────────────────────────────────

    /// Insert a batch of records in one SQL transaction: either all rows
    /// land or none do.
    pub fn insert_transactions(&self, run_id: &str, transactions: &[Transaction]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO txn (run_id, step, action, amount, name_orig, place, time,
                                  old_balance_orig, new_balance_orig, name_dest,
                                  old_balance_dest, new_balance_dest,
                                  is_fraud, is_flagged_fraud, is_unauthorized_overdraft)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            )?;
            for t in transactions {
                stmt.execute(params![
                    run_id,
                    t.step as i64,
                    t.action.as_str(),
                    t.amount,
                    t.name_orig,
                    t.place,
                    t.time_label(),
                    t.old_balance_orig,
                    t.new_balance_orig,
                    t.name_dest,
                    t.old_balance_dest,
                    t.new_balance_dest,
                    t.is_fraud,
                    t.is_flagged_fraud,
                    t.is_unauthorized_overdraft,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn txn_count_total(&self, run_id: &str) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM txn WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn txn_count_for_step(&self, run_id: &str, step: Step) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM txn WHERE run_id = ?1 AND step = ?2",
            params![run_id, step as i64],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn flagged_fraud_count(&self, run_id: &str) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM txn WHERE run_id = ?1 AND is_flagged_fraud = 1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn txn_volume_by_action(&self, run_id: &str, action: &str) -> SimResult<f64> {
        let v: Option<f64> = self.conn.query_row(
            "SELECT SUM(amount) FROM txn WHERE run_id = ?1 AND action = ?2",
            params![run_id, action],
            |row| row.get(0),
        )?;
        Ok(v.unwrap_or(0.0))
    }
}
