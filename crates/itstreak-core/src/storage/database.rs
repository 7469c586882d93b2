//! SQLite row storage for profiles, streaks, daily progress, and the
//! push-notification send log.
//!
//! Mirrors the hosted schema the mobile app talks to, so the same logic
//! can run against a local database in tests and tooling.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, Profile, PushLogEntry, Store};
use crate::dates::format_key;
use crate::error::DatabaseError;
use crate::notify::Slot;
use crate::progress::DailyProgress;
use crate::streak::StreakRecord;

/// SQLite database holding all persisted user state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/itstreak/itstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("itstreak.db");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id                   TEXT PRIMARY KEY,
                email                TEXT NOT NULL DEFAULT '',
                display_name         TEXT,
                daily_goal           INTEGER NOT NULL DEFAULT 5,
                notification_enabled INTEGER NOT NULL DEFAULT 1,
                notification_time    TEXT NOT NULL DEFAULT '20:00',
                push_token           TEXT
            );

            CREATE TABLE IF NOT EXISTS streaks (
                user_id             TEXT PRIMARY KEY,
                current_streak      INTEGER NOT NULL DEFAULT 0,
                longest_streak      INTEGER NOT NULL DEFAULT 0,
                previous_streak     INTEGER NOT NULL DEFAULT 0,
                last_completed_date TEXT
            );

            CREATE TABLE IF NOT EXISTS daily_progress (
                id                 TEXT PRIMARY KEY,
                user_id            TEXT NOT NULL,
                date               TEXT NOT NULL,
                questions_answered INTEGER NOT NULL DEFAULT 0,
                questions_correct  INTEGER NOT NULL DEFAULT 0,
                study_time_seconds INTEGER NOT NULL DEFAULT 0,
                UNIQUE(user_id, date)
            );

            CREATE TABLE IF NOT EXISTS push_notification_log (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                date       TEXT NOT NULL,
                slot       TEXT NOT NULL,
                message_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_push_log_user_date
                ON push_notification_log(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_push_log_date_slot
                ON push_notification_log(date, slot);",
        )?;
        Ok(())
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, DatabaseError> {
    crate::dates::parse_key(raw)
        .ok_or_else(|| DatabaseError::QueryFailed(format!("malformed date key '{raw}'")))
}

impl Store for Database {
    fn streak(&self, user_id: &str) -> Result<Option<StreakRecord>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, current_streak, longest_streak, previous_streak,
                        last_completed_date
                 FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, current, longest, previous, last)) = row else {
            return Ok(None);
        };
        let last_completed_date = match last {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };
        Ok(Some(StreakRecord {
            user_id,
            current_streak: current,
            longest_streak: longest,
            previous_streak: previous,
            last_completed_date,
        }))
    }

    fn save_streak(&self, record: &StreakRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO streaks (user_id, current_streak, longest_streak, previous_streak,
                                  last_completed_date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 current_streak = excluded.current_streak,
                 longest_streak = excluded.longest_streak,
                 previous_streak = excluded.previous_streak,
                 last_completed_date = excluded.last_completed_date",
            params![
                record.user_id,
                record.current_streak,
                record.longest_streak,
                record.previous_streak,
                record.last_completed_date.map(format_key),
            ],
        )?;
        Ok(())
    }

    fn progress(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyProgress>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT user_id, date, questions_answered, questions_correct,
                        study_time_seconds
                 FROM daily_progress WHERE user_id = ?1 AND date = ?2",
                params![user_id, format_key(date)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, u32>(3)?,
                        row.get::<_, u32>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, raw_date, answered, correct, seconds)) = row else {
            return Ok(None);
        };
        Ok(Some(DailyProgress {
            user_id,
            date: parse_date(&raw_date)?,
            questions_answered: answered,
            questions_correct: correct,
            study_time_seconds: seconds,
        }))
    }

    fn add_answer(
        &self,
        user_id: &str,
        date: NaiveDate,
        correct: bool,
    ) -> Result<DailyProgress, DatabaseError> {
        // Atomic create-or-increment: concurrent same-day answers all land.
        self.conn.execute(
            "INSERT INTO daily_progress (id, user_id, date, questions_answered, questions_correct)
             VALUES (?1, ?2, ?3, 1, ?4)
             ON CONFLICT(user_id, date) DO UPDATE SET
                 questions_answered = questions_answered + 1,
                 questions_correct = questions_correct + ?4",
            params![
                Uuid::new_v4().to_string(),
                user_id,
                format_key(date),
                if correct { 1u32 } else { 0u32 },
            ],
        )?;
        self.progress(user_id, date)?.ok_or_else(|| {
            DatabaseError::QueryFailed("daily_progress row missing after upsert".to_string())
        })
    }

    fn add_study_time(
        &self,
        user_id: &str,
        date: NaiveDate,
        seconds: u32,
    ) -> Result<DailyProgress, DatabaseError> {
        self.conn.execute(
            "INSERT INTO daily_progress (id, user_id, date, study_time_seconds)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, date) DO UPDATE SET
                 study_time_seconds = study_time_seconds + ?4",
            params![Uuid::new_v4().to_string(), user_id, format_key(date), seconds],
        )?;
        self.progress(user_id, date)?.ok_or_else(|| {
            DatabaseError::QueryFailed("daily_progress row missing after upsert".to_string())
        })
    }

    fn add_progress_stub(&self, user_id: &str, date: NaiveDate) -> Result<(), DatabaseError> {
        // Never overwrites an existing row for the same user+date.
        self.conn.execute(
            "INSERT OR IGNORE INTO daily_progress (id, user_id, date)
             VALUES (?1, ?2, ?3)",
            params![Uuid::new_v4().to_string(), user_id, format_key(date)],
        )?;
        Ok(())
    }

    fn profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, display_name, daily_goal, notification_enabled,
                        notification_time, push_token
                 FROM profiles WHERE id = ?1",
                params![user_id],
                |row| {
                    Ok(Profile {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        display_name: row.get(2)?,
                        daily_goal: row.get(3)?,
                        notification_enabled: row.get(4)?,
                        notification_time: row.get(5)?,
                        push_token: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO profiles (id, email, display_name, daily_goal, notification_enabled,
                                   notification_time, push_token)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 email = excluded.email,
                 display_name = excluded.display_name,
                 daily_goal = excluded.daily_goal,
                 notification_enabled = excluded.notification_enabled,
                 notification_time = excluded.notification_time,
                 push_token = excluded.push_token",
            params![
                profile.id,
                profile.email,
                profile.display_name,
                profile.daily_goal,
                profile.notification_enabled,
                profile.notification_time,
                profile.push_token,
            ],
        )?;
        Ok(())
    }

    fn notifiable_profiles(&self) -> Result<Vec<Profile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, display_name, daily_goal, notification_enabled,
                    notification_time, push_token
             FROM profiles
             WHERE notification_enabled = 1 AND push_token IS NOT NULL
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Profile {
                id: row.get(0)?,
                email: row.get(1)?,
                display_name: row.get(2)?,
                daily_goal: row.get(3)?,
                notification_enabled: row.get(4)?,
                notification_time: row.get(5)?,
                push_token: row.get(6)?,
            })
        })?;

        let mut profiles = Vec::new();
        for row in rows {
            profiles.push(row?);
        }
        Ok(profiles)
    }

    fn log_push(&self, entries: &[PushLogEntry]) -> Result<(), DatabaseError> {
        let created_at = Local::now().to_rfc3339();
        for entry in entries {
            self.conn.execute(
                "INSERT INTO push_notification_log (id, user_id, date, slot, message_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.id,
                    entry.user_id,
                    format_key(entry.date),
                    entry.slot.as_str(),
                    entry.message_id,
                    created_at,
                ],
            )?;
        }
        Ok(())
    }

    fn recent_message_ids(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<String>, DatabaseError> {
        // Date keys are zero-padded, so lexicographic >= is date order.
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT message_id FROM push_notification_log
             WHERE user_id = ?1 AND date >= ?2",
        )?;
        let rows = stmt.query_map(params![user_id, format_key(since)], |row| {
            row.get::<_, String>(0)
        })?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn slot_sent_on(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: Slot,
    ) -> Result<bool, DatabaseError> {
        let sent = self.conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM push_notification_log
                 WHERE user_id = ?1 AND date = ?2 AND slot = ?3
             )",
            params![user_id, format_key(date), slot.as_str()],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_key;

    fn d(key: &str) -> NaiveDate {
        parse_key(key).unwrap()
    }

    #[test]
    fn streak_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.streak("u1").unwrap().is_none());

        let record = StreakRecord {
            user_id: "u1".into(),
            current_streak: 4,
            longest_streak: 9,
            previous_streak: 0,
            last_completed_date: Some(d("2025-05-10")),
        };
        db.save_streak(&record).unwrap();
        assert_eq!(db.streak("u1").unwrap(), Some(record.clone()));

        // upsert replaces
        let mut updated = record;
        updated.current_streak = 5;
        updated.last_completed_date = Some(d("2025-05-11"));
        db.save_streak(&updated).unwrap();
        assert_eq!(db.streak("u1").unwrap(), Some(updated));
    }

    #[test]
    fn add_answer_creates_then_increments() {
        let db = Database::open_memory().unwrap();
        let date = d("2025-05-10");

        let p = db.add_answer("u1", date, true).unwrap();
        assert_eq!((p.questions_answered, p.questions_correct), (1, 1));

        let p = db.add_answer("u1", date, false).unwrap();
        assert_eq!((p.questions_answered, p.questions_correct), (2, 1));

        let p = db.add_answer("u1", date, true).unwrap();
        assert_eq!((p.questions_answered, p.questions_correct), (3, 2));

        // other users and other days are untouched
        assert!(db.progress("u2", date).unwrap().is_none());
        assert!(db.progress("u1", d("2025-05-11")).unwrap().is_none());
    }

    #[test]
    fn study_time_accumulates() {
        let db = Database::open_memory().unwrap();
        let date = d("2025-05-10");
        db.add_study_time("u1", date, 120).unwrap();
        let p = db.add_study_time("u1", date, 45).unwrap();
        assert_eq!(p.study_time_seconds, 165);
        assert_eq!(p.questions_answered, 0);
    }

    #[test]
    fn progress_stub_never_overwrites() {
        let db = Database::open_memory().unwrap();
        let date = d("2025-05-10");
        db.add_answer("u1", date, true).unwrap();

        db.add_progress_stub("u1", date).unwrap();
        let p = db.progress("u1", date).unwrap().unwrap();
        assert_eq!(p.questions_answered, 1);

        // and on an empty day it creates the zero row exactly once
        db.add_progress_stub("u1", d("2025-05-09")).unwrap();
        db.add_progress_stub("u1", d("2025-05-09")).unwrap();
        let stub = db.progress("u1", d("2025-05-09")).unwrap().unwrap();
        assert_eq!(stub, DailyProgress::stub("u1", d("2025-05-09")));
    }

    #[test]
    fn notifiable_profiles_filters_token_and_flag() {
        let db = Database::open_memory().unwrap();

        let mut with_token = Profile::new("a", "a@example.com");
        with_token.push_token = Some("ExponentPushToken[aaa]".into());
        db.upsert_profile(&with_token).unwrap();

        let no_token = Profile::new("b", "b@example.com");
        db.upsert_profile(&no_token).unwrap();

        let mut disabled = Profile::new("c", "c@example.com");
        disabled.push_token = Some("ExponentPushToken[ccc]".into());
        disabled.notification_enabled = false;
        db.upsert_profile(&disabled).unwrap();

        let notifiable = db.notifiable_profiles().unwrap();
        assert_eq!(notifiable.len(), 1);
        assert_eq!(notifiable[0].id, "a");
    }

    #[test]
    fn recent_ids_respect_since_date() {
        let db = Database::open_memory().unwrap();
        db.log_push(&[
            PushLogEntry::new("u1", d("2025-05-07"), Slot::Night, "N01"),
            PushLogEntry::new("u1", d("2025-05-09"), Slot::Night, "N02"),
            PushLogEntry::new("u1", d("2025-05-10"), Slot::Morning, "M01"),
            PushLogEntry::new("u2", d("2025-05-10"), Slot::Morning, "M05"),
        ])
        .unwrap();

        let mut ids = db.recent_message_ids("u1", d("2025-05-08")).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["M01".to_string(), "N02".to_string()]);
    }

    #[test]
    fn slot_sent_lookup() {
        let db = Database::open_memory().unwrap();
        let date = d("2025-05-10");
        assert!(!db.slot_sent_on("u1", date, Slot::Final).unwrap());

        db.log_push(&[PushLogEntry::new("u1", date, Slot::Final, "F03")])
            .unwrap();
        assert!(db.slot_sent_on("u1", date, Slot::Final).unwrap());
        assert!(!db.slot_sent_on("u1", date, Slot::Deadline).unwrap());
        assert!(!db.slot_sent_on("u1", d("2025-05-11"), Slot::Final).unwrap());
    }
}
