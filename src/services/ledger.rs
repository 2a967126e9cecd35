use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        meal::{MealStatus, MealType},
        opt_in::{OptInRecord, WeeklyDaysPatch, WeeklyPreference},
    },
    services::{catalog::MealCatalog, eligibility::EligibilityEngine},
};

type RecordKey = (Uuid, NaiveDate, i64);

/// Per-user, per-date, per-meal opt-in records plus the weekly default
/// templates. All writes go through one lock per arena, so a single
/// (user, date, meal) key mutates linearizably and concurrent toggles
/// resolve last-write-wins.
pub struct OptInLedger {
    catalog: Arc<MealCatalog>,
    eligibility: Arc<EligibilityEngine>,
    records: RwLock<HashMap<RecordKey, OptInRecord>>,
    weekly: RwLock<HashMap<(Uuid, i64), WeeklyPreference>>,
    /// (user, date) pairs whose weekly defaults have already been
    /// materialized, so the seeding pass runs once.
    defaults_applied: RwLock<HashSet<(Uuid, NaiveDate)>>,
}

impl OptInLedger {
    pub fn new(catalog: Arc<MealCatalog>, eligibility: Arc<EligibilityEngine>) -> Self {
        Self {
            catalog,
            eligibility,
            records: RwLock::new(HashMap::new()),
            weekly: RwLock::new(HashMap::new()),
            defaults_applied: RwLock::new(HashSet::new()),
        }
    }

    /// Toggle one meal for one date. Rejected outright when the governing
    /// window is not open at `now`; a rejected call never creates or mutates
    /// a record. `opt_in_time` is only stamped on a false → true transition.
    pub async fn set_opt_in(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        meal_type_id: i64,
        opted_in: bool,
        now: DateTime<FixedOffset>,
    ) -> Result<OptInRecord, ApiError> {
        self.catalog.get(meal_type_id)?;
        if !self.eligibility.is_open(now, date).await? {
            return Err(ApiError::WindowClosed(date));
        }

        let mut records = self.records.write().await;
        let record = records
            .entry((user_id, date, meal_type_id))
            .and_modify(|r| {
                if !r.opted_in && opted_in {
                    r.opt_in_time = Some(now);
                }
                r.opted_in = opted_in;
            })
            .or_insert_with(|| OptInRecord {
                user_id,
                date,
                meal_type_id,
                opted_in,
                opt_in_time: opted_in.then_some(now),
            });
        Ok(record.clone())
    }

    /// Seed this user's records for a weekday date from their weekly
    /// preferences, once the date's window has opened. Idempotent, and an
    /// existing record is never overwritten, however it came to exist.
    pub async fn apply_weekly_defaults(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<(), ApiError> {
        let dow = date.weekday().num_days_from_monday() as u8;
        if dow >= 5 {
            // Weekend dates have no weekly-default path.
            return Ok(());
        }
        let window = self.eligibility.window_for(date).await?;
        if now < window.opens {
            return Ok(());
        }
        if !self.defaults_applied.write().await.insert((user_id, date)) {
            return Ok(());
        }

        let prefs: Vec<i64> = {
            let weekly = self.weekly.read().await;
            self.catalog
                .list()
                .iter()
                .filter(|meal| {
                    weekly
                        .get(&(user_id, meal.id))
                        .and_then(|p| p.day(dow))
                        .unwrap_or(false)
                })
                .map(|meal| meal.id)
                .collect()
        };
        if prefs.is_empty() {
            return Ok(());
        }

        let mut records = self.records.write().await;
        for meal_type_id in prefs {
            records
                .entry((user_id, date, meal_type_id))
                .or_insert_with(|| OptInRecord {
                    user_id,
                    date,
                    meal_type_id,
                    opted_in: true,
                    opt_in_time: Some(now),
                });
        }
        Ok(())
    }

    /// Status for every catalog meal type, defaulting unseen ones to
    /// `opted_in = false`. Read-only.
    pub async fn get_status(&self, user_id: Uuid, date: NaiveDate) -> Vec<MealStatus> {
        let records = self.records.read().await;
        self.catalog
            .list()
            .iter()
            .map(|meal| {
                let record = records.get(&(user_id, date, meal.id));
                MealStatus {
                    meal_type_id: meal.id,
                    name: meal.name.clone(),
                    opted_in: record.map(|r| r.opted_in).unwrap_or(false),
                    opt_in_time: record.and_then(|r| r.opt_in_time),
                }
            })
            .collect()
    }

    /// Merge-update the weekly template. Deliberately unconstrained by any
    /// window: it edits future defaults and never touches records that have
    /// already materialized.
    pub async fn set_weekly_preference(
        &self,
        user_id: Uuid,
        meal_type_id: i64,
        patch: &WeeklyDaysPatch,
    ) -> Result<WeeklyPreference, ApiError> {
        self.catalog.get(meal_type_id)?;
        let mut weekly = self.weekly.write().await;
        let pref = weekly.entry((user_id, meal_type_id)).or_default();
        if let Some(v) = patch.monday {
            pref.monday = v;
        }
        if let Some(v) = patch.tuesday {
            pref.tuesday = v;
        }
        if let Some(v) = patch.wednesday {
            pref.wednesday = v;
        }
        if let Some(v) = patch.thursday {
            pref.thursday = v;
        }
        if let Some(v) = patch.friday {
            pref.friday = v;
        }
        Ok(pref.clone())
    }

    /// Weekly template per catalog meal type, defaulting to all-false.
    pub async fn weekly_status(&self, user_id: Uuid) -> Vec<(MealType, WeeklyPreference)> {
        let weekly = self.weekly.read().await;
        self.catalog
            .list()
            .iter()
            .map(|meal| {
                let pref = weekly
                    .get(&(user_id, meal.id))
                    .cloned()
                    .unwrap_or_default();
                (meal.clone(), pref)
            })
            .collect()
    }

    /// Opted-in records for a date, grouped by meal type in catalog order.
    /// Weekly defaults are materialized first for every user holding a
    /// template, so the serving-day roster includes users who never opened
    /// the app during the window.
    pub async fn roster(
        &self,
        date: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<(MealType, Vec<OptInRecord>)>, ApiError> {
        let holders: Vec<Uuid> = {
            let weekly = self.weekly.read().await;
            let mut ids: Vec<Uuid> = weekly.keys().map(|(user_id, _)| *user_id).collect();
            ids.sort();
            ids.dedup();
            ids
        };
        for user_id in holders {
            self.apply_weekly_defaults(user_id, date, now).await?;
        }

        let records = self.records.read().await;
        Ok(self
            .catalog
            .list()
            .iter()
            .map(|meal| {
                let mut opted: Vec<OptInRecord> = records
                    .values()
                    .filter(|r| r.date == date && r.meal_type_id == meal.id && r.opted_in)
                    .cloned()
                    .collect();
                opted.sort_by_key(|r| r.opt_in_time);
                (meal.clone(), opted)
            })
            .collect())
    }
}
