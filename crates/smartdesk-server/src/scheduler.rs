//! Background digest scheduler
//!
//! Two independent loops, each sleeping until its next wall-clock slot:
//!
//! - Weekly document reminder: Mondays at 09:00 local time
//! - Daily spending summary: every day at 09:00 local time
//!
//! Started only when both the datastore and the mailer are configured.
//! A failed run is logged and the loop carries on.

use std::time::Duration;

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use tracing::{error, info};

use smartdesk_core::dates::today;
use smartdesk_core::digest;
use smartdesk_core::{Mailer, Store};

/// Hour of day both digests go out
const SEND_HOUR: u32 = 9;

/// When a digest runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly(Weekday),
}

/// Next slot strictly after `now`
pub fn next_run(now: NaiveDateTime, cadence: Cadence) -> NaiveDateTime {
    let send_at = NaiveTime::from_hms_opt(SEND_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut candidate = now.date().and_time(send_at);

    loop {
        let day_matches = match cadence {
            Cadence::Daily => true,
            Cadence::Weekly(day) => candidate.weekday() == day,
        };
        if day_matches && candidate > now {
            return candidate;
        }
        candidate += chrono::Duration::days(1);
    }
}

/// Time to sleep from local `now` until the next slot
fn sleep_until_next(cadence: Cadence) -> Duration {
    let now = Local::now();
    let next = next_run(now.naive_local(), cadence);
    // No local instant exists inside a DST gap; check again in an hour
    let target = Local
        .from_local_datetime(&next)
        .earliest()
        .unwrap_or_else(|| now + chrono::Duration::hours(1));
    (target - now).to_std().unwrap_or(Duration::from_secs(60))
}

/// Start both digest loops as background tasks
pub fn start_digest_scheduler(store: Store, mailer: Mailer, expiry_months: u32) {
    info!(
        expiry_months,
        "Starting digest scheduler: documents on Mondays, spending daily, at {:02}:00",
        SEND_HOUR
    );

    {
        let store = store.clone();
        let mailer = mailer.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(sleep_until_next(Cadence::Weekly(Weekday::Mon))).await;

                info!("Running document reminder...");
                match digest::send_document_reminder(&store, &mailer, expiry_months, today()).await
                {
                    Ok(_) => info!("Document reminder completed"),
                    Err(e) => error!(error = %e, "Document reminder email failed"),
                }
            }
        });
    }

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sleep_until_next(Cadence::Daily)).await;

            info!("Running spending summary...");
            match digest::send_spending_summary(&store, &mailer, today()).await {
                Ok(_) => info!("Spending summary completed"),
                Err(e) => error!(error = %e, "Spending summary email failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: &str, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_before_and_after_send_hour() {
        assert_eq!(next_run(at("2024-05-10", 8, 59), Cadence::Daily), at("2024-05-10", 9, 0));
        assert_eq!(next_run(at("2024-05-10", 9, 0), Cadence::Daily), at("2024-05-11", 9, 0));
        assert_eq!(next_run(at("2024-05-31", 23, 0), Cadence::Daily), at("2024-06-01", 9, 0));
    }

    #[test]
    fn test_weekly_monday() {
        let monday = Cadence::Weekly(Weekday::Mon);
        // Friday 2024-05-10 -> Monday 2024-05-13
        assert_eq!(next_run(at("2024-05-10", 12, 0), monday), at("2024-05-13", 9, 0));
        // Monday morning before the slot
        assert_eq!(next_run(at("2024-05-13", 7, 30), monday), at("2024-05-13", 9, 0));
        // Monday after the slot waits a full week
        assert_eq!(next_run(at("2024-05-13", 9, 1), monday), at("2024-05-20", 9, 0));
    }

    #[test]
    fn test_sleep_is_bounded_by_a_week() {
        let wait = sleep_until_next(Cadence::Weekly(Weekday::Mon));
        assert!(wait <= Duration::from_secs(7 * 24 * 3600 + 3600));
    }
}
