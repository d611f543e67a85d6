//! Occurrence rules for the supported frequencies.

use chrono::{Datelike, NaiveDate};

use super::{
    calendar::{days_between, days_in_month, DateRange},
    transaction::{Frequency, Transaction},
};

pub const FOUR_WEEKLY_INTERVAL_DAYS: i64 = 28;

impl Frequency {
    /// Whether a rule with this frequency, anchored on `anchor`, fires on `date`.
    ///
    /// Monthly rules match on the day-of-month only. An anchor on the 29th,
    /// 30th or 31st therefore never fires in months that lack that day; the
    /// occurrence is skipped, not moved to the month's last day.
    pub fn occurs_on(self, anchor: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Frequency::Irregular => date == anchor,
            Frequency::Monthly => date >= anchor && date.day() == anchor.day(),
            Frequency::FourWeekly => {
                date >= anchor && days_between(anchor, date) % FOUR_WEEKLY_INTERVAL_DAYS == 0
            }
        }
    }
}

impl Transaction {
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.frequency.occurs_on(self.date, date)
    }
}

/// Concrete dates on which `transaction` occurs between `from` and `until`, inclusive.
pub fn upcoming(transaction: &Transaction, from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let start = from.max(transaction.date);
    match transaction.frequency {
        Frequency::Irregular => {
            if transaction.date >= from && transaction.date <= until {
                vec![transaction.date]
            } else {
                Vec::new()
            }
        }
        Frequency::FourWeekly => {
            let offset = days_between(transaction.date, start);
            let remainder = offset.rem_euclid(FOUR_WEEKLY_INTERVAL_DAYS);
            let skip = if remainder == 0 {
                0
            } else {
                FOUR_WEEKLY_INTERVAL_DAYS - remainder
            };
            DateRange::inclusive(start, until)
                .skip(skip as usize)
                .step_by(FOUR_WEEKLY_INTERVAL_DAYS as usize)
                .collect()
        }
        Frequency::Monthly => DateRange::inclusive(start, until)
            .filter(|date| transaction.occurs_on(*date))
            .collect(),
    }
}

/// Returns true when a monthly rule anchored on `anchor` has no occurrence in
/// the given month because the month is too short.
pub fn skips_month(anchor: NaiveDate, year: i32, month: u32) -> bool {
    anchor.day() > days_in_month(year, month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::TransactionKind;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, anchor: NaiveDate) -> Transaction {
        Transaction::new("Rule", TransactionKind::Income, dec!(1), frequency, anchor).unwrap()
    }

    #[test]
    fn irregular_matches_only_its_day() {
        let anchor = date(2024, 5, 3);
        assert!(Frequency::Irregular.occurs_on(anchor, anchor));
        assert!(!Frequency::Irregular.occurs_on(anchor, date(2024, 6, 3)));
    }

    #[test]
    fn monthly_never_fires_before_anchor() {
        let anchor = date(2024, 3, 15);
        assert!(!Frequency::Monthly.occurs_on(anchor, date(2024, 2, 15)));
        assert!(Frequency::Monthly.occurs_on(anchor, date(2024, 3, 15)));
        assert!(Frequency::Monthly.occurs_on(anchor, date(2025, 1, 15)));
        assert!(!Frequency::Monthly.occurs_on(anchor, date(2025, 1, 16)));
    }

    #[test]
    fn monthly_on_31st_skips_short_months() {
        let txn = rule(Frequency::Monthly, date(2024, 1, 31));
        let dates = upcoming(&txn, date(2024, 1, 1), date(2024, 6, 30));
        assert_eq!(
            dates,
            vec![date(2024, 1, 31), date(2024, 3, 31), date(2024, 5, 31)]
        );
        assert!(skips_month(txn.date, 2024, 2));
        assert!(skips_month(txn.date, 2024, 4));
        assert!(!skips_month(txn.date, 2024, 7));
    }

    #[test]
    fn four_weekly_counts_whole_days_from_anchor() {
        let anchor = date(2024, 1, 1);
        assert!(Frequency::FourWeekly.occurs_on(anchor, date(2024, 1, 29)));
        assert!(Frequency::FourWeekly.occurs_on(anchor, date(2024, 2, 26)));
        assert!(!Frequency::FourWeekly.occurs_on(anchor, date(2024, 2, 1)));
        assert!(!Frequency::FourWeekly.occurs_on(anchor, date(2023, 12, 4)));
    }

    #[test]
    fn upcoming_four_weekly_aligns_to_phase() {
        let txn = rule(Frequency::FourWeekly, date(2024, 1, 1));
        let dates = upcoming(&txn, date(2024, 1, 10), date(2024, 4, 1));
        assert_eq!(
            dates,
            vec![date(2024, 1, 29), date(2024, 2, 26), date(2024, 3, 25)]
        );
    }

    #[test]
    fn upcoming_irregular_outside_window_is_empty() {
        let txn = rule(Frequency::Irregular, date(2024, 1, 1));
        assert!(upcoming(&txn, date(2024, 1, 2), date(2024, 2, 1)).is_empty());
        assert_eq!(
            upcoming(&txn, date(2023, 12, 1), date(2024, 1, 1)),
            vec![date(2024, 1, 1)]
        );
    }
}
