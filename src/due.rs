use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// add calendar months, clamping to the last day of shorter months
pub fn add_months(date: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let naive = date.naive_utc();
    let total = naive.month() as i64 + months as i64;
    let year = naive.year() + ((total - 1) / 12) as i32;
    let month = ((total - 1) % 12 + 1) as u32;
    let day = naive.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(naive.hour(), naive.minute(), naive.second()))
        .map(|n| n.and_utc())
        .unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// maturity date of an instrument opened on open_date
pub fn maturity_date(open_date: DateTime<Utc>, tenure_months: u32) -> DateTime<Utc> {
    add_months(open_date, tenure_months)
}

/// whole days until maturity, rounded up; zero or negative means matured
pub fn days_to_maturity(maturity_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (maturity_date - now).num_seconds();
    let days = secs.div_euclid(86_400);
    if secs.rem_euclid(86_400) > 0 {
        days + 1
    } else {
        days
    }
}

/// due date of the next unpaid installment
pub fn next_due_date(open_date: DateTime<Utc>, paid_installments: u32) -> DateTime<Utc> {
    add_months(open_date, paid_installments + 1)
}

/// whether the next installment's due date has passed
pub fn is_overdue(open_date: DateTime<Utc>, paid_installments: u32, now: DateTime<Utc>) -> bool {
    now > next_due_date(open_date, paid_installments)
}

/// completed calendar months between two instants
pub fn months_elapsed(from: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    if now <= from {
        return 0;
    }
    let mut months = ((now.year() - from.year()) * 12
        + (now.month() as i32 - from.month() as i32))
        .max(0) as u32;
    while months > 0 && add_months(from, months) > now {
        months -= 1;
    }
    months
}

/// count of installments whose due date has passed without payment
pub fn overdue_installments(
    open_date: DateTime<Utc>,
    paid_installments: u32,
    now: DateTime<Utc>,
) -> u32 {
    let mut due = ((now.year() - open_date.year()) * 12
        + (now.month() as i32 - open_date.month() as i32))
        .max(0) as u32;
    while due > 0 && add_months(open_date, due) >= now {
        due -= 1;
    }
    due.saturating_sub(paid_installments)
}
