//! Monthly activity derived from the activity time series

use crate::error::CensusError;
use crate::join::ID;
use crate::table::{Cell, Table};
use chrono::{DateTime, Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// First day of the month containing a unix timestamp (UTC).
pub fn month_of(unix: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(unix, 0)
        .map(|dt| dt.date_naive())
        .and_then(first_of_month)
}

pub fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Number of calendar months spanned by two dates, both ends included.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    let (start, end) = if a < b { (a, b) } else { (b, a) };
    (end.year() - start.year()) as i64 * 12 + (end.month() as i64 - start.month() as i64) + 1
}

/// Distinct active months per DAO.
fn months_per_dao(activity: &Table) -> Result<HashMap<String, BTreeSet<NaiveDate>>, CensusError> {
    activity.require_column("daoId")?;
    activity.require_column("unixDate")?;

    let mut months: HashMap<String, BTreeSet<NaiveDate>> = HashMap::new();
    for row in activity.iter() {
        if let Some(month) = row.i64("unixDate").and_then(month_of) {
            months.entry(row.text("daoId")).or_default().insert(month);
        }
    }
    Ok(months)
}

/// Per-DAO lifetime versus months with activity.
///
/// Output columns: `id, name, date, monthLife, activityMonths`. `date` is the DAO's
/// birth month: the census `birth` timestamp when present, otherwise the first month
/// with recorded activity. `monthLife` counts the months from birth to `today`
/// inclusive (0 when the birth month is unknown).
pub fn month_activity(census: &Table, activity: &Table, today: NaiveDate) -> Result<Table, CensusError> {
    census.require_column(ID)?;
    census.require_column("name")?;
    let months = months_per_dao(activity)?;
    let now = first_of_month(today).unwrap_or(today);
    let has_birth = census.has_column("birth");

    let mut table = Table::new([ID, "name", "date", "monthLife", "activityMonths"]);
    for row in census.iter() {
        let id = row.text(ID);
        let active = months.get(&id);

        let birth = if has_birth {
            row.i64("birth").and_then(month_of)
        } else {
            active.and_then(|m| m.iter().next().copied())
        };

        table.push_row(vec![
            Cell::from(id.as_str()),
            row.get("name").cloned().unwrap_or(Cell::Null),
            Cell::from(birth.map(|d| d.format("%Y-%m-%d").to_string())),
            Cell::from(birth.map(|d| months_between(now, d)).unwrap_or(0)),
            Cell::from(active.map(BTreeSet::len).unwrap_or(0)),
        ]);
    }
    Ok(table)
}

/// Number of distinct `key` values (e.g. `daoId`, `userId`) active in each month.
///
/// Output columns: `date, actives`, ordered by month.
pub fn monthly_actives(activity: &Table, key: &str) -> Result<Table, CensusError> {
    activity.require_column(key)?;
    activity.require_column("unixDate")?;

    let mut per_month: BTreeMap<NaiveDate, HashSet<String>> = BTreeMap::new();
    for row in activity.iter() {
        if let Some(month) = row.i64("unixDate").and_then(month_of) {
            per_month.entry(month).or_default().insert(row.text(key));
        }
    }

    let mut table = Table::new(["date", "actives"]);
    for (month, keys) in per_month {
        table.push_row(vec![
            Cell::from(month.format("%Y-%m-%d").to_string()),
            Cell::from(keys.len()),
        ]);
    }
    Ok(table)
}

/// Adds `activityPercentage = activityMonths / monthLife * 100` (0 when `monthLife`
/// is 0). Tables without both source columns are returned unchanged.
pub fn activity_ratio(table: &mut Table) {
    if !table.has_column("activityMonths") || !table.has_column("monthLife") {
        return;
    }
    table.derive_column("activityPercentage", |row| {
        let life = row.f64("monthLife").unwrap_or(0.0);
        let active = row.f64("activityMonths").unwrap_or(0.0);
        if life > 0.0 {
            Cell::Float(active / life * 100.0)
        } else {
            Cell::Int(0)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn activity() -> Table {
        let mut table = Table::new(["daoId", "daoName", "actionType", "unixDate", "userId"]);
        // 2020-01-15, 2020-01-20, 2020-03-02
        table.push_row(vec!["a".into(), "Alpha".into(), "vote".into(), Cell::Int(1579046400), "u1".into()]);
        table.push_row(vec!["a".into(), "Alpha".into(), "stake".into(), Cell::Int(1579478400), "u2".into()]);
        table.push_row(vec!["a".into(), "Alpha".into(), "vote".into(), Cell::Int(1583107200), "u1".into()]);
        table.push_row(vec!["b".into(), "Beta".into(), "proposal".into(), Cell::Int(1583107200), "u1".into()]);
        table
    }

    fn census() -> Table {
        let mut table = Table::new(["id", "name"]);
        table.push_row(vec!["a".into(), "Alpha".into()]);
        table.push_row(vec!["b".into(), "Beta".into()]);
        table.push_row(vec!["c".into(), "Quiet".into()]);
        table
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2020, 1, 1), date(2020, 1, 1)), 1);
        assert_eq!(months_between(date(2020, 4, 1), date(2019, 11, 1)), 6);
        assert_eq!(months_between(date(2019, 11, 1), date(2020, 4, 1)), 6);
    }

    #[test]
    fn test_month_of() {
        assert_eq!(month_of(1579046400), Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_month_activity() {
        let table = month_activity(&census(), &activity(), date(2020, 4, 18)).unwrap();

        let alpha = table.row(0);
        assert_eq!(alpha.text("date"), "2020-01-01");
        assert_eq!(alpha.i64("monthLife"), Some(4));
        assert_eq!(alpha.i64("activityMonths"), Some(2));

        let quiet = table.row(2);
        assert_eq!(quiet.get("date"), Some(&Cell::Null));
        assert_eq!(quiet.i64("monthLife"), Some(0));
        assert_eq!(quiet.i64("activityMonths"), Some(0));
    }

    #[test]
    fn test_month_activity_uses_birth_column() {
        let mut census = census();
        census.add_column("birth", Cell::Int(1572566400)); // 2019-11-01
        let table = month_activity(&census, &activity(), date(2020, 4, 1)).unwrap();
        assert_eq!(table.get(1, "monthLife"), Some(&Cell::Int(6)));
    }

    #[test]
    fn test_monthly_actives() {
        let daos = monthly_actives(&activity(), "daoId").unwrap();
        assert_eq!(daos.column_text("date").unwrap(), vec!["2020-01-01", "2020-03-01"]);
        assert_eq!(daos.get(1, "actives"), Some(&Cell::Int(2)));

        let users = monthly_actives(&activity(), "userId").unwrap();
        assert_eq!(users.get(0, "actives"), Some(&Cell::Int(2)));
        assert_eq!(users.get(1, "actives"), Some(&Cell::Int(1)));
    }

    #[test]
    fn test_activity_ratio() {
        let mut table = month_activity(&census(), &activity(), date(2020, 4, 18)).unwrap();
        activity_ratio(&mut table);
        assert_eq!(table.get(0, "activityPercentage"), Some(&Cell::Float(50.0)));
        assert_eq!(table.get(2, "activityPercentage"), Some(&Cell::Int(0)));
    }
}
