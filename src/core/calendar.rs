use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, TimeZone, Utc};

use super::item::Item;
use super::list::List;

/// All calendar days are cut in Asia/Riyadh time (UTC+3, no DST), whatever the
/// viewer's local zone is.
pub const CALENDAR_UTC_OFFSET_SECS: i32 = 3 * 3600;

const CALENDAR_ZONE: FixedOffset = match FixedOffset::east_opt(CALENDAR_UTC_OFFSET_SECS) {
    Some(zone) => zone,
    None => panic!("calendar offset out of range"),
};

pub fn calendar_zone() -> FixedOffset {
    CALENDAR_ZONE
}

/// The calendar day an instant falls on.
pub fn day_key<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.with_timezone(&calendar_zone()).date_naive()
}

/// `YYYY-MM-DD` form of [`day_key`], as stored in item `date` fields.
pub fn day_key_string<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format_day_key(day_key(instant))
}

pub fn format_day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

pub fn today() -> NaiveDate {
    day_key(&Utc::now())
}

pub fn has_tasks(list: &List, day: NaiveDate) -> bool {
    list.items.iter().any(|i| i.date == Some(day))
}

pub fn tasks_for_day(list: &List, day: NaiveDate) -> Vec<&Item> {
    list.items.iter().filter(|i| i.date == Some(day)).collect()
}

pub fn is_highlighted(list: &List, day: NaiveDate) -> bool {
    list.highlights.contains(&day)
}

/// Add `day` to the highlights, or remove it if already present.
pub fn toggle_highlight(list: &List, day: NaiveDate) -> List {
    let mut next = list.clone();
    if !next.highlights.remove(&day) {
        next.highlights.insert(day);
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub has_tasks: bool,
    pub is_highlighted: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarCell {
    Blank,
    Day(DayCell),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|c| match c {
            CalendarCell::Day(d) => Some(d),
            CalendarCell::Blank => None,
        })
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells
            .iter()
            .take_while(|c| matches!(c, CalendarCell::Blank))
            .count()
    }

    /// Rows of seven cells, the last one padded with blanks.
    pub fn weeks(&self) -> Vec<Vec<CalendarCell>> {
        self.cells
            .chunks(7)
            .map(|week| {
                let mut row = week.to_vec();
                row.resize(7, CalendarCell::Blank);
                row
            })
            .collect()
    }
}

/// Lay out one month, Sunday first. Returns `None` for an invalid year/month.
pub fn month_grid(
    year: i32,
    month: u32,
    list: &List,
    selected: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = first.checked_add_months(Months::new(1))?;
    let days_in_month = (next_month - first).num_days() as u32;

    let offset = first.weekday().num_days_from_sunday() as usize;
    let mut cells = vec![CalendarCell::Blank; offset];

    for day in 1..=days_in_month {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        cells.push(CalendarCell::Day(DayCell {
            date,
            day,
            has_tasks: has_tasks(list, date),
            is_highlighted: is_highlighted(list, date),
            is_today: date == today,
            is_selected: selected == Some(date),
        }));
    }

    Some(MonthGrid { year, month, cells })
}

/// Month navigation and day selection for the calendar screen.
#[derive(Debug, Clone)]
pub struct CalendarView {
    /// First day of the displayed month.
    pub displayed_month: NaiveDate,
    pub selected_day: NaiveDate,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            displayed_month: today.with_day(1).unwrap_or(today),
            selected_day: today,
        }
    }

    pub fn prev_month(&mut self) {
        self.displayed_month = self
            .displayed_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(self.displayed_month);
    }

    pub fn next_month(&mut self) {
        self.displayed_month = self
            .displayed_month
            .checked_add_months(Months::new(1))
            .unwrap_or(self.displayed_month);
    }

    pub fn select_day(&mut self, date: NaiveDate) {
        self.selected_day = date;
    }

    pub fn grid(&self, list: &List, today: NaiveDate) -> Option<MonthGrid> {
        month_grid(
            self.displayed_month.year(),
            self.displayed_month.month(),
            list,
            Some(self.selected_day),
            today,
        )
    }
}

impl Default for CalendarView {
    fn default() -> Self {
        Self::new(today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_list() -> List {
        List::calendar(Utc::now())
    }

    #[test]
    fn day_key_ignores_caller_offset() {
        // 2024-03-10 22:30 UTC is already 2024-03-11 in Riyadh.
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let new_york = utc.with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap());
        let tokyo = utc.with_timezone(&FixedOffset::east_opt(9 * 3600).unwrap());

        assert_eq!(day_key_string(&utc), "2024-03-11");
        assert_eq!(day_key_string(&new_york), "2024-03-11");
        assert_eq!(day_key_string(&tokyo), "2024-03-11");
    }

    #[test]
    fn zone_is_three_hours_east() {
        assert_eq!(calendar_zone().local_minus_utc(), CALENDAR_UTC_OFFSET_SECS);
    }

    #[test]
    fn same_riyadh_day_same_key() {
        let zone = calendar_zone();
        let morning = zone.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let night = zone.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap();
        let next = zone.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(day_key(&morning), day_key(&night));
        assert_ne!(day_key(&night), day_key(&next));
    }

    #[test]
    fn day_key_round_trips_through_string() {
        assert_eq!(parse_day_key("2024-02-29"), Some(ymd(2024, 2, 29)));
        assert_eq!(format_day_key(ymd(2024, 2, 9)), "2024-02-09");
        assert_eq!(parse_day_key("2024-13-01"), None);
    }

    #[test]
    fn highlight_toggle_is_a_set() {
        let list = calendar_list();
        let day = ymd(2024, 5, 1);
        let on = toggle_highlight(&list, day);
        assert!(is_highlighted(&on, day));
        assert_eq!(on.highlights.len(), 1);
        let off = toggle_highlight(&on, day);
        assert!(!is_highlighted(&off, day));
        assert!(off.highlights.is_empty());
    }

    #[test]
    fn grid_layout_for_february_2024() {
        // 2024-02-01 is a Thursday.
        let mut list = calendar_list();
        list.add_task(ymd(2024, 2, 14), "Dinner").unwrap();
        let list = toggle_highlight(&list, ymd(2024, 2, 20));

        let grid = month_grid(2024, 2, &list, Some(ymd(2024, 2, 3)), ymd(2024, 2, 29)).unwrap();
        assert_eq!(grid.leading_blanks(), 4);
        assert_eq!(grid.days().count(), 29);
        assert_eq!(grid.cells.len(), 33);

        let cell = |d: u32| *grid.days().find(|c| c.day == d).unwrap();
        assert!(cell(14).has_tasks);
        assert!(!cell(15).has_tasks);
        assert!(cell(20).is_highlighted);
        assert!(cell(3).is_selected);
        assert!(cell(29).is_today);
        assert_eq!(grid.days().filter(|c| c.is_today).count(), 1);
        assert_eq!(grid.weeks().len(), 5);
        assert!(grid.weeks().iter().all(|w| w.len() == 7));
    }

    #[test]
    fn grid_is_pure() {
        let mut list = calendar_list();
        list.add_task(ymd(2023, 9, 1), "Start").unwrap();
        let a = month_grid(2023, 9, &list, None, ymd(2023, 9, 5));
        let b = month_grid(2023, 9, &list, None, ymd(2023, 9, 5));
        assert_eq!(a, b);
        // September 2023 starts on a Friday.
        assert_eq!(a.unwrap().leading_blanks(), 5);
    }

    #[test]
    fn invalid_month_yields_none() {
        assert!(month_grid(2024, 13, &calendar_list(), None, ymd(2024, 1, 1)).is_none());
    }

    #[test]
    fn view_navigation_wraps_years() {
        let mut view = CalendarView::new(ymd(2024, 1, 15));
        assert_eq!(view.displayed_month, ymd(2024, 1, 1));
        view.prev_month();
        assert_eq!(view.displayed_month, ymd(2023, 12, 1));
        view.next_month();
        view.next_month();
        assert_eq!(view.displayed_month, ymd(2024, 2, 1));
        assert_eq!(view.selected_day, ymd(2024, 1, 15));
    }

    #[test]
    fn tasks_for_day_filters() {
        let mut list = calendar_list();
        list.add_task(ymd(2024, 7, 4), "Fireworks").unwrap();
        list.add_task(ymd(2024, 7, 5), "Cleanup").unwrap();
        let tasks = tasks_for_day(&list, ymd(2024, 7, 4));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].value, "Fireworks");
    }
}
