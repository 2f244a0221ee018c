//! Event calendar domain logic.
//!
//! All date calculations and event organization by date live here; the
//! client only handles presentation.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate};
use log::info;
use shared::{CalendarDay, CalendarDayType, CalendarMonth, EventCategory, TempleEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory registry of temple events plus the calendar grid generator.
#[derive(Clone)]
pub struct EventService {
    events: Arc<Mutex<Vec<TempleEvent>>>,
}

impl EventService {
    pub fn new() -> Self {
        let today = Local::now().date_naive();
        Self {
            events: Arc::new(Mutex::new(seed_events(today.year(), today.month()))),
        }
    }

    pub fn list(&self) -> Vec<TempleEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events on a given YYYY-MM-DD date.
    pub fn events_on(&self, date: &str) -> Vec<TempleEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.date == date)
            .cloned()
            .collect()
    }

    /// Generate the calendar grid for a month: leading padding cells up to
    /// the weekday of day 1, then one cell per day carrying its events.
    pub fn month_grid(&self, year: i32, month: u32) -> Result<CalendarMonth> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month {year}-{month}"))?;
        let first_day_of_week = first.weekday().num_days_from_sunday();
        let days_in_month = days_in_month(year, month);

        info!("Calendar: generating grid for {year}-{month:02}");

        let events_by_day = self.group_events_by_day(year, month);

        let mut days = Vec::with_capacity((first_day_of_week + days_in_month) as usize);
        for _ in 0..first_day_of_week {
            days.push(CalendarDay {
                day: 0,
                day_type: CalendarDayType::PaddingBefore,
                events: Vec::new(),
            });
        }
        for day in 1..=days_in_month {
            days.push(CalendarDay {
                day,
                day_type: CalendarDayType::MonthDay,
                events: events_by_day.get(&day).cloned().unwrap_or_default(),
            });
        }

        Ok(CalendarMonth {
            month,
            year,
            days,
            first_day_of_week,
        })
    }

    fn group_events_by_day(&self, year: i32, month: u32) -> HashMap<u32, Vec<TempleEvent>> {
        let mut by_day: HashMap<u32, Vec<TempleEvent>> = HashMap::new();
        for event in self.events.lock().unwrap().iter() {
            if let Ok(date) = NaiveDate::parse_from_str(&event.date, "%Y-%m-%d") {
                if date.year() == year && date.month() == month {
                    by_day.entry(date.day()).or_default().push(event.clone());
                }
            }
        }
        by_day
    }

    /// Insert or replace an event, keyed by id. Used by the admin editor.
    pub fn upsert(&self, event: TempleEvent) -> Result<()> {
        if event.title.trim().is_empty() {
            return Err(anyhow!("Event title cannot be empty"));
        }
        NaiveDate::parse_from_str(&event.date, "%Y-%m-%d")
            .map_err(|_| anyhow!("Event date must be YYYY-MM-DD"))?;
        let mut events = self.events.lock().unwrap();
        match events.iter_mut().find(|existing| existing.id == event.id) {
            Some(existing) => *existing = event,
            None => events.push(event),
        }
        Ok(())
    }

    pub fn remove(&self, id: &str) -> bool {
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|event| event.id != id);
        events.len() < before
    }
}

impl Default for EventService {
    fn default() -> Self {
        Self::new()
    }
}

/// Month and year arithmetic for calendar navigation.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next) = next_month(year, month);
    // Day 0 of the next month is the last day of this one.
    NaiveDate::from_ymd_opt(next_year, next, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Demo events seeded into the given month, carried over from the
/// temple's launch content.
fn seed_events(year: i32, month: u32) -> Vec<TempleEvent> {
    let date = |day: u32| format!("{year}-{month:02}-{day:02}");
    vec![
        TempleEvent {
            id: "e1".to_string(),
            title: "周日共修法会".to_string(),
            date: date(3),
            time: "09:30 AM - 11:30 AM".to_string(),
            location: "大雄宝殿".to_string(),
            description: "讽诵《金刚经》，佛前大供，开示。欢迎大众参加。".to_string(),
            category: EventCategory::Ceremony,
        },
        TempleEvent {
            id: "e2".to_string(),
            title: "初级禅修班".to_string(),
            date: date(5),
            time: "07:00 PM - 09:00 PM".to_string(),
            location: "禅堂".to_string(),
            description: "教授基础坐禅方法（数息观），调身调息，放松身心。".to_string(),
            category: EventCategory::Meditation,
        },
        TempleEvent {
            id: "e3".to_string(),
            title: "佛学基础讲座".to_string(),
            date: date(8),
            time: "02:00 PM - 04:00 PM".to_string(),
            location: "般若讲堂".to_string(),
            description: "讲题：缘起法与现代生活。主讲：慧明法师。".to_string(),
            category: EventCategory::Class,
        },
        TempleEvent {
            id: "e4".to_string(),
            title: "周日共修法会".to_string(),
            date: date(10),
            time: "09:30 AM - 11:30 AM".to_string(),
            location: "大雄宝殿".to_string(),
            description: "讽诵《药师经》，祈愿众生身心康泰。".to_string(),
            category: EventCategory::Ceremony,
        },
        TempleEvent {
            id: "e5".to_string(),
            title: "观音菩萨圣诞法会".to_string(),
            date: date(19),
            time: "09:00 AM - 02:00 PM".to_string(),
            location: "大雄宝殿".to_string(),
            description: "恭祝观世音菩萨圣诞，举行大悲忏法会。".to_string(),
            category: EventCategory::Festival,
        },
        TempleEvent {
            id: "e6".to_string(),
            title: "八关斋戒".to_string(),
            date: date(25),
            time: "08:00 AM - 08:00 PM".to_string(),
            location: "大觉寺全区".to_string(),
            description: "一日一夜受持八条戒律，体验出家生活。需提前报名。".to_string(),
            category: EventCategory::Ceremony,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_has_padding_then_month_days() {
        let service = EventService::new();
        // March 2024 starts on a Friday (weekday 5 from Sunday).
        let grid = service.month_grid(2024, 3).unwrap();
        assert_eq!(grid.first_day_of_week, 5);
        assert_eq!(grid.days.len(), 5 + 31);
        assert!(grid.days[..5]
            .iter()
            .all(|d| d.day_type == CalendarDayType::PaddingBefore));
        assert_eq!(grid.days[5].day, 1);
        assert_eq!(grid.days.last().unwrap().day, 31);
    }

    #[test]
    fn test_seeded_events_land_on_their_days() {
        let service = EventService::new();
        let today = Local::now().date_naive();
        let grid = service.month_grid(today.year(), today.month()).unwrap();

        let day3 = grid
            .days
            .iter()
            .find(|d| d.day == 3 && d.day_type == CalendarDayType::MonthDay)
            .unwrap();
        assert_eq!(day3.events.len(), 1);
        assert_eq!(day3.events[0].id, "e1");
    }

    #[test]
    fn test_leap_february_has_29_days() {
        let service = EventService::new();
        let grid = service.month_grid(2024, 2).unwrap();
        assert_eq!(grid.days.last().unwrap().day, 29);
    }

    #[test]
    fn test_invalid_month_is_an_error() {
        let service = EventService::new();
        assert!(service.month_grid(2024, 13).is_err());
    }

    #[test]
    fn test_month_navigation_wraps_at_year_boundaries() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(next_month(2024, 6), (2024, 7));
    }

    #[test]
    fn test_upsert_rejects_malformed_date() {
        let service = EventService::new();
        let mut event = service.list()[0].clone();
        event.date = "03/19/2024".to_string();
        assert!(service.upsert(event).is_err());
    }
}
