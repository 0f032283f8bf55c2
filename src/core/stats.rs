use chrono::{Datelike, NaiveDate, Weekday};

use super::category::{self, Category, UNCATEGORIZED_COLOR};
use super::local_day;
use super::task::Task;

const MONTHS_SHOWN: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub color: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayCount {
    pub weekday: Weekday,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCount {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Completion {
    pub total: usize,
    pub completed: usize,
    pub rate: u32,
}

impl Completion {
    fn of<'a>(tasks: impl Iterator<Item = &'a Task>) -> Self {
        let (total, completed) = tasks.fold((0, 0), |(total, done), t| {
            (total + 1, done + usize::from(t.completed))
        });
        Self {
            total,
            completed,
            rate: percent(completed, total),
        }
    }
}

/// Aggregates shown on the statistics view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub overall: Completion,
    pub important: Completion,
    pub overdue: usize,
    pub by_category: Vec<CategoryCount>,
    /// Monday first, bucketed by due day.
    pub by_weekday: [WeekdayCount; 7],
    /// Oldest month first, bucketed by creation day.
    pub by_month: Vec<MonthCount>,
}

/// Rounded percentage, 0 for an empty set.
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as u32
}

impl TaskStats {
    pub fn compute(tasks: &[Task], categories: &[Category], today: NaiveDate) -> Self {
        Self {
            overall: Completion::of(tasks.iter()),
            important: Completion::of(tasks.iter().filter(|t| t.important)),
            overdue: tasks.iter().filter(|t| t.is_overdue(today)).count(),
            by_category: by_category(tasks, categories),
            by_weekday: by_weekday(tasks),
            by_month: by_month(tasks, today),
        }
    }
}

fn by_category(tasks: &[Task], categories: &[Category]) -> Vec<CategoryCount> {
    let mut result: Vec<CategoryCount> = categories
        .iter()
        .map(|c| {
            let counts = Completion::of(tasks.iter().filter(|t| t.has_category(&c.id)));
            CategoryCount {
                name: c.name.clone(),
                color: c.color.clone(),
                total: counts.total,
                completed: counts.completed,
            }
        })
        .collect();

    // Dangling references count as uncategorized.
    let uncategorized = Completion::of(
        tasks
            .iter()
            .filter(|t| category::find(categories, t.category_id.as_deref()).is_none()),
    );
    if uncategorized.total > 0 {
        result.push(CategoryCount {
            name: "Uncategorized".into(),
            color: UNCATEGORIZED_COLOR.into(),
            total: uncategorized.total,
            completed: uncategorized.completed,
        });
    }

    result.retain(|c| c.total > 0);
    result
}

fn by_weekday(tasks: &[Task]) -> [WeekdayCount; 7] {
    let mut buckets = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .map(|weekday| WeekdayCount {
        weekday,
        total: 0,
        completed: 0,
    });

    for (due, completed) in tasks.iter().filter_map(|t| t.due_day().map(|d| (d, t.completed))) {
        let bucket = &mut buckets[due.weekday().num_days_from_monday() as usize];
        bucket.total += 1;
        if completed {
            bucket.completed += 1;
        }
    }
    buckets
}

fn by_month(tasks: &[Task], today: NaiveDate) -> Vec<MonthCount> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..MONTHS_SHOWN as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            let (year, month) = (index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
            let counts = Completion::of(tasks.iter().filter(|t| {
                let created = local_day(&t.created_at);
                created.year() == year && created.month() == month
            }));
            let label = NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b").to_string())
                .unwrap_or_default();
            MonthCount {
                year,
                month,
                label,
                total: counts.total,
                completed: counts.completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::default_categories;
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};

    fn noon(day: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn today() -> NaiveDate {
        // A Tuesday.
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn empty_set_has_zero_rates() {
        let stats = TaskStats::compute(&[], &default_categories(), today());
        assert_eq!(stats.overall, Completion::default());
        assert!(stats.by_category.is_empty());
        assert_eq!(stats.by_month.len(), 6);
        assert!(stats.by_weekday.iter().all(|w| w.total == 0));
    }

    #[test]
    fn completion_rates_round() {
        let mut tasks: Vec<Task> = (0..3).map(|i| Task::new(format!("t{i}")).unwrap()).collect();
        tasks[0].completed = true;
        tasks[1].important = true;
        tasks[1].completed = true;
        let stats = TaskStats::compute(&tasks, &[], today());
        assert_eq!(stats.overall.rate, 67);
        assert_eq!(stats.important, Completion { total: 1, completed: 1, rate: 100 });
    }

    #[test]
    fn dangling_categories_count_as_uncategorized() {
        let tasks = vec![
            Task::new("a").unwrap().with_category("1"),
            Task::new("b").unwrap().with_category("deleted"),
            Task::new("c").unwrap(),
        ];
        let stats = TaskStats::compute(&tasks, &default_categories(), today());
        let names: Vec<_> = stats.by_category.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Uncategorized"]);
        assert_eq!(stats.by_category[1].total, 2);
        assert_eq!(stats.by_category[1].color, UNCATEGORIZED_COLOR);
    }

    #[test]
    fn weekday_buckets_start_on_monday() {
        let tasks = vec![
            Task::new("tue").unwrap().with_due_date(noon(today())),
            Task::new("sun").unwrap().with_due_date(noon(today() - Duration::days(2))),
        ];
        let stats = TaskStats::compute(&tasks, &[], today());
        assert_eq!(stats.by_weekday[0].weekday, Weekday::Mon);
        assert_eq!(stats.by_weekday[1].total, 1);
        assert_eq!(stats.by_weekday[6].total, 1);
    }

    #[test]
    fn months_cover_the_last_half_year() {
        let mut old = Task::new("old").unwrap();
        old.created_at = noon(NaiveDate::from_ymd_opt(2025, 10, 5).unwrap());
        let mut ancient = Task::new("ancient").unwrap();
        ancient.created_at = noon(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());

        let stats = TaskStats::compute(&[old, ancient], &[], today());
        let months: Vec<_> = stats.by_month.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(
            months,
            vec![(2025, 10), (2025, 11), (2025, 12), (2026, 1), (2026, 2), (2026, 3)]
        );
        assert_eq!(stats.by_month[0].total, 1);
        assert_eq!(stats.by_month[0].label, "Oct");
    }

    #[test]
    fn percent_of_empty_is_zero() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 2), 50);
    }
}
