use crate::input::Calendar;
use crate::normalize::Row;
use crate::panes::Filter;
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashSet;

fn explain_values(values: &HashSet<&str>) -> String {
    let vals = values.iter().copied().sorted().collect_vec();
    if vals.len() > 10 {
        format!("{}, ... ({} values)", vals[..10].join(", "), vals.len())
    } else {
        vals.join(", ")
    }
}

pub fn statistics(calendars: &[Calendar]) {
    let mut subjects = HashSet::new();
    let mut meetings = 0;
    for calendar in calendars {
        info!(target: "courseview", "calendar {}: {} courses", calendar.name, calendar.courses.len());
        for course in &calendar.courses {
            if let Some(subject) = course.subject.as_deref() {
                subjects.insert(subject);
            }
            meetings += course.properties().len();
        }
    }
    let total: usize = calendars.iter().map(|c| c.courses.len()).sum();
    info!(target: "courseview", "courses: {total}");
    debug!(target: "courseview", "meeting patterns: {meetings}");
    debug!(target: "courseview", "subjects: {}", explain_values(&subjects));
}

pub fn post_statistics(rows: &[&Row], filter: &Filter) {
    for (pane, values) in filter.active() {
        info!(
            target: "courseview",
            "{pane}: {} ({})",
            values.iter().join(", "),
            filter.combiner
        );
    }
    let search = filter.search();
    if !search.is_empty() {
        info!(target: "courseview", "search: {search}");
    }
    let calendars: HashSet<&str> = rows.iter().map(|r| r.calendar_name.as_str()).collect();
    info!(target: "courseview", "after filtering: courses: {}", rows.len());
    info!(target: "courseview", "after filtering: calendars: {}", explain_values(&calendars));
}
