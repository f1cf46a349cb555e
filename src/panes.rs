//! Search panes: categorical filters over table columns.
//!
//! Each pane offers the distinct values of one column (or a fixed set of
//! labelled options, for course level and capacity). Within a pane, the
//! selected options are combined according to the [Combiner]; separate
//! panes always narrow the result further.

use crate::columns::{self, Field};
use crate::errors::{self, Result};
use crate::normalize::Row;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// How the selected options of one pane are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Combiner {
    /// A row matches if it has any of the selected values.
    #[default]
    Or,
    /// A row matches only if it has all of the selected values.
    And,
}

impl Combiner {
    pub fn toggled(self) -> Combiner {
        match self {
            Combiner::Or => Combiner::And,
            Combiner::And => Combiner::Or,
        }
    }
}

impl fmt::Display for Combiner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Combiner::Or => write!(f, "OR"),
            Combiner::And => write!(f, "AND"),
        }
    }
}

impl FromStr for Combiner {
    type Err = Box<dyn std::error::Error>;

    fn from_str(s: &str) -> Result<Combiner> {
        if s.eq_ignore_ascii_case("or") {
            Ok(Combiner::Or)
        } else if s.eq_ignore_ascii_case("and") {
            Ok(Combiner::And)
        } else {
            Err(errors::invalid_argument(format!(
                "pane logic should be 'AND' or 'OR', got '{s}'"
            )))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pane {
    /// Distinct values of a column.
    Values(Field),
    /// Course level ranges.
    Level,
    /// Seat availability.
    Capacity,
}

/// All panes, in column order.
pub const PANES: [Pane; 11] = [
    Pane::Values(Field::Subject),
    Pane::Level,
    Pane::Capacity,
    Pane::Values(Field::Attributes),
    Pane::Values(Field::Type),
    Pane::Values(Field::Time),
    Pane::Values(Field::Days),
    Pane::Values(Field::Location),
    Pane::Values(Field::Nature),
    Pane::Values(Field::Instructors),
    Pane::Values(Field::CalendarName),
];

pub const LEVEL_OPTIONS: [&str; 5] = ["000-199", "200-299", "300-499", "500-999", "1000+"];
pub const CAPACITY_OPTIONS: [&str; 3] = ["Available", "Full", "Waitlisted"];

/// Integer prefix of a string, the way a lenient number parser reads it:
/// `"101"` and `" 101L"` are both 101, `"TBA"` has no value.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn level_labels(row: &Row) -> Vec<String> {
    let Some(level) = row.course.level.as_deref().and_then(leading_int) else {
        return vec![];
    };
    let label = match level {
        i64::MIN..=199 => "000-199",
        200..=299 => "200-299",
        300..=499 => "300-499",
        500..=999 => "500-999",
        _ => "1000+",
    };
    vec![label.to_owned()]
}

fn capacity_labels(row: &Row) -> Vec<String> {
    // Missing counts behave as zero.
    let remaining = row.course.remaining.copied().unwrap_or(0);
    let waitlisted = row.course.waitlisted.copied().unwrap_or(0);
    let mut labels = vec![];
    if remaining > 0 {
        labels.push("Available".to_owned());
    }
    if remaining <= 0 && waitlisted <= 0 {
        labels.push("Full".to_owned());
    }
    if waitlisted > 0 {
        labels.push("Waitlisted".to_owned());
    }
    labels
}

impl Pane {
    pub fn field(self) -> Field {
        match self {
            Pane::Values(f) => f,
            Pane::Level => Field::Level,
            Pane::Capacity => Field::Capacity,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Pane::Values(Field::Attributes) => "Attribute",
            Pane::Values(Field::Days) => "Day",
            Pane::Values(Field::Instructors) => "Instructor",
            Pane::Values(Field::CalendarName) => "Calendar",
            _ => self.field().header(),
        }
    }

    /// The options of this pane that apply to a row.
    pub fn labels(self, row: &Row) -> Vec<String> {
        match self {
            Pane::Values(f) => f.value(row).items(),
            Pane::Level => level_labels(row),
            Pane::Capacity => capacity_labels(row),
        }
    }

    fn fixed_options(self) -> Option<&'static [&'static str]> {
        match self {
            Pane::Values(_) => None,
            Pane::Level => Some(&LEVEL_OPTIONS[..]),
            Pane::Capacity => Some(&CAPACITY_OPTIONS[..]),
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

impl FromStr for Pane {
    type Err = Box<dyn std::error::Error>;

    /// Accepts the pane header or the column header/key, ignoring case.
    fn from_str(s: &str) -> Result<Pane> {
        PANES
            .into_iter()
            .find(|p| {
                p.header().eq_ignore_ascii_case(s)
                    || p.field().header().eq_ignore_ascii_case(s)
                    || p.field().key().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| errors::invalid_argument(format!("no search pane for '{s}'")))
    }
}

/// An option of a pane, with the number of matching rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaneOption {
    pub label: String,
    /// Rows with this value among the rows that pass the other panes.
    pub count: usize,
    /// Rows with this value overall.
    pub total: usize,
}

/// Parse a `pane=value` selection.
pub fn parse_selection(arg: &str) -> Result<(Pane, String)> {
    let parts = arg.splitn(2, '=').collect_vec();
    if parts.len() != 2 {
        return Err(errors::invalid_argument(format!(
            "selection should be of the form 'pane=value', got '{arg}'"
        )));
    }
    let pane: Pane = parts[0].trim().parse()?;
    Ok((pane, parts[1].to_owned()))
}

/// Pane selections plus a global search term.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    pub combiner: Combiner,
    selections: BTreeMap<Pane, BTreeSet<String>>,
    search: Vec<String>,
}

impl Filter {
    pub fn new(combiner: Combiner) -> Filter {
        Filter {
            combiner,
            ..Default::default()
        }
    }

    pub fn select(&mut self, pane: Pane, value: &str) {
        self.selections
            .entry(pane)
            .or_default()
            .insert(value.to_owned());
    }

    pub fn deselect(&mut self, pane: Pane, value: &str) {
        if let Some(values) = self.selections.get_mut(&pane) {
            values.remove(value);
            if values.is_empty() {
                self.selections.remove(&pane);
            }
        }
    }

    pub fn clear(&mut self, pane: Pane) {
        self.selections.remove(&pane);
    }

    pub fn clear_all(&mut self) {
        self.selections.clear();
        self.search.clear();
    }

    pub fn selected(&self, pane: Pane) -> Option<&BTreeSet<String>> {
        self.selections.get(&pane)
    }

    /// Panes with at least one selected option.
    pub fn active(&self) -> impl Iterator<Item = (Pane, &BTreeSet<String>)> {
        self.selections.iter().map(|(&p, v)| (p, v))
    }

    /// Set the global search; every whitespace-separated term must occur
    /// somewhere in the row, ignoring case.
    pub fn set_search(&mut self, search: &str) {
        self.search = search
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect_vec();
    }

    pub fn search(&self) -> String {
        self.search.join(" ")
    }

    fn pane_matches(&self, pane: Pane, selected: &BTreeSet<String>, row: &Row) -> bool {
        let labels = pane.labels(row);
        match self.combiner {
            Combiner::Or => selected.iter().any(|s| labels.contains(s)),
            Combiner::And => selected.iter().all(|s| labels.contains(s)),
        }
    }

    fn search_matches(&self, row: &Row) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let text = columns::search_text(row);
        self.search.iter().all(|t| text.contains(t.as_str()))
    }

    fn matches_except(&self, row: &Row, except: Option<Pane>) -> bool {
        self.search_matches(row)
            && self
                .selections
                .iter()
                .filter(|(p, _)| Some(**p) != except)
                .all(|(&p, selected)| self.pane_matches(p, selected, row))
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.matches_except(row, None)
    }

    /// Options of a pane with counts.
    ///
    /// Counts cascade: they are taken over the rows that pass every other
    /// pane and the search. Value panes list their values in sorted order,
    /// fixed panes list all their options.
    pub fn options(&self, pane: Pane, rows: &[Row]) -> Vec<PaneOption> {
        let mut totals: HashMap<String, usize> = HashMap::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let passes = self.matches_except(row, Some(pane));
            for label in pane.labels(row).into_iter().unique() {
                if passes {
                    *counts.entry(label.clone()).or_default() += 1;
                }
                *totals.entry(label).or_default() += 1;
            }
        }
        let labels = match pane.fixed_options() {
            Some(fixed) => fixed.iter().map(|s| s.to_string()).collect_vec(),
            None => totals.keys().cloned().sorted().collect_vec(),
        };
        labels
            .into_iter()
            .map(|label| PaneOption {
                count: counts.get(&label).copied().unwrap_or(0),
                total: totals.get(&label).copied().unwrap_or(0),
                label,
            })
            .collect_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::{Course, Property, StringList};
    use crate::slot::Slot;

    fn row(subject: &str, level: &str, days: &[&str], remaining: i64, waitlisted: i64) -> Row {
        Row {
            course: Course {
                subject: subject.into(),
                level: level.into(),
                remaining: Slot::Present(remaining),
                waitlisted: Slot::Present(waitlisted),
                properties: vec![Property {
                    days: StringList::Many(days.iter().map(|d| d.to_string()).collect_vec()).into(),
                    ..Default::default()
                }]
                .into(),
                ..Default::default()
            },
            calendar_name: "Fall".to_owned(),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            row("Math", "101", &["Monday", "Wednesday"], 5, 0),
            row("Math", "250", &["Tuesday"], 0, 0),
            row("Physics", "301", &["Monday"], 0, 3),
            row("Physics", "1100", &["Monday", "Tuesday"], 1, 0),
        ]
    }

    fn matching(filter: &Filter, rows: &[Row]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r))
            .map(|(i, _)| i)
            .collect_vec()
    }

    #[test]
    fn combiner_parse() {
        assert_eq!("and".parse::<Combiner>().unwrap(), Combiner::And);
        assert_eq!("OR".parse::<Combiner>().unwrap(), Combiner::Or);
        assert!("xor".parse::<Combiner>().is_err());
        assert_eq!(Combiner::default(), Combiner::Or);
        assert_eq!(Combiner::Or.toggled(), Combiner::And);
        assert_eq!(Combiner::And.to_string(), "AND");
    }

    #[test]
    fn leading_int_basic() {
        assert_eq!(leading_int("101"), Some(101));
        assert_eq!(leading_int(" 42L"), Some(42));
        assert_eq!(leading_int("-5"), Some(-5));
        assert_eq!(leading_int("TBA"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn level_buckets() {
        let r = rows();
        let labels = r.iter().map(|x| Pane::Level.labels(x)).collect_vec();
        assert_eq!(labels, [["000-199"], ["200-299"], ["300-499"], ["1000+"]]);
        let mut odd = r[0].clone();
        odd.course.level = "TBA".into();
        assert!(Pane::Level.labels(&odd).is_empty());
    }

    #[test]
    fn capacity_labels_basic() {
        let r = rows();
        assert_eq!(Pane::Capacity.labels(&r[0]), ["Available"]);
        assert_eq!(Pane::Capacity.labels(&r[1]), ["Full"]);
        assert_eq!(Pane::Capacity.labels(&r[2]), ["Waitlisted"]);
        let mut unknown = r[0].clone();
        unknown.course.remaining = Slot::Absent;
        unknown.course.waitlisted = Slot::Null;
        assert_eq!(Pane::Capacity.labels(&unknown), ["Full"]);
    }

    #[test]
    fn pane_parse() {
        assert_eq!("Day".parse::<Pane>().unwrap(), Pane::Values(Field::Days));
        assert_eq!("days".parse::<Pane>().unwrap(), Pane::Values(Field::Days));
        assert_eq!("Calendar".parse::<Pane>().unwrap(), Pane::Values(Field::CalendarName));
        assert_eq!("level".parse::<Pane>().unwrap(), Pane::Level);
        assert!("Description".parse::<Pane>().is_err());
    }

    #[test]
    fn selection_parse() {
        let (pane, value) = parse_selection("Subject=Computer Science").unwrap();
        assert_eq!(pane, Pane::Values(Field::Subject));
        assert_eq!(value, "Computer Science");
        let (_, value) = parse_selection("Time=a=b").unwrap();
        assert_eq!(value, "a=b");
        assert!(parse_selection("Subject").is_err());
    }

    #[test]
    fn or_within_pane() {
        let r = rows();
        let mut f = Filter::new(Combiner::Or);
        f.select(Pane::Values(Field::Days), "Monday");
        f.select(Pane::Values(Field::Days), "Tuesday");
        assert_eq!(matching(&f, &r), [0, 1, 2, 3]);
    }

    #[test]
    fn and_within_pane() {
        let r = rows();
        let mut f = Filter::new(Combiner::And);
        f.select(Pane::Values(Field::Days), "Monday");
        f.select(Pane::Values(Field::Days), "Tuesday");
        assert_eq!(matching(&f, &r), [3]);
    }

    #[test]
    fn panes_narrow() {
        let r = rows();
        let mut f = Filter::new(Combiner::Or);
        f.select(Pane::Values(Field::Subject), "Physics");
        f.select(Pane::Capacity, "Available");
        assert_eq!(matching(&f, &r), [3]);
        f.deselect(Pane::Capacity, "Available");
        assert!(f.selected(Pane::Capacity).is_none());
        assert_eq!(matching(&f, &r), [2, 3]);
        f.clear(Pane::Values(Field::Subject));
        assert_eq!(matching(&f, &r), [0, 1, 2, 3]);
    }

    #[test]
    fn search_terms() {
        let r = rows();
        let mut f = Filter::new(Combiner::Or);
        f.set_search("physics  MONDAY");
        assert_eq!(f.search(), "physics monday");
        assert_eq!(matching(&f, &r), [2, 3]);
        f.set_search("");
        assert_eq!(matching(&f, &r).len(), 4);
    }

    #[test]
    fn cascading_counts() {
        let r = rows();
        let mut f = Filter::new(Combiner::Or);
        f.select(Pane::Values(Field::Subject), "Physics");
        let days = f.options(Pane::Values(Field::Days), &r);
        let got = days
            .iter()
            .map(|o| (o.label.as_str(), o.count, o.total))
            .collect_vec();
        assert_eq!(
            got,
            [("Monday", 2, 3), ("Tuesday", 1, 2), ("Wednesday", 0, 1)]
        );
        // The pane's own selection does not affect its counts.
        let subjects = f.options(Pane::Values(Field::Subject), &r);
        assert_eq!(subjects[0].count, 2);
        assert_eq!(subjects[1].count, 2);
    }

    #[test]
    fn fixed_options_listed() {
        let r = rows();
        let f = Filter::new(Combiner::Or);
        let levels = f.options(Pane::Level, &r);
        let got = levels.iter().map(|o| (o.label.as_str(), o.count)).collect_vec();
        assert_eq!(
            got,
            [
                ("000-199", 1),
                ("200-299", 1),
                ("300-499", 1),
                ("500-999", 0),
                ("1000+", 1)
            ]
        );
    }
}
