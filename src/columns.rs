//! The fixed column layout of the course table.

use crate::errors::{self, Result};
use crate::input::Property;
use crate::normalize::Row;
use crate::slot::{Scalar, Slot};
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// The expand/collapse control; carries no data.
    Control,
    Crn,
    Section,
    Subject,
    Abbreviation,
    Level,
    Name,
    Description,
    Credits,
    Capacity,
    Registered,
    Remaining,
    Waitlisted,
    Prerequisites,
    Corequisites,
    MutualExclusions,
    CrossListCourses,
    Restrictions,
    Attributes,
    Type,
    Time,
    Days,
    Location,
    Period,
    Nature,
    Instructors,
    CalendarName,
}

use Field::*;

/// All columns, in table order.
pub const COLUMNS: [Field; 27] = [
    Control,
    Crn,
    Section,
    Subject,
    Abbreviation,
    Level,
    Name,
    Description,
    Credits,
    Capacity,
    Registered,
    Remaining,
    Waitlisted,
    Prerequisites,
    Corequisites,
    MutualExclusions,
    CrossListCourses,
    Restrictions,
    Attributes,
    Type,
    Time,
    Days,
    Location,
    Period,
    Nature,
    Instructors,
    CalendarName,
];

/// The value of one table cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(i64),
    List(Vec<String>),
}

impl Cell {
    fn text(v: &Slot<Scalar>) -> Cell {
        v.as_deref().map_or(Cell::Empty, |s| Cell::Text(s.to_owned()))
    }

    fn number(v: &Slot<i64>) -> Cell {
        v.copied().map_or(Cell::Empty, Cell::Number)
    }

    fn list(v: &Slot<Vec<String>>) -> Cell {
        v.get().map_or(Cell::Empty, |items| Cell::List(items.clone()))
    }

    /// Individual values, as offered by a filter pane.
    pub fn items(&self) -> Vec<String> {
        match self {
            Cell::Empty => vec![],
            Cell::Text(s) => vec![s.clone()],
            Cell::Number(n) => vec![n.to_string()],
            Cell::List(v) => v.clone(),
        }
    }

    fn sort_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n as f64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Table ordering: empty cells first, numbers numerically, the rest as text.
    pub fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Empty, Cell::Empty) => Ordering::Equal,
            (Cell::Empty, _) => Ordering::Less,
            (_, Cell::Empty) => Ordering::Greater,
            _ => match (self.sort_number(), other.sort_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.to_string().cmp(&other.to_string()),
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::List(v) => write!(f, "{}", v.join(", ")),
        }
    }
}

fn property_cell(row: &Row, get: impl Fn(&Property) -> Cell) -> Cell {
    row.course.first_property().map_or(Cell::Empty, get)
}

impl Field {
    /// Data key, using `Properties.0.*` for fields of the first meeting.
    pub fn key(self) -> &'static str {
        match self {
            Control => "",
            Crn => "CRN",
            Section => "Section",
            Subject => "Subject",
            Abbreviation => "Abbreviation",
            Level => "Level",
            Name => "Name",
            Description => "Description",
            Credits => "Credits",
            Capacity => "Capacity",
            Registered => "Registered",
            Remaining => "Remaining",
            Waitlisted => "Waitlisted",
            Prerequisites => "Prerequisites",
            Corequisites => "Corequisites",
            MutualExclusions => "Mutual Exclusions",
            CrossListCourses => "Cross List Courses",
            Restrictions => "Restrictions",
            Attributes => "Attributes",
            Type => "Properties.0.Type",
            Time => "Properties.0.Time",
            Days => "Properties.0.Days",
            Location => "Properties.0.Location",
            Period => "Properties.0.Period",
            Nature => "Properties.0.Nature",
            Instructors => "Properties.0.Instructors",
            CalendarName => "Calendar Name",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Control => "",
            Type | Time | Days | Location | Period | Nature | Instructors => {
                self.key().trim_start_matches("Properties.0.")
            }
            _ => self.key(),
        }
    }

    /// Shown as a table column; the others only feed panes and details.
    pub fn visible(self) -> bool {
        matches!(
            self,
            Control
                | Section
                | Subject
                | Abbreviation
                | Level
                | Name
                | Credits
                | Capacity
                | Registered
                | Remaining
                | Waitlisted
        )
    }

    /// Columns that carry data, i.e. everything but the control.
    pub fn data() -> impl Iterator<Item = Field> {
        COLUMNS.into_iter().filter(|&f| f != Control)
    }

    pub fn value(self, row: &Row) -> Cell {
        let c = &row.course;
        match self {
            Control => Cell::Empty,
            Crn => Cell::text(&c.crn),
            Section => Cell::text(&c.section),
            Subject => Cell::text(&c.subject),
            Abbreviation => Cell::text(&c.abbreviation),
            Level => Cell::text(&c.level),
            Name => Cell::text(&c.name),
            Description => Cell::text(&c.description),
            Credits => Cell::text(&c.credits),
            Capacity => Cell::number(&c.capacity),
            Registered => Cell::number(&c.registered),
            Remaining => Cell::number(&c.remaining),
            Waitlisted => Cell::number(&c.waitlisted),
            Prerequisites => Cell::list(&c.prerequisites),
            Corequisites => Cell::list(&c.corequisites),
            MutualExclusions => Cell::list(&c.mutual_exclusions),
            CrossListCourses => Cell::list(&c.cross_list_courses),
            Restrictions => c.restrictions.get().map_or(Cell::Empty, |v| {
                Cell::List(v.iter().map(|r| r.description.clone()).collect_vec())
            }),
            Attributes => Cell::list(&c.attributes),
            Type => property_cell(row, |p| Cell::text(&p.kind)),
            Time => property_cell(row, |p| Cell::text(&p.time)),
            Days => property_cell(row, |p| Cell::List(p.days().to_vec())),
            Location => property_cell(row, |p| Cell::text(&p.location)),
            Period => property_cell(row, |p| Cell::text(&p.period)),
            Nature => property_cell(row, |p| Cell::text(&p.nature)),
            Instructors => property_cell(row, |p| Cell::List(p.instructors().to_vec())),
            CalendarName => Cell::Text(row.calendar_name.clone()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

impl FromStr for Field {
    type Err = Box<dyn std::error::Error>;

    /// Accepts a header or data key, ignoring case.
    fn from_str(s: &str) -> Result<Field> {
        Field::data()
            .find(|f| f.header().eq_ignore_ascii_case(s) || f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| errors::invalid_argument(format!("unknown column '{s}'")))
    }
}

/// Lower-cased text of all data cells, for global search.
pub fn search_text(row: &Row) -> String {
    Field::data()
        .map(|f| f.value(row).to_string())
        .filter(|s| !s.is_empty())
        .join(" ")
        .to_lowercase()
}
