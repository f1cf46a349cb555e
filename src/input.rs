//! Data structures for representing the input: calendars of courses.
//!
//! Keys follow the spelling of the calendar files as written by the
//! course scraper, e.g. `"Mutual Exclusions"` or `"Calendar Name"`.
//! Keys that are not modelled here are kept in `extra` and written back
//! unchanged on export.

use crate::errors::{self, Result};
use crate::slot::{Scalar, Slot};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, slice};

/// Key under which a course carries the name of its calendar.
pub const CALENDAR_NAME: &str = "Calendar Name";

/// A list of strings that may also be given as a single bare string.
///
/// Unscheduled meetings are written as `"TBA"` instead of `["TBA"]`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringList {
    Many(Vec<String>),
    One(String),
}

impl StringList {
    pub fn items(&self) -> &[String] {
        match self {
            StringList::Many(v) => v,
            StringList::One(s) => slice::from_ref(s),
        }
    }
}

/// An eligibility rule with the specific requirements that satisfy it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Restriction {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Requirements", default, skip_serializing_if = "Slot::is_absent")]
    pub requirements: Slot<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Restriction {
    pub fn requirements(&self) -> &[String] {
        self.requirements.as_deref().unwrap_or_default()
    }
}

/// One scheduled meeting pattern of a course.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Property {
    #[serde(rename = "Type", default, skip_serializing_if = "Slot::is_absent")]
    pub kind: Slot<Scalar>,
    #[serde(rename = "Nature", default, skip_serializing_if = "Slot::is_absent")]
    pub nature: Slot<Scalar>,
    #[serde(rename = "Time", default, skip_serializing_if = "Slot::is_absent")]
    pub time: Slot<Scalar>,
    #[serde(rename = "Days", default, skip_serializing_if = "Slot::is_absent")]
    pub days: Slot<StringList>,
    #[serde(rename = "Location", default, skip_serializing_if = "Slot::is_absent")]
    pub location: Slot<Scalar>,
    #[serde(rename = "Period", default, skip_serializing_if = "Slot::is_absent")]
    pub period: Slot<Scalar>,
    #[serde(rename = "Instructors", default, skip_serializing_if = "Slot::is_absent")]
    pub instructors: Slot<StringList>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    pub fn days(&self) -> &[String] {
        self.days.get().map(StringList::items).unwrap_or_default()
    }

    pub fn instructors(&self) -> &[String] {
        self.instructors.get().map(StringList::items).unwrap_or_default()
    }
}

/// One offered class section.
///
/// Every field may be `null` or missing, and both are kept apart so that
/// the course is written back exactly as it was read. Text fields also
/// accept numbers (e.g. `"Credits": 3`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Course {
    #[serde(rename = "CRN", default, skip_serializing_if = "Slot::is_absent")]
    pub crn: Slot<Scalar>,
    #[serde(rename = "Section", default, skip_serializing_if = "Slot::is_absent")]
    pub section: Slot<Scalar>,
    #[serde(rename = "Subject", default, skip_serializing_if = "Slot::is_absent")]
    pub subject: Slot<Scalar>,
    #[serde(rename = "Abbreviation", default, skip_serializing_if = "Slot::is_absent")]
    pub abbreviation: Slot<Scalar>,
    /// Course level, a number usually written as a string (e.g. `"101"`).
    #[serde(rename = "Level", default, skip_serializing_if = "Slot::is_absent")]
    pub level: Slot<Scalar>,
    #[serde(rename = "Name", default, skip_serializing_if = "Slot::is_absent")]
    pub name: Slot<Scalar>,
    #[serde(rename = "Description", default, skip_serializing_if = "Slot::is_absent")]
    pub description: Slot<Scalar>,
    #[serde(rename = "Credits", default, skip_serializing_if = "Slot::is_absent")]
    pub credits: Slot<Scalar>,
    #[serde(rename = "Capacity", default, skip_serializing_if = "Slot::is_absent")]
    pub capacity: Slot<i64>,
    #[serde(rename = "Registered", default, skip_serializing_if = "Slot::is_absent")]
    pub registered: Slot<i64>,
    #[serde(rename = "Remaining", default, skip_serializing_if = "Slot::is_absent")]
    pub remaining: Slot<i64>,
    #[serde(rename = "Waitlisted", default, skip_serializing_if = "Slot::is_absent")]
    pub waitlisted: Slot<i64>,
    #[serde(rename = "Prerequisites", default, skip_serializing_if = "Slot::is_absent")]
    pub prerequisites: Slot<Vec<String>>,
    #[serde(rename = "Corequisites", default, skip_serializing_if = "Slot::is_absent")]
    pub corequisites: Slot<Vec<String>>,
    #[serde(rename = "Mutual Exclusions", default, skip_serializing_if = "Slot::is_absent")]
    pub mutual_exclusions: Slot<Vec<String>>,
    #[serde(rename = "Cross List Courses", default, skip_serializing_if = "Slot::is_absent")]
    pub cross_list_courses: Slot<Vec<String>>,
    #[serde(rename = "Restrictions", default, skip_serializing_if = "Slot::is_absent")]
    pub restrictions: Slot<Vec<Restriction>>,
    #[serde(rename = "Attributes", default, skip_serializing_if = "Slot::is_absent")]
    pub attributes: Slot<Vec<String>>,
    /// Meeting patterns; the first one is shown in the table columns.
    #[serde(rename = "Properties", default, skip_serializing_if = "Slot::is_absent")]
    pub properties: Slot<Vec<Property>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    pub fn properties(&self) -> &[Property] {
        self.properties.as_deref().unwrap_or_default()
    }

    /// The meeting pattern surfaced as top-level columns.
    pub fn first_property(&self) -> Option<&Property> {
        self.properties().first()
    }
}

/// A named grouping of courses, typically one academic term.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Calendar {
    #[serde(rename = "Calendar Name", alias = "Name")]
    pub name: String,
    #[serde(rename = "Courses")]
    pub courses: Vec<Course>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse the contents of a calendar file.
///
/// `source` is only used in error messages. Errors point to the JSON
/// path of the offending element, e.g. `[0].Courses[3].Properties`.
pub fn parse_calendars(data: &str, source: &str) -> Result<Vec<Calendar>> {
    let de = &mut serde_json::Deserializer::from_str(data);
    let calendars: Vec<Calendar> = serde_path_to_error::deserialize(&mut *de)
        .map_err(|e| errors::load_error(source, e))?;
    de.end().map_err(|e| errors::load_error(source, e))?;
    debug!(target: "courseview", "{source}: {} calendars", calendars.len());
    Ok(calendars)
}

/// Read and parse a calendar file.
pub fn read_calendars(filename: &str) -> Result<Vec<Calendar>> {
    let data = fs::read_to_string(filename)
        .map_err(|e| errors::load_error(filename, e))?;
    parse_calendars(&data, filename)
}
