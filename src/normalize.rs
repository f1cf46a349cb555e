//! Flattening calendars into a single sequence of courses.

use crate::input::{CALENDAR_NAME, Calendar, Course};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A course together with the name of the calendar it came from.
///
/// Serialized as one flat object: the course keys followed by
/// `"Calendar Name"`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Row {
    #[serde(flatten)]
    pub course: Course,
    #[serde(rename = "Calendar Name")]
    pub calendar_name: String,
}

/// Flatten calendars into rows, in calendar order and then course order.
///
/// A `"Calendar Name"` key already present in a course is replaced by
/// the name of its calendar.
pub fn normalize(calendars: Vec<Calendar>) -> Vec<Row> {
    calendars
        .into_iter()
        .flat_map(|calendar| {
            let name = calendar.name;
            calendar.courses.into_iter().map(move |mut course| {
                course.extra.remove(CALENDAR_NAME);
                Row {
                    course,
                    calendar_name: name.clone(),
                }
            })
        })
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::input::parse_calendars;
    use serde_json::{Value, json};

    fn full_course(crn: &str) -> Value {
        json!({
            "CRN": crn,
            "Section": "001",
            "Subject": "Computer Science",
            "Abbreviation": "CS",
            "Level": "101",
            "Name": "Intro",
            "Description": "Basics",
            "Credits": "3.000",
            "Capacity": 30,
            "Registered": 28,
            "Remaining": 2,
            "Waitlisted": 0,
            "Prerequisites": null,
            "Corequisites": ["CS 101L"],
            "Mutual Exclusions": null,
            "Cross List Courses": null,
            "Restrictions": null,
            "Attributes": ["Core"],
            "Properties": [{
                "Type": "Class",
                "Time": "9:00 AM - 9:50 AM",
                "Days": ["Monday"],
                "Location": "Hall 1",
                "Period": "Sep 04, 2024 - Dec 13, 2024",
                "Nature": "Lecture",
                "Instructors": ["Ada Lovelace"]
            }],
            "Campus": "Main"
        })
    }

    #[test]
    fn single_course() {
        let data = r#"[{"Calendar Name":"Fall","Courses":[{"CRN":"123","Properties":[]}]}]"#;
        let rows = normalize(parse_calendars(data, "test").unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course.crn.as_deref(), Some("123"));
        assert_eq!(rows[0].calendar_name, "Fall");
    }

    #[test]
    fn count_and_order() {
        let data = json!([
            {"Calendar Name": "Fall", "Courses": [full_course("1"), full_course("2")]},
            {"Calendar Name": "Empty", "Courses": []},
            {"Calendar Name": "Winter", "Courses": [full_course("3")]},
        ]);
        let rows = normalize(parse_calendars(&data.to_string(), "test").unwrap());
        let got = rows
            .iter()
            .map(|r| (r.course.crn.as_deref().unwrap(), r.calendar_name.as_str()))
            .collect_vec();
        assert_eq!(got, [("1", "Fall"), ("2", "Fall"), ("3", "Winter")]);
    }

    #[test]
    fn exactly_one_field_added() {
        let course = full_course("9");
        let data = json!([{"Calendar Name": "Fall", "Courses": [course.clone()]}]);
        let rows = normalize(parse_calendars(&data.to_string(), "test").unwrap());
        let mut expected = course;
        expected
            .as_object_mut()
            .unwrap()
            .insert("Calendar Name".to_owned(), json!("Fall"));
        assert_eq!(serde_json::to_value(&rows[0]).unwrap(), expected);
    }

    #[test]
    fn sparse_course_only_gains_calendar_name() {
        let data = r#"[{"Calendar Name":"Fall","Courses":[{"CRN":"123","Properties":[{"Type":"Class","Extra":"x"}]}]}]"#;
        let rows = normalize(parse_calendars(data, "test").unwrap());
        assert_eq!(
            serde_json::to_value(&rows[0]).unwrap(),
            json!({
                "CRN": "123",
                "Properties": [{"Type": "Class", "Extra": "x"}],
                "Calendar Name": "Fall"
            })
        );
    }

    #[test]
    fn nulls_and_numbers_kept() {
        let course = json!({
            "CRN": 10234,
            "Description": null,
            "Credits": 3,
            "Restrictions": [{"Description": "Majors only", "Requirements": ["CS"], "Code": "M"}],
            "Properties": [{"Days": "TBA", "Instructors": null}]
        });
        let data = json!([{"Calendar Name": "Fall", "Courses": [course.clone()]}]);
        let rows = normalize(parse_calendars(&data.to_string(), "test").unwrap());
        let mut expected = course;
        expected
            .as_object_mut()
            .unwrap()
            .insert("Calendar Name".to_owned(), json!("Fall"));
        assert_eq!(serde_json::to_value(&rows[0]).unwrap(), expected);
    }

    #[test]
    fn stale_calendar_name_replaced() {
        let data = r#"[{"Calendar Name":"Fall","Courses":[{"CRN":"1","Calendar Name":"Old"}]}]"#;
        let rows = normalize(parse_calendars(data, "test").unwrap());
        assert_eq!(rows[0].calendar_name, "Fall");
        let value = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(value["Calendar Name"], "Fall");
    }

    #[test]
    fn row_roundtrip() {
        let data = json!([{"Calendar Name": "Fall", "Courses": [full_course("5")]}]);
        let rows = normalize(parse_calendars(&data.to_string(), "test").unwrap());
        let s = serde_json::to_string(&rows).unwrap();
        let back: Vec<Row> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, rows);
    }
}
