//! Row details: the information about a course that does not fit in the table.
//!
//! The detail block lists, in a fixed order, the sections whose source
//! field is present (CRN, description, requisites, restrictions,
//! attributes), followed by one small table per meeting pattern.

use crate::input::{Course, Property, Restriction};
use crate::markup::{Html, Markup};
use crate::slot::{Scalar, Slot};
use itertools::Itertools;

const SEPARATOR: &str = ", ";

/// Column headers of a meeting-time table.
pub const PROPERTY_HEADERS: [&str; 7] = [
    "Type",
    "Nature",
    "Time",
    "Days",
    "Location",
    "Period",
    "Instructors",
];

/// One labeled section of the detail block.
#[derive(Debug, PartialEq)]
pub enum Section<'a> {
    Text {
        label: &'static str,
        value: String,
    },
    Restrictions(&'a [Restriction]),
}

fn text(label: &'static str, value: Option<&str>) -> Option<Section<'static>> {
    value.map(|v| Section::Text {
        label,
        value: v.to_owned(),
    })
}

fn list(label: &'static str, value: Option<&[String]>) -> Option<Section<'static>> {
    value.map(|v| Section::Text {
        label,
        value: v.join(SEPARATOR),
    })
}

/// The sections present for this course, in display order.
pub fn sections(course: &Course) -> Vec<Section<'_>> {
    [
        text("CRN", course.crn.as_deref()),
        text("Description", course.description.as_deref()),
        list("Prerequisites", course.prerequisites.as_deref()),
        list("Corequisites", course.corequisites.as_deref()),
        list("Mutual Exclusions", course.mutual_exclusions.as_deref()),
        list("Cross List Courses", course.cross_list_courses.as_deref()),
        course.restrictions.as_deref().map(Section::Restrictions),
        list("Attributes", course.attributes.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect_vec()
}

/// Cell values of a meeting-time table, in [PROPERTY_HEADERS] order.
pub fn property_cells(p: &Property) -> [String; 7] {
    let s = |v: &Slot<Scalar>| v.as_deref().unwrap_or_default().to_owned();
    [
        s(&p.kind),
        s(&p.nature),
        s(&p.time),
        p.days().join(SEPARATOR),
        s(&p.location),
        s(&p.period),
        p.instructors().join(SEPARATOR),
    ]
}

fn render_section(html: &mut Html, section: &Section) {
    html.open("tr", &[]).open("td", &[("colspan", "7")]);
    match section {
        Section::Text { label, value } => {
            html.element("b", &[], &format!("{label}: ")).text(value);
        }
        Section::Restrictions(restrictions) => {
            html.element("b", &[], "Restrictions: ");
            for r in *restrictions {
                html.void("br", &[]).element("b", &[], &r.description);
                html.open("ul", &[]);
                for req in r.requirements() {
                    html.element("li", &[], req);
                }
                html.close();
            }
        }
    }
    html.close().close();
}

fn render_property(html: &mut Html, number: usize, p: &Property) {
    html.open(
        "table",
        &[
            ("class", "format-properties-table"),
            ("border", "1"),
            ("width", "100%"),
        ],
    );
    html.open("thead", &[("class", "meeting-time")])
        .open("tr", &[])
        .element(
            "td",
            &[("colspan", "7"), ("style", "text-align: center;")],
            &format!("Schedule Meeting Times #{number}"),
        )
        .close()
        .close();
    html.open("thead", &[("class", "meeting-properties-head")])
        .open("tr", &[]);
    for header in PROPERTY_HEADERS {
        html.element("td", &[("style", "font-weight:bold")], header);
    }
    html.close().close();
    html.open("tbody", &[("class", "meeting-properties-body")])
        .open("tr", &[]);
    for cell in property_cells(p) {
        html.element("td", &[], &cell);
    }
    html.close().close();
    html.close();
}

/// Render the detail block of a course as an HTML fragment.
///
/// All field values are escaped.
pub fn render(course: &Course) -> Markup {
    let mut html = Html::new();
    html.open("table", &[("class", "format-table")]);
    for section in sections(course) {
        render_section(&mut html, &section);
    }
    if !course.properties().is_empty() {
        html.open("tr", &[]).open("td", &[("colspan", "7")]);
        for (i, p) in course.properties().iter().enumerate() {
            render_property(&mut html, i + 1, p);
        }
        html.close().close();
    }
    html.finish()
}

/// Plain-text rendering of the detail block, for terminals.
pub fn render_text(course: &Course) -> String {
    let mut lines = vec![];
    for section in sections(course) {
        match section {
            Section::Text { label, value } => lines.push(format!("{label}: {value}")),
            Section::Restrictions(restrictions) => {
                lines.push("Restrictions:".to_owned());
                for r in restrictions {
                    lines.push(format!("  {}", r.description));
                    for req in r.requirements() {
                        lines.push(format!("    - {req}"));
                    }
                }
            }
        }
    }
    for (i, p) in course.properties().iter().enumerate() {
        lines.push(format!("Schedule Meeting Times #{}", i + 1));
        for (header, cell) in PROPERTY_HEADERS.iter().zip(property_cells(p)) {
            lines.push(format!("  {header}: {cell}"));
        }
    }
    lines.join("\n")
}
