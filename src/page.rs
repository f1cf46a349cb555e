//! A standalone HTML page showing a view of the panel.

use crate::columns::{COLUMNS, Field};
use crate::errors::Result;
use crate::markup::{Html, Markup};
use crate::panel::Panel;
use itertools::Itertools;

const STYLE: &str = "\
table#courses { border-collapse: collapse; width: 100%; }
table#courses th, table#courses td { border: 1px solid #ccc; padding: 0.2em 0.5em; }
.format-table { width: 100%; }
";

fn visible() -> Vec<Field> {
    COLUMNS
        .into_iter()
        .filter(|&f| f.visible() && f != Field::Control)
        .collect_vec()
}

fn caption(html: &mut Html, panel: &Panel, shown: usize) {
    let filter = panel.filter();
    html.element(
        "p",
        &[("id", "paneLogic")],
        &format!("Inter-Pane Logic: {}", filter.combiner),
    );
    let active = filter.active().collect_vec();
    if !active.is_empty() || !filter.search().is_empty() {
        html.open("ul", &[("id", "selections")]);
        for (pane, values) in active {
            html.element(
                "li",
                &[],
                &format!("{pane}: {}", values.iter().join(", ")),
            );
        }
        if !filter.search().is_empty() {
            html.element("li", &[], &format!("Search: {}", filter.search()));
        }
        html.close();
    }
    html.element(
        "p",
        &[("id", "summary")],
        &format!("Showing {shown} of {} courses", panel.rows().len()),
    );
}

/// Render the given rows (indices into the panel) as a full HTML document.
///
/// Each row is followed by its details, open for expanded rows and
/// collapsed otherwise.
pub fn render(panel: &mut Panel, title: &str, rows: &[usize]) -> Result<Markup> {
    let fields = visible();
    let mut html = Html::new();
    html.doctype();
    html.open("html", &[]);
    html.open("head", &[])
        .void("meta", &[("charset", "utf-8")])
        .element("title", &[], title)
        .element("style", &[], STYLE)
        .close();
    html.open("body", &[]);
    html.element("h1", &[], title);
    caption(&mut html, panel, rows.len());
    html.open("table", &[("id", "courses")]);
    html.open("thead", &[]).open("tr", &[]);
    for f in &fields {
        html.element("th", &[], f.header());
    }
    html.close().close();
    html.open("tbody", &[]);
    let colspan = fields.len().to_string();
    for &i in rows {
        let row = panel.row(i)?;
        let cells = fields.iter().map(|f| f.value(row).to_string()).collect_vec();
        let index = i.to_string();
        html.open("tr", &[("class", "course"), ("data-row", index.as_str())]);
        for cell in &cells {
            html.element("td", &[], cell);
        }
        html.close();
        let open: &[(&str, &str)] = if panel.is_expanded(i) {
            &[("open", "")]
        } else {
            &[]
        };
        let details = panel.detail(i)?;
        html.open("tr", &[("class", "child")])
            .open("td", &[("colspan", colspan.as_str())])
            .open("details", open)
            .element("summary", &[], "Details")
            .markup(details)
            .close()
            .close()
            .close();
    }
    html.close();
    Ok(html.finish())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::panel::{PanelConfig, ReloadPolicy};
    use crate::panes::{Combiner, Pane};
    use select::document::Document;
    use select::predicate::{Attr, Class, Name};

    const DATA: &str = r#"[
        {"Calendar Name": "Fall", "Courses": [
            {"CRN": "1", "Subject": "Math", "Name": "Algebra <I>", "Level": "101", "Properties": []},
            {"CRN": "2", "Subject": "Physics", "Name": "Mechanics", "Level": "201", "Properties": []}
        ]}
    ]"#;

    fn panel() -> Panel {
        let mut p = Panel::new(PanelConfig {
            combiner: Combiner::And,
            reload: ReloadPolicy::Replace,
        });
        p.load_str(DATA, "test").unwrap();
        p
    }

    #[test]
    fn table() {
        let mut p = panel();
        let rows = p.filtered();
        let s = render(&mut p, "Courses", &rows).unwrap().into_string();
        assert!(s.starts_with("<!DOCTYPE html>"));
        let doc = Document::from(s.as_str());
        let headers = doc.find(Name("th")).map(|n| n.text()).collect_vec();
        assert_eq!(headers.len(), 10);
        assert_eq!(headers[0], "Section");
        assert_eq!(doc.find(Class("course")).count(), 2);
        assert_eq!(doc.find(Class("format-table")).count(), 2);
        let logic = doc.find(Attr("id", "paneLogic")).next().unwrap().text();
        assert_eq!(logic, "Inter-Pane Logic: AND");
        assert!(s.contains("Algebra &lt;I&gt;"));
    }

    #[test]
    fn expanded_rows_open() {
        let mut p = panel();
        p.toggle_row(1).unwrap();
        let rows = p.filtered();
        let s = render(&mut p, "Courses", &rows).unwrap().into_string();
        assert_eq!(s.matches(r#"<details open="">"#).count(), 1);
        assert_eq!(s.matches("<details>").count(), 1);
        let doc = Document::from(s.as_str());
        let open = doc.find(Attr("open", "")).next().unwrap().text();
        assert!(open.contains("CRN: 2"), "{open}");
    }

    #[test]
    fn filtered_caption() {
        let mut p = panel();
        p.select(Pane::Values(Field::Subject), "Physics");
        let rows = p.filtered();
        let s = render(&mut p, "Courses", &rows).unwrap().into_string();
        let doc = Document::from(s.as_str());
        assert_eq!(doc.find(Class("course")).count(), 1);
        let selections = doc.find(Name("li")).map(|n| n.text()).collect_vec();
        assert_eq!(selections, ["Subject: Physics"]);
        let summary = doc.find(Attr("id", "summary")).next().unwrap().text();
        assert_eq!(summary, "Showing 1 of 2 courses");
    }
}
