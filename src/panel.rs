//! The course panel: loaded rows plus the current view over them.
//!
//! A [Panel] is created explicitly with a [PanelConfig] and then fed
//! calendar files. Filtering, ordering, paging, row expansion and export
//! all work on the rows currently held by the panel.

use crate::columns::{Cell, Field};
use crate::detail;
use crate::errors::{self, Result};
use crate::information;
use crate::input;
use crate::markup::Markup;
use crate::normalize::{self, Row};
use crate::panes::{Combiner, Filter, Pane, PaneOption};
use crate::storage::Storage;
use itertools::Itertools;
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::{fs, io};

/// Page lengths offered by the table.
pub const PAGE_LENGTHS: [usize; 5] = [10, 25, 50, 75, 100];

/// What happens to rows already loaded when another file is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// The new file's rows replace the previous ones.
    #[default]
    Replace,
    /// The new file's rows are appended after the previous ones.
    Accumulate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelConfig {
    pub combiner: Combiner,
    pub reload: ReloadPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// One page of the filtered rows.
#[derive(Debug, PartialEq, Eq)]
pub struct Page {
    /// Row indices on this page, in display order.
    pub rows: Vec<usize>,
    /// Zero-based page number.
    pub index: usize,
    pub pages: usize,
    /// Number of filtered rows.
    pub total: usize,
}

pub struct Panel {
    reload: ReloadPolicy,
    rows: Vec<Row>,
    filter: Filter,
    sort: Option<(Field, Order)>,
    expanded: HashSet<usize>,
    details: Vec<Option<Markup>>,
}

impl Panel {
    pub fn new(config: PanelConfig) -> Panel {
        Panel {
            reload: config.reload,
            rows: vec![],
            filter: Filter::new(config.combiner),
            sort: None,
            expanded: HashSet::new(),
            details: vec![],
        }
    }

    /// Load calendars from JSON text. On error nothing changes.
    ///
    /// Returns the number of rows added.
    pub fn load_str(&mut self, data: &str, source: &str) -> Result<usize> {
        let calendars = input::parse_calendars(data, source)?;
        information::statistics(&calendars);
        let rows = normalize::normalize(calendars);
        let added = rows.len();
        match self.reload {
            ReloadPolicy::Replace => {
                if !self.rows.is_empty() {
                    debug!(target: "courseview", "replacing {} rows", self.rows.len());
                }
                self.rows = rows;
                self.expanded.clear();
                self.details.clear();
            }
            ReloadPolicy::Accumulate => self.rows.extend(rows),
        }
        self.details.resize(self.rows.len(), None);
        info!(target: "courseview", "{source}: {added} courses, {} in panel", self.rows.len());
        Ok(added)
    }

    pub fn load_file(&mut self, filename: &str) -> Result<usize> {
        let data = fs::read_to_string(filename).map_err(|e| errors::load_error(filename, e))?;
        self.load_str(&data, filename)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        self.rows
            .get(index)
            .ok_or_else(|| errors::invalid_argument(format!("no row {index}")))
    }

    pub fn combiner(&self) -> Combiner {
        self.filter.combiner
    }

    /// Switch between AND and OR and persist the new mode.
    pub fn toggle_combiner(&mut self, storage: &mut dyn Storage) -> Result<Combiner> {
        let combiner = self.filter.combiner.toggled();
        combiner.store(storage)?;
        self.filter.combiner = combiner;
        info!(target: "courseview", "pane logic: {combiner}");
        Ok(combiner)
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn select(&mut self, pane: Pane, value: &str) {
        self.filter.select(pane, value);
    }

    pub fn deselect(&mut self, pane: Pane, value: &str) {
        self.filter.deselect(pane, value);
    }

    pub fn clear(&mut self, pane: Pane) {
        self.filter.clear(pane);
    }

    pub fn clear_all(&mut self) {
        self.filter.clear_all();
    }

    pub fn search(&mut self, search: &str) {
        self.filter.set_search(search);
    }

    pub fn sort_by(&mut self, field: Field, order: Order) {
        self.sort = Some((field, order));
    }

    pub fn unsorted(&mut self) {
        self.sort = None;
    }

    pub fn options(&self, pane: Pane) -> Vec<PaneOption> {
        self.filter.options(pane, &self.rows)
    }

    /// Indices of the rows that pass the filter, in display order.
    ///
    /// Sorting is stable, so equal rows keep their load order.
    pub fn filtered(&self) -> Vec<usize> {
        let mut indices = (0..self.rows.len())
            .filter(|&i| self.filter.matches(&self.rows[i]))
            .collect_vec();
        if let Some((field, order)) = self.sort {
            let mut cells = indices
                .iter()
                .map(|&i| (i, field.value(&self.rows[i])))
                .collect_vec();
            cells.sort_by(|(_, a), (_, b)| match order {
                Order::Asc => a.compare(b),
                Order::Desc => b.compare(a),
            });
            indices = cells.into_iter().map(|(i, _)| i).collect_vec();
        }
        debug!(target: "courseview", "filtered: {}/{} rows", indices.len(), self.rows.len());
        indices
    }

    pub fn filtered_rows(&self) -> Vec<&Row> {
        self.filtered().into_iter().map(|i| &self.rows[i]).collect_vec()
    }

    pub fn page(&self, index: usize, length: usize) -> Result<Page> {
        if !PAGE_LENGTHS.contains(&length) {
            return Err(errors::invalid_argument(format!(
                "page length should be one of {}, got {length}",
                PAGE_LENGTHS.iter().join(", ")
            )));
        }
        let filtered = self.filtered();
        let total = filtered.len();
        let pages = total.div_ceil(length).max(1);
        if index >= pages {
            return Err(errors::invalid_argument(format!(
                "page {} requested, there are {pages} pages",
                index + 1
            )));
        }
        let rows = filtered
            .into_iter()
            .skip(index * length)
            .take(length)
            .collect_vec();
        Ok(Page {
            rows,
            index,
            pages,
            total,
        })
    }

    /// Detail block of a row, rendered on first use and cached.
    pub fn detail(&mut self, index: usize) -> Result<&Markup> {
        let row = self
            .rows
            .get(index)
            .ok_or_else(|| errors::invalid_argument(format!("no row {index}")))?;
        Ok(&*self.details[index].get_or_insert_with(|| {
            debug!(target: "courseview", "rendering details of row {index}");
            detail::render(&row.course)
        }))
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    /// Expand or collapse a row. Returns the details if the row is now open.
    pub fn toggle_row(&mut self, index: usize) -> Result<Option<&Markup>> {
        self.row(index)?;
        if self.expanded.remove(&index) {
            Ok(None)
        } else {
            self.expanded.insert(index);
            Ok(Some(self.detail(index)?))
        }
    }

    /// Filtered rows as a compact JSON array, in display order.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.filtered_rows())?)
    }

    pub fn write_json<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, &self.filtered_rows())?;
        Ok(())
    }

    /// Filtered rows as a spreadsheet with one column per data field.
    pub fn export_xlsx(&self, filename: &str) -> Result<()> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Courses")?;
        for (col, field) in Field::data().enumerate() {
            worksheet.write_string_with_format(0, col as u16, field.header(), &bold)?;
        }
        for (i, row) in self.filtered_rows().into_iter().enumerate() {
            let r = i as u32 + 1;
            for (col, field) in Field::data().enumerate() {
                let col = col as u16;
                match field.value(row) {
                    Cell::Empty => (),
                    Cell::Number(n) => {
                        worksheet.write_number(r, col, n as f64)?;
                    }
                    cell => {
                        worksheet.write_string(r, col, cell.to_string())?;
                    }
                }
            }
        }
        workbook.save(filename)?;
        info!(target: "courseview", "wrote {filename}");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::{MemoryStorage, PANE_LOGIC};
    use serde_json::{Value, json};

    fn course(crn: &str, subject: &str, level: &str) -> Value {
        json!({
            "CRN": crn,
            "Subject": subject,
            "Level": level,
            "Description": format!("About {crn}"),
            "Remaining": 1,
            "Waitlisted": 0,
            "Properties": [{"Type": "Class", "Days": ["Monday"], "Instructors": ["X"]}],
        })
    }

    fn fall() -> String {
        json!([
            {"Calendar Name": "Fall", "Courses": [
                course("1", "Math", "300"),
                course("2", "Physics", "100"),
                course("3", "Math", "200"),
            ]},
        ])
        .to_string()
    }

    fn winter() -> String {
        json!([{"Calendar Name": "Winter", "Courses": [course("4", "Math", "101")]}]).to_string()
    }

    fn crns(panel: &Panel, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| panel.rows()[i].course.crn.as_deref().unwrap().to_owned())
            .collect_vec()
    }

    fn panel(reload: ReloadPolicy) -> Panel {
        Panel::new(PanelConfig {
            combiner: Combiner::Or,
            reload,
        })
    }

    #[test]
    fn single_load() {
        let mut p = panel(ReloadPolicy::Replace);
        assert_eq!(p.load_str(&fall(), "fall").unwrap(), 3);
        assert_eq!(p.rows().len(), 3);
        assert_eq!(crns(&p, &p.filtered()), ["1", "2", "3"]);
    }

    #[test]
    fn reload_replaces() {
        let mut p = panel(ReloadPolicy::Replace);
        p.load_str(&fall(), "fall").unwrap();
        p.toggle_row(0).unwrap();
        p.load_str(&winter(), "winter").unwrap();
        assert_eq!(crns(&p, &p.filtered()), ["4"]);
        assert!(!p.is_expanded(0));
    }

    #[test]
    fn reload_accumulates() {
        let mut p = panel(ReloadPolicy::Accumulate);
        p.load_str(&fall(), "fall").unwrap();
        p.load_str(&winter(), "winter").unwrap();
        assert_eq!(crns(&p, &p.filtered()), ["1", "2", "3", "4"]);
        assert_eq!(p.rows()[3].calendar_name, "Winter");
        assert!(p.detail(3).unwrap().as_str().contains("About 4"));
    }

    #[test]
    fn failed_load_keeps_state() {
        let mut p = panel(ReloadPolicy::Replace);
        p.load_str(&fall(), "fall").unwrap();
        assert!(p.load_str("{", "broken").is_err());
        assert!(
            p.load_str(r#"[{"Calendar Name":"X","Courses":[{"Properties":{}}]}]"#, "bad")
                .is_err()
        );
        assert_eq!(p.rows().len(), 3);
    }

    #[test]
    fn filter_and_sort() {
        let mut p = panel(ReloadPolicy::Replace);
        p.load_str(&fall(), "fall").unwrap();
        p.select(Pane::Values(Field::Subject), "Math");
        assert_eq!(crns(&p, &p.filtered()), ["1", "3"]);
        p.sort_by(Field::Level, Order::Asc);
        assert_eq!(crns(&p, &p.filtered()), ["3", "1"]);
        p.sort_by(Field::Level, Order::Desc);
        assert_eq!(crns(&p, &p.filtered()), ["1", "3"]);
        p.unsorted();
        p.clear_all();
        p.search("physics");
        assert_eq!(crns(&p, &p.filtered()), ["2"]);
    }

    #[test]
    fn export_is_filtered_in_display_order() {
        let mut p = panel(ReloadPolicy::Replace);
        p.load_str(&fall(), "fall").unwrap();
        p.select(Pane::Level, "200-299");
        p.select(Pane::Level, "300-499");
        p.sort_by(Field::Crn, Order::Desc);
        let s = p.export_json().unwrap();
        assert!(!s.contains('\n'));
        let v: Vec<Value> = serde_json::from_str(&s).unwrap();
        let got = v.iter().map(|c| c["CRN"].as_str().unwrap()).collect_vec();
        assert_eq!(got, ["3", "1"]);
        assert!(v.iter().all(|c| c["Calendar Name"] == "Fall"));
        let back: Vec<Row> = serde_json::from_str(&s).unwrap();
        assert_eq!(back[0], p.rows()[2]);
    }

    #[test]
    fn paging() {
        let mut p = panel(ReloadPolicy::Replace);
        let courses = (0..23)
            .map(|i| course(&i.to_string(), "Math", "100"))
            .collect_vec();
        let data = json!([{"Calendar Name": "Fall", "Courses": courses}]).to_string();
        p.load_str(&data, "big").unwrap();
        let page = p.page(2, 10).unwrap();
        assert_eq!(page.rows, [20, 21, 22]);
        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 23);
        assert!(p.page(3, 10).is_err());
        assert!(p.page(0, 7).is_err());
        p.search("nothing-matches");
        let empty = p.page(0, 25).unwrap();
        assert!(empty.rows.is_empty());
        assert_eq!(empty.pages, 1);
    }

    #[test]
    fn expand_collapse() {
        let mut p = panel(ReloadPolicy::Replace);
        p.load_str(&fall(), "fall").unwrap();
        let first = p.toggle_row(1).unwrap().cloned().unwrap();
        assert!(first.as_str().contains("<b>CRN: </b>2"));
        assert!(p.is_expanded(1));
        assert!(p.toggle_row(1).unwrap().is_none());
        assert!(!p.is_expanded(1));
        let again = p.toggle_row(1).unwrap().cloned().unwrap();
        assert_eq!(first, again);
        assert!(p.toggle_row(9).is_err());
    }

    #[test]
    fn combiner_toggle_persisted() {
        let mut storage = MemoryStorage::new();
        let combiner = Combiner::load(&mut storage).unwrap();
        let mut p = Panel::new(PanelConfig {
            combiner,
            reload: ReloadPolicy::Replace,
        });
        assert_eq!(p.combiner(), Combiner::Or);
        assert_eq!(p.toggle_combiner(&mut storage).unwrap(), Combiner::And);
        assert_eq!(storage.get(PANE_LOGIC).unwrap().as_deref(), Some("AND"));
        assert_eq!(p.filter().combiner, Combiner::And);
    }
}
