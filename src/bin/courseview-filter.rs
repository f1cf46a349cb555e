use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cliclack::log;
use courseview::columns::Field;
use courseview::detail;
use courseview::errors;
use courseview::normalize::Row;
use courseview::panel::{Order, Panel, PanelConfig, ReloadPolicy};
use courseview::panes::{Combiner, Filter, PANES, Pane};
use courseview::storage::{FileStorage, MemoryStorage, Storage};
use itertools::Itertools;
use std::{fs, io};

/// Filter course calendars interactively
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Calendar files (JSON)
    #[arg(required = true)]
    infiles: Vec<String>,
    /// Output file (JSON)
    #[arg(short, long, default_value = "Filtered.json")]
    outfile: String,
    /// File that keeps the pane logic between runs
    #[arg(long)]
    state: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
enum Action {
    Undo,
    Select,
    Search,
    Sort,
    ToggleLogic,
    Details,
    Save,
    Quit,
}

fn lib<T>(r: errors::Result<T>) -> Result<T> {
    r.map_err(|e| anyhow!("{e}"))
}

fn select_values(panel: &Panel) -> Result<Option<(Pane, Vec<String>)>> {
    loop {
        let mut items = vec![];
        items.push((None, "Oops, go back".to_owned(), ""));
        for pane in PANES {
            let options = panel.options(pane);
            let available = options.iter().filter(|o| o.count > 0).count();
            items.push((
                Some(pane),
                format!("{pane} ({available}/{} options)", options.len()),
                "",
            ));
        }
        let choice = cliclack::select("Select from which pane?")
            .items(&items)
            .interact()?;
        match choice {
            None => return Ok(None),
            Some(pane) => {
                let items = panel
                    .options(pane)
                    .into_iter()
                    .filter(|o| o.count > 0)
                    .map(|o| {
                        let label = format!("{} ({}/{} courses)", o.label, o.count, o.total);
                        (o.label, label, "")
                    })
                    .collect_vec();
                if items.is_empty() {
                    log::warning(format!("No values left in pane {pane}"))?;
                    continue;
                }
                let choices = cliclack::multiselect("Select which values (or none to go back)?")
                    .items(&items)
                    .required(false)
                    .interact()?;
                if !choices.is_empty() {
                    return Ok(Some((pane, choices)));
                }
            }
        }
    }
}

fn select_order() -> Result<Option<(Field, Order)>> {
    let mut items = vec![(None, "Load order".to_owned(), "")];
    for field in Field::data() {
        items.push((Some(field), field.to_string(), ""));
    }
    let Some(field) = cliclack::select("Sort by which column?")
        .items(&items)
        .interact()?
    else {
        return Ok(None);
    };
    let order = cliclack::select("Order?")
        .items(&[
            (Order::Asc, "Ascending", ""),
            (Order::Desc, "Descending", ""),
        ])
        .interact()?;
    Ok(Some((field, order)))
}

fn describe(row: &Row) -> String {
    let c = &row.course;
    format!(
        "{} {} {} {} ({})",
        c.crn.as_deref().unwrap_or_default(),
        c.abbreviation.as_deref().unwrap_or_default(),
        c.level.as_deref().unwrap_or_default(),
        c.name.as_deref().unwrap_or_default(),
        row.calendar_name
    )
}

fn show_details(panel: &Panel) -> Result<()> {
    let filtered = panel.filtered();
    if filtered.is_empty() {
        log::warning("No courses left")?;
        return Ok(());
    }
    let items = filtered
        .iter()
        .map(|&i| (i, describe(&panel.rows()[i]), ""))
        .collect_vec();
    let choice = cliclack::select("Which course?").items(&items).interact()?;
    let row = lib(panel.row(choice))?;
    cliclack::note(describe(row), detail::render_text(&row.course))?;
    Ok(())
}

fn summarize(panel: &Panel, filter: &Filter) -> String {
    let n = panel.rows().iter().filter(|r| filter.matches(r)).count();
    format!("{n} courses")
}

/// Course counts after each step, replayed on a scratch filter.
fn history(panel: &Panel, search: &str, restrictions: &[(Pane, Vec<String>)]) -> Vec<String> {
    let mut filter = Filter::new(panel.combiner());
    let mut stack = vec![];
    let options = textwrap::Options::new(70).subsequent_indent(" ");
    stack.push(format!("{} ← input", summarize(panel, &filter)));
    if !search.is_empty() {
        filter.set_search(search);
        stack.push(format!("{} ← search '{search}'", summarize(panel, &filter)));
    }
    for (pane, values) in restrictions {
        for v in values {
            filter.select(*pane, v);
        }
        let line = format!(
            "{} ← {} is {}",
            summarize(panel, &filter),
            pane,
            values.iter().map(|x| format!("'{x}'")).join(match panel.combiner() {
                Combiner::Or => " or ",
                Combiner::And => " and ",
            }),
        );
        stack.push(textwrap::fill(&line, &options));
    }
    stack
}

fn main() -> Result<()> {
    let args = Args::parse();
    cliclack::intro("courseview-filter")?;
    let mut storage: Box<dyn Storage> = match &args.state {
        Some(filename) => Box::new(FileStorage::new(filename)),
        None => Box::new(MemoryStorage::new()),
    };
    let combiner = lib(Combiner::load(storage.as_mut()))?;
    let mut panel = Panel::new(PanelConfig {
        combiner,
        reload: ReloadPolicy::Accumulate,
    });
    for infile in &args.infiles {
        log::info(format!("Reading {infile}..."))?;
        lib(panel.load_file(infile)).with_context(|| format!("cannot load {infile}"))?;
    }
    let mut restrictions: Vec<(Pane, Vec<String>)> = vec![];
    let mut search = String::new();
    loop {
        let stack = history(&panel, &search, &restrictions);
        cliclack::note(
            format!("Restrictions (pane logic: {})", panel.combiner()),
            stack.join("\n"),
        )?;

        let mut items = vec![];
        if !restrictions.is_empty() {
            items.push((Action::Undo, "Remove last restriction", ""));
        }
        items.push((Action::Select, "Select values in a search pane", ""));
        items.push((Action::Search, "Search", ""));
        items.push((Action::Sort, "Sort", ""));
        items.push((Action::ToggleLogic, "Switch between AND and OR", ""));
        items.push((Action::Details, "Show details of a course", ""));
        items.push((Action::Save, "Write the filtered courses to a file", ""));
        items.push((Action::Quit, "Quit", ""));
        let choice = cliclack::select("Action?").items(&items).interact()?;
        match choice {
            Action::Quit => break,
            Action::Undo => {
                if let Some((pane, values)) = restrictions.pop() {
                    for v in &values {
                        let kept = restrictions
                            .iter()
                            .any(|(p, vs)| *p == pane && vs.contains(v));
                        if !kept {
                            panel.deselect(pane, v);
                        }
                    }
                }
            }
            Action::Select => {
                if let Some((pane, values)) = select_values(&panel)? {
                    for v in &values {
                        panel.select(pane, v);
                    }
                    restrictions.push((pane, values));
                }
            }
            Action::Search => {
                let current = if search.is_empty() { "-" } else { search.as_str() };
                let input: String = cliclack::input("Search terms, or '-' to clear")
                    .default_input(current)
                    .interact()?;
                search = match input.trim() {
                    "-" => String::new(),
                    s => s.to_owned(),
                };
                panel.search(&search);
            }
            Action::Sort => match select_order()? {
                None => panel.unsorted(),
                Some((field, order)) => panel.sort_by(field, order),
            },
            Action::ToggleLogic => {
                let combiner = lib(panel.toggle_combiner(storage.as_mut()))?;
                log::info(format!("Pane logic is now {combiner}"))?;
            }
            Action::Details => show_details(&panel)?,
            Action::Save => {
                let filename: String = cliclack::input("file name")
                    .default_input(&args.outfile)
                    .interact()?;
                let file = fs::File::create(&filename)?;
                let writer = io::BufWriter::new(file);
                lib(panel.write_json(writer))?;
                log::info(format!("Wrote {} courses to {}", panel.filtered().len(), filename))?;
            }
        }
    }
    cliclack::outro("Bye!")?;
    Ok(())
}
