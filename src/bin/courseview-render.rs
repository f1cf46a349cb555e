use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use courseview::columns::Field;
use courseview::errors::{self, Result};
use courseview::information;
use courseview::page;
use courseview::panel::{Order, Panel, PanelConfig, ReloadPolicy};
use courseview::panes::{self, Combiner};
use courseview::storage::{FileStorage, MemoryStorage, Storage};
use log::{error, info};
use serde::Serialize;
use std::{error, fs, io, process};

#[derive(Clone, Copy, ValueEnum)]
enum Reload {
    /// Keep only the courses of the last file
    Replace,
    /// Keep the courses of all files
    Accumulate,
}

impl From<Reload> for ReloadPolicy {
    fn from(r: Reload) -> ReloadPolicy {
        match r {
            Reload::Replace => ReloadPolicy::Replace,
            Reload::Accumulate => ReloadPolicy::Accumulate,
        }
    }
}

/// Render course calendars as an HTML table
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Calendar files (JSON)
    #[arg(required = true)]
    infiles: Vec<String>,
    /// Output file (HTML), standard output if not given
    #[arg(short, long)]
    output: Option<String>,
    /// Page title
    #[arg(long, default_value = "Course View Panel")]
    title: String,
    /// Search pane selection of the form 'pane=value', e.g. 'Day=Monday'
    #[arg(short, long)]
    select: Vec<String>,
    /// Search terms, all of which must match
    #[arg(long)]
    search: Option<String>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort in descending order
    #[arg(long)]
    desc: bool,
    /// Show the details of the course with this CRN opened
    #[arg(long)]
    expand: Vec<String>,
    /// Pane logic, AND or OR; also stored as the new default
    #[arg(long)]
    logic: Option<String>,
    /// File that keeps the pane logic between runs
    #[arg(long)]
    state: Option<String>,
    /// How to combine several input files
    #[arg(long, value_enum, default_value_t = Reload::Accumulate)]
    reload: Reload,
    /// Page number, starting from 1; all rows if not given
    #[arg(long)]
    page: Option<usize>,
    /// Page length
    #[arg(long, default_value_t = 10)]
    length: usize,
    /// Write the filtered courses to this file (JSON)
    #[arg(long)]
    export: Option<String>,
    /// Write the filtered courses to this file (XLSX)
    #[arg(long)]
    xlsx: Option<String>,
    /// Report errors as a JSON file
    #[arg(long)]
    error_file: Option<String>,
    /// Verbosity
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

#[derive(Serialize)]
struct OError {
    error: String,
}

fn open_storage(args: &Args) -> Box<dyn Storage> {
    match &args.state {
        Some(filename) => Box::new(FileStorage::new(filename)),
        None => Box::new(MemoryStorage::new()),
    }
}

fn build_panel(args: &Args) -> Result<Panel> {
    let mut storage = open_storage(args);
    let mut combiner = Combiner::load(storage.as_mut())?;
    if let Some(logic) = &args.logic {
        combiner = logic.parse()?;
        combiner.store(storage.as_mut())?;
    }
    info!(target: "courseview", "pane logic: {combiner}");
    let mut panel = Panel::new(PanelConfig {
        combiner,
        reload: args.reload.into(),
    });
    for infile in &args.infiles {
        info!(target: "courseview", "read: {infile}");
        panel.load_file(infile)?;
    }
    for s in &args.select {
        let (pane, value) = panes::parse_selection(s)?;
        panel.select(pane, &value);
    }
    if let Some(search) = &args.search {
        panel.search(search);
    }
    if let Some(sort) = &args.sort {
        let field: Field = sort.parse()?;
        let order = if args.desc { Order::Desc } else { Order::Asc };
        panel.sort_by(field, order);
    }
    for crn in &args.expand {
        let index = panel
            .rows()
            .iter()
            .position(|r| r.course.crn.as_deref() == Some(crn.as_str()))
            .ok_or_else(|| errors::invalid_argument(format!("no course with CRN {crn}")))?;
        if !panel.is_expanded(index) {
            panel.toggle_row(index)?;
        }
    }
    Ok(panel)
}

fn process(args: &Args) -> Result<()> {
    let mut panel = build_panel(args)?;
    information::post_statistics(&panel.filtered_rows(), panel.filter());
    let rows = match args.page {
        None => panel.filtered(),
        Some(0) => return Err(errors::invalid_argument_ref("pages are numbered from 1")),
        Some(n) => {
            let page = panel.page(n - 1, args.length)?;
            info!(target: "courseview", "page {}/{}", n, page.pages);
            page.rows
        }
    };
    let markup = page::render(&mut panel, &args.title, &rows)?;
    match &args.output {
        Some(filename) => {
            info!(target: "courseview", "write: {filename}");
            fs::write(filename, markup.as_str())?;
        }
        None => print!("{markup}"),
    }
    if let Some(filename) = &args.export {
        info!(target: "courseview", "write: {filename}");
        let file = fs::File::create(filename)?;
        panel.write_json(io::BufWriter::new(file))?;
    }
    if let Some(filename) = &args.xlsx {
        panel.export_xlsx(filename)?;
    }
    Ok(())
}

fn store_error(error_file: &str, e: &dyn error::Error) -> Result<()> {
    let error = OError {
        error: format!("{e}"),
    };
    let file = fs::File::create(error_file)?;
    let writer = io::BufWriter::new(file);
    serde_json::to_writer(writer, &error)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    pretty_env_logger::formatted_timed_builder()
        .filter_level(args.verbose.log_level_filter())
        .init();
    match process(&args) {
        Ok(()) => (),
        Err(e) => {
            match &args.error_file {
                Some(filename) => match store_error(filename, &*e) {
                    Ok(()) => {
                        info!(target: "courseview", "error reported: {e}");
                    }
                    Err(e2) => {
                        error!(target: "courseview", "{e}");
                        error!(target: "courseview", "{e2}");
                    }
                },
                None => error!(target: "courseview", "{e}"),
            }
            process::exit(1);
        }
    }
}
