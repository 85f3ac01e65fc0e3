// src/fetch/table.rs

use crate::timeline::parse::clean_cell;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

/// A `<table>` flattened to a rectangular grid.
///
/// `header` holds one row per header level; both header and body have
/// `rowspan`/`colspan` expanded, so every grid column has a cell in every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    pub header: Vec<Vec<String>>,
    pub body: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn width(&self) -> usize {
        self.header
            .iter()
            .chain(&self.body)
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Header labels for column `col`, outermost level first.
    pub fn column_labels(&self, col: usize) -> Vec<String> {
        self.header
            .iter()
            .map(|level| level.get(col).map(|s| clean_cell(s)).unwrap_or_default())
            .collect()
    }

    /// Index of the first column whose header path equals `path`.
    ///
    /// A single-level header matches a path that repeats the same label,
    /// so `["Deaths", "Deaths"]` finds a plain `Deaths` column.
    pub fn find_column(&self, path: &[String]) -> Option<usize> {
        (0..self.width()).find(|&col| labels_match(&self.column_labels(col), path))
    }

    /// Text of `col` in body row `row`; empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.body
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn labels_match(labels: &[String], path: &[String]) -> bool {
    if labels.len() == path.len() {
        labels == path
    } else if labels.len() == 1 {
        !path.is_empty() && path.iter().all(|p| *p == labels[0])
    } else {
        false
    }
}

struct RawCell {
    text: String,
    header: bool,
    colspan: usize,
    rowspan: usize,
}

/// Every `<table>` on the page, in document order.
pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("table").expect("CSS selector for tables should be valid");
    doc.select(&selector).map(read_table).collect()
}

fn read_table(table: ElementRef<'_>) -> HtmlTable {
    let mut head = Vec::new();
    let mut body = Vec::new();
    let mut foot = Vec::new();

    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" => head.extend(section_rows(child)),
            "tbody" => body.extend(section_rows(child)),
            "tfoot" => foot.extend(section_rows(child)),
            "tr" => body.push(row_cells(child)),
            _ => {}
        }
    }
    body.retain(|r| !r.is_empty());

    // Without a <thead>, leading all-<th> rows form the header.
    if head.is_empty() {
        let n = body
            .iter()
            .take_while(|r| r.iter().all(|c| c.header))
            .count();
        head = body.drain(..n).collect();
    }
    body.extend(foot.into_iter().filter(|r| !r.is_empty()));

    let table = HtmlTable {
        header: expand_spans(&head),
        body: expand_spans(&body),
    };
    trace!(
        levels = table.header.len(),
        rows = table.body.len(),
        width = table.width(),
        "parsed table"
    );
    table
}

fn section_rows(section: ElementRef<'_>) -> Vec<Vec<RawCell>> {
    section
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .map(row_cells)
        .collect()
}

fn row_cells(tr: ElementRef<'_>) -> Vec<RawCell> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let name = cell.value().name();
            if name != "th" && name != "td" {
                return None;
            }
            let span = |attr: &str| {
                cell.value()
                    .attr(attr)
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(1)
                    .max(1)
            };
            Some(RawCell {
                text: cell.text().collect::<String>(),
                header: name == "th",
                colspan: span("colspan"),
                rowspan: span("rowspan"),
            })
        })
        .collect()
}

/// Lay cells out on a grid, repeating spanned text into every covered slot.
fn expand_spans(rows: &[Vec<RawCell>]) -> Vec<Vec<String>> {
    // per column: text still owed to the rows below, and how many rows
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(rows.len());

    for row in rows {
        let mut line: Vec<String> = Vec::new();
        let mut cells = row.iter();
        loop {
            let col = line.len();
            if let Some(Some((text, left))) = carried.get_mut(col) {
                line.push(text.clone());
                *left -= 1;
                if *left == 0 {
                    carried[col] = None;
                }
                continue;
            }
            let Some(cell) = cells.next() else { break };
            for _ in 0..cell.colspan {
                let col = line.len();
                if cell.rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize(col + 1, None);
                    }
                    carried[col] = Some((cell.text.clone(), cell.rowspan - 1));
                }
                line.push(cell.text.clone());
            }
        }
        // spans from above that sit past this row's last cell
        while carried
            .get(line.len()..)
            .is_some_and(|rest| rest.iter().any(Option::is_some))
        {
            let col = line.len();
            match carried[col].take() {
                Some((text, left)) => {
                    line.push(text.clone());
                    if left > 1 {
                        carried[col] = Some((text, left - 1));
                    }
                }
                None => line.push(String::new()),
            }
        }
        grid.push(line);
    }

    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    for line in &mut grid {
        line.resize(width, String::new());
    }
    grid
}
