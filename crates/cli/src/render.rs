//! Terminal output: tables, footers, notices and the not-found view.

use attendify_core::routes;
use attendify_service::{MenuItem, Notice, NoticeLevel, PaginationFooter, TableBody, TableModel, ValidationErrors};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

const LINK_HEADER: &str = "Link";

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold).fg(Color::White)
}

fn base_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Bordered table with bold headers, for ad-hoc listings.
pub(crate) fn plain_table(headers: &[&str]) -> Table {
    let mut table = base_table();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    table
}

pub(crate) fn table<T>(model: &TableModel<'_, T>) -> Table {
    let mut table = base_table();
    let body = model.body();
    let with_links = matches!(&body, TableBody::Rows(rows) if rows.iter().any(|r| r.action.is_some()));

    let mut header: Vec<Cell> = model.header().iter().map(|h| header_cell(h)).collect();
    if with_links {
        header.push(header_cell(LINK_HEADER));
    }
    let width = header.len();
    table.set_header(header);

    match body {
        TableBody::Rows(rows) => {
            for row in rows {
                let mut cells: Vec<Cell> = row.cells.into_iter().map(Cell::new).collect();
                if let Some(action) = row.action {
                    cells.push(Cell::new(action).fg(Color::Cyan));
                }
                table.add_row(cells);
            }
        },
        TableBody::Empty(message) => {
            let mut cells = vec![Cell::new(message).fg(Color::DarkGrey).set_alignment(CellAlignment::Center)];
            cells.extend((1..width).map(|_| Cell::new("")));
            table.add_row(cells);
        },
    }
    table
}

/// Footer line: position, range and the available navigation targets.
pub(crate) fn footer(footer: &PaginationFooter) -> String {
    let mut nav = Vec::new();
    if footer.has_previous() {
        nav.push("first: --page 1".to_owned());
        nav.push(format!("prev: --page {}", footer.page - 1));
    }
    if footer.has_next() {
        nav.push(format!("next: --page {}", footer.page + 1));
        nav.push(format!("last: --page {}", footer.last()));
    }
    let mut line = format!("{}  |  {}", footer.page_label(), footer.range_label());
    if !nav.is_empty() {
        line.push_str("  |  ");
        line.push_str(&nav.join(", "));
    }
    line
}

pub(crate) fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success => println!("\u{2714} {}", notice.message),
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("\u{2718} {}", notice.message),
        }
    }
}

pub(crate) fn print_validation(errors: &ValidationErrors) {
    for (field, message) in errors.iter() {
        eprintln!("{field}: {message}");
    }
}

pub(crate) fn print_not_found(what: &str, id: &str) {
    eprintln!("404 - Not found");
    eprintln!("The {what} '{id}' does not exist or was removed.");
    eprintln!("Go back home: {}", routes::HOME);
}

pub(crate) fn menu_lines(items: &[MenuItem]) -> Vec<String> {
    let mut lines = Vec::new();
    push_menu(items, 0, &mut lines);
    lines
}

fn push_menu(items: &[MenuItem], depth: usize, lines: &mut Vec<String>) {
    for item in items {
        let indent = "  ".repeat(depth);
        match item.route {
            Some(route) => lines.push(format!("{indent}{:<16}{route}", item.title)),
            None => lines.push(format!("{indent}{}", item.title)),
        }
        push_menu(&item.children, depth + 1, lines);
    }
}
