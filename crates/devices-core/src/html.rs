//! HTML fragment for a [`ViewModel`].

use std::fmt::Write as _;

use quick_xml::escape::escape;

use crate::render::{Cell, Table};
use crate::view::{ViewBody, ViewModel};

pub const CREATE_LABEL: &str = "Create";

/// Render the view as an HTML fragment. Output depends only on `view`.
pub fn render_view(view: &ViewModel) -> String {
    let mut out = String::new();

    if let Some(route) = &view.create_route {
        let _ = write!(
            out,
            r#"<nav class="actions"><a class="button-link" href="{}">{CREATE_LABEL}</a></nav>"#,
            escape(route.path().as_str())
        );
    }

    match &view.body {
        ViewBody::Progress => {
            out.push_str(r#"<div class="progress" role="progressbar" aria-busy="true"></div>"#);
        }
        ViewBody::Table(table) => write_table(&mut out, table),
        ViewBody::NoData { message } => {
            let _ = write!(out, r#"<p class="no-data">{}</p>"#, escape(message.as_str()));
        }
    }

    if let Some(message) = &view.notification {
        let _ = write!(
            out,
            r#"<div class="alert" role="alert">{}</div>"#,
            escape(message.as_str())
        );
    }

    out
}

fn write_table(out: &mut String, table: &Table) {
    out.push_str(r#"<table aria-label="devices-table"><thead><tr>"#);
    for header in &table.headers {
        let _ = write!(out, "<th>{}</th>", escape(header.name.as_str()));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        let _ = write!(out, r#"<tr data-key="{}">"#, escape(row.key.as_str()));
        for cell in &row.cells {
            match cell {
                Cell::Link { text, href } => {
                    let _ = write!(
                        out,
                        r#"<td><a href="{}">{}</a></td>"#,
                        escape(href.as_str()),
                        escape(text.as_str())
                    );
                }
                Cell::Text { text } => {
                    let _ = write!(out, "<td>{}</td>", escape(text.as_str()));
                }
                Cell::Empty => out.push_str("<td></td>"),
            }
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
}
