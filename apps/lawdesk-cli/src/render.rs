//! Plain-text rendering of page states.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::model::{Appointment, Case, Client};
use crate::page::{DetailPage, ListPage, PageState};

const LOADING: &str = "Loading...";

fn date(d: &DateTime<Utc>) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn datetime(d: &DateTime<Utc>) -> String {
    d.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |cells: Vec<&str>, out: &mut String| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(headers.to_vec(), &mut out);
    for row in &rows {
        line(row.iter().map(String::as_str).collect(), &mut out);
    }
    out
}

fn list<T>(page: &ListPage<T>, empty: &str, render: impl FnOnce(Vec<&T>) -> String) -> String {
    match &page.state {
        PageState::Loading => LOADING.to_string(),
        PageState::Error(e) => format!("Could not load: {e}"),
        PageState::NotFound => empty.to_string(),
        PageState::Loaded(_) => {
            let rows = page.visible();
            if rows.is_empty() {
                empty.to_string()
            } else {
                render(rows)
            }
        }
    }
}

fn detail<T>(page: &DetailPage<T>, missing: &str, render: impl FnOnce(&T) -> String) -> String {
    match &page.state {
        PageState::Loading => LOADING.to_string(),
        PageState::NotFound => missing.to_string(),
        PageState::Error(e) => format!("Could not load: {e}"),
        PageState::Loaded(v) => render(v),
    }
}

pub fn clients(page: &ListPage<Client>) -> String {
    list(page, "No clients found", |rows| {
        table(
            &["ID", "NAME", "EMAIL", "PHONE"],
            rows.into_iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.full_name(),
                        c.email.clone(),
                        c.phone.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        )
    })
}

pub fn cases(page: &ListPage<Case>) -> String {
    list(page, "No cases found", |rows| {
        table(
            &["ID", "TITLE", "NUMBER", "CLIENT", "STATUS", "PRIORITY", "STARTED"],
            rows.into_iter()
                .map(|c| {
                    vec![
                        c.id.to_string(),
                        c.title.clone(),
                        c.case_number.clone().unwrap_or_default(),
                        c.client_id.label(),
                        c.status.to_string(),
                        c.priority.to_string(),
                        date(&c.start_date),
                    ]
                })
                .collect(),
        )
    })
}

pub fn appointments(page: &ListPage<Appointment>) -> String {
    list(page, "No appointments found", |rows| {
        table(
            &["ID", "WHEN", "TITLE", "CLIENT", "CASE", "MIN", "STATUS"],
            rows.into_iter()
                .map(|a| {
                    vec![
                        a.id.to_string(),
                        datetime(&a.appointment_date),
                        a.title.clone(),
                        a.client_id.label(),
                        a.case_id.as_ref().map(|c| c.label()).unwrap_or_default(),
                        a.duration.to_string(),
                        a.status.to_string(),
                    ]
                })
                .collect(),
        )
    })
}

pub fn client(page: &DetailPage<Client>) -> String {
    detail(page, "Client not found", |c| {
        let mut out = String::new();
        let _ = writeln!(out, "{}", c.full_name());
        let _ = writeln!(out, "Client since {}", date(&c.created_at));
        let _ = writeln!(out, "Email:   {}", c.email);
        let _ = writeln!(
            out,
            "Phone:   {}",
            c.phone.as_deref().unwrap_or("No phone number")
        );
        let _ = writeln!(
            out,
            "Address: {}",
            c.address.as_deref().unwrap_or("No address provided")
        );
        out
    })
}

pub fn case(page: &DetailPage<Case>) -> String {
    detail(page, "Case not found", |c| {
        let mut out = String::new();
        let _ = writeln!(out, "{}", c.title);
        if let Some(n) = &c.case_number {
            let _ = writeln!(out, "Case #{n}");
        }
        let _ = writeln!(out, "Status:   {}", c.status);
        let _ = writeln!(out, "Priority: {} priority", c.priority);
        let _ = writeln!(out, "Client:   {}", c.client_id.label());
        let _ = writeln!(out, "Started:  {}", date(&c.start_date));
        let _ = writeln!(
            out,
            "Court:    {}",
            c.court_date
                .as_ref()
                .map(date)
                .unwrap_or_else(|| "Not scheduled".to_string())
        );
        if let Some(d) = &c.description {
            let _ = writeln!(out, "\n{d}");
        }
        out
    })
}

pub fn appointment(page: &DetailPage<Appointment>) -> String {
    detail(page, "Appointment not found", |a| {
        let mut out = String::new();
        let _ = writeln!(out, "{}", a.title);
        let _ = writeln!(out, "Status:   {}", a.status);
        let _ = writeln!(out, "When:     {}", datetime(&a.appointment_date));
        let _ = writeln!(out, "Duration: {} minutes", a.duration);
        let _ = writeln!(out, "Client:   {}", a.client_id.label());
        if let Some(case) = &a.case_id {
            let _ = writeln!(out, "Case:     {}", case.label());
        }
        if let Some(d) = &a.description {
            let _ = writeln!(out, "\n{d}");
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let out = table(
            &["A", "BB"],
            vec![vec!["long".into(), "x".into()], vec!["s".into(), "".into()]],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["A     BB", "long  x", "s"]);
    }
}
