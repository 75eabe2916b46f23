use chrono::Local;
use url::Url;

use dogshare_core::UploadRecord;

pub const EMPTY_MESSAGE: &str = "NO DATA TO BE DISPLAYED";

const HEADERS: [&str; 5] = ["ID", "Timestamp", "Object", "Short", "Expiry"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the upload registry as an aligned text table
pub fn render(records: &[UploadRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_MESSAGE}\n");
    }

    let rows: Vec<[String; 5]> = records.iter().map(row).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn row(record: &UploadRecord) -> [String; 5] {
    [
        record.id.to_string(),
        record
            .timestamp
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        last_segment(&record.object_link),
        last_segment(&record.short_link),
        record.expiry.to_string(),
    ]
}

fn push_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Last non-empty path segment of a link, ignoring any query string
fn last_segment(link: &str) -> String {
    if let Ok(url) = Url::parse(link) {
        if let Some(segment) = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        {
            return segment.to_string();
        }
    }
    link.split(['?', '#'])
        .next()
        .unwrap_or(link)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(link)
        .to_string()
}
