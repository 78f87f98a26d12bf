//! CSV and PDF exports of already-fetched tables. No server round trip.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::Utc;

use crate::{
    constants::{
        PDF_HEADER_Y_MM, PDF_LINE_MM, PDF_MARGIN_MM, PDF_PAGE_BOTTOM_MM, PDF_PAGE_HEIGHT_PT,
        PDF_PAGE_WIDTH_PT, PDF_TEXT_SIZE, PDF_TITLE_SIZE,
    },
    data_types::admin_types::{Client, MealLog},
    errors::ExportError,
    render::format_money,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    /// File name prefix, e.g. `meal_logs`.
    pub stem: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn date_cell(log: &MealLog) -> String {
    log.local_time()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn amount_cell(log: &MealLog) -> String {
    log.transaction_amount()
        .map(format_money)
        .unwrap_or_default()
}

impl Table {
    pub fn admin_meal_logs(logs: &[MealLog]) -> Table {
        Table {
            title: "Meal Logs Report".to_string(),
            stem: "meal_logs",
            headers: ["Date", "Client", "Restaurant", "Meal", "Amount"]
                .map(String::from)
                .to_vec(),
            rows: logs
                .iter()
                .map(|log| {
                    vec![
                        date_cell(log),
                        log.client_label().to_string(),
                        log.restaurant_label().to_string(),
                        log.meal_label().to_string(),
                        amount_cell(log),
                    ]
                })
                .collect(),
        }
    }

    pub fn restaurant_meal_logs(logs: &[MealLog]) -> Table {
        Table {
            title: "Meal Logs Report".to_string(),
            stem: "meal_logs",
            headers: ["Date", "Client", "Meal", "Amount"].map(String::from).to_vec(),
            rows: logs
                .iter()
                .map(|log| {
                    vec![
                        date_cell(log),
                        log.client_label().to_string(),
                        log.meal_label().to_string(),
                        amount_cell(log),
                    ]
                })
                .collect(),
        }
    }

    pub fn clients(clients: &[Client]) -> Table {
        Table {
            title: "Clients".to_string(),
            stem: "clients",
            headers: ["Name", "Phone", "ID Number", "Card Number"]
                .map(String::from)
                .to_vec(),
            rows: clients
                .iter()
                .map(|client| {
                    vec![
                        client.name.clone(),
                        client.phone.clone(),
                        client.id_number.clone(),
                        client.card_number.clone(),
                    ]
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_line(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus one line per row, each terminated by `\n`.
pub fn to_csv(table: &Table) -> String {
    let mut csv = csv_line(&table.headers);
    csv.push('\n');
    for row in &table.rows {
        csv += &csv_line(row);
        csv.push('\n');
    }
    csv
}

fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

/// Helvetica in the base encoding only covers ASCII here.
fn pdf_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

struct PdfLine {
    y_mm: f64,
    size: u32,
    text: String,
}

fn layout_pages(table: &Table) -> Vec<Vec<PdfLine>> {
    let mut pages = vec![vec![
        PdfLine {
            y_mm: PDF_MARGIN_MM,
            size: PDF_TITLE_SIZE,
            text: table.title.clone(),
        },
        PdfLine {
            y_mm: PDF_HEADER_Y_MM,
            size: PDF_TEXT_SIZE,
            text: table.headers.join(" | "),
        },
    ]];

    let mut y = PDF_HEADER_Y_MM + PDF_LINE_MM;
    for row in &table.rows {
        if y > PDF_PAGE_BOTTOM_MM {
            pages.push(Vec::new());
            y = PDF_MARGIN_MM;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PdfLine {
                y_mm: y,
                size: PDF_TEXT_SIZE,
                text: row.join(" | "),
            });
        }
        y += PDF_LINE_MM;
    }

    pages
}

fn content_stream(lines: &[PdfLine]) -> String {
    let x = mm_to_pt(PDF_MARGIN_MM);
    let mut stream = String::new();
    for line in lines {
        let y = PDF_PAGE_HEIGHT_PT - mm_to_pt(line.y_mm);
        let _ = writeln!(
            stream,
            "BT /F1 {} Tf {:.2} {:.2} Td ({}) Tj ET",
            line.size,
            x,
            y,
            pdf_text(&line.text)
        );
    }
    stream
}

/// A minimal PDF 1.4 document: one Helvetica font, one content stream per page.
pub fn to_pdf(table: &Table) -> Vec<u8> {
    let pages = layout_pages(table);

    // 1 catalog, 2 page tree, 3 font, then (page, content) pairs
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + 2 * i).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{} 0 R", id))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (lines, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PDF_PAGE_WIDTH_PT,
            PDF_PAGE_HEIGHT_PT,
            page_id + 1
        ));
        let stream = content_stream(lines);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            stream.len(),
            stream
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }

    let xref_at = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    );

    pdf.into_bytes()
}

pub fn export_file_name(stem: &str, format: ExportFormat, millis: i64) -> String {
    format!("{}_{}.{}", stem, millis, format.extension())
}

/// Writes `table` into `dir` as `<stem>_<unix millis>.<ext>`.
pub async fn write_export(
    dir: &Path,
    table: &Table,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    if table.is_empty() {
        return Err(ExportError::Empty);
    }

    let bytes = match format {
        ExportFormat::Csv => to_csv(table).into_bytes(),
        ExportFormat::Pdf => to_pdf(table),
    };
    let path = dir.join(export_file_name(
        table.stem,
        format,
        Utc::now().timestamp_millis(),
    ));
    tokio::fs::write(&path, bytes).await?;

    log::info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::YearOfStudy;
    use crate::test_utils::{client, log_at, ts};

    fn logs(n: usize) -> Vec<MealLog> {
        (0..n)
            .map(|i| {
                let mut log = log_at(ts("2024-03-01T08:00:00Z"), None, 1000.0, 800.0);
                log.id = format!("l{}", i);
                log
            })
            .collect()
    }

    #[test]
    fn csv_has_header_plus_one_line_per_row() {
        for n in [0, 1, 7] {
            let csv = to_csv(&Table::admin_meal_logs(&logs(n)));
            assert_eq!(csv.lines().count(), n + 1);
            assert!(csv.ends_with('\n'));
        }
    }

    #[test]
    fn csv_doubles_embedded_quotes() {
        let mut log = logs(1).remove(0);
        log.client_name = Some(r#"Jean "JJ" Doe"#.into());
        log.meal_name = Some("Rice, beans".into());

        let csv = to_csv(&Table::admin_meal_logs(&[log]));
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(r#""Jean ""JJ"" Doe""#));
        assert!(row.contains(r#""Rice, beans""#));
        assert!(row.ends_with(r#""Frw 200""#));
        assert_eq!(
            csv.lines().next().unwrap(),
            r#""Date","Client","Restaurant","Meal","Amount""#
        );
    }

    #[test]
    fn restaurant_and_client_tables() {
        let table = Table::restaurant_meal_logs(&logs(2));
        assert_eq!(table.headers, ["Date", "Client", "Meal", "Amount"]);
        assert_eq!(table.rows[0][1], "Alice");
        assert_eq!(table.rows[0][2], "Meal");

        let table = Table::clients(&[client("c1", "Ann", YearOfStudy::Y2, "CS", 0.0)]);
        assert_eq!(table.rows[0], ["Ann", "0780000000", "ID-c1", "CARD-c1"]);
        assert_eq!(table.stem, "clients");
    }

    #[test]
    fn pdf_paginates_all_rows() {
        let small = String::from_utf8(to_pdf(&Table::admin_meal_logs(&logs(10)))).unwrap();
        assert!(small.starts_with("%PDF-1.4\n"));
        assert!(small.contains("/Count 1 "));
        assert!(small.trim_end().ends_with("%%EOF"));

        let big = String::from_utf8(to_pdf(&Table::admin_meal_logs(&logs(100)))).unwrap();
        assert!(big.contains("/Count 3 "));
        assert_eq!(big.matches("/Type /Page ").count(), 3);
        // title + header + 100 rows
        assert_eq!(big.matches(" Tj ET").count(), 102);
    }

    #[test]
    fn pdf_xref_offsets_point_at_objects() {
        let pdf = String::from_utf8(to_pdf(&Table::admin_meal_logs(&logs(3)))).unwrap();
        let xref = pdf.find("xref\n").unwrap();
        let entries: Vec<usize> = pdf[xref..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 5);
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn pdf_text_is_escaped_and_ascii() {
        assert_eq!(pdf_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(pdf_text("Café ñ"), "Caf? ?");
    }

    #[test]
    fn file_names_and_formats() {
        assert_eq!(
            export_file_name("meal_logs", ExportFormat::Csv, 1700000000000),
            "meal_logs_1700000000000.csv"
        );
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!("xls".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn empty_tables_are_not_written() {
        let err = write_export(
            &std::env::temp_dir(),
            &Table::clients(&[]),
            ExportFormat::Csv,
        )
        .await;
        assert!(matches!(err, Err(ExportError::Empty)));
    }

    #[tokio::test]
    async fn export_writes_named_file() {
        let dir = std::env::temp_dir();
        let path = write_export(&dir, &Table::admin_meal_logs(&logs(2)), ExportFormat::Csv)
            .await
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("meal_logs_") && name.ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);
        let _ = std::fs::remove_file(path);
    }
}
