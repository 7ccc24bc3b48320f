//! Monthly report rendering.
//!
//! Produces the PDF that gets attached to the report mail: a centered
//! title, a user identification line, the "Entries:" section with one line
//! per entry in the order given, and a right-aligned total.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use worklog_common::{ReportMonth, WorkEntry};

use crate::store::UserIdentity;

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const LINE_H: f32 = 18.0;

const TITLE_SIZE: f32 = 20.0;
const HEADER_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;

/// Attachment filename for a report month, e.g. `Report_Hours_May_2024.pdf`.
pub fn attachment_filename(month: ReportMonth) -> String {
    format!("Report_Hours_{}_{}.pdf", month.name(), month.year())
}

/// Render the monthly report for one user. Entries must already be in the
/// order they should appear (the store query orders by date ascending).
pub fn render(user: &UserIdentity, month: ReportMonth, entries: &[WorkEntry]) -> Vec<u8> {
    let mut doc = ReportPdf::new();

    doc.centered_line(TITLE_SIZE, &format!("Monthly Hours Report - {}", month));
    doc.blank_line();
    doc.left_line(BODY_SIZE, &format!("User: {} ({})", user.display_name, user.email));
    doc.blank_line();
    doc.left_line(HEADER_SIZE, "Entries:");
    doc.blank_line();

    let mut total_hours = 0.0;
    for entry in entries {
        doc.left_line(
            BODY_SIZE,
            &format!(
                "Date: {}, Project: {}, Hours: {}",
                entry.work_date.format("%d/%m/%Y"),
                entry.project_name,
                entry.hours_worked
            ),
        );
        total_hours += entry.hours_worked;
    }

    doc.blank_line();
    doc.right_line(
        HEADER_SIZE,
        &format!("Total Hours for the Month: {:.2}", total_hours),
    );

    doc.finish()
}

/// Single-font page writer with a downward cursor and automatic page
/// breaks on overflow.
struct ReportPdf {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
    content: Content,
    content_id: Ref,
    cursor_y: f32,
}

impl ReportPdf {
    fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        let mut doc = Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            next_id: 4,
            content: Content::new(),
            // placeholder, replaced by the start_page call below
            content_id: font_id,
            cursor_y: 0.0,
        };
        doc.start_page();
        doc
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn start_page(&mut self) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
            .contents(content_id);
        page.resources().fonts().pair(Name(b"F1"), self.font_id);
        drop(page);

        self.content = Content::new();
        self.content_id = content_id;
        self.cursor_y = PAGE_H - MARGIN;
    }

    fn finalize_page(&mut self) {
        let content = std::mem::replace(&mut self.content, Content::new());
        self.pdf.stream(self.content_id, &content.finish());
    }

    /// Rough Helvetica line width; enough to center and right-align.
    fn text_width(text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn left_line(&mut self, size: f32, text: &str) {
        self.write_line(MARGIN, size, text);
    }

    fn centered_line(&mut self, size: f32, text: &str) {
        let x = ((PAGE_W - Self::text_width(text, size)) / 2.0).max(MARGIN);
        self.write_line(x, size, text);
    }

    fn right_line(&mut self, size: f32, text: &str) {
        let x = (PAGE_W - MARGIN - Self::text_width(text, size)).max(MARGIN);
        self.write_line(x, size, text);
    }

    fn blank_line(&mut self) {
        self.cursor_y -= LINE_H;
    }

    fn write_line(&mut self, x: f32, size: f32, text: &str) {
        if self.cursor_y - LINE_H < MARGIN {
            self.finalize_page();
            self.start_page();
        }

        let bytes = win_ansi(text);
        self.content.begin_text();
        self.content.set_font(Name(b"F1"), size);
        self.content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, self.cursor_y]);
        self.content.show(Str(&bytes));
        self.content.end_text();

        self.cursor_y -= LINE_H;
    }

    fn finish(mut self) -> Vec<u8> {
        self.finalize_page();

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
        drop(pages);

        self.pdf.finish()
    }
}

/// Lossy map into the WinAnsi encoding the font is declared with. Latin-1
/// passes through; the few typographic characters we emit get their WinAnsi
/// slots; everything else becomes '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2013}' => 0x96, // en dash
            '\u{2014}' => 0x97, // em dash
            '\u{2019}' => 0x92, // right single quote
            c if (c as u32) < 0x80 || (0xA0..0x100).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
