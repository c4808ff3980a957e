//! A4 PDF export of invoices and statements.
//!
//! Uses the PDF built-in Helvetica faces, so no font files ship with the
//! binary. Those faces have no rupee glyph; amounts are prefixed with `Rs.`
//! and any other non-ASCII character is replaced.

use crate::models::document::{InvoiceDocument, StatementDocument};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};
use service_core::error::AppError;
use std::io::BufWriter;
use thiserror::Error;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 14.0;
const RIGHT: f32 = PAGE_W - MARGIN;
const BOTTOM: f32 = 18.0;
const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load built-in font: {0}")]
    Font(String),
    #[error("failed to write PDF: {0}")]
    Write(String),
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Drawing cursor over a growing document. `y` is in mm from the page
/// bottom, as printpdf expects, and decreases as content is added.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, PdfError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| PdfError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| PdfError::Font(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        self.layer
            .use_text(pdf_text(text), size, Mm(x), Mm(self.y), self.font(bold));
    }

    fn text_right(&self, text: &str, size: f32, x_right: f32, bold: bool) {
        let x = (x_right - estimate_width(text, size)).max(MARGIN);
        self.text(text, size, x, bold);
    }

    fn text_centered(&self, text: &str, size: f32, bold: bool) {
        let x = ((PAGE_W - estimate_width(text, size)) / 2.0).max(MARGIN);
        self.text(text, size, x, bold);
    }

    fn rule(&self, x1: f32, x2: f32, thickness: f32) {
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.y)), false),
                (Point::new(Mm(x2), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn down(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Start a new page when fewer than `needed` mm remain.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed >= BOTTOM {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
        self.pages += 1;
        true
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut writer = BufWriter::new(Vec::<u8>::new());
        self.doc
            .save(&mut writer)
            .map_err(|e| PdfError::Write(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| PdfError::Write(e.to_string()))
    }
}

/// Rough Helvetica advance: half an em per character.
fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn pdf_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{20b9}' => 'R',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect()
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// Invoice item table columns: left edges, amounts right-aligned to the next edge.
const COL_SR: f32 = MARGIN;
const COL_DESC: f32 = MARGIN + 12.0;
const COL_HSN: f32 = MARGIN + 78.0;
const COL_QTY_R: f32 = MARGIN + 112.0;
const COL_KG_R: f32 = MARGIN + 145.0;
const COL_RATE_R: f32 = MARGIN + 162.0;
const COL_AMT_R: f32 = RIGHT;

pub fn render_invoice_pdf(doc: &InvoiceDocument) -> Result<Vec<u8>, PdfError> {
    let mut c = Canvas::new(&format!("Tax Invoice {}", doc.invoice_no))?;
    let seller = &doc.seller;

    c.text_centered(&seller.name, 20.0, true);
    c.down(6.0);
    if !seller.tagline.is_empty() {
        c.text_centered(&seller.tagline.to_uppercase(), 9.0, false);
        c.down(4.5);
    }
    for line in wrap(&seller.address, 95) {
        c.text_centered(&line, 8.0, false);
        c.down(4.0);
    }
    c.text_centered(&format!("GSTIN: {}", seller.gstin), 8.0, false);
    c.down(3.0);
    c.rule(MARGIN, RIGHT, 0.8);
    c.down(6.0);
    c.text_centered("TAX INVOICE", 13.0, true);
    c.down(3.0);
    c.rule(MARGIN, RIGHT, 0.8);
    c.down(6.0);

    // Buyer block on the left, invoice references on the right.
    let top = c.y;
    c.text(&doc.buyer_name, 9.5, MARGIN, true);
    c.down(4.5);
    for line in wrap(&format!("Address: {}", doc.address), 70) {
        c.text(&line, 8.5, MARGIN, false);
        c.down(4.0);
    }
    c.text(&format!("GSTIN: {}", doc.gstin), 8.5, MARGIN, false);
    c.down(4.0);
    c.text(
        &format!("State: {}   Code: {}", seller.state, seller.state_code),
        8.5,
        MARGIN,
        false,
    );
    let left_bottom = c.y;

    c.y = top;
    let refs_x = MARGIN + 128.0;
    for (label, value) in [
        ("Invoice No:", doc.invoice_no.as_str()),
        ("Invoice Date:", doc.invoice_date.as_str()),
        ("Challan No:", doc.invoice_no.as_str()),
        ("Challan Date:", doc.invoice_date.as_str()),
    ] {
        c.text(label, 8.5, refs_x, true);
        c.text(value, 8.5, refs_x + 23.0, false);
        c.down(4.5);
    }
    c.y = c.y.min(left_bottom);
    c.down(3.0);
    c.rule(MARGIN, RIGHT, 0.5);
    c.down(4.5);
    c.text("Transporter:", 8.0, MARGIN, true);
    c.text("Vehicle No:", 8.0, MARGIN + 62.0, true);
    c.text("L/R or R/R No:", 8.0, MARGIN + 124.0, true);
    c.down(3.0);
    c.rule(MARGIN, RIGHT, 0.5);
    c.down(5.0);

    invoice_table_header(&mut c);
    for row in &doc.rows {
        if c.ensure_space(6.0) {
            invoice_table_header(&mut c);
        }
        c.text(&row.sr_no.to_string(), 8.0, COL_SR + 2.0, false);
        let description: String = row.description.chars().take(40).collect();
        c.text(&description, 8.0, COL_DESC, false);
        c.text(&row.hsn_code, 8.0, COL_HSN, false);
        c.text_right(&row.packing, 8.0, COL_QTY_R, false);
        c.text_right(&row.kg, 8.0, COL_KG_R, false);
        c.text_right(&row.rate, 8.0, COL_RATE_R, false);
        c.text_right(&row.amount, 8.0, COL_AMT_R, false);
        c.down(2.0);
        c.rule(MARGIN, RIGHT, 0.2);
        c.down(4.0);
    }
    for _ in 0..doc.filler_rows {
        c.down(2.0);
        c.rule(MARGIN, RIGHT, 0.2);
        c.down(4.0);
    }

    c.ensure_space(95.0);
    c.down(2.0);
    let totals_top = c.y;
    let totals_x = MARGIN + 122.0;
    for (label, value, bold) in [
        ("Total:", format!("Rs. {}", doc.subtotal), false),
        (doc.cgst_label.as_str(), format!("Rs. {}", doc.cgst), false),
        (doc.sgst_label.as_str(), format!("Rs. {}", doc.sgst), false),
        ("IGST: 18.0%", "-".to_string(), false),
        ("GROSS TOTAL:", format!("Rs. {}", doc.total), true),
    ] {
        c.text(label, 9.0, totals_x, bold);
        c.text_right(&value, 9.0, RIGHT, bold);
        c.down(5.0);
    }
    let totals_bottom = c.y;

    c.y = totals_top;
    let words_width = 75;
    c.text("Invoice Amount In Words:", 8.5, MARGIN, true);
    c.down(4.0);
    for line in wrap(&doc.amount_in_words, words_width) {
        c.text(&line, 8.5, MARGIN, false);
        c.down(4.0);
    }
    c.down(1.5);
    c.text("GST Amount In Words:", 8.5, MARGIN, true);
    c.down(4.0);
    for line in wrap(&doc.gst_in_words, words_width) {
        c.text(&line, 8.5, MARGIN, false);
        c.down(4.0);
    }
    c.down(1.5);
    c.text("Payment Terms", 8.5, MARGIN, true);
    c.down(4.0);
    c.text(&seller.payment_terms, 8.5, MARGIN, false);
    c.down(5.0);
    for (idx, term) in seller.terms.iter().enumerate() {
        for (n, line) in wrap(term, 80).into_iter().enumerate() {
            let text = if n == 0 {
                format!("{}. {}", idx + 1, line)
            } else {
                format!("   {}", line)
            };
            c.text(&text, 7.5, MARGIN, false);
            c.down(3.6);
        }
    }
    c.down(1.5);
    for line in [
        format!("Our Bank Name: {}", seller.bank_name),
        format!("Bank A/C No: {}", seller.bank_account),
        format!("IFSC: {}", seller.ifsc),
    ] {
        c.text(&line, 8.0, MARGIN, false);
        c.down(4.0);
    }
    let words_bottom = c.y;

    c.y = totals_bottom - 4.0;
    for line in ["Payment details", "DATE:", "CHEQUE NO:", "AMOUNT:", "CASH:"] {
        c.text(line, 8.0, totals_x, false);
        c.down(4.0);
    }
    c.down(3.0);
    c.text(&format!("For {}", seller.name), 8.5, totals_x, true);
    c.down(12.0);
    c.text("Proprietor", 8.5, totals_x, false);

    c.y = c.y.min(words_bottom) - 4.0;
    c.rule(MARGIN, RIGHT, 0.5);
    c.down(4.5);
    c.text("(ORIGINAL FOR RECIPIENT)", 7.5, MARGIN, true);
    c.down(3.6);
    c.text(
        "Certified that the particulars given above are true and correct",
        7.0,
        MARGIN,
        false,
    );
    if doc.paid {
        c.text_right("PAID", 12.0, RIGHT, true);
    }

    tracing::debug!(invoice_no = %doc.invoice_no, pages = c.pages, "invoice PDF rendered");
    c.finish()
}

fn invoice_table_header(c: &mut Canvas) {
    c.text("Sr.No.", 8.0, COL_SR, true);
    c.text("Description Of Goods", 8.0, COL_DESC, true);
    c.text("HSN Code", 8.0, COL_HSN, true);
    c.text_right("Quantity", 8.0, COL_QTY_R, true);
    c.text_right("KG", 8.0, COL_KG_R, true);
    c.text_right("PRICE", 8.0, COL_RATE_R, true);
    c.text_right("Amount", 8.0, COL_AMT_R, true);
    c.down(2.0);
    c.rule(MARGIN, RIGHT, 0.5);
    c.down(4.0);
}

const ST_NO: f32 = MARGIN;
const ST_DATE: f32 = MARGIN + 45.0;
const ST_ITEMS_R: f32 = MARGIN + 110.0;
const ST_QTY_R: f32 = MARGIN + 145.0;
const ST_AMT_R: f32 = RIGHT;

pub fn render_statement_pdf(doc: &StatementDocument) -> Result<Vec<u8>, PdfError> {
    let mut c = Canvas::new(&format!("Statement {}", doc.buyer))?;

    c.text_centered(&doc.seller.name, 16.0, true);
    c.down(5.0);
    c.text_centered(&format!("GSTIN: {}", doc.seller.gstin), 8.0, false);
    c.down(8.0);
    c.text_centered("Buyer Statement", 14.0, true);
    c.down(5.0);
    c.text_centered(&format!("Generated on {}", doc.generated_on), 8.0, false);
    c.down(8.0);

    c.text(&format!("Buyer: {}", doc.buyer), 9.5, MARGIN, true);
    c.down(4.5);
    if let Some(gstin) = &doc.buyer_gstin {
        c.text(&format!("GSTIN: {}", gstin), 9.0, MARGIN, false);
        c.down(4.5);
    }
    c.text(
        &format!("Total Invoices: {}", doc.invoice_count),
        9.0,
        MARGIN,
        false,
    );
    c.down(4.5);
    c.text(
        &format!("Total Amount: Rs. {}", doc.total_amount),
        9.0,
        MARGIN,
        false,
    );
    c.down(4.5);
    if doc.from.is_some() || doc.to.is_some() {
        let mut range = String::from("Filtered By:");
        if let Some(from) = &doc.from {
            range.push_str(&format!(" From {}", from));
        }
        if let Some(to) = &doc.to {
            range.push_str(&format!(" To {}", to));
        }
        c.text(&range, 9.0, MARGIN, false);
        c.down(4.5);
    }
    c.down(4.0);

    c.text("Invoice Details", 11.0, MARGIN, true);
    c.down(6.0);

    if doc.rows.is_empty() {
        c.text(
            "No invoices found for this buyer within the selected date range.",
            9.0,
            MARGIN,
            false,
        );
        return c.finish();
    }

    statement_table_header(&mut c);
    for row in &doc.rows {
        if c.ensure_space(6.0) {
            statement_table_header(&mut c);
        }
        c.text(&row.invoice_no, 8.5, ST_NO, false);
        c.text(&row.date, 8.5, ST_DATE, false);
        c.text_right(&row.item_count.to_string(), 8.5, ST_ITEMS_R, false);
        c.text_right(&row.total_qty, 8.5, ST_QTY_R, false);
        c.text_right(&format!("Rs. {}", row.amount), 8.5, ST_AMT_R, false);
        c.down(2.0);
        c.rule(MARGIN, RIGHT, 0.2);
        c.down(4.0);
    }

    c.ensure_space(8.0);
    c.text_right("Total:", 9.0, ST_ITEMS_R, true);
    c.text_right(&format!("{} kg", doc.total_qty), 9.0, ST_QTY_R, true);
    c.text_right(&format!("Rs. {}", doc.total_amount), 9.0, ST_AMT_R, true);

    tracing::debug!(buyer = %doc.buyer, rows = doc.rows.len(), pages = c.pages, "statement PDF rendered");
    c.finish()
}

fn statement_table_header(c: &mut Canvas) {
    c.text("Invoice No", 8.5, ST_NO, true);
    c.text("Date", 8.5, ST_DATE, true);
    c.text_right("Items", 8.5, ST_ITEMS_R, true);
    c.text_right("Total Qty (kg)", 8.5, ST_QTY_R, true);
    c.text_right("Amount (Rs.)", 8.5, ST_AMT_R, true);
    c.down(2.0);
    c.rule(MARGIN, RIGHT, 0.5);
    c.down(4.5);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SellerSettings;
    use billing_core::{BuyerStatement, Invoice, InvoiceLineItem, StatementInvoice};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn seller() -> SellerSettings {
        SellerSettings {
            name: "SHIVANSH INKS".into(),
            address: "Bhiwandi, Thane 421302".into(),
            gstin: "27AREPK4801E1Z5".into(),
            terms: vec!["Subject to jurisdiction only. E.&O.E.".into()],
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn invoice_pdf_is_a_pdf() {
        let invoice = Invoice {
            invoice_no: "12".into(),
            date: "2025-01-05".into(),
            buyer_name: "Sai Packaging".into(),
            items: vec![InvoiceLineItem::new(
                "Flexo Ink \u{20b9}",
                Decimal::from(20),
                Decimal::from(3),
                Decimal::from(150),
            )],
            ..Default::default()
        };
        let doc = InvoiceDocument::new(invoice, &seller(), today());
        let bytes = render_invoice_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_statement_spans_pages() {
        let invoices = (0..120)
            .map(|n| StatementInvoice {
                invoice_no: n.to_string(),
                date: "2025-01-05".into(),
                total_amount: Decimal::from(100),
                ..Default::default()
            })
            .collect();
        let statement = BuyerStatement {
            buyer: "Sai Packaging".into(),
            invoices,
            ..Default::default()
        };
        let doc = StatementDocument::new(&statement, &seller(), today());
        let bytes = render_statement_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn text_is_reduced_to_ascii() {
        assert_eq!(pdf_text("\u{20b9}100 caf\u{e9}"), "R100 caf?");
    }

    #[test]
    fn wrapping_respects_width() {
        let lines = wrap("One Thousand Two Hundred Thirty Four Rupees Only", 20);
        assert!(lines.iter().all(|l| l.len() <= 20));
        assert_eq!(lines.join(" "), "One Thousand Two Hundred Thirty Four Rupees Only");
    }
}
