//! # Invoice Renderer
//!
//! Regenerates a PDF invoice from an order's persisted line items. The
//! document is built from the snapshot alone — no timestamps, no catalog
//! reads — so the same order value always renders to the same bytes.
//!
//! Besides returning the bytes for the HTTP response, rendering durably
//! writes an order-id-addressed copy (`invoice-<order_id>.pdf`) for later
//! re-serving; rewriting the same order overwrites with identical content.

use crate::error::{ShopError, ShopResult};
use crate::money::{display_amount, Currency};
use crate::order::Order;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

// A4 media box, 1in margin
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 72.0;

/// Renders and stores PDF invoices for orders
pub struct InvoiceRenderer {
    invoice_dir: PathBuf,
}

impl InvoiceRenderer {
    /// Renderer writing durable copies under the given directory
    pub fn new(invoice_dir: impl Into<PathBuf>) -> Self {
        Self {
            invoice_dir: invoice_dir.into(),
        }
    }

    /// File name for an order's invoice
    pub fn invoice_name(order_id: &str) -> String {
        format!("invoice-{order_id}.pdf")
    }

    /// Full path of an order's durable invoice copy
    pub fn invoice_path(&self, order_id: &str) -> PathBuf {
        self.invoice_dir.join(Self::invoice_name(order_id))
    }

    /// Render the invoice document for an order.
    ///
    /// Deterministic: the same order value produces identical bytes.
    pub fn render(&self, order: &Order) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let font_id = Ref::new(4);
        let content_id = Ref::new(5);
        let font_name = Name(b"F1");

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);
        {
            let mut page = pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(font_name, font_id);
        }
        // Helvetica is one of the base fonts every reader ships, no embedding
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        let rows: Vec<String> = order
            .line_items
            .iter()
            .map(|item| {
                format!(
                    "{}: {} x {}",
                    item.title,
                    item.quantity,
                    display_amount(Currency::USD, item.unit_price)
                )
            })
            .collect();
        let header = format!("Order #{}", order.id);
        let total_row = format!(
            "Total Price: {}",
            display_amount(Currency::USD, order.total())
        );

        let mut content = Content::new();
        content.begin_text();
        content.set_font(font_name, 26.0);
        content.next_line(MARGIN, PAGE_HEIGHT - MARGIN - 26.0);
        content.show(Str(b"Invoice"));
        content.set_font(font_name, 12.0);
        content.next_line(0.0, -32.0);
        content.show(Str(header.as_bytes()));
        for row in &rows {
            content.next_line(0.0, -20.0);
            content.show(Str(row.as_bytes()));
        }
        content.next_line(0.0, -40.0);
        content.show(Str(total_row.as_bytes()));
        content.end_text();
        pdf.stream(content_id, &content.finish());

        pdf.finish()
    }

    /// Render the invoice and write the durable copy, returning the bytes
    /// for streaming. Overwriting an existing copy is idempotent.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn render_and_store(&self, order: &Order) -> ShopResult<Vec<u8>> {
        let bytes = self.render(order);
        let path = self.invoice_path(&order.id);

        tokio::fs::create_dir_all(&self.invoice_dir)
            .await
            .map_err(|e| persistence_error(&self.invoice_dir, e))?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| persistence_error(&path, e))?;

        debug!(path = %path.display(), size = bytes.len(), "wrote invoice");
        Ok(bytes)
    }
}

fn persistence_error(path: &Path, err: std::io::Error) -> ShopError {
    ShopError::PersistenceFailed(format!("invoice write {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Buyer, Order, OrderLineItem};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    fn sample_order() -> Order {
        Order::new(
            Buyer {
                email: "user-1@example.com".to_string(),
                user_id: "user-1".to_string(),
            },
            vec![
                OrderLineItem {
                    title: "Book".to_string(),
                    unit_price: Decimal::from_str("9.99").unwrap(),
                    description: "A very good book".to_string(),
                    quantity: 2,
                },
                OrderLineItem {
                    title: "Mug".to_string(),
                    unit_price: Decimal::from_str("5.00").unwrap(),
                    description: String::new(),
                    quantity: 1,
                },
            ],
            "cs_1",
        )
    }

    #[test]
    fn test_render_contains_rows_and_recomputed_total() {
        let renderer = InvoiceRenderer::new("data/invoices");
        let order = sample_order();
        let bytes = renderer.render(&order);

        assert!(contains(&bytes, "Invoice"));
        assert!(contains(&bytes, &format!("Order #{}", order.id)));
        assert!(contains(&bytes, "Book: 2 x $9.99"));
        assert!(contains(&bytes, "Mug: 1 x $5.00"));
        assert!(contains(&bytes, "Total Price: $24.98"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = InvoiceRenderer::new("data/invoices");
        let order = sample_order();

        assert_eq!(renderer.render(&order), renderer.render(&order));
    }

    #[test]
    fn test_render_empty_order() {
        let renderer = InvoiceRenderer::new("data/invoices");
        let order = Order::new(
            Buyer {
                email: "user-1@example.com".to_string(),
                user_id: "user-1".to_string(),
            },
            Vec::new(),
            "cs_empty",
        );

        let bytes = renderer.render(&order);
        assert!(contains(&bytes, "Total Price: $0.00"));
        // no line rows
        assert!(!contains(&bytes, " x $"));
    }

    #[tokio::test]
    async fn test_render_and_store_is_idempotent() {
        let dir = std::env::temp_dir().join(format!("invoices-{}", uuid::Uuid::new_v4()));
        let renderer = InvoiceRenderer::new(&dir);
        let order = sample_order();

        let first = renderer.render_and_store(&order).await.unwrap();
        let second = renderer.render_and_store(&order).await.unwrap();
        assert_eq!(first, second);

        let path = renderer.invoice_path(&order.id);
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("invoice-{}.pdf", order.id)
        );
        let on_disk = tokio::fs::read(&path).await.unwrap();
        assert_eq!(on_disk, second);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
