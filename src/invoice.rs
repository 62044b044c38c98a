//! Invoice rendering
//!
//! Renders an audit record into a self-contained styled HTML document held
//! entirely in memory. Persistence and transmission of the bytes belong to
//! the delivery layer; the rendering itself touches no filesystem or network.

use crate::audit::AuditRecord;

/// A rendered invoice document, ready to hand to the delivery channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInvoice {
    /// Suggested attachment file name, `<player>invoice.html`
    pub file_name: String,
    bytes: Vec<u8>,
}

impl RenderedInvoice {
    /// The document bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The document as HTML text
    pub fn as_html(&self) -> &str {
        std::str::from_utf8(&self.bytes).expect("rendered invoice is always valid UTF-8")
    }

    /// Size of the document in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check whether the document is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Render an audit record into its invoice document
///
/// Pure transform: the same record always renders to the same bytes.
pub fn render(record: &AuditRecord) -> RenderedInvoice {
    let player = escape_html(&record.player);
    let rank = escape_html(record.rank.as_str());

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<style>
body {{ font-family: Arial, sans-serif; margin: 0; padding: 0; }}
.invoice-box {{ padding: 30px; border: 1px solid #eee; box-shadow: 0 0 10px rgba(0, 0, 0, 0.15); }}
.invoice-title {{ font-size: 24px; margin-bottom: 10px; }}
.invoice-details table {{ width: 100%; border-collapse: collapse; }}
.invoice-details table, .invoice-details th, .invoice-details td {{ border: 1px solid #ddd; padding: 8px; }}
.invoice-details th {{ background-color: #f2f2f2; }}
.invoice-footer {{ margin-top: 20px; font-size: 11px; color: #888; }}
</style>
</head>
<body>
<div class="invoice-box">
<div class="invoice-title">Invoice</div>
<div class="invoice-details">
<table>
<tr><th>Player</th><td>{player}</td></tr>
<tr><th>Rank</th><td>{rank}</td></tr>
<tr><th>Cash</th><td>{cash}</td></tr>
<tr><th>Claim Blocks</th><td>{claim_blocks}</td></tr>
<tr><th>Assigned Date</th><td>{assigned_on}</td></tr>
<tr><th>Expiration Date</th><td>{expires_on}</td></tr>
</table>
</div>
<div class="invoice-footer">Record {record_hash}</div>
</div>
</body>
</html>
"#,
        player = player,
        rank = rank,
        cash = record.cash,
        claim_blocks = record.claim_blocks,
        assigned_on = record.assigned_on,
        expires_on = record.expires_on,
        record_hash = record.record_hash,
    );

    RenderedInvoice {
        file_name: format!("{}invoice.html", record.player),
        bytes: html.into_bytes(),
    }
}

/// Escape text for embedding in the document; player names are externally
/// supplied
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
