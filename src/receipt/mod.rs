//! Receipt
//!
//! Terminal rendering of a computed order: one table row per cart line, the
//! delivery options or the chosen delivery, and a totals summary.

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use rusty_money::{MoneyError, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    checkout::views::{ItemView, OrderShortView},
    money,
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable view of a computed order.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'a> {
    view: &'a OrderShortView,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Wraps `view` for printing in its own currency.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Money`] if the view's currency is unknown.
    pub fn new(view: &'a OrderShortView) -> Result<Self, ReceiptError> {
        Ok(Self {
            view,
            currency: money::currency(&view.currency)?,
        })
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn format(&self, amount: Decimal) -> String {
        money::format(amount, self.currency)
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "\n Order \x1b[1m{}\x1b[0m", self.view.uuid).map_err(|_err| ReceiptError::IO)?;

        self.write_items(&mut out)?;

        if let Some(shipping) = &self.view.shipping {
            let mut builder = Builder::default();

            builder.push_record(["Delivery", "Zone", "Fee", "Extras", "Discount"]);
            builder.push_record([
                display_title(&shipping.title, &shipping.name),
                shipping
                    .zone
                    .as_ref()
                    .map(|zone| zone.title.clone())
                    .unwrap_or_default(),
                self.format(shipping.fee.value),
                shipping
                    .services
                    .iter()
                    .map(|service| format!("{} {}", service.name, self.format(service.price)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                discount_cell(shipping.discount, || self.format(shipping.discount)),
            ]);

            write_table(&mut out, builder, &[], smallvec![(1, 4, Color::FG_GREEN)])?;
        } else if !self.view.deliveries.is_empty() {
            let mut builder = Builder::default();

            builder.push_record(["#", "Delivery option", "By volume", "By weight", "Fee"]);

            for quote in &self.view.deliveries {
                builder.push_record([
                    quote.transport.to_string(),
                    display_title(&quote.title, &quote.name),
                    self.format(quote.fee.by_volume),
                    self.format(quote.fee.by_weight),
                    self.format(quote.fee.value),
                ]);
            }

            write_table(&mut out, builder, &[], smallvec![])?;
        }

        self.write_summary(&mut out)?;

        self.write_payment(&mut out)
    }

    fn write_items(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();
        let mut item_boundary_rows: SmallVec<[usize; 16]> = smallvec![];
        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

        builder.push_record(["", "Item", "Options", "Qty", "Price", "Discount", "Total", "Coupons"]);

        for (idx, item) in self.view.items.iter().enumerate() {
            let row = idx + 1;

            item_boundary_rows.push(row);

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item_title(item),
                item.properties
                    .iter()
                    .map(|p| format!("{}: {}", p.property, p.value))
                    .collect::<Vec<_>>()
                    .join("\n"),
                item.quantity.to_string(),
                self.format(item.price),
                discount_cell(item.discount, || self.format(item.discount)),
                self.format(item.total),
                item.coupons
                    .iter()
                    .map(|c| c.code.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ]);

            color_ops.push((row, 2, color_dark_grey()));

            if !item.discount.is_zero() {
                color_ops.push((row, 5, Color::FG_GREEN));
            }
        }

        write_table(out, builder, &item_boundary_rows, color_ops)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let totals = &self.view.totals;

        let mut lines: SmallVec<[(String, String); 8]> = smallvec![
            (" Subtotal:".to_string(), self.format(totals.sum)),
        ];

        if !totals.discount.is_zero() {
            lines.push((" Discount:".to_string(), format!("-{}", self.format(totals.discount))));
        }

        if self.view.shipping.is_some() {
            lines.push((" Delivery:".to_string(), self.format(totals.delivery)));
        }

        if !totals.discount2.is_zero() {
            lines.push((
                " Delivery discount:".to_string(),
                format!("-{}", self.format(totals.discount2)),
            ));
        }

        lines.push((
            format!(" VAT {}% incl.:", totals.vat.normalize()),
            self.format(totals.vat_amount()),
        ));

        lines.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}\x1b[0m", self.format(totals.total)),
        ));

        let label_width = lines
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = lines
            .iter()
            .map(|(_, value)| visible_width(value) + 2)
            .max()
            .unwrap_or_default();

        for (label, value) in &lines {
            write_summary_line(out, label, &format!("{value}  "), label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }

    fn write_payment(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        if let Some(billing) = &self.view.billing {
            let method = display_title(&billing.method.title, &billing.method.name);

            match &billing.suffix {
                Some(suffix) => writeln!(out, " Payment: {method} ({suffix})"),
                None => writeln!(out, " Payment: {method}"),
            }
            .map_err(|_err| ReceiptError::IO)?;

            if let Some(text) = &billing.text {
                writeln!(out, " {text}").map_err(|_err| ReceiptError::IO)?;
            }
        } else if !self.view.payments.is_empty() {
            let methods = self
                .view
                .payments
                .iter()
                .map(|method| format!("{} {}", method.id, method.name))
                .collect::<Vec<_>>()
                .join(", ");

            writeln!(out, " Payment methods: {methods}").map_err(|_err| ReceiptError::IO)?;
        }

        if let Some(comment) = &self.view.comment {
            writeln!(out, " Comment: {comment}").map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }
}

fn item_title(item: &ItemView) -> String {
    let mut title = item.title.clone();

    if let Some(variation) = &item.variation_title {
        title.push_str("\n\x1b[90m");
        title.push_str(variation);
        title.push_str("\x1b[0m");
    }

    title
}

fn display_title(title: &str, name: &str) -> String {
    if title.is_empty() {
        name.to_string()
    } else {
        title.to_string()
    }
}

fn discount_cell(amount: Decimal, format: impl FnOnce() -> String) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        format!("-{}", format())
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    item_boundary_rows: &[usize],
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in item_boundary_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use crate::{
        checkout::{
            order::OrderUuid,
            totals::Totals,
            views::{BillingView, CouponView, PaymentMethodView},
        },
        shipping::fees::{FeeBreakdown, ShippingQuote},
    };

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut in_escape = false;

        for ch in s.chars() {
            if in_escape {
                if ch.is_ascii_alphabetic() {
                    in_escape = false;
                }
            } else if ch == '\x1b' {
                in_escape = true;
            } else {
                out.push(ch);
            }
        }

        out
    }

    fn item() -> ItemView {
        ItemView {
            uuid: "1:0:".to_string(),
            product: 1,
            variation: 0,
            title: "Trail Runner".to_string(),
            variation_title: None,
            path: "/outdoor/shoes".to_string(),
            thumbnail: None,
            properties: Vec::new(),
            coupons: vec![CouponView {
                code: "TEN".to_string(),
                title: String::new(),
                description: String::new(),
                amount: "10%".to_string(),
                discount: dec("10"),
            }],
            price: dec("100"),
            discount: dec("10"),
            quantity: 1,
            vat: dec("20"),
            total: dec("90"),
            volume: Decimal::ZERO,
            weight: dec("0.8"),
        }
    }

    fn view() -> OrderShortView {
        OrderShortView {
            uuid: OrderUuid::new(),
            currency: "GBP".to_string(),
            billing: None,
            items: vec![item()],
            totals: Totals {
                quantity: 1,
                volume: Decimal::ZERO,
                weight: dec("0.8"),
                sum: dec("100"),
                discount: dec("10"),
                delivery: Decimal::ZERO,
                discount2: Decimal::ZERO,
                vat: dec("20"),
                total: dec("90"),
            },
            deliveries: vec![ShippingQuote {
                transport: 2,
                name: "letter".to_string(),
                title: "Letter".to_string(),
                fee: FeeBreakdown {
                    by_volume: dec("2.50"),
                    by_weight: dec("2.50"),
                    value: dec("2.50"),
                },
                services: Vec::new(),
            }],
            shipping: None,
            payments: vec![PaymentMethodView {
                id: 1,
                name: "stripe".to_string(),
                title: "Card".to_string(),
            }],
            comment: None,
        }
    }

    #[test]
    fn renders_items_quotes_and_totals() -> TestResult {
        let view = view();
        let mut out = Vec::new();

        Receipt::new(&view)?.write_to(&mut out)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        assert!(text.contains("Trail Runner"), "expected item title, got {text}");
        assert!(text.contains("-£10.00"), "expected item discount, got {text}");
        assert!(text.contains("TEN"), "expected coupon code, got {text}");
        assert!(text.contains("Letter"), "expected delivery option, got {text}");
        assert!(text.contains("£2.50"), "expected delivery fee, got {text}");
        assert!(text.contains("VAT 20% incl.:"), "expected VAT line, got {text}");
        assert!(text.contains("£15.00"), "expected VAT amount, got {text}");
        assert!(text.contains("Total:"), "expected total line, got {text}");
        assert!(text.contains("£90.00"), "expected total, got {text}");
        assert!(text.contains("1 stripe"), "expected payment methods, got {text}");

        Ok(())
    }

    #[test]
    fn renders_chosen_payment_with_instructions() -> TestResult {
        let mut view = view();

        view.payments.clear();
        view.billing = Some(BillingView {
            method: PaymentMethodView {
                id: 3,
                name: "advance-payment".to_string(),
                title: "Bank transfer".to_string(),
            },
            suffix: Some("ING".to_string()),
            text: Some("Transfer £90.00".to_string()),
            profile: None,
            vat_id: None,
        });

        let mut out = Vec::new();

        Receipt::new(&view)?.write_to(&mut out)?;

        let text = strip_ansi(&String::from_utf8(out)?);

        assert!(
            text.contains("Payment: Bank transfer (ING)"),
            "expected chosen method, got {text}"
        );
        assert!(text.contains("Transfer £90.00"), "expected instructions, got {text}");

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let mut view = view();

        view.currency = "XXX1".to_string();

        let result = Receipt::new(&view);

        assert!(
            matches!(result, Err(ReceiptError::Money(_))),
            "expected Money error, got {result:?}"
        );
    }

    #[test]
    fn visible_width_ignores_escape_codes() {
        assert_eq!(visible_width("\x1b[1mTotal:\x1b[0m"), 6);
        assert_eq!(visible_width("plain"), 5);
    }

    #[test]
    fn colorize_borders_wraps_box_runs() {
        let out = colorize_borders("a──b");

        assert_eq!(out, "a\x1b[90m──\x1b[0mb");
    }
}
