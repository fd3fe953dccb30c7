use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::BuildError;
use super::types::*;

/// Builder for documents handed to the fiscal connector.
///
/// ```
/// use zimra_fiscal::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = DocumentBuilder::new(1, "INV/2024/0001", DocumentKind::CustomerInvoice)
///     .date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .posted()
///     .partner(PartnerBuilder::new("Kunde Pvt Ltd").vat("TIN:2000123456").build())
///     .add_line(LineItemBuilder::new("Consulting", dec!(1), dec!(100)).tax(1, dec!(15)).build())
///     .build()
///     .unwrap();
///
/// assert_eq!(invoice.amount_total, dec!(115.00));
/// ```
pub struct DocumentBuilder {
    id: u64,
    name: String,
    kind: DocumentKind,
    company_id: u64,
    state: PostingState,
    payment_state: PaymentState,
    date: Option<NaiveDate>,
    reference: Option<String>,
    origin_invoice: Option<String>,
    currency: String,
    totals: Option<(Decimal, Decimal, Decimal)>,
    partner: Option<Partner>,
    lines: Vec<LineItem>,
    fiscal: FiscalRecord,
}

impl DocumentBuilder {
    pub fn new(id: u64, name: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            company_id: 1,
            state: PostingState::Draft,
            payment_state: PaymentState::NotPaid,
            date: None,
            reference: None,
            origin_invoice: None,
            currency: "USD".to_string(),
            totals: None,
            partner: None,
            lines: Vec::new(),
            fiscal: FiscalRecord::default(),
        }
    }

    pub fn company(mut self, company_id: u64) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn state(mut self, state: PostingState) -> Self {
        self.state = state;
        self
    }

    pub fn posted(self) -> Self {
        self.state(PostingState::Posted)
    }

    pub fn payment_state(mut self, state: PaymentState) -> Self {
        self.payment_state = state;
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Invoice reversed by this credit note.
    pub fn origin_invoice(mut self, name: impl Into<String>) -> Self {
        self.origin_invoice = Some(name.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    /// Explicit document totals as computed by the host. Without them the
    /// totals are summed from the product lines.
    pub fn totals(mut self, untaxed: Decimal, tax: Decimal, total: Decimal) -> Self {
        self.totals = Some((untaxed, tax, total));
        self
    }

    pub fn partner(mut self, partner: Partner) -> Self {
        self.partner = Some(partner);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    /// Start from an existing fiscal record (e.g. a restored snapshot).
    pub fn fiscal(mut self, fiscal: FiscalRecord) -> Self {
        self.fiscal = fiscal;
        self
    }

    pub fn build(self) -> Result<Document, BuildError> {
        if self.name.trim().is_empty() {
            return Err(BuildError("document name must not be empty".into()));
        }
        if self.name.len() > 200 {
            return Err(BuildError(
                "document name cannot exceed 200 characters".into(),
            ));
        }
        if self.lines.len() > 10_000 {
            return Err(BuildError(
                "document cannot have more than 10,000 lines".into(),
            ));
        }
        if self.currency.len() != 3 {
            return Err(BuildError(format!(
                "currency '{}' must be a 3-letter code",
                self.currency
            )));
        }

        let (amount_untaxed, amount_tax, amount_total) = match self.totals {
            Some(totals) => totals,
            None => {
                let overflow = || BuildError("document totals overflow".into());
                let untaxed = self
                    .lines
                    .iter()
                    .filter(|l| l.is_product())
                    .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.subtotal))
                    .ok_or_else(overflow)?;
                let tax = self
                    .lines
                    .iter()
                    .filter(|l| l.is_product())
                    .filter_map(|l| l.tax_amount)
                    .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t))
                    .ok_or_else(overflow)?;
                (untaxed, tax, untaxed.checked_add(tax).ok_or_else(overflow)?)
            }
        };

        Ok(Document {
            id: self.id,
            name: self.name,
            kind: self.kind,
            company_id: self.company_id,
            state: self.state,
            payment_state: self.payment_state,
            date: self.date,
            reference: self.reference,
            origin_invoice: self.origin_invoice,
            currency: self.currency,
            amount_untaxed,
            amount_tax,
            amount_total,
            partner: self.partner,
            lines: self.lines,
            fiscal: self.fiscal,
        })
    }
}

/// Builder for Partner.
pub struct PartnerBuilder {
    partner: Partner,
}

impl PartnerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            partner: Partner {
                name: name.into(),
                ..Partner::default()
            },
        }
    }

    /// Combined identifier string, parsed into TIN and VAT number when no
    /// structured fields are set.
    pub fn vat(mut self, vat: impl Into<String>) -> Self {
        self.partner.vat = Some(vat.into());
        self
    }

    pub fn tin(mut self, tin: impl Into<String>) -> Self {
        self.partner.tin = Some(tin.into());
        self
    }

    pub fn vat_number(mut self, vat_number: impl Into<String>) -> Self {
        self.partner.vat_number = Some(vat_number.into());
        self
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.partner.street = Some(street.into());
        self
    }

    pub fn street2(mut self, street2: impl Into<String>) -> Self {
        self.partner.street2 = Some(street2.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.partner.city = Some(city.into());
        self
    }

    pub fn zip(mut self, zip: impl Into<String>) -> Self {
        self.partner.zip = Some(zip.into());
        self
    }

    pub fn province(mut self, province: impl Into<String>) -> Self {
        self.partner.province = Some(province.into());
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.partner.country = Some(country.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.partner.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.partner.email = Some(email.into());
        self
    }

    pub fn build(self) -> Partner {
        self.partner
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    display_type: DisplayType,
    description: Option<String>,
    quantity: Decimal,
    unit_price: Decimal,
    discount: Decimal,
    subtotal: Option<Decimal>,
    product_id: Option<u64>,
    product_code: Option<String>,
    product_name: Option<String>,
    tax_ids: Vec<u64>,
    tax_amount: Option<Decimal>,
    engine_rate: Option<Decimal>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            display_type: DisplayType::Product,
            description: Some(description.into()),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
            subtotal: None,
            product_id: None,
            product_code: None,
            product_name: None,
            tax_ids: Vec::new(),
            tax_amount: None,
            engine_rate: None,
        }
    }

    /// Section heading line.
    pub fn section(label: impl Into<String>) -> Self {
        Self {
            display_type: DisplayType::Section,
            ..Self::new(label, Decimal::ZERO, Decimal::ZERO)
        }
    }

    /// Free-text note line.
    pub fn note(label: impl Into<String>) -> Self {
        Self {
            display_type: DisplayType::Note,
            ..Self::new(label, Decimal::ZERO, Decimal::ZERO)
        }
    }

    /// Host product reference.
    pub fn product(mut self, id: u64, code: Option<&str>, name: impl Into<String>) -> Self {
        self.product_id = Some(id);
        self.product_code = code.map(str::to_string);
        self.product_name = Some(name.into());
        self
    }

    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }

    /// Discount in percent.
    pub fn discount(mut self, percent: Decimal) -> Self {
        self.discount = percent;
        self
    }

    /// Explicit line subtotal as computed by the host.
    pub fn subtotal(mut self, subtotal: Decimal) -> Self {
        self.subtotal = Some(subtotal);
        self
    }

    /// Host tax applied to the line, with the rate the host tax engine used
    /// to compute the line's tax amount.
    pub fn tax(mut self, tax_id: u64, rate: Decimal) -> Self {
        self.tax_ids.push(tax_id);
        self.engine_rate = Some(self.engine_rate.unwrap_or(Decimal::ZERO).saturating_add(rate));
        self
    }

    /// Host tax without an engine result; the connector approximates the
    /// tax from the mapped rate.
    pub fn tax_id(mut self, tax_id: u64) -> Self {
        self.tax_ids.push(tax_id);
        self
    }

    /// Override the engine-computed tax amount.
    pub fn tax_amount(mut self, amount: Decimal) -> Self {
        self.tax_amount = Some(amount);
        self
    }

    pub fn build(self) -> LineItem {
        let subtotal = self.subtotal.unwrap_or_else(|| {
            // Saturates: out-of-range figures surface as a payload error.
            let gross = self.unit_price.saturating_mul(self.quantity);
            let discounted =
                gross.saturating_sub(gross.saturating_mul(self.discount) / Decimal::ONE_HUNDRED);
            discounted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        });
        let tax_amount = self.tax_amount.or_else(|| {
            self.engine_rate.map(|rate| {
                (subtotal.saturating_mul(rate) / Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            })
        });
        LineItem {
            display_type: self.display_type,
            product_id: self.product_id,
            product_code: self.product_code,
            product_name: self.product_name,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
            subtotal,
            tax_ids: self.tax_ids,
            tax_amount,
        }
    }
}
