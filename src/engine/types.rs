use serde::Serialize;

/// Every intermediate and final figure for one price/rent pair.
/// Carries numbers only; interpretation lives in the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalculationResult {
    pub house_price: f64,
    pub monthly_rent: f64,

    pub purchase_expenses: f64,
    pub loan_amount: f64,
    pub down_payment: f64,

    pub monthly_installment: f64,
    pub total_loan_repayment: f64,

    /// Down payment, every installment and purchase expenses together.
    pub real_total_cost: f64,

    pub gross_annual_rent: f64,
    pub annual_tax: f64,
    pub net_annual_rent: f64,

    /// Years of net rent needed to cover `real_total_cost`.
    pub amortization_years: f64,
}

impl CalculationResult {
    /// All-zero placeholder for listings that only yielded a location.
    pub fn neutral() -> Self {
        Self {
            house_price: 0.0,
            monthly_rent: 0.0,
            purchase_expenses: 0.0,
            loan_amount: 0.0,
            down_payment: 0.0,
            monthly_installment: 0.0,
            total_loan_repayment: 0.0,
            real_total_cost: 0.0,
            gross_annual_rent: 0.0,
            annual_tax: 0.0,
            net_annual_rent: 0.0,
            amortization_years: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InvestmentCategory {
    Logical,
    Overpriced,
    /// Only for location-only listings; never produced by evaluation.
    Neutral,
}

/// Semantic color suggestion for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorHint {
    Green,
    Red,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentVerdict {
    pub amortization_years: f64,
    pub status_text: String,
    pub category: InvestmentCategory,
    pub color_hint: ColorHint,
    pub summary: String,
}

impl InvestmentVerdict {
    pub fn neutral() -> Self {
        Self {
            amortization_years: 0.0,
            status_text: "LOCATION ONLY".to_string(),
            category: InvestmentCategory::Neutral,
            color_hint: ColorHint::Neutral,
            summary: "A location was found but no price/rent pair, so no amortization \
                      estimate is available for this listing."
                .to_string(),
        }
    }
}

/// Whole lira with comma thousands grouping, e.g. `1,250,000 TL`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{} TL", sign, grouped)
}
