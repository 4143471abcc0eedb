// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! Cost arithmetic shared by the simulation agents.

use serde::Serialize;
use std::collections::HashMap;

const DAYS_PER_MONTH: f64 = 30.0;

pub fn monthly_to_annual(monthly: f64) -> f64 {
    monthly * 12.0
}

pub fn annual_to_monthly(annual: f64) -> f64 {
    annual / 12.0
}

pub fn daily_cost(monthly: f64) -> f64 {
    monthly / DAYS_PER_MONTH
}

pub fn hourly_cost(monthly: f64) -> f64 {
    monthly / (DAYS_PER_MONTH * 24.0)
}

/// Apply a percentage change; positive increases, negative decreases.
pub fn apply_percentage_change(base: f64, percentage: f64) -> f64 {
    base * (1.0 + percentage / 100.0)
}

/// Percentage saved going from `original` to `new`; positive when `new` is
/// cheaper, zero when `original` is zero.
pub fn savings_percentage(original: f64, new: f64) -> f64 {
    if original == 0.0 {
        return 0.0;
    }
    (original - new) / original * 100.0
}

pub fn apply_discount(cost: f64, discount_percentage: f64) -> f64 {
    cost * (1.0 - discount_percentage / 100.0)
}

/// Format a cost with its currency symbol, e.g. `$1234.56`.
pub fn format_cost(cost: f64, currency: &str) -> String {
    let symbol = match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CAD" => "C$",
        "AUD" => "A$",
        other => other,
    };
    format!("{symbol}{cost:.2}")
}

/// Totals and per-category percentages for a cost breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownSummary {
    pub total: f64,
    pub percentages: HashMap<String, f64>,
    pub largest_category: Option<String>,
}

pub fn breakdown_summary(breakdown: &HashMap<String, f64>) -> BreakdownSummary {
    let total: f64 = breakdown.values().sum();

    let percentages = breakdown
        .iter()
        .map(|(category, cost)| {
            let share = if total > 0.0 { cost / total * 100.0 } else { 0.0 };
            (category.clone(), share)
        })
        .collect();

    let largest_category = breakdown
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(category, _)| category.clone());

    BreakdownSummary {
        total,
        percentages,
        largest_category,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCost {
    pub month: u32,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CostProjection {
    pub monthly_projections: Vec<MonthlyCost>,
    pub total_cost: f64,
    pub average_monthly: f64,
    pub growth_rate: f64,
}

/// Project costs over `months`, compounding an optional monthly growth rate.
pub fn project_over_time(base_monthly: f64, months: u32, growth_rate: Option<f64>) -> CostProjection {
    let rate = growth_rate.unwrap_or(0.0);
    let mut monthly_projections = Vec::with_capacity(months as usize);
    let mut current = base_monthly;

    for month in 1..=months {
        monthly_projections.push(MonthlyCost {
            month,
            cost: current,
        });
        current *= 1.0 + rate;
    }

    let total_cost: f64 = monthly_projections.iter().map(|m| m.cost).sum();
    let average_monthly = if months > 0 {
        total_cost / f64::from(months)
    } else {
        0.0
    };

    CostProjection {
        monthly_projections,
        total_cost,
        average_monthly,
        growth_rate: rate,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoiSummary {
    pub initial_investment: f64,
    pub total_savings: f64,
    pub net_benefit: f64,
    pub roi_percentage: f64,
    pub payback_months: f64,
    pub is_profitable: bool,
}

/// ROI of a one-time optimization investment over `months`.
pub fn roi(initial_investment: f64, monthly_savings: f64, months: u32) -> RoiSummary {
    let total_savings = monthly_savings * f64::from(months);
    let net_benefit = total_savings - initial_investment;
    let roi_percentage = if initial_investment > 0.0 {
        net_benefit / initial_investment * 100.0
    } else {
        f64::INFINITY
    };
    let payback_months = if monthly_savings > 0.0 {
        initial_investment / monthly_savings
    } else {
        f64::INFINITY
    };

    RoiSummary {
        initial_investment,
        total_savings,
        net_benefit,
        roi_percentage,
        payback_months,
        is_profitable: net_benefit > 0.0,
    }
}
