use crate::domains::campaign::CampaignRecord;
use crate::domains::listing::filter::Listable;
use crate::domains::project::ProjectRecord;
use crate::types::RecordStatus;
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Records that progress toward a target and may have an end date.
pub trait Measurable: Listable {
    /// Amount achieved so far, e.g. money raised or volunteers enrolled.
    fn achieved(&self) -> Option<Decimal>;
    /// Target the percentage is computed against.
    fn target(&self) -> Option<Decimal>;
    fn end_date(&self) -> Option<DateTime<Utc>>;
}

/// Visual weight of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    Success,
    Info,
    Neutral,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    pub label: String,
    pub tier: StatusTier,
}

/// Maps a status to its badge. Unknown codes are shown verbatim.
pub fn status_display(status: &RecordStatus) -> StatusDisplay {
    let (label, tier) = match status {
        RecordStatus::Active => ("Ativa", StatusTier::Success),
        RecordStatus::Open => ("Aberto", StatusTier::Success),
        RecordStatus::InProgress => ("Em andamento", StatusTier::Info),
        RecordStatus::Pending => ("Pendente", StatusTier::Info),
        RecordStatus::Completed => ("Concluído", StatusTier::Neutral),
        RecordStatus::Closed => ("Fechado", StatusTier::Danger),
        RecordStatus::Cancelled => ("Cancelado", StatusTier::Danger),
        RecordStatus::Other(code) => (code.as_str(), StatusTier::Neutral),
    };
    StatusDisplay {
        label: label.to_string(),
        tier,
    }
}

fn percentage_decimal(achieved: Option<Decimal>, target: Option<Decimal>) -> Decimal {
    let target = target.unwrap_or(Decimal::ZERO);
    let achieved = achieved.unwrap_or(Decimal::ZERO).max(Decimal::ZERO);
    if target <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    // Overflow only happens for a vanishing target, i.e. far past 100%
    let ratio = achieved.checked_div(target).unwrap_or(Decimal::ONE).min(Decimal::ONE);
    ratio * Decimal::ONE_HUNDRED
}

/// `min(achieved / target, 1) * 100`, always within `[0, 100]`.
pub fn funding_percentage(achieved: Option<Decimal>, target: Option<Decimal>) -> f64 {
    percentage_decimal(achieved, target)
        .to_f64()
        .unwrap_or(0.0)
        .clamp(0.0, 100.0)
}

/// Whole percent, halves rounded away from zero.
pub fn funding_percentage_rounded(achieved: Option<Decimal>, target: Option<Decimal>) -> u32 {
    percentage_decimal(achieved, target)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// `target - achieved`, never negative.
pub fn remaining_to_goal(achieved: Option<Decimal>, target: Option<Decimal>) -> Decimal {
    let remaining = target.unwrap_or(Decimal::ZERO) - achieved.unwrap_or(Decimal::ZERO);
    remaining.max(Decimal::ZERO)
}

/// Whole days until `end_date`, rounded up and never negative.
pub fn days_remaining(end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u32> {
    let end_date = end_date?;
    let left = end_date - now;
    if left <= TimeDelta::zero() {
        return Some(0);
    }
    let whole = left.num_days();
    let days = if left > TimeDelta::days(whole) { whole + 1 } else { whole };
    Some(u32::try_from(days).unwrap_or(u32::MAX))
}

/// Share of capacity already taken, in `[0, 1]`. Zero capacity gives 0.
pub fn progress_fraction(enrolled: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (f64::from(enrolled) / f64::from(capacity)).clamp(0.0, 1.0)
}

/// Everything a card or detail header shows besides the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetrics {
    pub percentage: f64,
    pub percentage_rounded: u32,
    pub remaining: Decimal,
    pub days_remaining: Option<u32>,
    pub status_label: String,
    pub status_tier: StatusTier,
}

/// Computes display metrics against `now`. Never fails; missing numbers
/// count as zero and a missing status gets an empty neutral badge.
pub fn compute_metrics<R: Measurable + ?Sized>(record: &R, now: DateTime<Utc>) -> RecordMetrics {
    let achieved = record.achieved();
    let target = record.target();
    let status = record.status().map(status_display).unwrap_or(StatusDisplay {
        label: String::new(),
        tier: StatusTier::Neutral,
    });

    RecordMetrics {
        percentage: funding_percentage(achieved, target),
        percentage_rounded: funding_percentage_rounded(achieved, target),
        remaining: remaining_to_goal(achieved, target),
        days_remaining: days_remaining(record.end_date(), now),
        status_label: status.label,
        status_tier: status.tier,
    }
}

/// Money formatting rules. Defaults to Brazilian reais: `R$ 1.234,56`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::brl()
    }
}

impl CurrencyFormat {
    pub fn brl() -> Self {
        Self {
            symbol: "R$".to_string(),
            thousands_separator: '.',
            decimal_separator: ',',
        }
    }

    /// Two decimals, half away from zero, grouped in thousands.
    pub fn format(&self, value: Decimal) -> String {
        let mut rounded = value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .abs();
        rounded.rescale(2);

        let plain = rounded.to_string();
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(self.thousands_separator);
            }
            grouped.push(digit);
        }

        let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
        format!("{}{} {}{}{}", sign, self.symbol, grouped, self.decimal_separator, fraction)
    }

    /// Reads back a string produced by [`CurrencyFormat::format`]. The symbol
    /// is optional so typed input like `1.250,50` also parses.
    pub fn parse(&self, text: &str) -> Option<Decimal> {
        let mut body = text.trim();
        let negative = body.starts_with('-');
        if negative {
            body = body[1..].trim_start();
        }
        body = body.strip_prefix(self.symbol.as_str()).unwrap_or(body).trim();
        if body.is_empty() {
            return None;
        }

        let normalized: String = body
            .chars()
            .filter(|c| *c != self.thousands_separator)
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        let value = Decimal::from_str(&normalized).ok()?;
        Some(if negative { -value } else { value })
    }
}

/// Totals for the campaign listing header
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub total_raised: Decimal,
    pub active_count: usize,
    pub completed_count: usize,
    pub total_donors: u64,
}

pub fn summarize_campaigns(campaigns: &[CampaignRecord]) -> CampaignSummary {
    campaigns.iter().fold(CampaignSummary::default(), |mut acc, campaign| {
        acc.total_raised += campaign.current_amount.unwrap_or(Decimal::ZERO);
        acc.total_donors += u64::from(campaign.donor_count);
        match campaign.status {
            Some(RecordStatus::Active) | Some(RecordStatus::Open) => acc.active_count += 1,
            Some(RecordStatus::Completed) => acc.completed_count += 1,
            _ => {}
        }
        acc
    })
}

/// Totals for the project listing header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub open_count: usize,
    pub total_enrolled: u64,
    pub total_capacity: u64,
}

pub fn summarize_projects(projects: &[ProjectRecord]) -> ProjectSummary {
    projects.iter().fold(ProjectSummary::default(), |mut acc, project| {
        if project.status.as_ref().map_or(false, RecordStatus::accepts_submissions) {
            acc.open_count += 1;
        }
        acc.total_enrolled += u64::from(project.enrolled_count());
        acc.total_capacity += u64::from(project.max_volunteers);
        acc
    })
}
