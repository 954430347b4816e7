//! Business Intelligence agent (#1): revenue, expense, profit and growth
//! reporting over a six-month sample data set.

use crate::agents::agent_type::AgentKind;
use crate::agents::base::{AgentBehavior, AgentError};
use crate::agents::context::AgentContext;
use ah_protocol::agent_models::{AgentConfig, AgentDescriptor, CommandPattern};
use ah_protocol::command_models::{Command, Response};
use anyhow::bail;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const METRICS_CACHE_KEY: &str = "metrics";
const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_CURRENCY_SYMBOL: &str = "$";

struct MonthRecord {
    month: &'static str,
    revenue: u64,
    expenses: u64,
    profit: u64,
    growth: f64,
}

static SAMPLE_DATA: [MonthRecord; 6] = [
    MonthRecord { month: "January", revenue: 125_000, expenses: 85_000, profit: 40_000, growth: 0.0 },
    MonthRecord { month: "February", revenue: 132_000, expenses: 88_000, profit: 44_000, growth: 5.6 },
    MonthRecord { month: "March", revenue: 145_000, expenses: 92_000, profit: 53_000, growth: 9.8 },
    MonthRecord { month: "April", revenue: 138_000, expenses: 90_000, profit: 48_000, growth: -4.8 },
    MonthRecord { month: "May", revenue: 155_000, expenses: 95_000, profit: 60_000, growth: 12.3 },
    MonthRecord { month: "June", revenue: 168_000, expenses: 98_000, profit: 70_000, growth: 8.4 },
];

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiAction {
    GetRevenue,
    GetExpenses,
    GetRevenuePeriod,
    GetProfit,
    GetGrowth,
    GetMetrics,
}

#[derive(Debug, Clone)]
pub struct BusinessIntelligence {
    currency_symbol: String,
    cache_ttl: Duration,
}

impl Default for BusinessIntelligence {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

/// `1234567` -> `"1,234,567"`.
fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn format_growth(growth: f64) -> String {
    if growth > 0.0 {
        format!("+{growth}%")
    } else {
        format!("{growth}%")
    }
}

fn current_month() -> &'static MonthRecord {
    &SAMPLE_DATA[SAMPLE_DATA.len() - 1]
}

/// Mean of the non-zero growth rates. January's baseline of 0 is excluded.
fn average_growth() -> f64 {
    let rates: Vec<f64> = SAMPLE_DATA
        .iter()
        .map(|m| m.growth)
        .filter(|g| *g != 0.0)
        .collect();
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}

fn margin(record: &MonthRecord) -> String {
    format!("{:.1}", record.profit as f64 / record.revenue as f64 * 100.0)
}

impl BusinessIntelligence {
    fn money(&self, amount: u64) -> String {
        format!("{}{}", self.currency_symbol, group_thousands(amount))
    }

    fn revenue(&self) -> Value {
        let current = current_month();
        let total: u64 = SAMPLE_DATA.iter().map(|m| m.revenue).sum();

        json!({
            "current": {
                "month": current.month,
                "revenue": current.revenue,
                "formatted": self.money(current.revenue),
            },
            "total": { "revenue": total, "formatted": self.money(total) },
            "monthly": SAMPLE_DATA.iter().map(|m| json!({
                "month": m.month,
                "revenue": m.revenue,
                "formatted": self.money(m.revenue),
            })).collect::<Vec<_>>(),
        })
    }

    fn expenses(&self) -> Value {
        let current = current_month();
        let total: u64 = SAMPLE_DATA.iter().map(|m| m.expenses).sum();

        json!({
            "current": {
                "month": current.month,
                "expenses": current.expenses,
                "formatted": self.money(current.expenses),
            },
            "total": { "expenses": total, "formatted": self.money(total) },
            "monthly": SAMPLE_DATA.iter().map(|m| json!({
                "month": m.month,
                "expenses": m.expenses,
                "formatted": self.money(m.expenses),
            })).collect::<Vec<_>>(),
        })
    }

    fn revenue_period(&self, period: &str) -> anyhow::Result<Value> {
        let Some(record) = SAMPLE_DATA
            .iter()
            .find(|m| m.month.eq_ignore_ascii_case(period.trim()))
        else {
            bail!("No data found for period: {period}");
        };

        Ok(json!({
            "month": record.month,
            "revenue": record.revenue,
            "expenses": record.expenses,
            "profit": record.profit,
            "growth": record.growth,
            "formatted": {
                "revenue": self.money(record.revenue),
                "expenses": self.money(record.expenses),
                "profit": self.money(record.profit),
                "growth": format_growth(record.growth),
            },
        }))
    }

    fn profit(&self) -> Value {
        let current = current_month();
        let total: u64 = SAMPLE_DATA.iter().map(|m| m.profit).sum();
        let average = total as f64 / SAMPLE_DATA.len() as f64;

        json!({
            "current": {
                "month": current.month,
                "profit": current.profit,
                "margin": margin(current),
                "formatted": self.money(current.profit),
            },
            "total": { "profit": total, "formatted": self.money(total) },
            "average": {
                "profit": average,
                "formatted": self.money(average.round() as u64),
            },
            "monthly": SAMPLE_DATA.iter().map(|m| json!({
                "month": m.month,
                "profit": m.profit,
                "margin": margin(m),
                "formatted": self.money(m.profit),
            })).collect::<Vec<_>>(),
        })
    }

    fn growth(&self) -> Value {
        let current = current_month();
        let average = average_growth();
        let trend = if current.growth > average { "improving" } else { "declining" };
        let average_formatted = if average > 0.0 {
            format!("+{average:.1}%")
        } else {
            format!("{average:.1}%")
        };

        json!({
            "current": {
                "month": current.month,
                "growth": current.growth,
                "formatted": format_growth(current.growth),
            },
            "average": { "growth": average, "formatted": average_formatted },
            "trend": trend,
            "monthly": SAMPLE_DATA.iter().map(|m| json!({
                "month": m.month,
                "growth": m.growth,
                "formatted": format_growth(m.growth),
            })).collect::<Vec<_>>(),
        })
    }

    fn metrics() -> Value {
        let best = SAMPLE_DATA
            .iter()
            .fold(&SAMPLE_DATA[0], |best, m| if m.profit > best.profit { m } else { best });
        let worst = SAMPLE_DATA
            .iter()
            .fold(&SAMPLE_DATA[0], |worst, m| if m.profit < worst.profit { m } else { worst });

        json!({
            "totalRevenue": SAMPLE_DATA.iter().map(|m| m.revenue).sum::<u64>(),
            "totalExpenses": SAMPLE_DATA.iter().map(|m| m.expenses).sum::<u64>(),
            "totalProfit": SAMPLE_DATA.iter().map(|m| m.profit).sum::<u64>(),
            "averageGrowth": average_growth(),
            "bestMonth": best.month,
            "worstMonth": worst.month,
        })
    }
}

#[async_trait]
impl AgentBehavior for BusinessIntelligence {
    type Action = BiAction;

    fn descriptor(&self) -> AgentDescriptor {
        AgentKind::BusinessIntelligence.descriptor()
    }

    fn validate_config(&self, config: &AgentConfig) -> Result<(), AgentError> {
        if let Some(symbol) = config.get("currency_symbol") {
            if !symbol.is_string() {
                return Err(AgentError::ConfigInvalid(
                    "currency_symbol must be a string".to_string(),
                ));
            }
        }
        if let Some(ttl) = config.get("cache_ttl_secs") {
            if ttl.as_u64().is_none() {
                return Err(AgentError::ConfigInvalid(
                    "cache_ttl_secs must be a non-negative integer".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn command_patterns(&self) -> Vec<CommandPattern> {
        vec![
            CommandPattern::new(
                "get_revenue",
                &["show revenue", "display income", "financial status", "how much money"],
            )
            .with_description("Display current revenue data"),
            CommandPattern::new("get_expenses", &["show expenses", "display costs", "spending report"])
                .with_description("Display expense breakdown"),
            CommandPattern::new("get_revenue_period", &["revenue for (.*)", "income in (.*)"])
                .with_description("Get revenue for specific period"),
            CommandPattern::new("get_profit", &["profit margin", "show profit", "net income"])
                .with_description("Display profit analysis"),
            CommandPattern::new("get_growth", &["growth rate", "show growth", "performance trend"])
                .with_description("Display growth metrics"),
        ]
    }

    async fn setup(&mut self, config: &AgentConfig, _context: &mut AgentContext) -> anyhow::Result<()> {
        if let Some(symbol) = config.get("currency_symbol").and_then(Value::as_str) {
            self.currency_symbol = symbol.to_string();
        }
        if let Some(ttl) = config.get("cache_ttl_secs").and_then(Value::as_u64) {
            self.cache_ttl = Duration::from_secs(ttl);
        }
        Ok(())
    }

    async fn handle(
        &mut self,
        action: BiAction,
        command: &Command,
        context: &mut AgentContext,
    ) -> anyhow::Result<Value> {
        match action {
            BiAction::GetRevenue => Ok(self.revenue()),
            BiAction::GetExpenses => Ok(self.expenses()),
            BiAction::GetRevenuePeriod => {
                let Some(period) = command
                    .str_parameter("period")
                    .or_else(|| command.str_parameter("param1"))
                else {
                    bail!("Missing parameter: period");
                };
                self.revenue_period(period)
            }
            BiAction::GetProfit => Ok(self.profit()),
            BiAction::GetGrowth => Ok(self.growth()),
            BiAction::GetMetrics => {
                if let Some(cached) = context.get_memory(METRICS_CACHE_KEY) {
                    return Ok(cached);
                }
                let metrics = Self::metrics();
                context.save_memory(METRICS_CACHE_KEY, metrics.clone(), Some(self.cache_ttl));
                Ok(metrics)
            }
        }
    }

    fn resources_used(&self) -> Vec<String> {
        vec!["financial_sample_data".to_string()]
    }

    fn format_voice_response(&self, response: &Response) -> Option<String> {
        if !response.success {
            return None;
        }
        let data = response.data.as_ref()?;
        let text = |value: &Value| value.as_str().unwrap_or_default().to_string();

        if let (Some(current), Some(total)) = (data.get("current"), data.get("total")) {
            let month = text(&current["month"]);
            let formatted = text(&current["formatted"]);
            let total = text(&total["formatted"]);

            if current.get("revenue").is_some() {
                return Some(format!(
                    "Current revenue for {month} is {formatted}. Total revenue is {total}."
                ));
            }
            if current.get("expenses").is_some() {
                return Some(format!(
                    "Current expenses for {month} are {formatted}. Total expenses are {total}."
                ));
            }
            if current.get("profit").is_some() {
                let margin = text(&current["margin"]);
                return Some(format!(
                    "Current profit for {month} is {formatted} with a margin of {margin}%. Total profit is {total}."
                ));
            }
        }

        if let Some(current) = data.get("current").filter(|c| c.get("growth").is_some()) {
            return Some(format!(
                "Growth rate for {} is {}. Average growth is {}. The trend is {}.",
                text(&current["month"]),
                text(&current["formatted"]),
                text(&data["average"]["formatted"]),
                text(&data["trend"]),
            ));
        }

        if let Some(month) = data.get("month").and_then(Value::as_str) {
            let formatted = &data["formatted"];
            return Some(format!(
                "For {month}: Revenue is {}, expenses are {}, profit is {} with {} growth.",
                text(&formatted["revenue"]),
                text(&formatted["expenses"]),
                text(&formatted["profit"]),
                text(&formatted["growth"]),
            ));
        }

        Some("Financial data retrieved successfully.".to_string())
    }
}
