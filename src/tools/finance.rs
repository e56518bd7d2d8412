//! Leaf calculator tools
//!
//! Single-expression financial utilities behind the uniform tool interface.

use serde_json::json;

use super::{require_f64, require_str, Tool};
use crate::error::PortalError;
use crate::models::{Bill, ToolInput, ToolOutput};
use crate::Result;

/// Static keyword lists for the expense classifier
const TRANSPORT_KEYWORDS: &[&str] = &["uber", "taxi", "flight", "bus", "transport"];
const GROCERY_KEYWORDS: &[&str] = &["grocery", "supermarket", "food", "restaurant"];
const ENTERTAINMENT_KEYWORDS: &[&str] = &["movie", "cinema", "concert", "netflix"];
const UTILITY_KEYWORDS: &[&str] = &["electricity", "water", "internet", "utility"];

fn contains_any(description: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| description.contains(kw))
}

/// Classify an expense description into a spending category by keyword.
pub fn classify_expense(description: &str) -> &'static str {
    let description = description.to_lowercase();

    if contains_any(&description, TRANSPORT_KEYWORDS) {
        "Transportation"
    } else if contains_any(&description, GROCERY_KEYWORDS) {
        "Groceries"
    } else if contains_any(&description, ENTERTAINMENT_KEYWORDS) {
        "Entertainment"
    } else if contains_any(&description, UTILITY_KEYWORDS) {
        "Utilities"
    } else {
        "Other"
    }
}

/// Check spending against a budget.
pub fn check_budget(spent: f64, budget: f64) -> String {
    if spent > budget {
        format!(
            "⚠️ You have overspent your budget by ${:.2}.",
            spent - budget
        )
    } else {
        format!(
            "✅ You are within your budget. You have ${:.2} remaining.",
            budget - spent
        )
    }
}

/// Suggest whether extra debt payments are affordable.
pub fn suggest_debt_payoff(budget: f64, monthly_payment: f64) -> &'static str {
    if budget > monthly_payment * 1.5 {
        "✅ You can consider making extra payments to reduce your debt faster."
    } else {
        "⚠️ Stick to your regular payment schedule for now."
    }
}

/// Simple percent return between an initial and final amount.
pub fn calculate_investment_return(initial_amount: f64, final_amount: f64) -> f64 {
    if initial_amount == 0.0 {
        return 0.0;
    }
    (final_amount - initial_amount) / initial_amount * 100.0
}

/// Average a list of per-investment returns into a one-line verdict.
pub fn analyze_portfolio(returns: &[f64]) -> String {
    let average_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };

    if average_return > 0.0 {
        format!(
            "📈 Your portfolio is performing well with an average return of {:.2}%.",
            average_return
        )
    } else {
        format!(
            "📉 Your portfolio is underperforming with an average return of {:.2}%.",
            average_return
        )
    }
}

/// List upcoming bills.
pub fn remind_upcoming_bills(bills: &[Bill]) -> String {
    if bills.is_empty() {
        return "You have no upcoming bills!".to_string();
    }

    let mut message = String::from("📋 Upcoming Bills:\n");
    for bill in bills {
        message.push_str(&format!("- {} due on {}\n", bill.name, bill.due_date));
    }
    message
}

pub struct ExpenseClassifierTool;

#[async_trait::async_trait]
impl Tool for ExpenseClassifierTool {
    fn name(&self) -> &'static str {
        "expense_classifier"
    }

    fn description(&self) -> &'static str {
        "Classify an expense description into a spending category"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let description = require_str(input, "description")?;
        let category = classify_expense(description);

        Ok(ToolOutput {
            success: true,
            data: json!({ "category": category }),
            error: None,
        })
    }
}

pub struct BudgetTrackerTool;

#[async_trait::async_trait]
impl Tool for BudgetTrackerTool {
    fn name(&self) -> &'static str {
        "budget_tracker"
    }

    fn description(&self) -> &'static str {
        "Check spending in a category against its budget"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let spent = require_f64(input, "spent")?;
        let budget = require_f64(input, "budget")?;

        Ok(ToolOutput {
            success: true,
            data: json!({ "message": check_budget(spent, budget) }),
            error: None,
        })
    }
}

pub struct BillReminderTool;

#[async_trait::async_trait]
impl Tool for BillReminderTool {
    fn name(&self) -> &'static str {
        "bill_reminder"
    }

    fn description(&self) -> &'static str {
        "List upcoming bills and their due dates"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let bills: Vec<Bill> = input
            .parameters
            .get("bills")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default();

        Ok(ToolOutput {
            success: true,
            data: json!({ "message": remind_upcoming_bills(&bills) }),
            error: None,
        })
    }
}

pub struct InvestmentReturnTool;

#[async_trait::async_trait]
impl Tool for InvestmentReturnTool {
    fn name(&self) -> &'static str {
        "investment_return_calculator"
    }

    fn description(&self) -> &'static str {
        "Calculate the simple percent return between two amounts"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let initial = require_f64(input, "initial_amount")?;
        let final_amount = require_f64(input, "final_amount")?;
        let return_pct = calculate_investment_return(initial, final_amount);

        Ok(ToolOutput {
            success: true,
            data: json!({ "return_pct": return_pct }),
            error: None,
        })
    }
}

pub struct PortfolioAnalyzerTool;

#[async_trait::async_trait]
impl Tool for PortfolioAnalyzerTool {
    fn name(&self) -> &'static str {
        "portfolio_analyzer"
    }

    fn description(&self) -> &'static str {
        "Average individual investment returns into a portfolio verdict"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let returns: Vec<f64> = input
            .parameters
            .get("returns")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_f64()).collect())
            .ok_or_else(|| {
                PortalError::InvalidToolInput(
                    "Expected numeric array 'returns' in tool_input".to_string(),
                )
            })?;

        Ok(ToolOutput {
            success: true,
            data: json!({ "message": analyze_portfolio(&returns) }),
            error: None,
        })
    }
}

pub struct DebtPayoffTool;

#[async_trait::async_trait]
impl Tool for DebtPayoffTool {
    fn name(&self) -> &'static str {
        "debt_payoff_optimizer"
    }

    fn description(&self) -> &'static str {
        "Suggest whether extra debt payments fit the available budget"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let budget = require_f64(input, "budget")?;
        let monthly_payment = require_f64(input, "monthly_payment")?;

        Ok(ToolOutput {
            success: true,
            data: json!({ "suggestion": suggest_debt_payoff(budget, monthly_payment) }),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_classify_expense_categories() {
        assert_eq!(classify_expense("Uber to the airport"), "Transportation");
        assert_eq!(classify_expense("weekly SUPERMARKET run"), "Groceries");
        assert_eq!(classify_expense("netflix subscription"), "Entertainment");
        assert_eq!(classify_expense("electricity for May"), "Utilities");
        assert_eq!(classify_expense("new couch"), "Other");
    }

    #[test]
    fn test_check_budget_overspent() {
        let message = check_budget(120.0, 100.0);
        assert!(message.contains("overspent"));
        assert!(message.contains("$20.00"));
    }

    #[test]
    fn test_check_budget_within() {
        let message = check_budget(80.0, 100.0);
        assert!(message.contains("within your budget"));
        assert!(message.contains("$20.00"));
    }

    #[test]
    fn test_debt_payoff_threshold() {
        assert!(suggest_debt_payoff(400.0, 200.0).contains("extra payments"));
        assert!(suggest_debt_payoff(300.0, 200.0).contains("regular payment schedule"));
    }

    #[test]
    fn test_investment_return() {
        assert_eq!(calculate_investment_return(100.0, 150.0), 50.0);
        assert_eq!(calculate_investment_return(200.0, 150.0), -25.0);
        assert_eq!(calculate_investment_return(0.0, 150.0), 0.0);
    }

    #[test]
    fn test_analyze_portfolio() {
        assert!(analyze_portfolio(&[10.0, 20.0]).contains("15.00%"));
        assert!(analyze_portfolio(&[-10.0, -20.0]).contains("underperforming"));
        assert!(analyze_portfolio(&[]).contains("0.00%"));
    }

    #[test]
    fn test_remind_upcoming_bills() {
        assert_eq!(remind_upcoming_bills(&[]), "You have no upcoming bills!");

        let bills = vec![Bill {
            name: "Electricity Bill".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        }];
        let message = remind_upcoming_bills(&bills);
        assert!(message.contains("Electricity Bill"));
        assert!(message.contains("2025-05-10"));
    }

    #[tokio::test]
    async fn test_budget_tracker_tool() {
        let tool = BudgetTrackerTool;
        let input = ToolInput {
            tool_name: "budget_tracker".to_string(),
            parameters: serde_json::json!({"spent": 120.0, "budget": 100.0}),
        };

        let output = tool.execute(&input).await.unwrap();
        assert!(output.success);
        assert!(output.data["message"]
            .as_str()
            .unwrap()
            .contains("overspent your budget by $20.00"));
    }

    #[tokio::test]
    async fn test_budget_tracker_tool_rejects_missing_params() {
        let tool = BudgetTrackerTool;
        let input = ToolInput {
            tool_name: "budget_tracker".to_string(),
            parameters: serde_json::json!({"spent": 120.0}),
        };

        assert!(tool.execute(&input).await.is_err());
    }

    #[tokio::test]
    async fn test_portfolio_analyzer_tool() {
        let tool = PortfolioAnalyzerTool;
        let input = ToolInput {
            tool_name: "portfolio_analyzer".to_string(),
            parameters: serde_json::json!({"returns": [5.0, 15.0]}),
        };

        let output = tool.execute(&input).await.unwrap();
        assert!(output.data["message"].as_str().unwrap().contains("10.00%"));
    }
}
