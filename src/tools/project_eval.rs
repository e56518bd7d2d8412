//! Project cash-flow and NPV engine
//!
//! Deterministic evaluation of extracted projects: expand each project into
//! its per-period net cash flows, discount them into an NPV, and rank a
//! batch. The LLM is not involved here.

use serde_json::json;
use std::cmp::Ordering;

use super::Tool;
use crate::error::PortalError;
use crate::models::{EvaluatedProject, Project, ToolInput, ToolOutput};
use crate::Result;

/// Default discount rate when the user does not supply one.
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.10;

/// Expand a project into one net cash flow per period (1-based).
///
/// `income(t) = base_income * (1 + growth_rate)^(t-1)`, minus recurring
/// expenses, minus any unexpected cost registered for exactly period `t`.
pub fn build_cash_flows(project: &Project) -> Vec<f64> {
    let mut cash_flows = Vec::with_capacity(project.periods as usize);

    for period in 1..=project.periods {
        let income = project.base_income * (1.0 + project.growth_rate).powi(period as i32 - 1);
        let mut net_cash_flow = income - project.expenses;

        if let Some(cost) = project.unexpected_costs.get(&period) {
            net_cash_flow -= cost;
        }

        cash_flows.push(net_cash_flow);
    }

    cash_flows
}

/// Net present value of a cash-flow sequence against an upfront investment.
pub fn calculate_project_npv(initial_investment: f64, cash_flows: &[f64], discount_rate: f64) -> f64 {
    let mut npv = -initial_investment;

    for (t, cash_flow) in cash_flows.iter().enumerate() {
        npv += cash_flow / (1.0 + discount_rate).powi(t as i32 + 1);
    }

    npv
}

/// Evaluate a batch under one discount rate and rank it by NPV descending.
/// The sort is stable: ties keep their extraction order.
pub fn evaluate_projects(projects: &[Project], discount_rate: f64) -> Vec<EvaluatedProject> {
    let mut evaluated: Vec<EvaluatedProject> = projects
        .iter()
        .map(|project| {
            let cash_flows = build_cash_flows(project);
            let npv = calculate_project_npv(project.initial_investment, &cash_flows, discount_rate);
            EvaluatedProject {
                name: project.name.clone(),
                npv,
                cash_flows,
            }
        })
        .collect();

    evaluated.sort_by(|a, b| b.npv.partial_cmp(&a.npv).unwrap_or(Ordering::Equal));
    evaluated
}

/// Render a period ↔ cash-flow table for console display.
pub fn build_cash_flow_table(cash_flows: &[f64]) -> String {
    let mut table = String::from("Period | Cash Flow\n-------|----------\n");

    for (i, flow) in cash_flows.iter().enumerate() {
        table.push_str(&format!("{:^7}| ${:.2}\n", i + 1, flow));
    }

    table
}

/// NPV evaluation behind the uniform tool interface.
/// Parameters: `{ "projects": [...], "discount_rate": 0.10 }`.
pub struct ProjectNpvTool;

#[async_trait::async_trait]
impl Tool for ProjectNpvTool {
    fn name(&self) -> &'static str {
        "project_npv_calculator"
    }

    fn description(&self) -> &'static str {
        "Evaluate projects by net present value and rank them"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let projects: Vec<Project> = input
            .parameters
            .get("projects")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| {
                PortalError::InvalidToolInput("Expected 'projects' in tool_input".to_string())
            })?;

        let discount_rate = input
            .parameters
            .get("discount_rate")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_DISCOUNT_RATE);

        let ranked = evaluate_projects(&projects, discount_rate);

        Ok(ToolOutput {
            success: true,
            data: json!({ "ranked_projects": ranked }),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn project(name: &str, initial: f64, periods: u32, base_income: f64) -> Project {
        Project {
            name: name.to_string(),
            initial_investment: initial,
            periods,
            base_income,
            growth_rate: 0.0,
            expenses: 0.0,
            unexpected_costs: BTreeMap::new(),
        }
    }

    #[test]
    fn test_npv_matches_formula() {
        let flows = [600.0, 600.0];
        let npv = calculate_project_npv(1000.0, &flows, 0.10);

        let expected = -1000.0 + 600.0 / 1.1 + 600.0 / 1.1_f64.powi(2);
        assert!((npv - expected).abs() < 1e-9);
        assert!((npv - 41.32).abs() < 0.005);
    }

    #[test]
    fn test_npv_zero_flows_zero_rate() {
        let flows = [0.0, 0.0, 0.0];
        assert_eq!(calculate_project_npv(750.0, &flows, 0.0), -750.0);
    }

    #[test]
    fn test_cash_flow_length_matches_periods() {
        let p = project("Kiosk", 100.0, 7, 50.0);
        assert_eq!(build_cash_flows(&p).len(), 7);
    }

    #[test]
    fn test_zero_growth_yields_constant_income() {
        let p = project("Stand", 100.0, 5, 80.0);
        let flows = build_cash_flows(&p);
        assert!(flows.iter().all(|&f| f == 80.0));
    }

    #[test]
    fn test_growth_compounds_per_period() {
        let mut p = project("Shop", 100.0, 3, 100.0);
        p.growth_rate = 0.10;
        let flows = build_cash_flows(&p);

        assert!((flows[0] - 100.0).abs() < 1e-9);
        assert!((flows[1] - 110.0).abs() < 1e-9);
        assert!((flows[2] - 121.0).abs() < 1e-9);
    }

    #[test]
    fn test_unexpected_cost_hits_only_its_period() {
        let baseline = project("Truck", 500.0, 4, 200.0);
        let mut with_cost = baseline.clone();
        with_cost.unexpected_costs.insert(3, 75.0);

        let base_flows = build_cash_flows(&baseline);
        let cost_flows = build_cash_flows(&with_cost);

        for t in 0..4 {
            if t == 2 {
                assert_eq!(cost_flows[t], base_flows[t] - 75.0);
            } else {
                assert_eq!(cost_flows[t], base_flows[t]);
            }
        }
    }

    #[test]
    fn test_ranking_is_stable_descending() {
        // NPVs [5, 20, 20, -3] for A, B, C, D must rank as B, C, A, D.
        // With rate 0 and one period, NPV = base_income - initial.
        let projects = vec![
            project("A", 0.0, 1, 5.0),
            project("B", 0.0, 1, 20.0),
            project("C", 0.0, 1, 20.0),
            project("D", 3.0, 1, 0.0),
        ];

        let ranked = evaluate_projects(&projects, 0.0);
        let order: Vec<&str> = ranked.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_cash_flow_table_lists_each_period() {
        let table = build_cash_flow_table(&[600.0, 550.25]);

        assert!(table.starts_with("Period | Cash Flow"));
        assert!(table.contains("$600.00"));
        assert!(table.contains("$550.25"));
        assert_eq!(table.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_project_npv_tool() {
        let tool = ProjectNpvTool;
        let input = ToolInput {
            tool_name: "project_npv_calculator".to_string(),
            parameters: serde_json::json!({
                "projects": [{
                    "name": "Cafe",
                    "initial_investment": 1000.0,
                    "periods": 2,
                    "base_income": 600.0
                }],
                "discount_rate": 0.10
            }),
        };

        let output = tool.execute(&input).await.unwrap();
        let ranked = output.data["ranked_projects"].as_array().unwrap();
        assert_eq!(ranked.len(), 1);

        let npv = ranked[0]["npv"].as_f64().unwrap();
        assert!((npv - 41.32).abs() < 0.005);
        assert_eq!(ranked[0]["cash_flows"], serde_json::json!([600.0, 600.0]));
    }

    #[tokio::test]
    async fn test_project_npv_tool_defaults_discount_rate() {
        let tool = ProjectNpvTool;
        let input = ToolInput {
            tool_name: "project_npv_calculator".to_string(),
            parameters: serde_json::json!({
                "projects": [{
                    "name": "Cafe",
                    "initial_investment": 0.0,
                    "periods": 1,
                    "base_income": 110.0
                }]
            }),
        };

        let output = tool.execute(&input).await.unwrap();
        let npv = output.data["ranked_projects"][0]["npv"].as_f64().unwrap();
        assert!((npv - 100.0).abs() < 1e-9);
    }
}
