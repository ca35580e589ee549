//! Terminal rendition of the search flow

use std::fmt::Write as _;

use thiserror::Error;

use crate::backend::{ApiError, BackendClient, EvaluationResponse, RentOnlyResponse, SearchParams};
use crate::commands::Command;
use crate::screens::results::{criteria_line, sorted, top_yield_candidate, SortOrder};
use crate::screens::search::{validate, ValidationError};
use crate::ui::format::{format_currency, format_number, format_yield};

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("could not encode criteria: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("the window can only be opened from the graphical entry point")]
    NotHeadless,
}

/// Runs one headless command, printing its report to stdout
pub async fn run(backend: &BackendClient, command: Command) -> Result<(), HeadlessError> {
    match command {
        Command::Estimate(criteria) => {
            let params = SearchParams::from(criteria);
            validate(&params)?;
            let estimate = backend.estimate_rent(&params).await?;
            print!("{}", render_estimate(&params, &estimate));
        }
        Command::Evaluate { criteria, sort } => {
            let params = SearchParams::from(criteria);
            validate(&params)?;

            let estimate = backend.estimate_rent(&params).await?;
            print!("{}", render_estimate(&params, &estimate));

            let evaluation = backend.evaluate(&params).await?;
            print!("{}", render_evaluation(&evaluation, sort.into()));
        }
        Command::Parse { query } => {
            let params = backend.parse_query(&query).await?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Command::Gui { .. } => return Err(HeadlessError::NotHeadless),
    }
    Ok(())
}

pub fn render_estimate(params: &SearchParams, estimate: &RentOnlyResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", criteria_line(params));
    let _ = writeln!(
        out,
        "Preliminary average rent: {} / month ({})",
        format_currency(estimate.average_rent),
        estimate.currency
    );
    if !estimate.analysis.trim().is_empty() {
        let _ = writeln!(out, "{}", estimate.analysis.trim());
    }
    out
}

pub fn render_evaluation(evaluation: &EvaluationResponse, order: SortOrder) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Average rent: {} / month ({})",
        format_currency(evaluation.average_rent),
        evaluation.currency
    );

    if evaluation.properties.is_empty() {
        let _ = writeln!(out, "No sample properties were returned for this search.");
        return out;
    }

    if let Some(top) = top_yield_candidate(&evaluation.properties) {
        let _ = writeln!(
            out,
            "Top yield candidate: {} ({})",
            top.address,
            format_yield(top.gross_yield)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<36} {:>12} {:>5} {:>7} {:>10} {:>8}  Listing",
        "Address", "Price", "Beds", "Sqft", "Est. rent", "Yield"
    );
    for property in sorted(&evaluation.properties, order) {
        let _ = writeln!(
            out,
            "{:<36} {:>12} {:>5} {:>7} {:>10} {:>8}  {}",
            truncate(&property.address, 36),
            format_currency(property.price),
            property.bedrooms,
            format_number(property.sqft),
            format_currency(property.estimated_rent),
            format_yield(property.gross_yield),
            property.listing_url().unwrap_or("-"),
        );
    }
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PropertyResult;
    use crate::commands::CriteriaArgs;

    fn property(id: &str, address: &str, gross_yield: f64, url: &str) -> PropertyResult {
        PropertyResult {
            id: id.to_string(),
            address: address.to_string(),
            price: 280_000.0,
            bedrooms: 2,
            sqft: 1_050.0,
            estimated_rent: 2_100.0,
            gross_yield,
            url: url.to_string(),
        }
    }

    #[test]
    fn test_render_estimate() {
        let params = SearchParams {
            area: "Tulsa, OK".to_string(),
            ..SearchParams::default()
        };
        let estimate = RentOnlyResponse {
            average_rent: 2500.0,
            currency: "USD".to_string(),
            analysis: "Rents are flat year over year.".to_string(),
        };
        let out = render_estimate(&params, &estimate);
        assert!(out.contains("Tulsa, OK · 2 bd · $200,000 – $500,000 · 600 – 1,500 sqft"));
        assert!(out.contains("Preliminary average rent: $2,500 / month (USD)"));
        assert!(out.contains("Rents are flat year over year."));
    }

    #[test]
    fn test_render_evaluation_table() {
        let evaluation = EvaluationResponse {
            average_rent: 2650.0,
            currency: "USD".to_string(),
            properties: vec![
                property("a", "1 Elm St", 0.05, ""),
                property("b", "2 Oak Ave", 0.09, "https://example.com/b"),
            ],
        };
        let out = render_evaluation(&evaluation, SortOrder::YieldDesc);
        assert!(out.contains("Average rent: $2,650 / month"));
        assert!(out.contains("Top yield candidate: 2 Oak Ave (9.00%)"));

        let oak = out.find("2 Oak Ave  ").unwrap();
        let elm = out.find("1 Elm St").unwrap();
        assert!(oak < elm);
        assert!(out.contains("https://example.com/b"));
    }

    #[test]
    fn test_render_empty_evaluation() {
        let evaluation = EvaluationResponse {
            average_rent: 1900.0,
            currency: "USD".to_string(),
            properties: Vec::new(),
        };
        let out = render_evaluation(&evaluation, SortOrder::Server);
        assert!(out.contains("No sample properties"));
        assert!(!out.contains("Top yield candidate"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("1234567890", 5), "1234…");
    }

    #[tokio::test]
    async fn test_invalid_criteria_skip_network() {
        // Nothing listens here; reaching the network would fail differently
        let backend = BackendClient::new("http://127.0.0.1:9");
        let criteria = CriteriaArgs {
            area: "Tulsa".to_string(),
            min_price: 600_000.0,
            max_price: 500_000.0,
            bedrooms: 2,
            min_sqft: 600.0,
            max_sqft: 1500.0,
        };
        let err = run(&backend, Command::Estimate(criteria)).await.unwrap_err();
        assert!(matches!(err, HeadlessError::Validation(ValidationError::PriceRange)));
        assert_eq!(err.to_string(), "Min price cannot be greater than max price.");
    }
}
