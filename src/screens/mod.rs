//! The two application screens

pub mod results;
pub mod search;

use crate::backend::SearchParams;

/// State carried from the search form to the results screen
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
    pub search_params: SearchParams,
    /// Preliminary estimate, shown until the full evaluation arrives
    pub initial_average_rent: Option<f64>,
    pub market_analysis: Option<String>,
}
