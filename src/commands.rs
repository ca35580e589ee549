//! Command-line parsing
//!
//! With no subcommand the window opens on `/`. The other subcommands run the
//! same flow headless and print to stdout.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::backend::SearchParams;
use crate::screens::results::SortOrder;

#[derive(Debug, Parser)]
#[command(name = "rentscope", version, about = "Rent and gross-yield estimator")]
pub struct Cli {
    /// Estimation service address, e.g. http://localhost:8000
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Gui {
            route: String::from("/"),
        })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Open the window (default)
    Gui {
        /// Start route: `/` or `/results`; anything else opens `/`
        #[arg(long, default_value = "/")]
        route: String,
    },
    /// Print the quick average-rent estimate
    Estimate(CriteriaArgs),
    /// Print the full evaluation with the property table
    Evaluate {
        #[command(flatten)]
        criteria: CriteriaArgs,
        #[arg(long, value_enum, default_value_t = SortArg::Server)]
        sort: SortArg,
    },
    /// Turn a description into search criteria (printed as JSON)
    Parse {
        /// e.g. "2 bed in Miami under 400k"
        query: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct CriteriaArgs {
    #[arg(long, default_value = "")]
    pub area: String,
    #[arg(long, default_value_t = 200_000.0)]
    pub min_price: f64,
    #[arg(long, default_value_t = 500_000.0)]
    pub max_price: f64,
    #[arg(long, default_value_t = 2)]
    pub bedrooms: u32,
    #[arg(long, default_value_t = 600.0)]
    pub min_sqft: f64,
    #[arg(long, default_value_t = 1500.0)]
    pub max_sqft: f64,
}

impl From<CriteriaArgs> for SearchParams {
    fn from(args: CriteriaArgs) -> Self {
        Self {
            min_price: args.min_price,
            max_price: args.max_price,
            area: args.area,
            bedrooms: args.bedrooms,
            min_sqft: args.min_sqft,
            max_sqft: args.max_sqft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Server,
    Desc,
    Asc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Server => SortOrder::Server,
            SortArg::Desc => SortOrder::YieldDesc,
            SortArg::Asc => SortOrder::YieldAsc,
        }
    }
}
