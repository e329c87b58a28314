pub mod portfolio;
pub mod price_resolution;
pub mod price_source;
pub mod valuation;

pub use portfolio::PortfolioService;
pub use price_resolution::PriceResolutionService;
pub use price_source::{CollectApiPriceSource, PriceSource};
pub use valuation::{GiftFailure, GiftValuationUpdater, RevaluationReport};
