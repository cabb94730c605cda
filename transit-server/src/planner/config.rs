//! Search configuration for the route planner.

use super::heuristic::HeuristicKind;

/// Error returned when a weight factor cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("weight factor must be a non-negative number, got {0}")]
pub struct InvalidWeight(pub f64);

/// Configuration parameters for route search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Multiplier on the heuristic term of the frontier priority.
    /// 0 gives uniform-cost search, 1 plain A*, above 1 a greedier
    /// search that may return suboptimal routes.
    pub weight_factor: f64,

    /// Heuristic used when routing over a transit network.
    pub heuristic: HeuristicKind,

    /// Give up after expanding this many nodes.
    /// `None` lets the search run until the frontier is exhausted.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(weight_factor: f64, heuristic: HeuristicKind, max_expansions: Option<usize>) -> Self {
        Self {
            weight_factor,
            heuristic,
            max_expansions,
        }
    }

    /// Replace the weight factor.
    pub fn with_weight(mut self, weight_factor: f64) -> Self {
        self.weight_factor = weight_factor;
        self
    }

    /// Replace the heuristic.
    pub fn with_heuristic(mut self, heuristic: HeuristicKind) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Set an expansion limit.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    /// Check the weight factor is usable.
    pub fn validate(&self) -> Result<(), InvalidWeight> {
        if self.weight_factor.is_finite() && self.weight_factor >= 0.0 {
            Ok(())
        } else {
            Err(InvalidWeight(self.weight_factor))
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            weight_factor: 1.0,
            heuristic: HeuristicKind::Manhattan,
            max_expansions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.weight_factor, 1.0);
        assert_eq!(config.heuristic, HeuristicKind::Manhattan);
        assert_eq!(config.max_expansions, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_config() {
        let config = SearchConfig::new(1.5, HeuristicKind::TravelTime, Some(500));

        assert_eq!(config.weight_factor, 1.5);
        assert_eq!(config.heuristic, HeuristicKind::TravelTime);
        assert_eq!(config.max_expansions, Some(500));
    }

    #[test]
    fn builder_setters() {
        let config = SearchConfig::default()
            .with_weight(0.0)
            .with_heuristic(HeuristicKind::Zero)
            .with_max_expansions(10);

        assert_eq!(config, SearchConfig::new(0.0, HeuristicKind::Zero, Some(10)));
    }

    #[test]
    fn validate_rejects_bad_weights() {
        assert!(SearchConfig::default().with_weight(0.0).validate().is_ok());
        assert!(SearchConfig::default().with_weight(3.0).validate().is_ok());

        assert_eq!(
            SearchConfig::default().with_weight(-0.1).validate(),
            Err(InvalidWeight(-0.1))
        );
        assert!(SearchConfig::default().with_weight(f64::NAN).validate().is_err());
        assert!(
            SearchConfig::default()
                .with_weight(f64::INFINITY)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn invalid_weight_display() {
        assert_eq!(
            InvalidWeight(-2.0).to_string(),
            "weight factor must be a non-negative number, got -2"
        );
    }
}
