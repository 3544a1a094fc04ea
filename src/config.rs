use serde::{Deserialize, Serialize};

/// Options for `Automaton::simplify_with`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    /// Drop sequences whose log weight, minus the log normalizer of the automaton, is
    /// below this value. `None` keeps everything.
    pub prune_log_weight_threshold: Option<f64>,
}

impl SimplifyConfig {
    pub fn with_pruning(threshold: f64) -> Self {
        Self {
            prune_log_weight_threshold: Some(threshold),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: SimplifyConfig =
            serde_json::from_str(r#"{"prune_log_weight_threshold": -4.5}"#).unwrap();
        assert_eq!(config, SimplifyConfig::with_pruning(-4.5));

        let empty: SimplifyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, SimplifyConfig::default());
    }
}
