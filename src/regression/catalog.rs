//! Built-in Regression Catalog
//!
//! Explicit registration of every regression algorithm shipped with the harness.
//! Each entry pairs an identity with a factory producing its descriptor.
//!
//! # Algorithms
//!
//! ## Baseline
//! - `BasicTemplateAlgorithm` - buys and holds a single equity
//! - `SimpleMovingAverageAlgorithm` - fast/slow SMA crossover
//! - `WarmUpHistoryRegressionAlgorithm` - warm-up via history requests (counts non-deterministic)
//!
//! ## Environment shaping
//! - `OptionChainConsistencyRegressionAlgorithm` - needs raised subscription limits
//! - `TrainingOnDataRegressionAlgorithm` - drains a one-token bucket while training
//! - `TrainingInitializeRegressionAlgorithm` - exceeds a shrunken time-loop budget
//!
//! ## Expected failures
//! - `OnOrderEventExceptionRegression` - throws from the order event handler
//! - `WarmUpAfterInitializeRegression` - calls warm-up after initialization
//! - `LiquidateOnMarginCallRegression` - is liquidated on a margin call
//!
//! ## Not runnable here
//! - `RemoteCustomDataUniverseAlgorithm` - needs a remote data source
//! - `BasicTemplateFSharpAlgorithm` - F# only, outside the default allow-list

use crate::regression::descriptor::{AlgorithmDescriptor, AlphaStatistics, NON_DETERMINISTIC};
use crate::regression::error::DescriptorError;
use crate::regression::language::Language;
use crate::regression::registry::DescriptorFactory;

/// Every built-in registration, in declaration order.
pub const BUILTIN: &[(&str, DescriptorFactory)] = &[
    ("BasicTemplateAlgorithm", basic_template),
    ("SimpleMovingAverageAlgorithm", simple_moving_average),
    ("WarmUpHistoryRegressionAlgorithm", warm_up_history),
    ("OptionChainConsistencyRegressionAlgorithm", option_chain_consistency),
    ("TrainingOnDataRegressionAlgorithm", training_on_data),
    ("TrainingInitializeRegressionAlgorithm", training_initialize),
    ("OnOrderEventExceptionRegression", on_order_event_exception),
    ("WarmUpAfterInitializeRegression", warm_up_after_initialize),
    ("LiquidateOnMarginCallRegression", liquidate_on_margin_call),
    ("RemoteCustomDataUniverseAlgorithm", remote_custom_data_universe),
    ("BasicTemplateFSharpAlgorithm", basic_template_fsharp),
];

const BOTH: [Language; 2] = [Language::CSharp, Language::Python];

fn no_trades(descriptor: AlgorithmDescriptor) -> AlgorithmDescriptor {
    descriptor
        .statistic("Total Trades", "0")
        .statistic("Net Profit", "0%")
        .statistic("Drawdown", "0%")
        .statistic("Sharpe Ratio", "0")
}

fn basic_template() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("BasicTemplateAlgorithm")
        .languages(BOTH)
        .statistic("Total Trades", "1")
        .statistic("Average Win", "0%")
        .statistic("Average Loss", "0%")
        .statistic("Compounding Annual Return", "271.453%")
        .statistic("Drawdown", "2.200%")
        .statistic("Net Profit", "1.692%")
        .statistic("Sharpe Ratio", "8.888")
        .statistic("Total Fees", "$3.44")
        .alpha_statistics(
            AlphaStatistics::default()
                .with("Total Insights Generated", "0")
                .with("Total Insights Closed", "0"),
        )
        .data_points(3943)
        .history_data_points(0))
}

fn simple_moving_average() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("SimpleMovingAverageAlgorithm")
        .languages(BOTH)
        .statistic("Total Trades", "12")
        .statistic("Average Win", "0.91%")
        .statistic("Average Loss", "-0.44%")
        .statistic("Drawdown", "3.100%")
        .statistic("Net Profit", "2.457%")
        .statistic("Win Rate", "50%")
        .data_points(7843)
        .history_data_points(120))
}

fn warm_up_history() -> Result<AlgorithmDescriptor, DescriptorError> {
    // Warm-up history depends on the available data snapshot
    Ok(no_trades(AlgorithmDescriptor::new("WarmUpHistoryRegressionAlgorithm"))
        .languages(BOTH)
        .data_points(NON_DETERMINISTIC)
        .history_data_points(NON_DETERMINISTIC as i32))
}

fn option_chain_consistency() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("OptionChainConsistencyRegressionAlgorithm")
        .languages(BOTH)
        .statistic("Total Trades", "2")
        .statistic("Net Profit", "-0.298%")
        .statistic("Drawdown", "0.300%")
        .statistic("Total Fees", "$2.00")
        .data_points(493_131)
        .history_data_points(0))
}

fn training_on_data() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(no_trades(AlgorithmDescriptor::new("TrainingOnDataRegressionAlgorithm"))
        .languages(BOTH)
        .data_points(NON_DETERMINISTIC)
        .history_data_points(0))
}

fn training_initialize() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(no_trades(AlgorithmDescriptor::new("TrainingInitializeRegressionAlgorithm"))
        .languages(BOTH)
        .data_points(NON_DETERMINISTIC)
        .history_data_points(0))
}

fn on_order_event_exception() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("OnOrderEventExceptionRegression")
        .languages(BOTH)
        .statistic("Total Trades", "1")
        .data_points(48)
        .history_data_points(0))
}

fn warm_up_after_initialize() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(no_trades(AlgorithmDescriptor::new("WarmUpAfterInitializeRegression"))
        .languages(BOTH)
        .data_points(0)
        .history_data_points(0))
}

fn liquidate_on_margin_call() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("LiquidateOnMarginCallRegression")
        .languages([Language::CSharp])
        .statistic("Total Trades", "3")
        .statistic("Net Profit", "-98.512%")
        .data_points(2346)
        .history_data_points(0))
}

fn remote_custom_data_universe() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("RemoteCustomDataUniverseAlgorithm")
        .can_run_locally(false)
        .languages(BOTH))
}

fn basic_template_fsharp() -> Result<AlgorithmDescriptor, DescriptorError> {
    Ok(AlgorithmDescriptor::new("BasicTemplateFSharpAlgorithm")
        .languages([Language::FSharp])
        .statistic("Total Trades", "1")
        .data_points(3943)
        .history_data_points(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_every_builtin_factory_matches_its_identity() {
        for (identity, factory) in BUILTIN {
            let descriptor = factory().unwrap();
            assert_eq!(descriptor.identity(), *identity);
            descriptor.validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_identities_are_unique() {
        let identities: BTreeSet<&str> = BUILTIN.iter().map(|(identity, _)| *identity).collect();
        assert_eq!(identities.len(), BUILTIN.len());
    }
}
