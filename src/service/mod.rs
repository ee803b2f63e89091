pub mod fee_estimator;

pub use fee_estimator::FeeEstimator;
