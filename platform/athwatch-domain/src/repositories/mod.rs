pub mod audit_log;
pub mod market_data;
pub mod notifier;
