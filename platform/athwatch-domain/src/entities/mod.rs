pub mod alert_policy;
