pub mod audit;
pub mod market_data;
pub mod notify;

#[cfg(test)]
mod test_support;
