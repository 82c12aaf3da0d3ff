pub mod alert;
pub mod ath;
