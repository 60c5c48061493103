pub mod amount;
pub mod configure;
pub mod erc20;
pub mod errors;
pub mod logger;
pub mod transfer;
