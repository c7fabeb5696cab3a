pub mod monitor_service;
pub mod trading_service;
