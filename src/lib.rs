//! Проверки RNX UPDU по SNMP: разбор таблиц питания, датчиков, интерфейсов
//! и инвентаря, обнаружение сервисов, проверки по порогам и записи
//! инвентаря.

pub mod collector;
pub mod config;
pub mod decoder;
pub mod formatter;
pub mod host;
pub mod plugins;
pub mod snmp;
