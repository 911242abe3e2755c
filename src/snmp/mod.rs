pub mod catalog;
pub mod device_profiles;
pub mod oid;

pub use catalog::{ColumnKind, ColumnSpec, ParsePolicy, SnmpSection, TableSchema};
pub use device_profiles::{DeviceDetector, DeviceInfo, Detect, RNX_UPDU_DETECT};
pub use oid::{SYS_DESCR, column_oid, normalize_oid, parse_oid};
