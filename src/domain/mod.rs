// Domain layer: 資料模型與 ports (介面)

pub mod model;
pub mod ports;
