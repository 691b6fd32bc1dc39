// Domain layer: records and ports. No knowledge of workbook files or HTTP.

pub mod model;
pub mod ports;
