mod cost_filter;
mod subscription;
mod year_month;

pub use cost_filter::*;
pub use subscription::*;
pub use year_month::*;
