mod cancellation;
mod subscription_service;

pub use cancellation::*;
pub use subscription_service::*;
