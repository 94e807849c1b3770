//! Configuration module

mod site;

pub use site::ConfigError;
pub use site::NavLink;
pub use site::SiteConfig;
