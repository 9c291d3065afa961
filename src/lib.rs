pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

/// Build details shown in the page footer.
#[derive(Debug)]
pub struct VersionInfo {
    pub version: &'static str,
}

pub static VERSION_INFO: VersionInfo = VersionInfo {
    version: env!("CARGO_PKG_VERSION"),
};
