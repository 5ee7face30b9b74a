mod api;
#[cfg(test)]
pub(crate) mod fake;
mod rest;

pub use api::RouterApi;
pub use rest::RestClient;
