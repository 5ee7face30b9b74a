mod connection;
mod registry;
mod server;

pub use connection::ConnectionFamily;
pub use registry::ExporterMetrics;
pub use server::MetricsServer;
