use crate::config::RouteConnectionsConfig;
use chrono::{DateTime, Utc};
use mrx_common::types::RouteConnection;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Per connection metric families, each gated by its
/// own flag in [`RouteConnectionsConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionFamily {
    ByteFromServer,
    ByteToServer,
    TimeStarted,
    TimeConnectedToServer,
    TimeLastSentToServer,
    TimeLastReceivedFromServer,
}

impl ConnectionFamily {
    /// Metric name without the namespace prefix
    pub fn metric_name(self) -> String {
        let suffix: &'static str = self.into();
        format!("route_connections_{suffix}")
    }

    pub fn help(self) -> &'static str {
        match self {
            ConnectionFamily::ByteFromServer => "Bytes received from the server on a route connection",
            ConnectionFamily::ByteToServer => "Bytes sent to the server on a route connection",
            ConnectionFamily::TimeStarted => "Connection start time in unix milliseconds",
            ConnectionFamily::TimeConnectedToServer => {
                "Time the connection reached the server in unix milliseconds"
            }
            ConnectionFamily::TimeLastSentToServer => {
                "Time data was last sent to the server in unix milliseconds"
            }
            ConnectionFamily::TimeLastReceivedFromServer => {
                "Time data was last received from the server in unix milliseconds"
            }
        }
    }

    pub fn is_enabled(self, flags: &RouteConnectionsConfig) -> bool {
        match self {
            ConnectionFamily::ByteFromServer => flags.byte_from_server,
            ConnectionFamily::ByteToServer => flags.byte_to_server,
            ConnectionFamily::TimeStarted => flags.time_started,
            ConnectionFamily::TimeConnectedToServer => flags.time_connected_to_server,
            ConnectionFamily::TimeLastSentToServer => flags.time_last_sent_to_server,
            ConnectionFamily::TimeLastReceivedFromServer => flags.time_last_received_from_server,
        }
    }

    /// The families switched on by `flags`, in declaration order
    pub fn enabled(flags: &RouteConnectionsConfig) -> Vec<ConnectionFamily> {
        ConnectionFamily::iter()
            .filter(|f| f.is_enabled(flags))
            .collect()
    }

    /// Live value of this family for one connection. Byte
    /// counters are raw, timestamps are whole seconds scaled
    /// to milliseconds and a missing timestamp reads as 0
    pub fn value(self, conn: &RouteConnection) -> f64 {
        match self {
            ConnectionFamily::ByteFromServer => conn.bytes_from_server as f64,
            ConnectionFamily::ByteToServer => conn.bytes_to_server as f64,
            ConnectionFamily::TimeStarted => unix_millis(conn.time_started),
            ConnectionFamily::TimeConnectedToServer => unix_millis(conn.time_connected_to_server),
            ConnectionFamily::TimeLastSentToServer => unix_millis(conn.time_last_sent_to_server),
            ConnectionFamily::TimeLastReceivedFromServer => {
                unix_millis(conn.time_last_received_from_server)
            }
        }
    }
}

fn unix_millis(ts: Option<DateTime<Utc>>) -> f64 {
    ts.map(|t| (t.timestamp() * 1000) as f64).unwrap_or(0.0)
}
