//! # TM Server

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use comms_if::{
    eqpt::plant::SwerveDems,
    net::{MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions, zmq}
};

use crate::ctrl_loop;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry server
pub struct TmServer {
    socket: MonitoredSocket
}

/// Telemetry packet that is output by the server once per tick.
#[derive(Debug, Serialize)]
pub struct TmPacket<'a> {
    pub time_s: f64,

    pub held: bool,

    pub dems: &'a SwerveDems,

    pub status_rpt: &'a ctrl_loop::StatusReport,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not send telemetry: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmServer {
    /// Create a new instance of the TM Server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, TmServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.tm_endpoint
        ).map_err(TmServerError::SocketError)?;

        Ok(Self {
            socket
        })
    }

    /// Publish a telemetry packet.
    pub fn send(&mut self, packet: &TmPacket) -> Result<(), TmServerError> {
        let packet_string = serde_json::to_string(packet)
            .map_err(TmServerError::SerializationError)?;

        self.socket.send(&packet_string, 0)
            .map_err(TmServerError::SendError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_packet_json() {
        let dems = SwerveDems::neutral([0.5, -0.5]);
        let report = ctrl_loop::StatusReport::default();

        let packet = TmPacket {
            time_s: 1.25,
            held: true,
            dems: &dems,
            status_rpt: &report,
        };

        let json: serde_json::Value = serde_json::to_value(&packet).unwrap();

        assert_eq!(json["time_s"], 1.25);
        assert_eq!(json["held"], true);
        assert_eq!(json["dems"]["str_abs_pos_rad"][1], -0.5);
        assert_eq!(json["status_rpt"]["first_tick"], false);
        assert_eq!(json["status_rpt"]["loco"]["gated"][0], false);
    }
}
