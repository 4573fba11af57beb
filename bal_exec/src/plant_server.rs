//! # Plant Server Module
//!
//! The plant (simulation or hardware bridge) connects to this server with a REQ socket and sends
//! one [`PlantReq`] per control tick. The executable computes the demands and answers with a
//! [`PlantRep`] before the plant steps, so each tick is a single atomic exchange.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::plant::{PlantReq, PlantRep},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the plant side of the networking.
pub struct PlantServer {
    /// REP socket which accepts state requests from the plant
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`PlantServer`]
#[derive(thiserror::Error, Debug)]
pub enum PlantServerError {
    #[error("Socket error: {0}")]
    SocketError(#[from] MonitoredSocketError),

    #[error("Could not recieve a request from the plant: {0}")]
    RecvError(zmq::Error),

    /// A message was recieved but could not be parsed. The plant is still waiting for a reply.
    #[error("Could not parse the plant request: {0}")]
    InvalidRequest(String),

    #[error("Could not send the reply to the plant: {0}")]
    SendError(zmq::Error),

    #[error("Could not serialize the reply: {0}")]
    SerializationError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlantServer {
    /// Create a new instance of the plant server.
    ///
    /// This function will not wait for the plant to connect before returning.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PlantServerError> {
        let socket_options = SocketOptions {
            bind: true,
            block_on_first_connect: false,
            linger: 1,
            recv_timeout: 200,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REP,
            socket_options,
            &params.plant_endpoint
        )?;

        Ok(Self {
            socket
        })
    }

    /// Wait for the next request from the plant.
    ///
    /// Returns `Ok(None)` if nothing arrived before the recieve timeout. After `Ok(Some(_))` or
    /// `Err(PlantServerError::InvalidRequest(_))` the caller MUST call [`PlantServer::send_reply`]
    /// before waiting for another request.
    pub fn get_request(&mut self) -> Result<Option<PlantReq>, PlantServerError> {
        let msg = match self.socket.recv_msg(0) {
            Ok(m) => m,
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(PlantServerError::RecvError(e))
        };

        let msg_str = msg.as_str()
            .ok_or_else(|| PlantServerError::InvalidRequest("request is not UTF-8".into()))?;

        serde_json::from_str(msg_str)
            .map(Some)
            .map_err(|e| PlantServerError::InvalidRequest(e.to_string()))
    }

    /// Send the reply for the last request.
    pub fn send_reply(&mut self, reply: &PlantRep) -> Result<(), PlantServerError> {
        let reply_str = serde_json::to_string(reply)
            .map_err(PlantServerError::SerializationError)?;

        self.socket.send(&reply_str, 0)
            .map_err(PlantServerError::SendError)
    }

    /// True if a plant is connected.
    pub fn connected(&self) -> bool {
        self.socket.connected()
    }
}
