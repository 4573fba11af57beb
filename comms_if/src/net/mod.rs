//! # Network Module
//!
//! This module provides networking abstractions over ZMQ, which carries both the plant exchange
//! and the telemetry stream.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{sync::{Arc, atomic::{AtomicBool, AtomicUsize}, atomic::Ordering}, thread};
use log::{debug, warn};
use serde::Deserialize;
use zmq::{Socket, Context, SocketType, SocketEvent};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| MonitoredSocketError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Number of monitors that are registered. Used to provide unique IDs for each mointor endpoint.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network endpoints, loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint the plant request/reply socket binds to, e.g. `"tcp://*:5556"`.
    pub plant_endpoint: String,

    /// Endpoint the telemetry publisher binds to.
    pub tm_endpoint: String,
}

/// A zmq socket which is monitored providing additional information.
///
/// A background thread is run in order to monitor activity on the socket and update visible
/// information to the user. Currently this is only whether or not the socket has a peer.
pub struct MonitoredSocket {
    socket: Socket,

    join_handle: Option<thread::JoinHandle<()>>,

    shutdown: Arc<AtomicBool>,

    connected: Arc<AtomicBool>
}

/// Represents options which can be set on a monitored socket.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
pub struct SocketOptions {

    /// Indicates if the socket should bind itself to the endpoint. Servers should have this value
    /// set as `true`, clients should have it set as `false`.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// If true the `MonitoredSocket::new()` function will block until the socket is connected, or
    /// until the connect_timeout elapses. If the timeout elapses this function will return a
    /// `MonitoredSocketError::CouldNotConnect` error.
    ///
    /// The default value is `true`.
    pub block_on_first_connect: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RECONNECT_IVL`: Set reconnection interval
    pub reconnect_ivl: i32,

    /// `ZMQ_CONNECT_TIMEOUT`: Set `connect()` timeout
    pub connect_timeout: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_HEARTBEAT_IVL`: Set interval between sending ZMTP heartbeats
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`: Set timeout for ZMTP heartbeats
    pub heartbeat_timeout: i32,

    /// `ZMQ_HEARTBEAT_TTL`: Set the TTL (time to live) value for ZMTP heartbeats
    pub heartbeat_ttl: i32
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not connect the socket: {0:?}")]
    CouldNotConnect(Option<zmq::Error>),

    #[error("Could not read event from monitor socket: {0}")]
    EventReadError(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create a new monitored socket.
    ///
    /// ## Arguments
    /// - `ctx`: the zmq context which will be used to create the socket
    /// - `socket_type`: the type of zmq socket to create
    /// - `socket_options`: a [`SocketOptions`] struct specifying how to configure the socket
    /// - `endpoint`: a zmq endpoint string, such as `"tcp://*:5556"`
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        socket_options: SocketOptions,
        endpoint: &str
    ) -> Result<Self, MonitoredSocketError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let connected = Arc::new(AtomicBool::new(false));

        let socket = ctx.socket(socket_type)
            .map_err(MonitoredSocketError::CreateSocketError)?;

        let monitor_endpoint = format!(
            "inproc://monitor_{}",
            NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
        );

        // Enable, create, and connect monitor
        socket.monitor(&monitor_endpoint, SocketEvent::ALL as i32)
            .map_err(MonitoredSocketError::MonitoringEnableError)?;
        let monitor = ctx.socket(zmq::PAIR)
            .map_err(MonitoredSocketError::CreateSocketError)?;
        monitor.connect(&monitor_endpoint)
            .map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        socket_options.set(&socket)?;

        match socket_options.bind {
            false => socket.connect(endpoint),
            true => socket.bind(endpoint)
        }.map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        // Clients may wait for the monitor to signal connection
        if socket_options.block_on_first_connect {
            loop {
                let event = read_event(&monitor)
                    .map_err(MonitoredSocketError::EventReadError)?;

                match event {
                    SocketEvent::CONNECTED => break,
                    SocketEvent::CONNECT_DELAYED => continue,
                    _ => return Err(MonitoredSocketError::CouldNotConnect(None))
                }
            }

            connected.store(true, Ordering::Relaxed);
        }

        let shutdown_clone = shutdown.clone();
        let connected_clone = connected.clone();

        let join_handle = thread::spawn(move || monitor_socket(
            monitor,
            monitor_endpoint,
            shutdown_clone,
            connected_clone
        ));

        Ok(Self {
            socket,
            join_handle: Some(join_handle),
            shutdown,
            connected
        })
    }

    /// Return if the socket has a connected peer or not.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The monitor thread only checks the flag between events, so it is detached rather than
        // joined
        self.join_handle.take();
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl std::ops::DerefMut for MonitoredSocket {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        set_sockopts!(
            socket,
            (set_connect_timeout, self.connect_timeout),
            (set_heartbeat_ivl, self.heartbeat_ivl),
            (set_heartbeat_timeout, self.heartbeat_timeout),
            (set_heartbeat_ttl, self.heartbeat_ttl),
            (set_linger, self.linger),
            (set_reconnect_ivl, self.reconnect_ivl),
            (set_rcvtimeo, self.recv_timeout),
            (set_sndtimeo, self.send_timeout)
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            block_on_first_connect: true,
            connect_timeout: 0,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
            heartbeat_ttl: 0,
            linger: 30_000,
            reconnect_ivl: 100,
            recv_timeout: -1,
            send_timeout: 0
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read an event from a monitor socket.
fn read_event(socket: &Socket) -> Result<SocketEvent, zmq::Error> {
    let msg = socket.recv_msg(0)?;

    // Event frames are a u16 event ID followed by a u32 value
    if msg.len() < 2 {
        return Err(zmq::Error::EINVAL)
    }
    let event = u16::from_ne_bytes([msg[0], msg[1]]);

    // Second frame is the address, which we ignore
    if socket.get_rcvmore()? {
        let _ = socket.recv_msg(0)?;
    }

    Ok(SocketEvent::from_raw(event))
}

fn monitor_socket(
    monitor: Socket,
    monitor_endpoint: String,
    shutdown: Arc<AtomicBool>,
    connected: Arc<AtomicBool>
) {
    while !shutdown.load(Ordering::Relaxed) {
        let event = match read_event(&monitor) {
            Ok(e) => e,
            Err(e) => {
                warn!("Error reading event from monitor {}: {}", monitor_endpoint, e);
                break
            }
        };

        match event {
            SocketEvent::CONNECTED | SocketEvent::ACCEPTED => {
                connected.store(true, Ordering::Relaxed)
            },
            SocketEvent::DISCONNECTED => connected.store(false, Ordering::Relaxed),
            _ => ()
        }
    }

    debug!("Monitor {} stopped", monitor_endpoint);
}
