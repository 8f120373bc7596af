/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{net::SocketAddr, sync::Arc};
use tokio::{net::UdpSocket, task::JoinHandle};
use tracing::{error, info};

use crate::{
    errors::{BridgeError, Result}, packets::{parse_datagram, RawPacket, UdpMessage}, spawn
};

/// max size of a UDP datagram
pub const RECV_BUFFER_SIZE: usize = 65535;

/// the receiver of classified datagrams. Implementations are called from the receive loop and must
/// not block
pub trait PacketHandler: Send + Sync {
    fn on_telemetry (&self, pkt: RawPacket);
    fn on_tactical (&self, pkt: RawPacket);
}

/// receives datagrams from the DCS export script on a single UDP socket. Datagrams that do not parse
/// into a known packet type are dropped without response or log
pub struct UdpListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpListener {
    pub async fn bind (addr: SocketAddr)->Result<Self> {
        let socket = UdpSocket::bind( addr).await.map_err( |e| BridgeError::Bind( addr.to_string(), e.to_string()))?;
        let local_addr = socket.local_addr()?;
        info!("UDP listening on {}", local_addr);

        Ok( UdpListener { socket, local_addr })
    }

    pub fn local_addr (&self)->SocketAddr { self.local_addr }

    /// receive and dispatch until the socket fails. This only returns with an error
    pub async fn run (self, handler: Arc<dyn PacketHandler>)->Result<()> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];

        loop {
            match self.socket.recv_from( &mut buf).await {
                Ok((len,_)) => { dispatch( &buf[..len], handler.as_ref()); }
                Err(e) => {
                    error!("UDP socket error: {}", e);
                    return Err( e.into())
                }
            }
        }
    }

    /// spawn the receive loop as a task. Aborting the task closes the socket
    pub fn start (self, handler: Arc<dyn PacketHandler>)->JoinHandle<Result<()>> {
        spawn( "udp", self.run( handler))
    }
}

/// classify a datagram and hand it to the matching handler function. Returns false if it was dropped
pub fn dispatch (data: &[u8], handler: &dyn PacketHandler)->bool {
    match parse_datagram( data) {
        Some(UdpMessage::Telemetry(pkt)) => { handler.on_telemetry( pkt); true }
        Some(UdpMessage::Tactical(pkt)) => { handler.on_tactical( pkt); true }
        None => false
    }
}
