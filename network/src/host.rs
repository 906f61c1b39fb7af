//! End hosts: fragment outgoing messages and reassemble incoming ones.

use crate::{
    assembler::{fragment, Assembler},
    interface::{Full, Interface},
    metrics,
    node::{discard_malformed, Node},
    Error,
};
use bytes::Bytes;
use futures::channel::mpsc;
use netsim_codec::{
    Address, Decode, DecodeExt, EncodeExt, FrameKind, HeaderLayout, LinkFrame, NetworkPacket,
    Protocol,
};
use serde::{Deserialize, Serialize};
use std::{future::Future, sync::Arc};
use tracing::{debug, trace, warn};

/// Configuration for a [Host].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the host.
    pub address: Address,

    /// Bound of both queues of the host's interface (0 means unbounded).
    #[serde(default)]
    pub queue_size: usize,

    /// Header layout shared by every node of the network.
    #[serde(default)]
    pub layout: HeaderLayout,
}

/// A message reassembled by a [Host].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Source of the last fragment (unspecified with [HeaderLayout::Compact]).
    pub source: Address,
    pub message: Bytes,
}

/// Outcome of [Sender::send].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sent {
    /// Fragments placed on the outbound queue.
    pub enqueued: usize,
    /// Fragments dropped because the outbound queue was full.
    pub dropped: usize,
}

/// Injects messages into the network on behalf of a [Host].
///
/// Cloneable, so traffic can be generated while the host runs in its own task.
#[derive(Clone)]
pub struct Sender {
    address: Address,
    layout: HeaderLayout,
    interface: Arc<Interface>,
    metrics: metrics::Host,
}

impl Sender {
    /// Send `message` to `destination`, fragmenting it so no encoded packet exceeds `mtu`.
    ///
    /// Fragments are enqueued in order. A fragment that does not fit the outbound queue is
    /// dropped (the remaining ones are still attempted).
    pub fn send(
        &self,
        destination: Address,
        message: impl Into<Bytes>,
        mtu: usize,
    ) -> Result<Sent, Error> {
        let packets = fragment(
            destination,
            self.address,
            message.into(),
            mtu,
            self.layout,
        )?;
        let mut sent = Sent::default();
        for packet in packets {
            let frame = LinkFrame::network(&packet, self.layout);
            match self.interface.outbound().try_put(frame.encode()) {
                Ok(()) => {
                    sent.enqueued += 1;
                    self.metrics.sent.inc();
                    debug!(node = %self.address, %packet, "sending packet");
                }
                Err(Full(_)) => {
                    sent.dropped += 1;
                    self.metrics.dropped.inc();
                    warn!(node = %self.address, %packet, "dropping packet: outbound queue full");
                }
            }
        }
        Ok(sent)
    }
}

/// A node with a single interface that sends and receives application messages.
pub struct Host {
    address: Address,
    layout: HeaderLayout,
    interface: Arc<Interface>,
    assembler: Assembler,
    deliveries: mpsc::UnboundedSender<Delivery>,
    metrics: metrics::Host,
}

impl Host {
    /// Create a host and the channel its reassembled messages are delivered on.
    pub fn new(cfg: Config) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (deliveries, receiver) = mpsc::unbounded();
        let host = Self {
            address: cfg.address,
            layout: cfg.layout,
            interface: Interface::new(cfg.address, 0, cfg.queue_size),
            assembler: Assembler::default(),
            deliveries,
            metrics: metrics::Host::default(),
        };
        (host, receiver)
    }

    /// The interface to connect a [Link](crate::link::Link) to.
    pub fn interface(&self) -> &Arc<Interface> {
        &self.interface
    }

    pub fn metrics(&self) -> &metrics::Host {
        &self.metrics
    }

    /// A handle that can send on behalf of this host.
    pub fn sender(&self) -> Sender {
        Sender {
            address: self.address,
            layout: self.layout,
            interface: self.interface.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// See [Sender::send].
    pub fn send(
        &self,
        destination: Address,
        message: impl Into<Bytes>,
        mtu: usize,
    ) -> Result<Sent, Error> {
        self.sender().send(destination, message, mtu)
    }

    fn receive(&mut self, raw: Bytes) -> Result<(), Error> {
        let frame = LinkFrame::decode(raw)?;
        if frame.kind != FrameKind::Network {
            return Err(Error::UnexpectedFrame(frame.kind));
        }
        let packet = NetworkPacket::decode_cfg(frame.payload, self.layout)?;
        if packet.protocol == Protocol::Control {
            trace!(node = %self.address, %packet, "ignoring control packet");
            return Ok(());
        }
        debug!(node = %self.address, %packet, "received packet");

        let Some(message) = self.assembler.push(&packet) else {
            return Ok(());
        };
        debug!(node = %self.address, source = %packet.source, len = message.len(), "reassembled message");
        self.metrics.delivered.inc();
        let delivery = Delivery {
            source: packet.source,
            message,
        };
        if self.deliveries.unbounded_send(delivery).is_err() {
            trace!(node = %self.address, "delivery receiver dropped");
        }
        Ok(())
    }
}

impl Node for Host {
    fn address(&self) -> Address {
        self.address
    }

    fn poll_once(&mut self) -> Result<bool, Error> {
        let Some(raw) = self.interface.inbound().get() else {
            return Ok(false);
        };
        self.metrics.received.inc();
        let result = self.receive(raw);
        discard_malformed(result, self.address, 0, &self.metrics.malformed)?;
        Ok(true)
    }

    fn readable(&self) -> impl Future<Output = ()> + Send + '_ {
        self.interface.inbound().readable()
    }
}
