//! Link requests handed from the event loop to a radio driver that runs in
//! its own future.
//!
//! The event loop only ever holds a [`LinkClient`]; the driver owns the radio
//! and is polled by [`serve`]. A request that is dropped by its caller (for
//! example when a bring-up attempt times out) is superseded by the next one:
//! the driver abandons it and its reply, if any, is never delivered.

use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::RawMutex, channel::Channel, signal::Signal};
use heapless::String;
use log::{debug, info};

use super::{NetworkCredentials, SSID_BYTES};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LinkCommand {
    Connect(NetworkCredentials),
    StartAccessPoint(String<SSID_BYTES>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkRequest {
    pub seq: u32,
    pub command: LinkCommand,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinkReply {
    pub seq: u32,
    pub ok: bool,
}

/// Radio side of the hand-off.
#[allow(async_fn_in_trait)]
pub trait LinkDriver {
    /// Runs one request. Dropped mid-way when a newer request arrives, so it
    /// has to start from whatever state the radio was left in.
    async fn execute(&mut self, command: &LinkCommand) -> bool;

    /// Link watch and reconnects between requests. May be dropped at any
    /// await point when a request arrives.
    async fn supervise(&mut self);
}

pub struct LinkControl<M: RawMutex> {
    requests: Channel<M, LinkRequest, 1>,
    replies: Signal<M, LinkReply>,
}

impl<M: RawMutex> LinkControl<M> {
    pub const fn new() -> Self {
        Self {
            requests: Channel::new(),
            replies: Signal::new(),
        }
    }
}

impl<M: RawMutex> Default for LinkControl<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event-loop side of the hand-off.
pub struct LinkClient<'a, M: RawMutex> {
    control: &'a LinkControl<M>,
    next_seq: u32,
}

impl<'a, M: RawMutex> LinkClient<'a, M> {
    pub const fn new(control: &'a LinkControl<M>) -> Self {
        Self {
            control,
            next_seq: 0,
        }
    }

    /// Sends `command` and waits for its own reply; replies to earlier,
    /// abandoned requests are skipped.
    pub async fn request(&mut self, command: LinkCommand) -> bool {
        self.next_seq = self.next_seq.wrapping_add(1);
        let seq = self.next_seq;

        self.control.replies.reset();
        self.control.requests.send(LinkRequest { seq, command }).await;

        loop {
            let reply = self.control.replies.wait().await;
            if reply.seq == seq {
                return reply.ok;
            }
            debug!("net: dropping stale reply seq={}", reply.seq);
        }
    }
}

/// Drives `driver` forever: supervision while idle, one request at a time,
/// and a newer request always wins over the one in flight.
pub async fn serve<M: RawMutex, D: LinkDriver>(control: &LinkControl<M>, driver: &mut D) -> ! {
    let mut pending: Option<LinkRequest> = None;
    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => match select(control.requests.receive(), driver.supervise()).await {
                Either::First(request) => request,
                Either::Second(()) => continue,
            },
        };

        match select(control.requests.receive(), driver.execute(&request.command)).await {
            Either::First(next) => {
                info!(
                    "net: request seq={} superseded by seq={}",
                    request.seq, next.seq
                );
                pending = Some(next);
            }
            Either::Second(ok) => control.replies.signal(LinkReply {
                seq: request.seq,
                ok,
            }),
        }
    }
}
