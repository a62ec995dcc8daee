use libp2p::{identify, ping};
use strum_macros::Display;

#[derive(Debug, Display)]
pub enum Event {
    Ping(ping::Event),
    Identify(Box<identify::Event>),
    WakuRelay(waku_relay::Event),
    WakuFilter(waku_filter::Event),
    WakuStore(waku_store::Event),
    WakuLightPush(waku_lightpush::Event),
}

impl From<void::Void> for Event {
    fn from(event: void::Void) -> Self {
        void::unreachable(event)
    }
}

impl From<ping::Event> for Event {
    fn from(event: ping::Event) -> Self {
        Self::Ping(event)
    }
}

impl From<identify::Event> for Event {
    fn from(event: identify::Event) -> Self {
        Self::Identify(Box::new(event))
    }
}

impl From<waku_relay::Event> for Event {
    fn from(event: waku_relay::Event) -> Self {
        Self::WakuRelay(event)
    }
}

impl From<waku_filter::Event> for Event {
    fn from(event: waku_filter::Event) -> Self {
        Self::WakuFilter(event)
    }
}

impl From<waku_store::Event> for Event {
    fn from(event: waku_store::Event) -> Self {
        Self::WakuStore(event)
    }
}

impl From<waku_lightpush::Event> for Event {
    fn from(event: waku_lightpush::Event) -> Self {
        Self::WakuLightPush(event)
    }
}
