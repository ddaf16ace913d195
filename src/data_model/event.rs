//! Event recording (7.14)

use log::debug;

use crate::{constants::EVENT_LOG_CAPACITY, util::time::current_timestamp, Error};

use super::{ClusterId, EndpointId, EventId, EventNumber, EventPriority};

/// An event payload that knows where it belongs.
pub trait ClusterEvent {
    const CLUSTER_ID: ClusterId;

    fn event_id(&self) -> EventId;

    fn priority(&self) -> EventPriority;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<T> {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub event_id: EventId,
    /// The number is monotonically increasing per node, and is persisted (7.14.2.1).
    pub event_number: EventNumber,
    pub priority: EventPriority,
    /// Milliseconds since the UNIX epoch
    pub timestamp: u64,
    pub data: T,
}

pub trait EventSink<T: ClusterEvent> {
    /// Record `event` on `endpoint`, returning the number it was assigned.
    fn log_event(&mut self, endpoint: EndpointId, event: T) -> Result<EventNumber, Error>;
}

impl<S, T> EventSink<T> for &mut S
where
    S: EventSink<T>,
    T: ClusterEvent,
{
    fn log_event(&mut self, endpoint: EndpointId, event: T) -> Result<EventNumber, Error> {
        (**self).log_event(endpoint, event)
    }
}

/// A bounded in-memory event log.
///
/// When the log is full new events are refused with [`Error::NoSpace`] and
/// no event number is consumed. Numbers resume from `next_event_number`,
/// which a host restores from persistent storage on boot.
pub struct EventLog<T, const N: usize = EVENT_LOG_CAPACITY> {
    next_event_number: EventNumber,
    events: heapless::Deque<Event<T>, N>,
}

impl<T, const N: usize> EventLog<T, N> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(next_event_number: EventNumber) -> Self {
        Self {
            next_event_number,
            events: heapless::Deque::new(),
        }
    }

    pub fn next_event_number(&self) -> EventNumber {
        self.next_event_number
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event<T>> {
        self.events.iter()
    }

    /// Events recorded for `endpoint`, oldest first.
    pub fn for_endpoint(&self, endpoint: EndpointId) -> impl Iterator<Item = &Event<T>> {
        self.events.iter().filter(move |e| e.endpoint == endpoint)
    }

    /// Remove the oldest event, once the reporting layer delivered it.
    pub fn pop_oldest(&mut self) -> Option<Event<T>> {
        self.events.pop_front()
    }
}

impl<T, const N: usize> Default for EventLog<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClusterEvent, const N: usize> EventSink<T> for EventLog<T, N> {
    fn log_event(&mut self, endpoint: EndpointId, event: T) -> Result<EventNumber, Error> {
        if self.events.is_full() {
            return Err(Error::NoSpace);
        }
        let event_number = self.next_event_number;
        // Numbers never wrap: once exhausted, nothing more is recorded.
        let next_event_number = event_number.checked_add(1).ok_or(Error::NoSpace)?;
        let record = Event {
            endpoint,
            cluster: T::CLUSTER_ID,
            event_id: event.event_id(),
            event_number,
            priority: event.priority(),
            timestamp: current_timestamp(),
            data: event,
        };
        self.events.push_back(record).map_err(|_| Error::NoSpace)?;
        self.next_event_number = next_event_number;
        debug!("Recorded event {event_number} on endpoint {endpoint}");
        Ok(event_number)
    }
}
