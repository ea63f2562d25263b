//! Channel event delivery
//!
//! A peer of method dispatch: the same lookup and marshalling steps, but the
//! callable is the event's broadcast or addressed sender, and addressed
//! sends pass the address by value ahead of the event arguments.

use super::dispatcher::NativeCall;
use super::{DispatchError, DispatchResult, Dispatcher};
use crate::marshal::MarshalledValue;

impl Dispatcher {
    /// Deliver an event to every handler on `channel`
    pub fn broadcast_event(&self, channel: &str, event: &str, args: &[MarshalledValue]) -> DispatchResult {
        let outcome = self.try_deliver(channel, event, None, args);
        if let Err(error) = &outcome {
            log::debug!("broadcast_event failed: {}", error);
        }
        outcome.into()
    }

    /// Deliver an event to the handlers at `address` on `channel`
    pub fn send_event(
        &self,
        channel: &str,
        event: &str,
        address: &MarshalledValue,
        args: &[MarshalledValue],
    ) -> DispatchResult {
        let outcome = self.try_deliver(channel, event, Some(address), args);
        if let Err(error) = &outcome {
            log::debug!("send_event failed: {}", error);
        }
        outcome.into()
    }

    fn try_deliver(
        &self,
        channel_name: &str,
        event_name: &str,
        address: Option<&MarshalledValue>,
        args: &[MarshalledValue],
    ) -> Result<MarshalledValue, DispatchError> {
        let catalog = self.catalog()?;
        let channel = catalog
            .get_channel(channel_name)
            .ok_or_else(|| DispatchError::ChannelNotFound(channel_name.to_string()))?;
        let event = channel
            .event(event_name)
            .ok_or_else(|| DispatchError::EventNotFound(format!("{}.{}", channel_name, event_name)))?;
        let target = event.qualified_name();

        let (sender, mode) = match address {
            None => (event.broadcast.as_ref(), "broadcast"),
            Some(_) => (event.addressed.as_ref(), "addressed send"),
        };
        let sender = sender.ok_or_else(|| DispatchError::NotImplemented(format!("{} of {}", mode, target)))?;
        let call = sender
            .call()
            .ok_or_else(|| DispatchError::NoBinding(format!("Sender of {}", target)))?;

        if args.len() != event.parameters.len() {
            return Err(DispatchError::EventArity {
                target,
                expected: event.parameters.len(),
                supplied: args.len(),
            });
        }

        let mut native = NativeCall::new(&target, call);
        if let Some(address) = address {
            let expected = channel.address.as_ref().ok_or_else(|| {
                DispatchError::NotImplemented(format!("{}: channel {} has no address type", mode, channel.name))
            })?;
            native = native.leading_value(address, expected)?;
        }
        native.run(&event.parameters, args, Some(&event.return_value), false)
    }
}
