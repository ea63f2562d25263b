//! `dynbind call`, `dynbind prop` and `dynbind emit`

use dynbind_engine::BoundaryGateway;
use dynbind_engine::DispatchResult;

use super::Session;
use crate::output::StyledOutput;

/// Split `Class.Method`; a bare name is a free function
fn split_target(target: &str) -> (Option<&str>, &str) {
    match target.split_once('.') {
        Some((class, method)) => (Some(class), method),
        None => (None, target),
    }
}

fn report(json: &str, out: &mut StyledOutput) -> bool {
    match serde_json::from_str::<DispatchResult>(json) {
        Ok(result) => out.dispatch_result(&result),
        Err(e) => {
            out.error(&format!("Malformed gateway response: {}", e));
            false
        }
    }
}

pub fn call(session: &Session, target: &str, args: &str, out: &mut StyledOutput) -> bool {
    let gateway = BoundaryGateway::new(&session.dispatcher);
    let json = match split_target(target) {
        (Some(class), method) => gateway.invoke_static(class, method, args),
        (None, function) => gateway.invoke_global(function, args),
    };
    report(&json, out)
}

pub fn property(session: &Session, name: &str, value: Option<&str>, out: &mut StyledOutput) -> bool {
    let gateway = BoundaryGateway::new(&session.dispatcher);
    let json = match value {
        Some(value) => gateway.set_global_property(name, value),
        None => gateway.get_global_property(name),
    };
    report(&json, out)
}

pub fn emit(
    session: &Session,
    channel: &str,
    event: &str,
    address: Option<&str>,
    args: &str,
    out: &mut StyledOutput,
) -> bool {
    let gateway = BoundaryGateway::new(&session.dispatcher);
    let json = match address {
        Some(address) => gateway.send_event(channel, event, address, args),
        None => gateway.broadcast_event(channel, event, args),
    };
    let ok = report(&json, out);
    log::info!("{} bus deliveries recorded", session.model.events.len());
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("Math.Add"), (Some("Math"), "Add"));
        assert_eq!(split_target("GetVersion"), (None, "GetVersion"));
    }
}
