use slirc_proto::{Message, Prefix};
use std::net::SocketAddr;

/// Build the final ERROR line of a connection.
pub fn closing_link(addr: &SocketAddr, reason: &str) -> Message {
    Message::error(format!("Closing Link: {} ({})", addr.ip(), reason))
}

/// Build the QUIT a departing user sees for themselves.
pub fn quit_echo(prefix: &Prefix, reason: &str) -> Message {
    Message::quit(reason).with_prefix(prefix.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_link_names_ip_and_reason() {
        let addr: SocketAddr = "192.0.2.7:40000".parse().unwrap();
        assert_eq!(
            closing_link(&addr, "Ping timeout (60 seconds)").to_string(),
            "ERROR :Closing Link: 192.0.2.7 (Ping timeout (60 seconds))"
        );
    }

    #[test]
    fn quit_echo_carries_user_prefix() {
        let prefix = Prefix::new("dave", "~dave", "192.0.2.7");
        assert_eq!(
            quit_echo(&prefix, "Client Quit").to_string(),
            ":dave!~dave@192.0.2.7 QUIT :Client Quit"
        );
    }
}
