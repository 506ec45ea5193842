//! The server's inbound UDP loop (spec.md §4.6, §5), grounded in
//! `original_source/sip/sip_server.py::receive_message`'s
//! `recvfrom`-then-dispatch loop. Unlike the client side there is no
//! transaction slot to gate on — the server answers every parseable
//! request it sees, in the order [`crate::dialog::ServerDialog::handle_request`]
//! returns them.

use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::warn;

use vcu_sip::method::MethodType;
use vcu_sip::serializer::serialize;

use crate::dialog::ServerDialog;

/// Read buffer for inbound datagrams (matches the client's `run_receive_loop`).
const RECV_BUF_SIZE: usize = 10240;

/// Drive the server's receive side for as long as `dialog` lives. Intended
/// to be spawned as its own task; the caller owns `socket` and decides
/// when to stop polling it by dropping the task.
pub async fn run_server_loop(dialog: Arc<ServerDialog>, socket: Arc<UdpSocket>) {
    let mut buf = vec![0u8; RECV_BUF_SIZE];

    loop {
        let (n, peer) = match socket.recv_from(&mut buf).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("server receive failed: {e}");
                continue;
            }
        };

        let message = String::from_utf8_lossy(&buf[..n]).into_owned();
        let request = match vcu_sip::parse(&message) {
            Ok(params) => params,
            Err(e) => {
                warn!("dropping unparseable request: {e}");
                continue;
            }
        };

        if request.method_type != MethodType::Request {
            continue;
        }

        let responses = match dialog.handle_request(&request).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!(subject = request.subject.as_deref().unwrap_or(""), "dialog handler failed: {e}");
                continue;
            }
        };

        for response in responses {
            let wire = serialize(&response);
            if let Err(e) = socket.send_to(wire.as_bytes(), peer).await {
                warn!("failed to send response to {peer}: {e}");
            }
        }
    }
}
