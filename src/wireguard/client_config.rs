//! Client `.conf` rendering

use crate::config::WireGuardConfig;
use crate::roster::Client;

/// Render the wg-quick configuration a client imports
pub fn render_client_config(
    client: &Client,
    server_public_key: &str,
    wireguard: &WireGuardConfig,
) -> String {
    format!(
        "[Interface]\n\
         PrivateKey = {private_key}\n\
         Address = {address}\n\
         DNS = {dns}\n\
         \n\
         [Peer]\n\
         PublicKey = {server_public_key}\n\
         PresharedKey = {preshared_key}\n\
         AllowedIPs = {allowed_ips}\n\
         Endpoint = {host}:{port}\n\
         PersistentKeepalive = {keepalive}",
        private_key = client.private_key,
        address = client.address,
        dns = wireguard.default_dns,
        server_public_key = server_public_key,
        preshared_key = client.preshared_key,
        allowed_ips = wireguard.allowed_ips,
        host = wireguard.host,
        port = wireguard.port,
        keepalive = wireguard.persistent_keepalive,
    )
}
