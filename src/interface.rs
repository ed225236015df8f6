// Startup lookup of the monitored interface via sysinfo.

use sysinfo::Networks;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub name: String,
    pub mac_address: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

/// Addresses of `name`, or None when the interface does not exist.
pub async fn lookup(name: &str) -> anyhow::Result<Option<InterfaceInfo>> {
    let name = name.to_string();
    tokio::task::spawn_blocking(move || {
        let networks = Networks::new_with_refreshed_list();
        networks.list().get(&name).map(|data| InterfaceInfo {
            name: name.clone(),
            mac_address: data.mac_address().to_string(),
            ipv4: data
                .ip_networks()
                .iter()
                .filter(|n| n.addr.is_ipv4())
                .map(|n| n.addr.to_string())
                .collect(),
            ipv6: data
                .ip_networks()
                .iter()
                .filter(|n| n.addr.is_ipv6())
                .map(|n| n.addr.to_string())
                .collect(),
        })
    })
    .await
    .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))
}

/// Logs what is known about the interface. A missing interface is not fatal: probes bound to
/// it fail and are recorded as failures.
pub async fn log_interface(name: &str) {
    match lookup(name).await {
        Ok(Some(info)) => info!(
            interface = %info.name,
            mac = %info.mac_address,
            ipv4 = ?info.ipv4,
            ipv6 = ?info.ipv6,
            "Monitoring interface"
        ),
        Ok(None) => warn!(interface = %name, "interface not found; probes will fail until it appears"),
        Err(e) => warn!(error = %e, operation = "lookup_interface", "interface lookup failed"),
    }
}
