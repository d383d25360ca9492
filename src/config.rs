use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use crate::error::{Error, Result};
use crate::reader::DEFAULT_BROKEN_VENDORS;

pub const DHCP_SERVER_PORT: u16 = 67;
pub const DHCP_CLIENT_PORT: u16 = 68;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub interface: String,
    pub client_port: u16,
    pub server_port: u16,
    pub server_ip: Option<Ipv4Addr>,
    pub broken_vendors: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface: "eth0".to_string(),
            client_port: DHCP_CLIENT_PORT,
            server_port: DHCP_SERVER_PORT,
            server_ip: None,
            broken_vendors: DEFAULT_BROKEN_VENDORS
                .iter()
                .map(|vendor| vendor.to_string())
                .collect(),
        }
    }
}

impl Config {
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.interface.is_empty() {
            return Err(Error::InvalidConfig(
                "interface must not be empty".to_string(),
            ));
        }

        if self.client_port == 0 || self.server_port == 0 {
            return Err(Error::InvalidConfig(
                "client_port and server_port must be non-zero".to_string(),
            ));
        }

        if self.client_port == self.server_port {
            return Err(Error::InvalidConfig(
                "client_port and server_port must differ".to_string(),
            ));
        }

        for vendor in &self.broken_vendors {
            if vendor.len() > 255 {
                return Err(Error::InvalidConfig(
                    "broken_vendors entries must fit in a 255-byte option".to_string(),
                ));
            }
        }

        Ok(())
    }
}
