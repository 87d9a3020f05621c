use std::path::PathBuf;
use std::str::FromStr;

pub use bitcoin::Network;
use clightningrpc_conf::{CLNConf, SyncCLNConf};

use crate::backend::PartnerCredentials;

/// Name of the configuration file inside the working directory.
pub const CONF_FILE: &str = "blaze.conf";

#[derive(Clone, Debug)]
pub struct BlazeConf {
    /// Network the node runs on, `bitcoin` unless told otherwise.
    pub network: Network,
    /// Local working directory of the backend.
    pub path: String,
    pub log_level: String,
    pub log_file: Option<String>,
    pub partner_credentials: Option<PartnerCredentials>,
}

impl Default for BlazeConf {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
        Self {
            network: Network::Bitcoin,
            path: format!("{home}/.breez"),
            log_level: "info".to_owned(),
            log_file: None,
            partner_credentials: None,
        }
    }
}

impl BlazeConf {
    pub fn new(path: Option<String>, network: Option<Network>) -> Self {
        let mut conf = Self::default();
        if let Some(path) = path {
            conf.path = path;
        }
        if let Some(network) = network {
            conf.network = network;
        }
        conf
    }

    /// Where the backend keeps the node seed.
    pub fn seed_path(&self) -> PathBuf {
        PathBuf::from(&self.path).join("seed")
    }

    /// Create the working directory if it does not exist yet.
    pub fn prepare_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.path)?;
        Ok(())
    }

    pub fn set_network(&mut self, network: &str) -> anyhow::Result<()> {
        self.network = Network::from_str(network)?;
        Ok(())
    }
}

fn get_conf(conf: &CLNConf, key: &str) -> anyhow::Result<Option<String>> {
    conf.get_conf(key).map_err(|err| anyhow::anyhow!("{err}"))
}

fn decode_hex(key: &str, value: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(value.trim()).map_err(|err| anyhow::anyhow!("`{key}` is not valid hex: {err}"))
}

impl TryFrom<String> for BlazeConf {
    type Error = anyhow::Error;

    /// Load `<value>/blaze.conf`, missing keys keep their defaults.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let path = format!("{value}/{CONF_FILE}");
        let mut conf = CLNConf::new(path, false);
        conf.parse()
            .map_err(|err| anyhow::anyhow!("{}", err.cause))?;

        let mut blaze = BlazeConf::new(Some(value), None);
        if let Some(network) = get_conf(&conf, "network")? {
            blaze.set_network(&network)?;
        }
        if let Some(level) = get_conf(&conf, "log-level")? {
            blaze.log_level = level;
        }
        blaze.log_file = get_conf(&conf, "log-file")?;

        let cert = get_conf(&conf, "partner-cert")?;
        let key = get_conf(&conf, "partner-key")?;
        blaze.partner_credentials = match (cert, key) {
            (Some(cert), Some(key)) => Some(PartnerCredentials {
                developer_cert: decode_hex("partner-cert", &cert)?,
                developer_key: decode_hex("partner-key", &key)?,
            }),
            (None, None) => None,
            _ => anyhow::bail!("`partner-cert` and `partner-key` must be specified together"),
        };
        Ok(blaze)
    }
}
