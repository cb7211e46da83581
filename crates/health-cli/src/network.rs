use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::Error;

const LOCAL_DEVNET_URL: &str = "http://127.0.0.1:16591";
const API_PATH: &str = "v3";

/// The network to check: a known preset or an explicit URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// A devnet running on this machine.
    LocalDevnet,
    /// Accumulate mainnet.
    Mainnet,
    /// The Kermit testnet.
    Kermit,
    /// The Fozzie testnet.
    Fozzie,
    /// Any other network, by URL.
    Custom(Url),
}

impl Network {
    /// Base URL of the network's API server.
    ///
    /// # Errors
    ///
    /// Returns an error if a preset URL fails to parse.
    pub fn base_url(&self) -> Result<Url, Error> {
        let url = match self {
            Self::LocalDevnet => LOCAL_DEVNET_URL.to_string(),
            Self::Mainnet | Self::Kermit | Self::Fozzie => {
                format!("https://{self}.accumulatenetwork.io")
            }
            Self::Custom(url) => return Ok(url.clone()),
        };

        Url::parse(&url).map_err(|e| Error::Network(format!("{url}: {e}")))
    }

    /// The JSON-RPC endpoint, `<base>/v3`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn api_url(&self) -> Result<Url, Error> {
        let mut url = self.base_url()?;

        let already_api = url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
            .is_some_and(|last| last == API_PATH);
        if already_api {
            return Ok(url);
        }

        url.path_segments_mut()
            .map_err(|()| Error::Network(format!("{self} cannot be used as an API base")))?
            .pop_if_empty()
            .push(API_PATH);

        Ok(url)
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local-devnet" | "devnet" | "local" => Ok(Self::LocalDevnet),
            "mainnet" => Ok(Self::Mainnet),
            "kermit" => Ok(Self::Kermit),
            "fozzie" => Ok(Self::Fozzie),
            _ => Url::parse(s)
                .map(Self::Custom)
                .map_err(|e| Error::Network(format!("unknown network '{s}': {e}"))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalDevnet => write!(f, "local-devnet"),
            Self::Mainnet => write!(f, "mainnet"),
            Self::Kermit => write!(f, "kermit"),
            Self::Fozzie => write!(f, "fozzie"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(
            "local-devnet".parse::<Network>().unwrap().api_url().unwrap().as_str(),
            "http://127.0.0.1:16591/v3"
        );
        assert_eq!(
            "Mainnet".parse::<Network>().unwrap().api_url().unwrap().as_str(),
            "https://mainnet.accumulatenetwork.io/v3"
        );
        assert_eq!(
            "kermit".parse::<Network>().unwrap().api_url().unwrap().as_str(),
            "https://kermit.accumulatenetwork.io/v3"
        );
    }

    #[test]
    fn test_custom_url() {
        let network: Network = "http://10.0.0.5:26660".parse().unwrap();

        assert_eq!(network.api_url().unwrap().as_str(), "http://10.0.0.5:26660/v3");
        assert_eq!(network.to_string(), "http://10.0.0.5:26660/");
    }

    #[test]
    fn test_custom_url_with_api_path() {
        let network: Network = "https://node.example.com/v3/".parse().unwrap();

        assert_eq!(network.api_url().unwrap().as_str(), "https://node.example.com/v3/");
    }

    #[test]
    fn test_unknown_network() {
        let err = "betanet".parse::<Network>().unwrap_err();

        assert!(err.to_string().contains("unknown network 'betanet'"));
    }
}
