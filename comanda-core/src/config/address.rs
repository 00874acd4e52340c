use serde::Deserialize;

pub const DEFAULT_QUERY_PARAM: &str = "cep";
pub const DEFAULT_ADDRESS_FIELD: &str = "endereco";

/// Remote postal-code lookup used by `delivery_address`.
///
/// ```toml
/// [address]
/// url = "https://cep.example.com/api/lookup"
/// username = "CEP_API_USER"
/// password = "CEP_API_PASSWORD"
/// ```
///
/// `username` and `password` name environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressServiceConfig {
    pub url: String,
    pub query_param: String,
    pub address_field: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawAddressConfig {
    #[serde(default)]
    url: String,
    query_param: Option<String>,
    address_field: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl From<RawAddressConfig> for AddressServiceConfig {
    fn from(raw: RawAddressConfig) -> Self {
        Self {
            url: raw.url,
            query_param: raw
                .query_param
                .unwrap_or_else(|| DEFAULT_QUERY_PARAM.to_string()),
            address_field: raw
                .address_field
                .unwrap_or_else(|| DEFAULT_ADDRESS_FIELD.to_string()),
            username: raw.username,
            password: raw.password,
        }
    }
}
