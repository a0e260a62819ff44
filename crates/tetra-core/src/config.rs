//! Configuration types for the Tetra system
//!
//! The YAML file is a mapping of domain name to [`DomainConfig`]. The file
//! format accepts a number of shorthand shapes (a bare string where a list is
//! expected, a bare address list where a zone map is expected, ...). These are
//! all normalised here, while loading, into the explicit types the expanders
//! consume: [`Host`], [`MidName`], [`AliasGroup`] and [`BackendConfig`].
//! Anything malformed is a [`Error::Config`] raised before any network access.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{Error, Result};

/// TTL of zone-0 host records
pub const TTL_HOST: u32 = 43200;
/// TTL of stable version aliases
pub const TTL_PERMA: u32 = 86400;
/// TTL of host records outside zone 0 (auto)
pub const TTL_EXT: u32 = 1;
/// TTL of switchable aliases (auto)
pub const TTL_NET: u32 = 1;
/// TTL of top-layer records
pub const TTL_TOP: u32 = 600;

/// Ownership prefix of bottom-layer records
pub const COMMENT_PREFIX_BOTTOM: &str = "TETRAB";
/// Ownership prefix of top-layer records
pub const COMMENT_PREFIX_TOP: &str = "TETRAT";

/// Which expander a domain is generated by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Physical host and zone records
    Bottom,
    /// Public alias records
    Top,
}

impl Layer {
    /// Comment prefix marking records owned by this layer
    pub fn ownership_prefix(&self) -> &'static str {
        match self {
            Layer::Bottom => COMMENT_PREFIX_BOTTOM,
            Layer::Top => COMMENT_PREFIX_TOP,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Bottom => f.write_str("bottom"),
            Layer::Top => f.write_str("top"),
        }
    }
}

/// Address zone of a host
///
/// 0 is the physical address, 1 the externally reachable one, 4 and 6 are
/// derived "prefer IPv4/IPv6" views, and 10 and above are user-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Zone(pub u32);

impl Zone {
    /// Physical / private address
    pub const PHYSICAL: Zone = Zone(0);
    /// Externally reachable address
    pub const EXTERNAL: Zone = Zone(1);
    /// Prefer IPv4
    pub const PREFER_V4: Zone = Zone(4);
    /// Prefer IPv6
    pub const PREFER_V6: Zone = Zone(6);
    /// First user-defined zone
    pub const FIRST_CUSTOM: u32 = 10;

    /// Whether this zone may appear in a host's address map
    pub fn is_assignable(&self) -> bool {
        *self == Zone::PHYSICAL || *self == Zone::EXTERNAL || self.0 >= Zone::FIRST_CUSTOM
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// YAML writes zone keys as integers, JSON from exec sources as strings.
impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ZoneVisitor;

        impl Visitor<'_> for ZoneVisitor {
            type Value = Zone;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative zone number")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Zone, E> {
                u32::try_from(v)
                    .map(Zone)
                    .map_err(|_| E::custom(format!("zone {} out of range", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Zone, E> {
                u32::try_from(v)
                    .map(Zone)
                    .map_err(|_| E::custom(format!("invalid zone {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Zone, E> {
                v.trim()
                    .parse::<u32>()
                    .map(Zone)
                    .map_err(|_| E::custom(format!("invalid zone '{}'", v)))
            }
        }

        deserializer.deserialize_any(ZoneVisitor)
    }
}

/// Mapping from zone to the suffix appended to alias names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSuffixTable {
    suffixes: BTreeMap<Zone, String>,
}

impl ZoneSuffixTable {
    /// Build a table from explicit entries
    pub fn new(suffixes: BTreeMap<Zone, String>) -> Self {
        Self { suffixes }
    }

    /// Suffix for a zone
    ///
    /// Custom zones without an entry get `-z<zone>`.
    pub fn suffix(&self, zone: Zone) -> Result<String> {
        if let Some(suffix) = self.suffixes.get(&zone) {
            return Ok(suffix.clone());
        }
        if zone.0 >= Zone::FIRST_CUSTOM {
            return Ok(format!("-z{}", zone.0));
        }
        Err(Error::config(format!("No suffix configured for zone {}", zone)))
    }
}

impl Default for ZoneSuffixTable {
    fn default() -> Self {
        let suffixes = [
            (Zone::PHYSICAL, "-phy"),
            (Zone::EXTERNAL, "-ext"),
            (Zone::PREFER_V4, "-ip4"),
            (Zone::PREFER_V6, "-ip6"),
        ]
        .into_iter()
        .map(|(zone, suffix)| (zone, suffix.to_string()))
        .collect();
        Self { suffixes }
    }
}

/// A value that may be written either alone or as a list
///
/// `Many` is tried first: derived structs also accept a sequence, so a list
/// must never reach `One`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A list of values
    Many(Vec<T>),
    /// A single value
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into a list
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Host addresses as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressSpec {
    /// A single zone-0 address
    One(String),
    /// A list of zone-0 addresses
    Many(Vec<String>),
    /// Addresses keyed by zone; an empty entry clears the zone
    Zoned(BTreeMap<Zone, Option<OneOrMany<String>>>),
}

/// Mid-name alias as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MidNameSpec {
    /// Bare alias name
    Name(String),
    /// Alias with blue/green selection
    Detailed(MidNameDetail),
}

/// Long form of a mid-name
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MidNameDetail {
    /// Alias name, optionally carrying a `-v` version marker
    pub name: String,
    /// Whether the version-stripped name should point at this alias
    #[serde(default)]
    pub current: bool,
    /// Zone the bare alias points at
    #[serde(default)]
    pub current_zone: Option<Zone>,
}

/// Host descriptor as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    /// Host label
    pub name: String,
    /// Addresses, by zone
    #[serde(default)]
    pub addresses: Option<AddressSpec>,
    /// Aliases pointing at this host
    #[serde(default)]
    pub mid_names: Option<OneOrMany<MidNameSpec>>,
}

/// Alias target as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    /// Target with the default line
    Value(String),
    /// Target with an explicit line
    Detailed(TargetDetail),
}

/// Long form of an alias target
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDetail {
    /// IP literal or CNAME target
    pub value: String,
    /// Routing line
    #[serde(default)]
    pub line: Option<String>,
}

/// Alias group as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasGroupSpec {
    /// Public names sharing the targets
    pub names: OneOrMany<String>,
    /// Targets
    pub records: OneOrMany<TargetSpec>,
    /// Extra names aliased to the first public name
    #[serde(default)]
    pub cnames: Option<OneOrMany<String>>,
}

/// A host with its addresses normalised per zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Host label
    pub name: String,
    /// Declared addresses by zone; an empty list clears the zone
    pub addresses: BTreeMap<Zone, Vec<IpAddr>>,
    /// Mid-name aliases
    pub mid_names: Vec<MidName>,
}

/// A mid-name alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidName {
    /// Alias name
    pub name: String,
    /// Blue/green "current" marker
    pub current: bool,
    /// Zone the bare alias points at; lowest populated zone if absent
    pub current_zone: Option<Zone>,
}

impl MidName {
    /// Version marker separating the network name from the version
    pub const VERSION_MARKER: &'static str = "-v";

    /// Short form: not current, default zone
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            current: false,
            current_zone: None,
        }
    }

    /// Mark as the current version, pointing at `zone`
    pub fn current(mut self, zone: Option<Zone>) -> Self {
        self.current = true;
        self.current_zone = zone;
        self
    }

    /// Whether this is a stable version alias
    pub fn is_versioned(&self) -> bool {
        self.name.contains(Self::VERSION_MARKER)
    }

    /// Name with the version marker and everything after it removed
    pub fn network_name(&self) -> &str {
        self.name
            .split(Self::VERSION_MARKER)
            .next()
            .unwrap_or(&self.name)
    }
}

/// A top-layer alias group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasGroup {
    /// Public names
    pub names: Vec<String>,
    /// Targets
    pub records: Vec<AliasTarget>,
    /// Names aliased to `names[0]`
    pub cnames: Vec<String>,
}

/// One target of an alias group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    /// IP literal or CNAME target
    pub value: String,
    /// Routing line
    pub line: Option<String>,
}

impl AliasTarget {
    /// Target on the default line
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            line: None,
        }
    }
}

impl TryFrom<HostSpec> for Host {
    type Error = Error;

    fn try_from(spec: HostSpec) -> Result<Self> {
        if spec.name.is_empty() {
            return Err(Error::config("Host name cannot be empty"));
        }

        let declared: BTreeMap<Zone, Vec<String>> = match spec.addresses {
            None => BTreeMap::new(),
            Some(AddressSpec::One(address)) => BTreeMap::from([(Zone::PHYSICAL, vec![address])]),
            Some(AddressSpec::Many(addresses)) => BTreeMap::from([(Zone::PHYSICAL, addresses)]),
            Some(AddressSpec::Zoned(zones)) => zones
                .into_iter()
                .map(|(zone, addresses)| {
                    (zone, addresses.map(OneOrMany::into_vec).unwrap_or_default())
                })
                .collect(),
        };

        let mut addresses = BTreeMap::new();
        for (zone, literals) in declared {
            if !zone.is_assignable() {
                return Err(Error::config(format!(
                    "Special zone {} should not be set manually for host {}",
                    zone, spec.name
                )));
            }
            let parsed = literals
                .iter()
                .map(|literal| {
                    literal.trim().parse::<IpAddr>().map_err(|_| {
                        Error::config(format!(
                            "{} is not a valid IP address (host {})",
                            literal, spec.name
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            addresses.insert(zone, parsed);
        }

        let mid_names = spec
            .mid_names
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|mid| match mid {
                MidNameSpec::Name(name) => MidName::new(name),
                MidNameSpec::Detailed(detail) => MidName {
                    name: detail.name,
                    current: detail.current,
                    current_zone: detail.current_zone,
                },
            })
            .collect::<Vec<_>>();

        if let Some(empty) = mid_names.iter().find(|mid| mid.name.is_empty()) {
            return Err(Error::config(format!(
                "Empty mid-name on host {} ({:?})",
                spec.name, empty
            )));
        }

        Ok(Host {
            name: spec.name,
            addresses,
            mid_names,
        })
    }
}

impl TryFrom<AliasGroupSpec> for AliasGroup {
    type Error = Error;

    fn try_from(spec: AliasGroupSpec) -> Result<Self> {
        let names = spec.names.into_vec();
        if names.is_empty() || names.iter().any(String::is_empty) {
            return Err(Error::config("Alias group names cannot be empty"));
        }

        let records = spec
            .records
            .into_vec()
            .into_iter()
            .map(|target| match target {
                TargetSpec::Value(value) => AliasTarget::new(value),
                TargetSpec::Detailed(detail) => AliasTarget {
                    value: detail.value,
                    line: detail.line,
                },
            })
            .collect::<Vec<_>>();
        if records.iter().any(|target| target.value.is_empty()) {
            return Err(Error::config(format!(
                "Empty record value in alias group {}",
                names[0]
            )));
        }

        Ok(AliasGroup {
            names,
            records,
            cnames: spec.cnames.map(OneOrMany::into_vec).unwrap_or_default(),
        })
    }
}

/// Backend selection and credentials
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose secrets.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Cloudflare API v4
    Cloudflare {
        /// API token with Zone:DNS:Edit permission
        api_token: String,
        /// Zone ID (optional, looked up by domain name otherwise)
        zone_id: Option<String>,
    },

    /// Tencent Cloud DNSPod
    Dnspod {
        /// SecretId
        secret_id: String,
        /// SecretKey
        secret_key: String,
    },
}

impl BackendConfig {
    /// Get the backend type name
    pub fn type_name(&self) -> &'static str {
        match self {
            BackendConfig::Cloudflare { .. } => "cloudflare",
            BackendConfig::Dnspod { .. } => "dnspod",
        }
    }

    /// Validate the backend configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::Cloudflare { api_token, .. } => {
                if api_token.is_empty() {
                    return Err(Error::config("Cloudflare API token cannot be empty"));
                }
            }
            BackendConfig::Dnspod {
                secret_id,
                secret_key,
            } => {
                if secret_id.is_empty() || secret_key.is_empty() {
                    return Err(Error::config("DNSPod secret_id and secret_key are required"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Cloudflare { zone_id, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("zone_id", zone_id)
                .finish(),
            BackendConfig::Dnspod { secret_id, .. } => f
                .debug_struct("Dnspod")
                .field("secret_id", secret_id)
                .field("secret_key", &"<REDACTED>")
                .finish(),
        }
    }
}

/// Per-domain configuration as written in the file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// Expander used for this domain
    pub layer: Layer,

    /// Backend type name (`cloudflare`, `dnspod`)
    pub backend: String,

    /// Credentials; any key may be given as `<key>_file`
    pub auth: BTreeMap<String, String>,

    /// Zone suffix overrides (bottom layer)
    #[serde(default)]
    pub zone_suffix: Option<BTreeMap<Zone, String>>,

    /// Host descriptors (bottom layer)
    #[serde(default)]
    pub hosts: Option<Vec<HostSpec>>,

    /// Shell command printing more host descriptors as JSON
    #[serde(default)]
    pub hosts_from_exec: Option<String>,

    /// Suffix appended to relative CNAME targets (top layer)
    #[serde(default)]
    pub bottom: Option<String>,

    /// Alias groups (top layer)
    #[serde(default)]
    pub domains: Option<Vec<AliasGroupSpec>>,

    /// Shell command printing more alias groups as JSON
    #[serde(default)]
    pub domains_from_exec: Option<String>,
}

/// Fully resolved configuration of one domain
#[derive(Debug, Clone)]
pub struct DomainSpec {
    /// Zone name, e.g. `example.com`
    pub domain: String,
    /// Expander used
    pub layer: Layer,
    /// Backend and credentials
    pub backend: BackendConfig,
    /// Zone suffixes (bottom layer)
    pub zone_suffix: ZoneSuffixTable,
    /// Suffix for relative CNAME targets (top layer)
    pub bottom: String,
    /// Hosts (bottom layer)
    pub hosts: Vec<Host>,
    /// Alias groups (top layer)
    pub alias_groups: Vec<AliasGroup>,
}

impl DomainSpec {
    /// A spec with no hosts or aliases, mostly useful for tests
    pub fn new(domain: impl Into<String>, layer: Layer, backend: BackendConfig) -> Self {
        Self {
            domain: domain.into(),
            layer,
            backend,
            zone_suffix: ZoneSuffixTable::default(),
            bottom: String::new(),
            hosts: Vec::new(),
            alias_groups: Vec::new(),
        }
    }
}

impl DomainConfig {
    /// Resolve exec sources and secret files, and normalise every shorthand
    pub async fn resolve(&self, domain: &str) -> Result<DomainSpec> {
        let backend = self.backend_config().await?;

        let mut spec = DomainSpec::new(domain, self.layer, backend);
        if let Some(overrides) = &self.zone_suffix {
            spec.zone_suffix = ZoneSuffixTable::new(overrides.clone());
        }
        spec.bottom = self.bottom.clone().unwrap_or_default();

        match self.layer {
            Layer::Bottom => {
                if self.domains.is_some() || self.domains_from_exec.is_some() || self.bottom.is_some() {
                    return Err(Error::config(format!(
                        "{}: `domains`, `domains_from_exec` and `bottom` belong to the top layer",
                        domain
                    )));
                }
                let mut specs: Vec<HostSpec> = match &self.hosts_from_exec {
                    Some(command) => read_from_exec(command).await?,
                    None => Vec::new(),
                };
                match &self.hosts {
                    Some(hosts) => specs.extend(hosts.iter().cloned()),
                    None if self.hosts_from_exec.is_none() => {
                        return Err(Error::config(format!(
                            "{}: bottom layer requires `hosts` or `hosts_from_exec`",
                            domain
                        )));
                    }
                    None => {}
                }
                spec.hosts = specs
                    .into_iter()
                    .map(Host::try_from)
                    .collect::<Result<Vec<_>>>()?;
            }
            Layer::Top => {
                if self.hosts.is_some() || self.hosts_from_exec.is_some() || self.zone_suffix.is_some() {
                    return Err(Error::config(format!(
                        "{}: `hosts`, `hosts_from_exec` and `zone_suffix` belong to the bottom layer",
                        domain
                    )));
                }
                let mut specs: Vec<AliasGroupSpec> = match &self.domains_from_exec {
                    Some(command) => read_from_exec(command).await?,
                    None => Vec::new(),
                };
                match &self.domains {
                    Some(groups) => specs.extend(groups.iter().cloned()),
                    None if self.domains_from_exec.is_none() => {
                        return Err(Error::config(format!(
                            "{}: top layer requires `domains` or `domains_from_exec`",
                            domain
                        )));
                    }
                    None => {}
                }
                spec.alias_groups = specs
                    .into_iter()
                    .map(AliasGroup::try_from)
                    .collect::<Result<Vec<_>>>()?;
            }
        }

        Ok(spec)
    }

    /// Build the backend configuration from `backend` and `auth`
    pub async fn backend_config(&self) -> Result<BackendConfig> {
        let config = match self.backend.as_str() {
            "cloudflare" => {
                self.check_auth_keys(&["token", "zone_id"])?;
                BackendConfig::Cloudflare {
                    api_token: read_secret(&self.auth, "token").await?,
                    zone_id: self.auth.get("zone_id").cloned(),
                }
            }
            "dnspod" => {
                self.check_auth_keys(&["secret_id", "secret_key"])?;
                BackendConfig::Dnspod {
                    secret_id: read_secret(&self.auth, "secret_id").await?,
                    secret_key: read_secret(&self.auth, "secret_key").await?,
                }
            }
            other => {
                return Err(Error::config(format!(
                    "Backend '{}' is not supported. Supported backends: cloudflare, dnspod",
                    other
                )));
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn check_auth_keys(&self, allowed: &[&str]) -> Result<()> {
        for key in self.auth.keys() {
            let base = key.strip_suffix("_file").unwrap_or(key);
            if !allowed.contains(&base) {
                return Err(Error::config(format!(
                    "Unknown auth key '{}' for backend {}",
                    key, self.backend
                )));
            }
        }
        Ok(())
    }
}

/// Read `key` from the auth map, or the trimmed contents of `<key>_file`
pub async fn read_secret(auth: &BTreeMap<String, String>, key: &str) -> Result<String> {
    let file_key = format!("{}_file", key);
    if let Some(path) = auth.get(&file_key) {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!("Failed to read {} from {}: {}", key, path, e))
        })?;
        return Ok(contents.trim().to_string());
    }
    auth.get(key)
        .cloned()
        .ok_or_else(|| Error::config(format!("Missing auth key '{}'", key)))
}

/// Run a shell command and parse its stdout as a JSON list
async fn read_from_exec<T: serde::de::DeserializeOwned>(command: &str) -> Result<Vec<T>> {
    tracing::debug!("Reading descriptors from command: {}", command);

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await
        .map_err(|e| Error::config(format!("Failed to execute '{}': {}", command, e)))?;

    if !output.status.success() {
        return Err(Error::config(format!(
            "Command '{}' failed ({}): {}",
            command,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    serde_json::from_slice(&output.stdout).map_err(|e| {
        Error::config(format!("Command '{}' did not print a JSON list: {}", command, e))
    })
}

/// Main configuration: domains in file order
#[derive(Debug, Clone, Default)]
pub struct TetraConfig {
    /// Domain name and its configuration, in file order
    pub domains: Vec<(String, DomainConfig)>,
}

impl TetraConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(contents)?;

        let mut domains = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let domain = key
                .as_str()
                .ok_or_else(|| Error::config(format!("Domain key must be a string: {:?}", key)))?
                .to_string();
            let config: DomainConfig = serde_yaml::from_value(value)
                .map_err(|e| Error::config(format!("{}: {}", domain, e)))?;
            domains.push((domain, config));
        }

        Ok(Self { domains })
    }

    /// Load a YAML file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "A proper config file must be specified ({}): {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Domains to process: all in file order, or the requested ones in the
    /// order given
    pub fn select(&self, requested: &[String]) -> Result<Vec<(&str, &DomainConfig)>> {
        if requested.is_empty() {
            return Ok(self
                .domains
                .iter()
                .map(|(domain, config)| (domain.as_str(), config))
                .collect());
        }

        requested
            .iter()
            .map(|wanted| {
                self.domains
                    .iter()
                    .find(|(domain, _)| domain == wanted)
                    .map(|(domain, config)| (domain.as_str(), config))
                    .ok_or_else(|| {
                        Error::config(format!("Domain {} is not in the config file", wanted))
                    })
            })
            .collect()
    }
}
