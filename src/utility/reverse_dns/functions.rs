// Standard library
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

// 3rd party crates
use ipnet::IpNet;
use serde_json::Value;

// Current module imports
use super::constants::{
    BITS_PER_NIBBLE, BITS_PER_OCTET, IPV4_ARPA_SUFFIX, IPV4_MAX_ZONE_LABELS, IPV4_PTR_LABELS,
    IPV4_ZONE_PREFIX_LENGTHS, IPV6_ARPA_SUFFIX, IPV6_MAX_PREFIX_LENGTH, IPV6_MAX_ZONE_LABELS,
    IPV6_MIN_PREFIX_LENGTH, IPV6_PREFIX_STEP, IPV6_PTR_LABELS,
};
use super::errors::ReverseDnsError;
use super::types::IpFamily;

/// Checks that a configuration value is a CIDR block PowerDNS can host a
/// reverse zone for.
///
/// All problems found are returned together; an `Ok` means the value can be
/// handed to [`get_reverse_zone_name`].
pub fn validate_cidr(value: &Value, field: &str) -> Result<(), Vec<ReverseDnsError>> {
    let cidr = match value {
        Value::String(cidr) => cidr,
        other => {
            return Err(vec![ReverseDnsError::TypeMismatch {
                field: field.to_string(),
                actual: json_type_name(other),
            }])
        }
    };

    parse_zone_cidr(cidr).map(|_| ()).map_err(|e| vec![e])
}

/// Returns the reverse zone name for a CIDR block, e.g. `192.168.1.0/24`
/// becomes `1.168.192.in-addr.arpa.`.
pub fn get_reverse_zone_name(cidr: &str) -> Result<String, ReverseDnsError> {
    let net = parse_zone_cidr(cidr)?;
    let prefix = usize::from(net.prefix_len());

    let labels: Vec<String> = match net.addr() {
        IpAddr::V4(addr) => addr
            .octets()
            .iter()
            .take(prefix / BITS_PER_OCTET)
            .rev()
            .map(|octet| octet.to_string())
            .collect(),
        IpAddr::V6(addr) => ipv6_nibbles(&addr)[..prefix / BITS_PER_NIBBLE]
            .iter()
            .rev()
            .map(|nibble| format!("{:x}", nibble))
            .collect(),
    };

    Ok(format!(
        "{}{}",
        labels.join("."),
        IpFamily::of(&net.addr()).arpa_suffix()
    ))
}

/// Turns a reverse zone name back into the CIDR block it covers.
///
/// The name is matched case-insensitively and the trailing dot is optional.
pub fn parse_reverse_zone_name(name: &str) -> Result<String, ReverseDnsError> {
    let fqdn = normalize_name(name);
    let (family, labels) = split_reverse_name(&fqdn)
        .ok_or_else(|| ReverseDnsError::UnsupportedSuffix(name.to_string()))?;

    match family {
        IpFamily::V4 => {
            if !(1..=IPV4_MAX_ZONE_LABELS).contains(&labels.len()) {
                return Err(ReverseDnsError::UnsupportedLabelCount {
                    name: name.to_string(),
                    expected: "1 to 3 labels",
                    got: labels.len(),
                });
            }

            let mut octets = [0u8; 4];
            for (octet, label) in octets.iter_mut().zip(labels.iter().rev()) {
                *octet = parse_octet(label)?;
            }

            Ok(format!(
                "{}/{}",
                Ipv4Addr::from(octets),
                labels.len() * BITS_PER_OCTET
            ))
        }
        IpFamily::V6 => {
            let nibbles = labels
                .iter()
                .rev()
                .map(|label| parse_nibble(name, label))
                .collect::<Result<Vec<u8>, _>>()?;

            if !(1..=IPV6_MAX_ZONE_LABELS).contains(&nibbles.len()) {
                return Err(ReverseDnsError::UnsupportedLabelCount {
                    name: name.to_string(),
                    expected: "1 to 31 labels",
                    got: nibbles.len(),
                });
            }

            Ok(format!(
                "{}/{}",
                ipv6_from_nibbles(&nibbles),
                nibbles.len() * BITS_PER_NIBBLE
            ))
        }
    }
}

/// Returns the reversed labels of an address without the arpa suffix, e.g.
/// `192.168.1.10` becomes `10.1.168.192`.
pub fn get_ptr_record_name(ip: &str) -> Result<String, ReverseDnsError> {
    let addr: IpAddr = ip.trim().parse().map_err(|_| ReverseDnsError::MalformedInput {
        expected: "IP",
        input: ip.to_string(),
    })?;

    Ok(ptr_labels(&addr).join("."))
}

/// The arpa suffix, with its leading dot, that completes a PTR owner name.
pub fn ptr_record_suffix(ip: &IpAddr) -> &'static str {
    IpFamily::of(ip).arpa_suffix()
}

/// Fully qualified owner name of the PTR record for `ip`.
pub fn get_ptr_owner_name(ip: &IpAddr) -> String {
    format!("{}{}", ptr_labels(ip).join("."), ptr_record_suffix(ip))
}

/// Parses a full PTR owner name back into the address it names.
pub fn parse_ptr_record_name(name: &str) -> Result<IpAddr, ReverseDnsError> {
    let fqdn = normalize_name(name);
    let (family, labels) = split_reverse_name(&fqdn)
        .ok_or_else(|| ReverseDnsError::UnsupportedSuffix(name.to_string()))?;

    match family {
        IpFamily::V4 => {
            if labels.len() != IPV4_PTR_LABELS {
                return Err(ReverseDnsError::UnsupportedLabelCount {
                    name: name.to_string(),
                    expected: "4 labels",
                    got: labels.len(),
                });
            }

            let mut octets = [0u8; 4];
            for (octet, label) in octets.iter_mut().zip(labels.iter().rev()) {
                *octet = parse_octet(label)?;
            }
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        IpFamily::V6 => {
            if labels.len() != IPV6_PTR_LABELS {
                return Err(ReverseDnsError::UnsupportedLabelCount {
                    name: name.to_string(),
                    expected: "32 labels",
                    got: labels.len(),
                });
            }

            let nibbles = labels
                .iter()
                .rev()
                .map(|label| parse_nibble(name, label))
                .collect::<Result<Vec<u8>, _>>()?;
            Ok(IpAddr::V6(ipv6_from_nibbles(&nibbles)))
        }
    }
}

/// Parses a CIDR block and checks its prefix length against what a reverse
/// zone can cover.
pub(crate) fn parse_zone_cidr(cidr: &str) -> Result<IpNet, ReverseDnsError> {
    let net: IpNet = cidr.parse().map_err(|_| ReverseDnsError::MalformedInput {
        expected: "CIDR",
        input: cidr.to_string(),
    })?;

    let prefix = net.prefix_len();
    let supported = match net {
        IpNet::V4(_) => IPV4_ZONE_PREFIX_LENGTHS.contains(&prefix),
        IpNet::V6(_) => {
            prefix % IPV6_PREFIX_STEP == 0
                && (IPV6_MIN_PREFIX_LENGTH..=IPV6_MAX_PREFIX_LENGTH).contains(&prefix)
        }
    };

    if !supported {
        return Err(ReverseDnsError::UnsupportedPrefixLength {
            family: IpFamily::of(&net.addr()),
            prefix,
        });
    }

    Ok(net)
}

/// Name of the JSON type of `value`, in the wording used by type mismatch
/// errors.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn normalize_name(name: &str) -> String {
    let mut fqdn = name.trim().to_ascii_lowercase();
    if !fqdn.ends_with('.') {
        fqdn.push('.');
    }
    fqdn
}

/// Splits a normalized reverse name into its family and the labels in front
/// of the arpa suffix, in DNS order.
fn split_reverse_name(fqdn: &str) -> Option<(IpFamily, Vec<&str>)> {
    [IpFamily::V4, IpFamily::V6].into_iter().find_map(|family| {
        fqdn.strip_suffix(family.arpa_suffix())
            .map(|rest| (family, rest.split('.').collect()))
    })
}

fn ptr_labels(ip: &IpAddr) -> Vec<String> {
    match ip {
        IpAddr::V4(addr) => addr.octets().iter().rev().map(|o| o.to_string()).collect(),
        IpAddr::V6(addr) => ipv6_nibbles(addr)
            .iter()
            .rev()
            .map(|nibble| format!("{:x}", nibble))
            .collect(),
    }
}

/// The 32 nibbles of an IPv6 address, most significant first.
fn ipv6_nibbles(addr: &Ipv6Addr) -> Vec<u8> {
    addr.octets()
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .collect()
}

/// Builds an address from leading nibbles, zero-filling the rest.
fn ipv6_from_nibbles(nibbles: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    for (i, nibble) in nibbles.iter().enumerate() {
        if i % 2 == 0 {
            octets[i / 2] |= nibble << 4;
        } else {
            octets[i / 2] |= nibble;
        }
    }
    Ipv6Addr::from(octets)
}

fn parse_octet(label: &str) -> Result<u8, ReverseDnsError> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReverseDnsError::MalformedInput {
            expected: "IPv4 octet",
            input: label.to_string(),
        });
    }

    label.parse().map_err(|_| ReverseDnsError::MalformedInput {
        expected: "IPv4 octet",
        input: label.to_string(),
    })
}

fn parse_nibble(name: &str, label: &str) -> Result<u8, ReverseDnsError> {
    let mut chars = label.chars();
    match (chars.next().and_then(|c| c.to_digit(16)), chars.next()) {
        (Some(digit), None) => Ok(digit as u8),
        _ => Err(ReverseDnsError::InvalidNibble {
            name: name.to_string(),
            label: label.to_string(),
        }),
    }
}
