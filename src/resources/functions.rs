// Standard library
use std::net::{IpAddr, SocketAddr};

// 3rd party crates
use serde::Deserialize;

// Project imports
use crate::providers::powerdns::models::{Record, ResourceRecordSet, ZoneInfo};
use crate::providers::powerdns::PowerDnsError;

// Current module imports
use super::constants::{NS_RRSET_TTL, NS_TYPE, SLAVE_KIND, ZONE_KINDS};
use super::errors::ResourceError;

/// Canonical spelling of a zone kind (`native` becomes `Native`).
pub fn normalize_kind(kind: &str) -> Result<String, ResourceError> {
    ZONE_KINDS
        .iter()
        .find(|known| known.eq_ignore_ascii_case(kind.trim()))
        .map(|known| known.to_string())
        .ok_or_else(|| ResourceError::InvalidConfig {
            resource: "zone",
            reason: format!(
                "unknown zone kind {:?}, expected one of {}",
                kind,
                ZONE_KINDS.join(", ")
            ),
        })
}

pub fn is_slave(kind: &str) -> bool {
    kind.eq_ignore_ascii_case(SLAVE_KIND)
}

/// Checks one master entry: an IP address, optionally followed by a port.
pub fn validate_master(master: &str) -> Result<(), String> {
    if master.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    if let Ok(addr) = master.parse::<SocketAddr>() {
        return match addr.port() {
            0 => Err(format!("invalid port in master {:?}", master)),
            _ => Ok(()),
        };
    }

    if master.matches(':').count() > 1 {
        return Err(format!(
            "master {:?} has more than one colon; use [ip]:port for IPv6",
            master
        ));
    }

    let (ip, port) = master.split_once(':').unwrap_or((master, ""));
    if ip.parse::<IpAddr>().is_err() {
        return Err(format!("master {:?} is not an IP address", master));
    }
    match port.parse::<u16>() {
        Ok(port) if port > 0 => Ok(()),
        _ => Err(format!(
            "invalid port in master {:?}, must be between 1 and 65535",
            master
        )),
    }
}

/// Masters are required for Slave zones and rejected for every other kind.
pub fn validate_masters(kind: &str, masters: &[String]) -> Result<(), ResourceError> {
    let invalid = |reason: String| ResourceError::InvalidConfig {
        resource: "zone",
        reason,
    };

    if !is_slave(kind) {
        if !masters.is_empty() {
            return Err(invalid(format!("masters are only allowed for {} zones", SLAVE_KIND)));
        }
        return Ok(());
    }

    if masters.is_empty() {
        return Err(invalid(format!("{} zones require masters", SLAVE_KIND)));
    }

    masters
        .iter()
        .try_for_each(|master| validate_master(master))
        .map_err(invalid)
}

/// Lowercased, dot-terminated form of a DNS name.
pub fn fqdn(name: &str) -> String {
    let mut name = name.trim().to_ascii_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}

pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

/// Nameservers published in the zone's apex NS rrset.
pub fn zone_nameservers(zone: &ZoneInfo) -> Vec<String> {
    sorted(
        zone.rrsets
            .iter()
            .filter(|rrset| {
                rrset.r#type.eq_ignore_ascii_case(NS_TYPE)
                    && rrset.name.eq_ignore_ascii_case(&zone.name)
            })
            .flat_map(|rrset| rrset.records.iter().map(|record| record.content.clone()))
            .collect(),
    )
}

pub fn nameserver_rrset(zone: &str, nameservers: &[String]) -> ResourceRecordSet {
    ResourceRecordSet {
        name: zone.to_string(),
        r#type: NS_TYPE.to_string(),
        ttl: NS_RRSET_TTL,
        records: nameservers
            .iter()
            .map(|ns| Record {
                content: ns.clone(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

#[derive(Deserialize)]
struct ImportId {
    zone: String,
    id: String,
}

/// Splits a `{"zone": .., "id": ..}` import ID.
pub fn parse_import_id(id: &str) -> Result<(String, String), ResourceError> {
    let parsed: ImportId =
        serde_json::from_str(id).map_err(|e| ResourceError::InvalidImportId {
            id: id.to_string(),
            reason: format!("expected {{\"zone\": .., \"id\": ..}}: {}", e),
        })?;

    if parsed.zone.is_empty() || parsed.id.is_empty() {
        return Err(ResourceError::InvalidImportId {
            id: id.to_string(),
            reason: "zone and id must both be set".to_string(),
        });
    }

    Ok((parsed.zone, parsed.id))
}

/// Whether an API error carries one of the given server messages.
pub fn error_matches(error: &PowerDnsError, markers: &[&str]) -> bool {
    error
        .reason()
        .map(|reason| markers.iter().any(|marker| reason.contains(marker)))
        .unwrap_or(false)
}

/// Maps a missing object to `None`.
pub fn found<T>(result: Result<T, PowerDnsError>) -> Result<Option<T>, ResourceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(PowerDnsError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_title_cased() {
        for (input, expected) in [
            ("native", "Native"),
            ("MASTER", "Master"),
            ("Slave", "Slave"),
            (" sLaVe ", "Slave"),
        ] {
            assert_eq!(normalize_kind(input).unwrap(), expected);
        }
        assert!(normalize_kind("forwarded").is_err());
    }

    #[test]
    fn master_entries() {
        for ok in ["192.0.2.1", "192.0.2.1:5300", "2001:db8::1", "[2001:db8::1]:53"] {
            assert!(validate_master(ok).is_ok(), "{}", ok);
        }
        for bad in [
            "192.0.2.1:0",
            "192.0.2.1:65536",
            "192.0.2.1:port",
            "ns1.example.com",
            "ns1.example.com:53",
            "192.0.2.1:53:53",
        ] {
            assert!(validate_master(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn masters_only_for_slave_zones() {
        let masters = vec!["192.0.2.1".to_string()];
        assert!(validate_masters("Slave", &masters).is_ok());
        assert!(validate_masters("Native", &[]).is_ok());
        assert!(validate_masters("Native", &masters).is_err());
        assert!(validate_masters("Slave", &[]).is_err());
    }

    #[test]
    fn import_ids() {
        assert_eq!(
            parse_import_id(r#"{"zone": "example.com.", "id": "www.example.com.:::A"}"#).unwrap(),
            ("example.com.".to_string(), "www.example.com.:::A".to_string())
        );
        assert!(parse_import_id("www.example.com.:::A").is_err());
        assert!(parse_import_id(r#"{"zone": "", "id": "x"}"#).is_err());
    }

    #[test]
    fn names_are_fully_qualified() {
        assert_eq!(fqdn("Example.COM"), "example.com.");
        assert_eq!(fqdn("example.com."), "example.com.");
    }
}
