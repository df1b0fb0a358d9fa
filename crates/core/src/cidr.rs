//! IPv4 capacity arithmetic for subnet sizing.
//!
//! Capacity counts raw block sizes (`2^(32-mask)`), network and broadcast
//! addresses included; allocation accounting never uses usable-host counts.

use std::net::{IpAddr, Ipv4Addr};

use ipnet::Ipv4Net;

use crate::Error;

/// Address count implied by a mask length.
pub fn subnet_size_from_mask(mask: u8) -> Result<u64, Error> {
    if mask > 32 {
        return Err(Error::InvalidMaskLength(mask));
    }
    Ok(1u64 << (32 - u32::from(mask)))
}

/// Sum of address counts across a CIDR list.
pub fn total_addresses_from_cidrs(cidrs: &[String]) -> Result<u64, Error> {
    let mut total = 0u64;
    for cidr in cidrs {
        let net: Ipv4Net = cidr
            .parse()
            .map_err(|_| Error::InvalidCidr(cidr.clone()))?;
        total += 1u64 << (32 - u32::from(net.prefix_len()));
    }
    Ok(total)
}

/// `"1.2.3.4/24"` -> `"1.2.3.4"`.
pub fn strip_ip_prefix(address: &str) -> Result<String, Error> {
    let ip = address.split('/').next().unwrap_or(address);
    ip.parse::<IpAddr>()
        .map_err(|_| Error::InvalidIp(address.to_string()))?;
    Ok(ip.to_string())
}

/// `"1.2.3.4/24"` -> `24`.
pub fn ip_prefix_len(address: &str) -> Result<u8, Error> {
    address
        .split('/')
        .nth(1)
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|len| *len <= 32)
        .ok_or_else(|| Error::InvalidCidr(address.to_string()))
}

/// Dotted-decimal mask for a prefix length, e.g. `24` -> `"255.255.255.0"`.
pub fn subnet_mask_from_len(len: u8) -> Result<String, Error> {
    if len > 32 {
        return Err(Error::InvalidMaskLength(len));
    }
    let bits = if len == 0 { 0 } else { u32::MAX << (32 - u32::from(len)) };
    Ok(Ipv4Addr::from(bits).to_string())
}
