//! IPv4 CIDR arithmetic for carving subnets out of a VPC range

use crate::error::{AwsError, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Smallest and largest prefix lengths AWS accepts for VPCs and subnets
pub const MIN_MASK: u8 = 16;
pub const MAX_MASK: u8 = 28;

/// An IPv4 CIDR block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    network: u32,
    mask: u8,
}

impl CidrBlock {
    pub fn new(network: Ipv4Addr, mask: u8) -> Result<Self> {
        if mask > 32 {
            return Err(AwsError::InvalidCidr(format!("{}/{}", network, mask)));
        }
        let raw = u32::from(network);
        if raw & !Self::netmask(mask) != 0 {
            return Err(AwsError::InvalidCidr(format!(
                "{}/{} has host bits set",
                network, mask
            )));
        }
        Ok(Self { network: raw, mask })
    }

    fn netmask(mask: u8) -> u32 {
        if mask == 0 { 0 } else { u32::MAX << (32 - mask) }
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - self.mask)
    }

    fn first(&self) -> u64 {
        u64::from(self.network)
    }

    fn end(&self) -> u64 {
        self.first() + self.size()
    }
}

impl FromStr for CidrBlock {
    type Err = AwsError;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, mask) = s
            .split_once('/')
            .ok_or_else(|| AwsError::InvalidCidr(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| AwsError::InvalidCidr(s.to_string()))?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| AwsError::InvalidCidr(s.to_string()))?;
        Self::new(addr, mask)
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.mask)
    }
}

/// Hands out consecutive subnets of a VPC range
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    block: CidrBlock,
    next: u64,
}

impl NetworkBuilder {
    pub fn new(cidr: &str) -> Result<Self> {
        let block: CidrBlock = cidr.parse()?;
        if !(MIN_MASK..=MAX_MASK).contains(&block.mask()) {
            return Err(AwsError::InvalidCidr(format!(
                "VPC range {} must have a prefix between /{} and /{}",
                block, MIN_MASK, MAX_MASK
            )));
        }
        Ok(Self {
            next: block.first(),
            block,
        })
    }

    pub fn block(&self) -> CidrBlock {
        self.block
    }

    /// Prefix length that splits the remaining space into `count` equal subnets
    pub fn mask_for_remaining_subnets(&self, count: usize) -> Result<u8> {
        if count == 0 {
            return Err(AwsError::InvalidVpc("no subnets requested".to_string()));
        }
        let remaining = self.block.end().saturating_sub(self.next);
        let per_subnet = remaining / count as u64;
        if per_subnet == 0 {
            return Err(AwsError::AddressSpaceExhausted(format!(
                "{} subnets do not fit in {}",
                count, self.block
            )));
        }
        let bits = 63 - per_subnet.leading_zeros() as u8;
        Ok(32 - bits)
    }

    /// Allocates the next subnet of the given prefix length
    pub fn add_subnet(&mut self, mask: u8) -> Result<CidrBlock> {
        if mask < self.block.mask() || !(MIN_MASK..=MAX_MASK).contains(&mask) {
            return Err(AwsError::InvalidCidr(format!(
                "subnet prefix /{} is not valid inside {}",
                mask, self.block
            )));
        }

        let size = 1u64 << (32 - mask);
        let start = self.next.div_ceil(size) * size;
        if start + size > self.block.end() {
            return Err(AwsError::AddressSpaceExhausted(format!(
                "no room for a /{} subnet in {}",
                mask, self.block
            )));
        }

        self.next = start + size;
        CidrBlock::new(Ipv4Addr::from(start as u32), mask)
    }
}
