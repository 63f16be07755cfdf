//! IP2Location BIN database reader.
//!
//! The file is loaded into memory once and queried with a binary search over
//! the fixed-width row table. Layout (all integers little-endian):
//!
//! ```text
//! offset  size  field
//!      0     1  database type (DB1..DB26)
//!      1     1  column count per row
//!      2     3  build date (yy, mm, dd)
//!      5     4  IPv4 row count
//!      9     4  IPv4 table base address (1-based)
//!     13     4  IPv6 row count
//!     17     4  IPv6 table base address (1-based)
//!     21     4  IPv4 index base address (1-based, 0 = no index)
//!     25     4  IPv6 index base address (1-based, 0 = no index)
//! ```
//!
//! A row starts with the range's first address (4 bytes for IPv4, 16 for
//! IPv6) followed by 4-byte pointers to length-prefixed strings. The range
//! ends where the next row begins. The optional index maps the top 16 bits
//! of an address to the (low, high) row bounds to search.
//!
//! IPv6 addresses that carry an IPv4 address (`::ffff:0:0/96` mapped,
//! `2002::/16` 6to4, `2001:0::/32` Teredo) are looked up in the IPv4 table.

use bytes::Bytes;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GeoError, GeoResult};
use crate::{GeoLocation, GeoLocator};

const HEADER_LEN: usize = 29;

/// Column positions (1-based, column 1 is the range start) for DB3 and up.
const COUNTRY_COLUMN: usize = 2;
const REGION_COLUMN: usize = 3;
const CITY_COLUMN: usize = 4;

/// Offset of the long country name from the short code's pointer.
const COUNTRY_LONG_OFFSET: usize = 3;

/// Placeholder used by the lite databases for unknown fields.
const UNKNOWN: &str = "-";

/// Parsed database header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbHeader {
    pub db_type: u8,
    pub db_column: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub ipv4_count: u32,
    ipv4_base: usize,
    pub ipv6_count: u32,
    ipv6_base: usize,
    ipv4_index_base: usize,
    ipv6_index_base: usize,
}

impl DbHeader {
    fn parse(data: &[u8]) -> GeoResult<Self> {
        if data.len() < HEADER_LEN {
            return Err(GeoError::InvalidDatabase(
                "Not enough data for header".to_string(),
            ));
        }

        let u32_at = |pos: usize| {
            u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
        };
        // Base addresses are stored 1-based.
        let base_at = |pos: usize| (u32_at(pos) as usize).saturating_sub(1);
        let index_at = |pos: usize| match u32_at(pos) {
            0 => 0,
            addr => addr as usize - 1,
        };

        let header = Self {
            db_type: data[0],
            db_column: data[1],
            year: data[2],
            month: data[3],
            day: data[4],
            ipv4_count: u32_at(5),
            ipv4_base: base_at(9),
            ipv6_count: u32_at(13),
            ipv6_base: base_at(17),
            ipv4_index_base: index_at(21),
            ipv6_index_base: index_at(25),
        };

        if header.db_type < 3 || (header.db_column as usize) < CITY_COLUMN {
            return Err(GeoError::InvalidDatabase(format!(
                "DB{} with {} columns carries no city data",
                header.db_type, header.db_column
            )));
        }

        Ok(header)
    }

    pub fn has_ipv6(&self) -> bool {
        self.ipv6_count > 0
    }

    fn has_ipv4_index(&self) -> bool {
        self.ipv4_index_base > 0
    }

    fn has_ipv6_index(&self) -> bool {
        self.ipv6_index_base > 0
    }
}

/// Which row table a lookup runs against.
#[derive(Debug, Clone, Copy)]
enum Family {
    V4,
    V6,
}

impl Family {
    fn address_width(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }
}

/// An in-memory IP2Location database.
#[derive(Debug, Clone)]
pub struct Ip2LocationDb {
    data: Bytes,
    header: DbHeader,
}

impl Ip2LocationDb {
    /// Load a BIN file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> GeoResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let db = Self::from_bytes(Bytes::from(data))?;

        info!(
            path = %path.display(),
            db_type = db.header.db_type,
            build = %format!("20{:02}-{:02}-{:02}", db.header.year, db.header.month, db.header.day),
            ipv4_rows = db.header.ipv4_count,
            ipv6_rows = db.header.ipv6_count,
            "Loaded IP2Location database"
        );

        Ok(db)
    }

    /// Wrap an already loaded database image.
    pub fn from_bytes(data: Bytes) -> GeoResult<Self> {
        let header = DbHeader::parse(&data)?;
        Ok(Self { data, header })
    }

    pub fn header(&self) -> &DbHeader {
        &self.header
    }

    /// Look up a parsed address.
    pub fn lookup(&self, addr: IpAddr) -> GeoResult<GeoLocation> {
        let row = match addr {
            IpAddr::V4(v4) => self.find_v4(v4)?,
            IpAddr::V6(v6) => match embedded_ipv4(v6) {
                Some(v4) => self.find_v4(v4)?,
                None => self.find_v6(v6)?,
            },
        };

        let Some((row, family)) = row else {
            return Err(GeoError::NotFound(addr.to_string()));
        };

        let location = self.read_location(row, family)?;
        if location.country_code == UNKNOWN || location.city_name == UNKNOWN {
            return Err(GeoError::NotFound(addr.to_string()));
        }

        debug!(ip = %addr, city = %location.city_name, country = %location.country_code, "Resolved IP address");
        Ok(location)
    }

    fn find_v4(&self, addr: Ipv4Addr) -> GeoResult<Option<(usize, Family)>> {
        let mut ipno = u32::from(addr) as u128;
        if ipno == u32::MAX as u128 {
            ipno -= 1;
        }

        let (low, high) = if self.header.has_ipv4_index() {
            let entry = self.header.ipv4_index_base + ((ipno >> 16) as usize) * 8;
            (self.read_u32(entry)? as usize, self.read_u32(entry + 4)? as usize)
        } else {
            (0, self.header.ipv4_count as usize)
        };

        self.search(
            Family::V4,
            self.header.ipv4_base,
            self.header.ipv4_count as usize,
            ipno,
            low,
            high,
        )
    }

    fn find_v6(&self, addr: Ipv6Addr) -> GeoResult<Option<(usize, Family)>> {
        if !self.header.has_ipv6() {
            return Err(GeoError::Ipv6Unsupported(addr.to_string()));
        }

        let mut ipno = u128::from(addr);
        if ipno == u128::MAX {
            ipno -= 1;
        }

        let (low, high) = if self.header.has_ipv6_index() {
            let entry = self.header.ipv6_index_base + ((ipno >> 112) as usize) * 8;
            (self.read_u32(entry)? as usize, self.read_u32(entry + 4)? as usize)
        } else {
            (0, self.header.ipv6_count as usize)
        };

        self.search(
            Family::V6,
            self.header.ipv6_base,
            self.header.ipv6_count as usize,
            ipno,
            low,
            high,
        )
    }

    /// Binary search for the row whose range holds `ipno`.
    ///
    /// Row `i` covers `[from(i), from(i + 1))`, so the last row in the table
    /// only terminates the range before it.
    fn search(
        &self,
        family: Family,
        base: usize,
        count: usize,
        ipno: u128,
        low: usize,
        high: usize,
    ) -> GeoResult<Option<(usize, Family)>> {
        if count < 2 {
            return Ok(None);
        }

        let row_size = self.row_size(family);
        let mut low = low;
        let mut high = high.min(count - 2);

        while low <= high {
            let mid = low + (high - low) / 2;
            let row = base + mid * row_size;

            let ip_from = self.read_address(row, family)?;
            let ip_to = self.read_address(row + row_size, family)?;

            if ipno >= ip_from && ipno < ip_to {
                return Ok(Some((row, family)));
            }

            if ipno < ip_from {
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }

        Ok(None)
    }

    fn row_size(&self, family: Family) -> usize {
        self.header.db_column as usize * 4 + family.address_width() - 4
    }

    fn column_pointer(&self, row: usize, family: Family, column: usize) -> GeoResult<usize> {
        let pos = row + family.address_width() + 4 * (column - 2);
        Ok(self.read_u32(pos)? as usize)
    }

    fn read_location(&self, row: usize, family: Family) -> GeoResult<GeoLocation> {
        let country = self.column_pointer(row, family, COUNTRY_COLUMN)?;
        let region = self.column_pointer(row, family, REGION_COLUMN)?;
        let city = self.column_pointer(row, family, CITY_COLUMN)?;

        Ok(GeoLocation {
            country_code: self.read_string(country)?,
            country_name: self.read_string(country + COUNTRY_LONG_OFFSET)?,
            region_name: self.read_string(region)?,
            city_name: self.read_string(city)?,
        })
    }

    fn read_u32(&self, pos: usize) -> GeoResult<u32> {
        let bytes = self
            .data
            .get(pos..pos + 4)
            .ok_or_else(|| out_of_bounds(pos))?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_address(&self, pos: usize, family: Family) -> GeoResult<u128> {
        match family {
            Family::V4 => self.read_u32(pos).map(u128::from),
            Family::V6 => {
                let bytes = self
                    .data
                    .get(pos..pos + 16)
                    .ok_or_else(|| out_of_bounds(pos))?;
                let mut buf = [0u8; 16];
                buf.copy_from_slice(bytes);
                Ok(u128::from_le_bytes(buf))
            }
        }
    }

    /// Read a string stored as a length byte followed by the text.
    fn read_string(&self, pos: usize) -> GeoResult<String> {
        let len = *self.data.get(pos).ok_or_else(|| out_of_bounds(pos))? as usize;
        let bytes = self
            .data
            .get(pos + 1..pos + 1 + len)
            .ok_or_else(|| out_of_bounds(pos))?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// The IPv4 address carried inside a mapped, 6to4 or Teredo IPv6 address.
fn embedded_ipv4(addr: Ipv6Addr) -> Option<Ipv4Addr> {
    if let Some(v4) = addr.to_ipv4_mapped() {
        return Some(v4);
    }

    let bits = u128::from(addr);
    match addr.segments() {
        // 6to4: 2002:AABB:CCDD::/48
        [0x2002, ..] => Some(Ipv4Addr::from((bits >> 80) as u32)),
        // Teredo: client address is the inverted low 32 bits
        [0x2001, 0x0000, ..] => Some(Ipv4Addr::from(!(bits as u32))),
        _ => None,
    }
}

fn out_of_bounds(pos: usize) -> GeoError {
    GeoError::InvalidDatabase(format!("Read past end of file at offset {}", pos))
}

impl GeoLocator for Ip2LocationDb {
    fn locate(&self, ip: &str) -> GeoResult<GeoLocation> {
        let addr: IpAddr = ip
            .trim()
            .parse()
            .map_err(|_| GeoError::InvalidIpAddress(ip.to_string()))?;
        self.lookup(addr)
    }
}
