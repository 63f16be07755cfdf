//! Test data generators.
//!
//! Builds small IP2Location DB3 images so geolocation lookups can be tested
//! without the multi-megabyte lite database.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One range of a synthetic database. The family of `from` picks the table.
#[derive(Debug, Clone)]
pub struct GeoRange {
    pub from: IpAddr,
    pub country_code: String,
    pub country_name: String,
    pub region_name: String,
    pub city_name: String,
}

impl GeoRange {
    pub fn new(from: [u8; 4], country_code: &str, country_name: &str, region_name: &str, city_name: &str) -> Self {
        Self {
            from: IpAddr::V4(Ipv4Addr::from(from)),
            country_code: country_code.to_string(),
            country_name: country_name.to_string(),
            region_name: region_name.to_string(),
            city_name: city_name.to_string(),
        }
    }

    pub fn new_v6(from: Ipv6Addr, country_code: &str, country_name: &str, region_name: &str, city_name: &str) -> Self {
        Self {
            from: IpAddr::V6(from),
            ..Self::new([0, 0, 0, 0], country_code, country_name, region_name, city_name)
        }
    }

    /// A range the lite database marks as unknown ("-" everywhere).
    pub fn unknown(from: [u8; 4]) -> Self {
        Self::new(from, "-", "-", "-", "-")
    }

    pub fn unknown_v6(from: Ipv6Addr) -> Self {
        Self::new_v6(from, "-", "-", "-", "-")
    }

    fn start(&self) -> u128 {
        match self.from {
            IpAddr::V4(v4) => u128::from(u32::from(v4)),
            IpAddr::V6(v6) => u128::from(v6),
        }
    }
}

/// Builds a DB3 BIN image.
///
/// IPv4 and IPv6 ranges go to their own tables. Within a family, ranges must
/// be sorted by start address and the first should start at the zero
/// address. Each table gets a terminating row at the family's highest
/// address. The IPv6 table is only written when an IPv6 range was added.
///
/// # Example
///
/// ```
/// use test_utils::{GeoRange, Ip2LocationBuilder};
///
/// let bin = Ip2LocationBuilder::new()
///     .range(GeoRange::unknown([0, 0, 0, 0]))
///     .range(GeoRange::new([8, 8, 8, 0], "US", "United States of America", "California", "Mountain View"))
///     .build();
/// assert_eq!(bin[0], 3);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Ip2LocationBuilder {
    ranges: Vec<GeoRange>,
    with_index: bool,
}

const HEADER_LEN: usize = 64;
const COLUMNS: usize = 4;
const V4_ROW_SIZE: usize = COLUMNS * 4;
const V6_ROW_SIZE: usize = COLUMNS * 4 + 12;
const INDEX_ENTRIES: usize = 65536;
const INDEX_LEN: usize = INDEX_ENTRIES * 8;

/// Placement of one family's row table inside the image.
struct Table<'a> {
    ranges: Vec<&'a GeoRange>,
    address_width: usize,
    row_size: usize,
    rows_start: usize,
    /// Shift that leaves the top 16 bits of an address.
    index_shift: u32,
    index_start: Option<usize>,
    max_address: u128,
}

impl Table<'_> {
    fn row_count(&self) -> usize {
        self.ranges.len() + 1
    }

    fn len(&self) -> usize {
        self.row_count() * self.row_size
    }

    fn write_rows(&self, out: &mut [u8], strings: &mut StringTable) {
        for (i, range) in self.ranges.iter().enumerate() {
            let row = self.rows_start + i * self.row_size;
            let country = strings.country(&range.country_code, &range.country_name);
            let region = strings.text(&range.region_name);
            let city = strings.text(&range.city_name);

            put_address(out, row, range.start(), self.address_width);
            let columns = row + self.address_width;
            put_u32(out, columns, country);
            put_u32(out, columns + 4, region);
            put_u32(out, columns + 8, city);
        }

        let last = self.rows_start + self.ranges.len() * self.row_size;
        put_address(out, last, self.max_address, self.address_width);
    }

    /// For each 16-bit prefix, record the first and last row that can hold it.
    fn write_index(&self, out: &mut [u8]) {
        let Some(index_start) = self.index_start else {
            return;
        };
        let starts: Vec<u128> = self.ranges.iter().map(|r| r.start()).collect();
        let last_row = self.ranges.len().saturating_sub(1);
        let span = (1u128 << self.index_shift) - 1;

        for prefix in 0..INDEX_ENTRIES {
            let lo_ip = (prefix as u128) << self.index_shift;
            let hi_ip = lo_ip | span;
            let low = starts.iter().rposition(|&s| s <= lo_ip).unwrap_or(0);
            let high = starts.iter().rposition(|&s| s <= hi_ip).unwrap_or(last_row);

            let entry = index_start + prefix * 8;
            put_u32(out, entry, low as u32);
            put_u32(out, entry + 4, high as u32);
        }
    }
}

impl Ip2LocationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, range: GeoRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Emit the first-level index tables as well.
    pub fn with_index(mut self) -> Self {
        self.with_index = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let v4_ranges: Vec<&GeoRange> = self.ranges.iter().filter(|r| r.from.is_ipv4()).collect();
        let v6_ranges: Vec<&GeoRange> = self.ranges.iter().filter(|r| r.from.is_ipv6()).collect();
        let has_v6 = !v6_ranges.is_empty();

        // Layout: header, IPv4 index, IPv6 index, IPv4 rows, IPv6 rows, strings
        let v4_index = self.with_index.then_some(HEADER_LEN);
        let v6_index = (self.with_index && has_v6).then_some(HEADER_LEN + INDEX_LEN);
        let indexes_end = HEADER_LEN
            + v4_index.map_or(0, |_| INDEX_LEN)
            + v6_index.map_or(0, |_| INDEX_LEN);

        let v4 = Table {
            ranges: v4_ranges,
            address_width: 4,
            row_size: V4_ROW_SIZE,
            rows_start: indexes_end,
            index_shift: 16,
            index_start: v4_index,
            max_address: u128::from(u32::MAX),
        };
        let v6 = Table {
            ranges: v6_ranges,
            address_width: 16,
            row_size: V6_ROW_SIZE,
            rows_start: v4.rows_start + v4.len(),
            index_shift: 112,
            index_start: v6_index,
            max_address: u128::MAX,
        };
        let strings_start = if has_v6 { v6.rows_start + v6.len() } else { v6.rows_start };

        let mut out = vec![0u8; strings_start];

        // Header (base addresses are 1-based)
        out[0] = 3;
        out[1] = COLUMNS as u8;
        out[2] = 24;
        out[3] = 1;
        out[4] = 1;
        put_u32(&mut out, 5, v4.row_count() as u32);
        put_u32(&mut out, 9, v4.rows_start as u32 + 1);
        if has_v6 {
            put_u32(&mut out, 13, v6.row_count() as u32);
            put_u32(&mut out, 17, v6.rows_start as u32 + 1);
        }
        put_u32(&mut out, 21, v4_index.map_or(0, |pos| pos as u32 + 1));
        put_u32(&mut out, 25, v6_index.map_or(0, |pos| pos as u32 + 1));

        let mut strings = StringTable::new(strings_start);

        v4.write_rows(&mut out, &mut strings);
        v4.write_index(&mut out);
        if has_v6 {
            v6.write_rows(&mut out, &mut strings);
            v6.write_index(&mut out);
        }

        out.extend_from_slice(&strings.bytes);
        out
    }
}

fn put_address(buf: &mut [u8], pos: usize, value: u128, width: usize) {
    buf[pos..pos + width].copy_from_slice(&value.to_le_bytes()[..width]);
}

fn put_u32(buf: &mut [u8], pos: usize, value: u32) {
    buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

/// Interned length-prefixed strings placed after the row table.
struct StringTable {
    base: usize,
    bytes: Vec<u8>,
    seen: HashMap<String, u32>,
}

impl StringTable {
    fn new(base: usize) -> Self {
        Self {
            base,
            bytes: Vec::new(),
            seen: HashMap::new(),
        }
    }

    fn push(&mut self, value: &str) -> u32 {
        let pos = (self.base + self.bytes.len()) as u32;
        self.bytes.push(value.len() as u8);
        self.bytes.extend_from_slice(value.as_bytes());
        pos
    }

    fn text(&mut self, value: &str) -> u32 {
        if let Some(&pos) = self.seen.get(value) {
            return pos;
        }
        let pos = self.push(value);
        self.seen.insert(value.to_string(), pos);
        pos
    }

    /// Short code padded to 3 bytes, immediately followed by the long name.
    fn country(&mut self, code: &str, name: &str) -> u32 {
        let key = format!("country:{}", code);
        if let Some(&pos) = self.seen.get(&key) {
            return pos;
        }
        let pos = (self.base + self.bytes.len()) as u32;
        self.bytes.push(code.len() as u8);
        let mut padded = code.as_bytes().to_vec();
        padded.resize(2, b' ');
        self.bytes.extend_from_slice(&padded[..2]);
        self.push(name);
        self.seen.insert(key, pos);
        pos
    }
}

/// The ranges used by most geolocation tests.
pub fn sample_geo_ranges() -> Vec<GeoRange> {
    vec![
        GeoRange::unknown([0, 0, 0, 0]),
        GeoRange::new([103, 48, 198, 0], "IN", "India", "Delhi", "Delhi"),
        GeoRange::unknown([103, 48, 199, 0]),
        GeoRange::new([108, 30, 178, 0], "US", "United States of America", "New York", "New York City"),
        GeoRange::unknown([108, 30, 179, 0]),
        GeoRange::new([203, 0, 113, 0], "AU", "Australia", "", "Sydney"),
        GeoRange::unknown([203, 0, 114, 0]),
    ]
}

/// IPv6 ranges for tests of the native IPv6 table.
pub fn sample_geo_ranges_v6() -> Vec<GeoRange> {
    vec![
        GeoRange::unknown_v6(Ipv6Addr::UNSPECIFIED),
        GeoRange::new_v6("2001:db8::".parse().unwrap(), "JP", "Japan", "Tokyo", "Tokyo"),
        GeoRange::unknown_v6("2001:db9::".parse().unwrap()),
        GeoRange::new_v6("2400:4050::".parse().unwrap(), "IN", "India", "Delhi", "Delhi"),
        GeoRange::unknown_v6("2400:4051::".parse().unwrap()),
    ]
}

/// A DB3 image holding both the IPv4 and IPv6 sample ranges.
pub fn sample_dual_stack_database(with_index: bool) -> Vec<u8> {
    let mut builder = Ip2LocationBuilder::new();
    if with_index {
        builder = builder.with_index();
    }
    sample_geo_ranges()
        .into_iter()
        .chain(sample_geo_ranges_v6())
        .fold(builder, |b, r| b.range(r))
        .build()
}

/// A DB3 image built from [`sample_geo_ranges`].
pub fn sample_geo_database(with_index: bool) -> Vec<u8> {
    let mut builder = Ip2LocationBuilder::new();
    if with_index {
        builder = builder.with_index();
    }
    sample_geo_ranges()
        .into_iter()
        .fold(builder, |b, r| b.range(r))
        .build()
}
