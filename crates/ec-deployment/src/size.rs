//! Conversion between user facing size strings (`"4g"`, `"512m"`, `"0.5g"`)
//! and the megabyte values used by the API.

use std::sync::LazyLock;

use ec_api::models::{SIZE_RESOURCE_MEMORY, TopologySize};
use regex::Regex;
use snafu::{OptionExt, ResultExt, Snafu, ensure};

/// The smallest non-zero size the platform accepts, in megabytes.
pub const MINIMUM_SIZE_MB: i32 = 512;

const MB_PER_GB: i32 = 1024;

static SIZE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(gb|g|mb|m)?\s*$").expect("failed to compile size regex")
});

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Eq, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("failed to convert {input:?} to <size><g|m>"))]
    InvalidFormat { input: String },

    #[snafu(display("failed to parse the numeric part of {input:?}"))]
    InvalidNumber {
        source: std::num::ParseFloatError,
        input: String,
    },

    #[snafu(display("size {input:?} does not resolve to a whole number of megabytes"))]
    FractionalMegabytes { input: String },

    #[snafu(display("size {input:?} is too large"))]
    TooLarge { input: String },

    #[snafu(display("size {input:?} is below the minimum of {MINIMUM_SIZE_MB}m"))]
    BelowMinimum { input: String },
}

/// Parses a memory size into megabytes.
///
/// Accepts `g`/`gb` and `m`/`mb` suffixes in any case. Numbers without a unit
/// are megabytes. `0` is allowed because it marks an unused topology element.
pub fn parse_memory(input: &str) -> Result<i32> {
    let captures = SIZE_REGEX
        .captures(input)
        .context(InvalidFormatSnafu { input })?;

    let number = captures.get(1).map_or("", |m| m.as_str());
    let number: f64 = number.parse().context(InvalidNumberSnafu { input })?;

    let multiplier = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(unit) if unit.starts_with('g') => f64::from(MB_PER_GB),
        _ => 1.0,
    };

    let megabytes = number * multiplier;
    ensure!(megabytes.fract() == 0.0, FractionalMegabytesSnafu { input });
    ensure!(megabytes <= f64::from(i32::MAX), TooLargeSnafu { input });

    let megabytes = megabytes as i32;
    ensure!(
        megabytes == 0 || megabytes >= MINIMUM_SIZE_MB,
        BelowMinimumSnafu { input }
    );

    Ok(megabytes)
}

/// Parses an optional size and its resource into a [`TopologySize`].
///
/// An empty size yields [`None`], meaning "keep whatever the template or the
/// existing topology has". The resource defaults to memory.
pub fn parse_size(size: Option<&str>, resource: Option<&str>) -> Result<Option<TopologySize>> {
    let Some(size) = size.filter(|size| !size.is_empty()) else {
        return Ok(None);
    };

    let resource = resource
        .filter(|resource| !resource.is_empty())
        .unwrap_or(SIZE_RESOURCE_MEMORY);

    Ok(Some(TopologySize::new(parse_memory(size)?, resource)))
}

/// Renders megabytes the way users write them: whole and half gigabytes with a
/// `g` suffix, everything else in megabytes.
pub fn memory_to_state(megabytes: i32) -> String {
    if megabytes % MB_PER_GB == 0 {
        format!("{}g", megabytes / MB_PER_GB)
    } else if megabytes % (MB_PER_GB / 2) == 0 {
        format!("{}.5g", megabytes / MB_PER_GB)
    } else {
        format!("{megabytes}m")
    }
}

/// Renders an API size into the `(size, size_resource)` pair kept in state.
pub fn size_to_state(size: Option<&TopologySize>) -> (Option<String>, Option<String>) {
    match size {
        Some(size) => (
            Some(memory_to_state(size.value_or_zero())),
            Some(
                size.resource
                    .clone()
                    .unwrap_or_else(|| SIZE_RESOURCE_MEMORY.to_owned()),
            ),
        ),
        None => (None, None),
    }
}
