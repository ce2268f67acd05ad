//! Reads the lightning events of a GLM LCFA NetCDF file.
//!
//! The event fields are packed 16-bit integers with CF `scale_factor`,
//! `add_offset`, `_FillValue` and `_Unsigned` attributes.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use netcdf::{AttributeValue, Variable};

use crate::{error::GlmError, glm::GlmEvent};

pub const EVENT_LAT: &str = "event_lat";
pub const EVENT_LON: &str = "event_lon";
pub const EVENT_ENERGY: &str = "event_energy";

/// Load a GLM file and return its valid events.
pub fn read_events(file_path: &Path) -> Result<Vec<GlmEvent>> {
    let file = netcdf::open(file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;

    let lat = read_unpacked(&file, EVENT_LAT)?;
    let lon = read_unpacked(&file, EVENT_LON)?;
    let energy = read_unpacked(&file, EVENT_ENERGY)?;

    if lat.len() != lon.len() || lat.len() != energy.len() {
        return Err(GlmError::LengthMismatch {
            lat: lat.len(),
            lon: lon.len(),
            energy: energy.len(),
        }
        .into());
    }

    let events = lat
        .into_iter()
        .zip(lon)
        .zip(energy)
        .map(|((lat, lon), energy)| GlmEvent {
            lat: lat as f32,
            lon: lon as f32,
            energy: energy as f32,
        })
        .filter(GlmEvent::is_valid)
        .collect();

    Ok(events)
}

fn read_unpacked(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| GlmError::MissingVariable(name.to_string()))?;

    if var.len() == 0 {
        return Ok(Vec::new());
    }

    let packing = Packing::from_variable(&var)?;
    let raw: Vec<f64> = if packing.unsigned {
        var.get_values::<i16, _>(..)?
            .into_iter()
            .map(|v| v as f64)
            .collect()
    } else {
        var.get_values::<f64, _>(..)?
    };

    Ok(raw.into_iter().map(|v| packing.unpack(v)).collect())
}

#[derive(Debug, Clone, PartialEq)]
/// CF packing attributes of a variable.
struct Packing {
    scale: f64,
    offset: f64,
    fill: Option<f64>,
    unsigned: bool,
}

impl Default for Packing {
    fn default() -> Self {
        Packing {
            scale: 1.0,
            offset: 0.0,
            fill: None,
            unsigned: false,
        }
    }
}

impl Packing {
    fn from_variable(var: &Variable) -> Result<Self> {
        let number = |attr: &str| -> Result<Option<f64>> {
            match var.attribute_value(attr) {
                Some(value) => Ok(Some(attribute_to_f64(value?).with_context(|| {
                    format!("Attribute `{}` of `{}`", attr, var.name())
                })?)),
                None => Ok(None),
            }
        };

        let unsigned = match var.attribute_value("_Unsigned") {
            Some(value) => matches!(value?, AttributeValue::Str(s) if s.eq_ignore_ascii_case("true")),
            None => false,
        };

        Ok(Packing {
            scale: number("scale_factor")?.unwrap_or(1.0),
            offset: number("add_offset")?.unwrap_or(0.0),
            fill: number("_FillValue")?,
            unsigned,
        })
    }

    /// Maps a raw value as stored in the file to its physical value, NaN for fill.
    fn unpack(&self, raw: f64) -> f64 {
        if self.fill == Some(raw) {
            return f64::NAN;
        }
        let raw = if self.unsigned && raw < 0.0 {
            raw + 65536.0
        } else {
            raw
        };

        raw * self.scale + self.offset
    }
}

fn attribute_to_f64(value: AttributeValue) -> Result<f64> {
    let v = match value {
        AttributeValue::Double(v) => v,
        AttributeValue::Float(v) => v as f64,
        AttributeValue::Short(v) => v as f64,
        AttributeValue::Ushort(v) => v as f64,
        AttributeValue::Int(v) => v as f64,
        AttributeValue::Uint(v) => v as f64,
        AttributeValue::Schar(v) => v as f64,
        AttributeValue::Uchar(v) => v as f64,
        AttributeValue::Longlong(v) => v as f64,
        AttributeValue::Ulonglong(v) => v as f64,
        other => return Err(anyhow!("Expected a numeric attribute, found {:?}", other)),
    };

    Ok(v)
}

// -- Tests -------------------------------------------------------------------
