//! Lightning events and their aggregation over a day.

pub mod product;

pub use product::{day_prefixes, GlmFileName, Satellite};

#[derive(Debug, Clone, Copy, PartialEq)]
/// A single optical event detected by the GLM.
pub struct GlmEvent {
    /// Degrees north.
    pub lat: f32,
    /// Degrees east.
    pub lon: f32,
    /// Radiant energy in joules, NaN when missing.
    pub energy: f32,
}

impl GlmEvent {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// `log10` of the energy, `None` when it cannot be coloured.
    pub fn log_energy(&self) -> Option<f32> {
        (self.energy.is_finite() && self.energy > 0.0).then(|| self.energy.log10())
    }
}

#[derive(Debug, Default)]
/// All events of a day, in the order their files were read.
pub struct DayEvents {
    events: Vec<GlmEvent>,
    files: usize,
}

impl DayEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_file(&mut self, events: Vec<GlmEvent>) {
        self.events.extend(events);
        self.files += 1;
    }

    pub fn events(&self) -> &[GlmEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn files(&self) -> usize {
        self.files
    }

    /// Min and max of `log10(energy)` over events that have one.
    pub fn energy_range(&self) -> Option<(f32, f32)> {
        self.events
            .iter()
            .filter_map(GlmEvent::log_energy)
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// -- Tests -------------------------------------------------------------------
