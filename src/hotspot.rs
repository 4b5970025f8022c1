//! The hotspot controller.
//!
//! Orchestrates the pipeline: build the spherical kernel for the input's
//! spacing, convolve to a local-mean volume, locate the constrained
//! maximum, then rasterize a sphere at its world position. The result is
//! cached and recomputed only when a version counter of some input moved,
//! never on a clock.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::convolve::{convolve, BoundaryPolicy, ConvolveMethod, ConvolveOptions};
use crate::extrema::{allowed_region, find_extrema, Extrema};
use crate::geometry::IndexRegion;
use crate::kernel::Kernel;
use crate::mask::{fill_sphere_mask, MaskGenerator};
use crate::trace::{trace_error, trace_span};
use crate::util::{VoxPeakError, VoxPeakResult};
use crate::volume::{LabelVolume, VolumeSeries, Voxel};

/// Radius in millimetres of a sphere with a volume of one millilitre.
pub const DEFAULT_RADIUS_MM: f64 = 6.2035049089940;

/// Parameters of a hotspot search.
#[derive(Copy, Clone, Debug)]
pub struct HotspotConfig {
    /// Sphere radius in millimetres.
    pub radius_mm: f64,
    /// Keep candidate centers far enough from the border that the whole
    /// sphere fits inside the volume.
    pub completely_inside: bool,
    /// Label selecting the eligible voxels of the collaborator's mask.
    pub label: u16,
    /// Frame of the input series to search.
    pub time_step: usize,
    /// Convolution path selection.
    pub method: ConvolveMethod,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            radius_mm: DEFAULT_RADIUS_MM,
            completely_inside: true,
            label: 1,
            time_step: 0,
            method: ConvolveMethod::Auto,
        }
    }
}

/// Version counters of every mutable input, compared wholesale to decide
/// staleness.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
struct VersionStamp {
    input: u64,
    masker_slot: u64,
    masker_self: u64,
    radius: u64,
    inside: u64,
    label: u64,
    time_step: u64,
    method: u64,
}

/// Locates the hotspot of a volume series and rasterizes it as a mask.
///
/// The controller borrows its input, owns at most one cached output mask
/// and recomputes only when some input's version moved. Every setter bumps
/// the counter of the value it changes (and only on an actual change), so
/// repeated [`hotspot_mask`](Self::hotspot_mask) calls with unchanged
/// inputs return the cached mask. Taking `&mut self` for the computation
/// makes shared concurrent use impossible without an external lock.
pub struct HotspotMaskGenerator<'a, A> {
    input: Option<&'a VolumeSeries<A>>,
    masker: Option<Box<dyn MaskGenerator + 'a>>,
    config: HotspotConfig,
    versions: VersionStamp,
    computed: Option<VersionStamp>,
    cache: Option<LabelVolume>,
    extrema: Option<Extrema>,
    region: Option<IndexRegion>,
}

impl<'a, A: Voxel> HotspotMaskGenerator<'a, A> {
    /// Creates a generator with default parameters and no input.
    pub fn new() -> Self {
        Self {
            input: None,
            masker: None,
            config: HotspotConfig::default(),
            versions: VersionStamp::default(),
            computed: None,
            cache: None,
            extrema: None,
            region: None,
        }
    }

    /// Replaces the whole parameter set, builder style.
    pub fn with_config(mut self, config: HotspotConfig) -> Self {
        self.set_radius_mm(config.radius_mm);
        self.set_completely_inside(config.completely_inside);
        self.set_label(config.label);
        self.set_time_step(config.time_step);
        self.set_method(config.method);
        self
    }

    /// Returns the current parameters.
    pub fn config(&self) -> &HotspotConfig {
        &self.config
    }

    /// Sets the input series. A different reference than the current one
    /// counts as a change.
    pub fn set_input(&mut self, input: &'a VolumeSeries<A>) {
        let changed = match self.input {
            Some(current) => !std::ptr::eq(current, input),
            None => true,
        };
        if changed {
            self.input = Some(input);
            self.versions.input += 1;
        }
    }

    /// Installs the mask collaborator restricting the search.
    pub fn set_mask_generator(&mut self, masker: Box<dyn MaskGenerator + 'a>) {
        self.masker = Some(masker);
        self.versions.masker_slot += 1;
    }

    /// Removes the mask collaborator; the whole volume becomes eligible.
    pub fn clear_mask_generator(&mut self) {
        if self.masker.take().is_some() {
            self.versions.masker_slot += 1;
        }
    }

    /// Returns the installed mask collaborator for reconfiguration.
    pub fn mask_generator_mut(&mut self) -> Option<&mut (dyn MaskGenerator + 'a)> {
        self.masker.as_deref_mut()
    }

    /// Sets the sphere radius in millimetres.
    pub fn set_radius_mm(&mut self, radius_mm: f64) {
        if self.config.radius_mm != radius_mm {
            self.config.radius_mm = radius_mm;
            self.versions.radius += 1;
        }
    }

    /// Sets whether the sphere must fit completely inside the volume.
    pub fn set_completely_inside(&mut self, completely_inside: bool) {
        if self.config.completely_inside != completely_inside {
            self.config.completely_inside = completely_inside;
            self.versions.inside += 1;
        }
    }

    /// Sets the label selecting eligible voxels of the collaborator's mask.
    pub fn set_label(&mut self, label: u16) {
        if self.config.label != label {
            self.config.label = label;
            self.versions.label += 1;
        }
    }

    /// Sets the frame of the input series to search.
    pub fn set_time_step(&mut self, time_step: usize) {
        if self.config.time_step != time_step {
            self.config.time_step = time_step;
            self.versions.time_step += 1;
        }
    }

    /// Sets the convolution path selection.
    pub fn set_method(&mut self, method: ConvolveMethod) {
        if self.config.method != method {
            self.config.method = method;
            self.versions.method += 1;
        }
    }

    /// Returns true when the cached result no longer matches the inputs.
    pub fn is_stale(&self) -> bool {
        match self.computed {
            Some(stamp) => stamp != self.current_stamp(),
            None => true,
        }
    }

    /// Returns the hotspot mask for the configured time step.
    ///
    /// Recomputes only when an input changed since the last run. A run
    /// that finds no eligible voxel records that outcome too: the
    /// [`NoHotspotFound`](VoxPeakError::NoHotspotFound) error is returned
    /// again without recomputation until some input changes.
    pub fn hotspot_mask(&mut self) -> VoxPeakResult<&LabelVolume> {
        if self.is_stale() {
            self.recompute()?;
        }
        match self.cache {
            Some(ref mask) => Ok(mask),
            None => Err(VoxPeakError::NoHotspotFound),
        }
    }

    /// Returns the peak index of the last completed computation.
    pub fn hotspot_index(&self) -> Option<&[usize]> {
        self.extrema.as_ref().map(|e| e.max_index.as_slice())
    }

    /// Returns the extrema of the last completed computation, peak value
    /// included.
    pub fn extrema(&self) -> Option<&Extrema> {
        self.extrema.as_ref()
    }

    /// Returns the candidate region of the last completed computation.
    pub fn search_region(&self) -> Option<&IndexRegion> {
        self.region.as_ref()
    }

    fn current_stamp(&self) -> VersionStamp {
        VersionStamp {
            masker_self: self.masker.as_ref().map_or(0, |m| m.version()),
            ..self.versions
        }
    }

    fn recompute(&mut self) -> VoxPeakResult<()> {
        self.computed = None;
        self.cache = None;
        self.extrema = None;
        self.region = None;

        let input = self.input.ok_or(VoxPeakError::MissingInput)?;
        if !self.config.radius_mm.is_finite() || self.config.radius_mm <= 0.0 {
            return Err(VoxPeakError::InvalidRadius {
                radius: self.config.radius_mm,
            });
        }

        let _guard = trace_span!("hotspot_update", time_step = self.config.time_step).entered();

        let frame = input.frame(self.config.time_step)?;
        let spacing = frame.geometry().spacing().to_vec();
        let kernel = Kernel::sphere(&spacing, self.config.radius_mm)?;
        let boundary = if self.config.completely_inside {
            BoundaryPolicy::ZeroPad
        } else {
            BoundaryPolicy::Extend
        };
        let options = ConvolveOptions {
            normalize: true,
            boundary,
            method: self.config.method,
        };
        let scored = convolve(frame, &kernel, &options)?;

        let margin = if self.config.completely_inside {
            self.config.radius_mm
        } else {
            0.0
        };
        let region = allowed_region(frame.shape(), &spacing, margin);

        let label_frame = match self.masker.as_mut() {
            Some(masker) => Some(masker.mask(self.config.time_step)?),
            None => None,
        };
        let found = find_extrema(&scored, label_frame, self.config.label, &region)?;

        let stamp = self.current_stamp();
        self.region = Some(region);
        match found {
            None => {
                trace_error!("hotspot_undefined", label = self.config.label);
                self.computed = Some(stamp);
                Err(VoxPeakError::NoHotspotFound)
            }
            Some(extrema) => {
                let center = frame.index_to_world(&extrema.max_index);
                let mask = fill_sphere_mask(
                    frame.shape(),
                    frame.geometry(),
                    &center,
                    self.config.radius_mm,
                )?;
                self.cache = Some(mask);
                self.extrema = Some(extrema);
                self.computed = Some(stamp);
                Ok(())
            }
        }
    }
}

impl<'a, A: Voxel> Default for HotspotMaskGenerator<'a, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: Voxel> MaskGenerator for HotspotMaskGenerator<'a, A> {
    /// Equivalent to `set_time_step(time_step)` followed by
    /// [`hotspot_mask`](Self::hotspot_mask), so a found hotspot can feed a
    /// further search as its mask.
    fn mask(&mut self, time_step: usize) -> VoxPeakResult<&LabelVolume> {
        self.set_time_step(time_step);
        self.hotspot_mask()
    }

    /// Folds the per-input counters into one value; any component change
    /// yields a new version.
    fn version(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.current_stamp().hash(&mut hasher);
        hasher.finish()
    }
}
