//! Packed pixel-format descriptors and the pixel/sample traits.
//!
//! A [`PixelFormat`] packs bits-per-sample, samples-per-pixel and the lookup
//! table length into one `u32`. The [`Pixel`] trait binds a storage type to
//! its format at compile time; one value of the implementing type always
//! stores one whole pixel, so formats that would pack several pixels into a
//! single storage unit are unrepresentable. Packed *samples* (several samples
//! sharing the bits of one storage unit) are allowed and checked at container
//! construction via [`PixelFormat::check_storage`].

use crate::util::{CowImageError, CowImageResult};

const BITS_PER_SAMPLE_MAX: u32 = 0xFF;
const SAMPLES_PER_PIXEL_MAX: u32 = 0xFF;
const LOOKUP_TABLE_MAX: u32 = 0xFFF;

/// Packed pixel-format descriptor.
///
/// Layout: bits 0-7 bits-per-sample, bits 8-15 samples-per-pixel,
/// bits 16-27 lookup-table entries, bits 28-31 reserved (zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat(u32);

impl PixelFormat {
    /// Packs a descriptor from its fields.
    ///
    /// Panics when a field exceeds its reserved bit width; in `const`
    /// contexts (every [`Pixel::FORMAT`] in this crate) that is a compile
    /// error. Use [`PixelFormat::from_raw`] for run-time validation.
    pub const fn new(bits_per_sample: u32, samples_per_pixel: u32, lookup_table_len: u32) -> Self {
        assert!(bits_per_sample > 0 && bits_per_sample <= BITS_PER_SAMPLE_MAX);
        assert!(samples_per_pixel > 0 && samples_per_pixel <= SAMPLES_PER_PIXEL_MAX);
        assert!(lookup_table_len <= LOOKUP_TABLE_MAX);
        Self(bits_per_sample | (samples_per_pixel << 8) | (lookup_table_len << 16))
    }

    /// Validates a raw packed descriptor.
    pub fn from_raw(raw: u32) -> CowImageResult<Self> {
        let format = Self(raw);
        if raw >> 28 != 0 || format.bits_per_sample() == 0 || format.samples_per_pixel() == 0 {
            return Err(CowImageError::InvalidPixelFormat { format: raw });
        }
        Ok(format)
    }

    /// Returns the raw packed descriptor.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Bits used by one sample.
    pub const fn bits_per_sample(self) -> u32 {
        self.0 & 0xFF
    }

    /// Samples stored per pixel.
    pub const fn samples_per_pixel(self) -> u32 {
        (self.0 >> 8) & 0xFF
    }

    /// Entries in the lookup table (0 for direct formats).
    pub const fn lookup_table_len(self) -> u32 {
        (self.0 >> 16) & 0xFFF
    }

    /// True iff pixel values index a lookup table.
    pub const fn uses_lookup_table(self) -> bool {
        self.lookup_table_len() != 0
    }

    /// Bits required by one whole pixel.
    pub const fn bits_per_pixel(self) -> u32 {
        self.bits_per_sample() * self.samples_per_pixel()
    }

    /// Checks that one `P` can store one whole pixel of this format.
    ///
    /// Rejects formats whose samples do not fit the storage unit, which
    /// would force several pixels to share one unit.
    pub fn check_storage<P>(self) -> CowImageResult<()> {
        let storage_bits = (std::mem::size_of::<P>() * 8) as u32;
        let needed_bits = self.bits_per_pixel();
        if needed_bits == 0 || needed_bits > storage_bits {
            return Err(CowImageError::PackedPixelsUnsupported {
                format: self.0,
                needed_bits,
                storage_bits,
            });
        }
        Ok(())
    }
}

/// A pixel value stored whole in the image buffer.
pub trait Pixel: Copy + PartialEq + Default + 'static {
    /// The packed format this storage type carries.
    const FORMAT: PixelFormat;
}

macro_rules! impl_pixel {
    ($($ty:ty => ($bps:expr, $spp:expr)),+ $(,)?) => {
        $(impl Pixel for $ty {
            const FORMAT: PixelFormat = PixelFormat::new($bps, $spp, 0);
        })+
    };
}

impl_pixel! {
    u8 => (8, 1),
    u16 => (16, 1),
    u32 => (32, 1),
    i16 => (16, 1),
    i32 => (32, 1),
    f32 => (32, 1),
    f64 => (64, 1),
    [u8; 3] => (8, 3),
    [u8; 4] => (8, 4),
    [u16; 3] => (16, 3),
    [f32; 3] => (32, 3),
}

/// Numeric scalar used by the format-converting copies.
///
/// Conversions route through `f64`, which represents every supported sample
/// type exactly; integer targets round and saturate.
pub trait Sample: Pixel {
    /// Widens the sample to `f64`.
    fn to_f64(self) -> f64;
    /// Narrows from `f64`, rounding and saturating for integer targets.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_int_sample {
    ($($ty:ty),+ $(,)?) => {
        $(impl Sample for $ty {
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_f64(value: f64) -> Self {
                // `as` saturates on out-of-range floats.
                value.round() as $ty
            }
        })+
    };
}

impl_int_sample!(u8, u16, u32, i16, i32);

impl Sample for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Sample for f64 {
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::{Pixel, PixelFormat, Sample};
    use crate::util::CowImageError;

    #[test]
    fn packed_fields_round_trip() {
        let format = PixelFormat::new(10, 3, 256);
        assert_eq!(format.bits_per_sample(), 10);
        assert_eq!(format.samples_per_pixel(), 3);
        assert_eq!(format.lookup_table_len(), 256);
        assert!(format.uses_lookup_table());
        assert_eq!(PixelFormat::from_raw(format.raw()), Ok(format));
    }

    #[test]
    fn from_raw_rejects_reserved_bits_and_zero_fields() {
        let err = PixelFormat::from_raw(0x1000_0108).err().unwrap();
        assert_eq!(err, CowImageError::InvalidPixelFormat { format: 0x1000_0108 });
        assert!(PixelFormat::from_raw(0x0000_0100).is_err());
        assert!(PixelFormat::from_raw(0x0000_0008).is_err());
    }

    #[test]
    fn storage_check_accepts_packed_samples_only() {
        // Two 10-bit samples packed in one u32 pixel: fine.
        assert!(PixelFormat::new(10, 2, 0).check_storage::<u32>().is_ok());
        // A 16-bit sample cannot occupy a whole u8 storage unit: rejected.
        let err = PixelFormat::new(16, 1, 0).check_storage::<u8>().err().unwrap();
        assert!(matches!(err, CowImageError::PackedPixelsUnsupported { .. }));
    }

    #[test]
    fn builtin_formats_fit_their_storage() {
        assert_eq!(<[u8; 3]>::FORMAT.samples_per_pixel(), 3);
        assert!(<[u8; 3]>::FORMAT.check_storage::<[u8; 3]>().is_ok());
        assert!(u16::FORMAT.check_storage::<u16>().is_ok());
    }

    #[test]
    fn integer_samples_round_and_saturate() {
        assert_eq!(u8::from_f64(254.6), 255);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-5.0), 0);
        assert_eq!(i16::from_f64(-40000.0), i16::MIN);
        assert_eq!(u16::to_f64(513), 513.0);
    }
}
