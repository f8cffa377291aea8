use std::fmt::Display;

use crate::{AffinityMask, Error};

/// A single logical processor, identified by a single-bit [`AffinityMask`].
///
/// The zero-based index of a core is the position of its bit in the mask, which matches the
/// processor number used by operating system tooling (e.g. `taskset`).
///
/// Cores are plain values. They do not own any operating system resources and can be freely
/// copied and shared between threads.
///
/// # Example
///
/// ```
/// use thread_affinity::Core;
///
/// let core = Core::from_mask(0b1000).unwrap();
/// assert_eq!(core.index(), 3);
/// assert_eq!(core.to_string(), "Core[#3]");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Core {
    mask: AffinityMask,
}

impl Core {
    /// The core with index 0, present on every system.
    pub(crate) const FIRST: Self = Self { mask: 1 };

    /// Creates a core from a mask that has exactly one bit set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoreMask`] if the mask has zero or more than one bit set.
    pub fn from_mask(mask: AffinityMask) -> Result<Self, Error> {
        if mask.is_power_of_two() {
            Ok(Self { mask })
        } else {
            Err(Error::InvalidCoreMask { mask })
        }
    }

    /// Creates the core with the given zero-based processor index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CoreOutOfRange`] if the index does not fit in an [`AffinityMask`].
    pub fn from_index(index: u32) -> Result<Self, Error> {
        let mask = 1_u64
            .checked_shl(index)
            .ok_or(Error::CoreOutOfRange { index })?;

        Ok(Self { mask })
    }

    /// The single-bit mask that selects only this core.
    #[must_use]
    #[inline]
    pub fn mask(self) -> AffinityMask {
        self.mask
    }

    /// The zero-based index of the core, i.e. the number of bits below its mask bit.
    #[must_use]
    #[inline]
    pub fn index(self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Enumerates the cores selected by `mask`, in increasing index order.
    ///
    /// # Example
    ///
    /// ```
    /// use thread_affinity::Core;
    ///
    /// let indexes: Vec<_> = Core::all_in(0b10_0101).map(Core::index).collect();
    /// assert_eq!(indexes, [0, 2, 5]);
    /// ```
    pub fn all_in(mask: AffinityMask) -> impl Iterator<Item = Self> {
        let mut remaining = mask;

        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }

            let lowest = remaining & remaining.wrapping_neg();
            remaining &= !lowest;

            Some(Self { mask: lowest })
        })
    }

    /// Returns the `n`-th (zero-based) core selected by `mask`, in increasing index order.
    ///
    /// Returns `None` if the mask selects `n` or fewer cores.
    #[must_use]
    pub fn nth_in(mask: AffinityMask, n: u32) -> Option<Self> {
        Self::all_in(mask).nth(n as usize)
    }

    /// Returns the lowest-index core selected by `mask`, if any.
    #[must_use]
    pub(crate) fn lowest_in(mask: AffinityMask) -> Option<Self> {
        Self::all_in(mask).next()
    }
}

impl Display for Core {
    #[cfg_attr(test, mutants::skip)] // Trivial formatting.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Core[#{}]", self.index())
    }
}

impl From<Core> for AffinityMask {
    #[inline]
    fn from(value: Core) -> Self {
        value.mask
    }
}
