#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Row index → layout slot.
#[cfg(feature = "std")]
pub(crate) type SlotMap = HashMap<usize, usize>;
#[cfg(not(feature = "std"))]
pub(crate) type SlotMap = BTreeMap<usize, usize>;
