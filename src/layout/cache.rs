//! Memoised variant layouts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use super::{Layout, LayoutError, VariantLayout, compute_layout};
use crate::logging::trace;

type LayoutKey = (usize, Vec<Layout>);

/// A cache of variant layouts keyed by the discriminant width and the
/// ordered case layouts.
///
/// Each distinct combination is computed once; later lookups return the
/// stored result. The cache is safe to share between threads.
///
/// # Example
///
/// ```ignore
/// use wit_layout::{Layout, LayoutCache};
///
/// let cache = LayoutCache::new();
/// let layout = cache.variant(1, &[Layout::new(8, 8), Layout::new(4, 4)])?;
/// assert_eq!(layout.size, 16);
/// ```
#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: RwLock<HashMap<LayoutKey, VariantLayout>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or compute the layout of a variant.
    pub fn variant(
        &self,
        discriminant_width: usize,
        cases: &[Layout],
    ) -> Result<VariantLayout, LayoutError> {
        let key = (discriminant_width, cases.to_vec());
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(layout) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(*layout);
            }
        }

        let (sizes, alignments): (Vec<usize>, Vec<usize>) =
            cases.iter().map(|c| (c.size, c.align)).unzip();
        let layout = compute_layout(discriminant_width, &sizes, &alignments)?;
        trace!(
            discriminant_width,
            cases = cases.len(),
            size = layout.size,
            "variant layout cache miss"
        );

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, layout);
        Ok(layout)
    }

    /// Number of distinct layouts stored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Drop every stored layout and reset the counters.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
