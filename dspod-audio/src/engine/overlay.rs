//! Code overlays.
//!
//! On parts with a small tightly-coupled instruction RAM the effects do not
//! all fit at once. The linker places each [`OverlayGroup`]'s code at the same
//! execution address and records where each image is stored; switching
//! groups copies the new image over the old one. This is only safe while the
//! audio path is parked on bypass, which the hot-swap interlock guarantees.

use crate::effects::OverlayGroup;

/// Loads the code image of an overlay group into its execution region.
pub trait OverlayLoader {
    fn load(&mut self, group: OverlayGroup);
}

impl<T: OverlayLoader + ?Sized> OverlayLoader for &mut T {
    fn load(&mut self, group: OverlayGroup) {
        (**self).load(group)
    }
}

/// For targets that execute every effect in place.
#[derive(Debug, Default)]
pub struct NoOverlays;

impl OverlayLoader for NoOverlays {
    fn load(&mut self, _group: OverlayGroup) {}
}

/// One linker overlay table entry.
#[derive(Clone, Copy, Debug)]
pub struct OverlaySection {
    /// Execution address.
    pub exec: *mut u8,
    /// Image size in bytes.
    pub len: usize,
    /// Storage address of the image.
    pub load: *const u8,
}

/// Copies overlay images from their load address to RAM.
pub struct RamOverlays<'t> {
    table: &'t [OverlaySection],
}

// SAFETY: the table only describes memory regions; `RamOverlays::new`
// requires that they stay valid and that nothing else writes them.
unsafe impl Send for RamOverlays<'_> {}

impl<'t> RamOverlays<'t> {
    /// `table[g]` describes group `g` in [`OverlayGroup`] order.
    ///
    /// # Safety
    ///
    /// Every entry must describe a readable `load` region and a writable
    /// `exec` region of `len` bytes that do not overlap, valid for `'t`.
    pub unsafe fn new(table: &'t [OverlaySection]) -> Self {
        RamOverlays { table }
    }
}

impl OverlayLoader for RamOverlays<'_> {
    fn load(&mut self, group: OverlayGroup) {
        if let Some(section) = self.table.get(group as usize) {
            // SAFETY: guaranteed by the contract of `RamOverlays::new`.
            unsafe {
                core::ptr::copy_nonoverlapping(section.load, section.exec, section.len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_the_selected_image() {
        let filter_image = [1u8, 2, 3, 4];
        let delay_image = [9u8, 8, 7, 6];
        let mut exec = [0u8; 4];
        let exec_ptr = exec.as_mut_ptr();

        let table = [
            OverlaySection { exec: exec_ptr, len: 4, load: filter_image.as_ptr() },
            OverlaySection { exec: exec_ptr, len: 4, load: delay_image.as_ptr() },
        ];
        let mut overlays = unsafe { RamOverlays::new(&table) };

        overlays.load(OverlayGroup::Delay);
        assert_eq!(unsafe { *exec_ptr.add(1) }, 8);
        overlays.load(OverlayGroup::Filter);
        assert_eq!(unsafe { *exec_ptr.add(1) }, 2);
    }

    #[test]
    fn missing_entry_is_ignored() {
        let mut overlays = unsafe { RamOverlays::new(&[]) };
        overlays.load(OverlayGroup::Delay);
    }
}
