//! Holds the last generated variants and images between user actions.

use crate::batch::GeneratedImage;
use crate::error::CopyforgeError;
use crate::selection::SelectionTracker;
use crate::variants::{ParsedVariants, Variant};

/// Interactive session state, owned by whoever drives the pipeline.
///
/// Every replacement of the variant sequence bumps an epoch, so a batch that
/// was planned against an older sequence can be recognised and dropped.
#[derive(Debug, Default)]
pub struct SessionCache {
    last_variants: Option<ParsedVariants>,
    last_images: Option<Vec<GeneratedImage>>,
    selection: SelectionTracker,
    epoch: u64,
}

impl SessionCache {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last generated variant sequence.
    pub fn variants(&self) -> Option<&ParsedVariants> {
        self.last_variants.as_ref()
    }

    /// The variants of the last sequence, or an empty slice.
    pub fn variant_list(&self) -> &[Variant] {
        self.last_variants
            .as_ref()
            .map(|parsed| parsed.variants.as_slice())
            .unwrap_or_default()
    }

    /// Replaces the variant sequence, resetting the selection and dropping cached images.
    pub fn set_variants(&mut self, parsed: ParsedVariants) {
        self.selection.rebind(parsed.len());
        self.last_images = None;
        self.last_variants = Some(parsed);
        self.epoch += 1;
    }

    /// Forgets the variant sequence and its selection.
    pub fn clear_variants(&mut self) {
        self.selection.rebind(0);
        self.last_variants = None;
        self.epoch += 1;
    }

    /// The last rendered batch.
    pub fn images(&self) -> Option<&[GeneratedImage]> {
        self.last_images.as_deref()
    }

    /// Replaces the rendered batch.
    pub fn set_images(&mut self, images: Vec<GeneratedImage>) {
        self.last_images = Some(images);
    }

    /// Stores `images` only if the variant sequence is still the one of `epoch`.
    pub fn set_images_for(&mut self, epoch: u64, images: Vec<GeneratedImage>) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.set_images(images);
        true
    }

    /// Forgets the rendered batch.
    pub fn clear_images(&mut self) {
        self.last_images = None;
    }

    /// Clears both slots.
    pub fn clear(&mut self) {
        self.clear_variants();
        self.clear_images();
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Toggles one variant's selection.
    pub fn toggle(&mut self, index: usize) -> Result<bool, CopyforgeError> {
        self.selection.toggle(index)
    }

    /// Clears the selection.
    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    /// Identifies the current variant sequence.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::tests::png_fixture;
    use crate::batch::inspect_image;
    use crate::variants::{CampaignMode, parse_variants};

    fn image_for(variant: Variant) -> GeneratedImage {
        let bytes = png_fixture(1, 1);
        let (format, width, height) = inspect_image(&bytes).unwrap();
        GeneratedImage {
            variant,
            bytes,
            format,
            width,
            height,
            rendered_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn new_variants_reset_selection_and_images() {
        let mut cache = SessionCache::new();
        cache.set_variants(parse_variants("A\nB\nC", CampaignMode::SingleField, 10));
        cache.toggle(1).unwrap();
        cache.set_images(vec![image_for(Variant::title(1, "B"))]);

        cache.set_variants(parse_variants("D\nE", CampaignMode::SingleField, 10));

        assert!(cache.selection().is_empty());
        assert!(cache.images().is_none());
        assert_eq!(cache.variant_list().len(), 2);
        assert!(cache.toggle(2).is_err());
    }

    #[test]
    fn slots_clear_independently() {
        let mut cache = SessionCache::new();
        cache.set_variants(parse_variants("A", CampaignMode::SingleField, 10));
        cache.set_images(vec![image_for(Variant::title(0, "A"))]);

        cache.clear_images();
        assert!(cache.images().is_none());
        assert!(cache.variants().is_some());

        cache.set_images(vec![image_for(Variant::title(0, "A"))]);
        cache.clear_variants();
        assert!(cache.variants().is_none());
        assert!(cache.variant_list().is_empty());
        assert_eq!(cache.images().map(<[GeneratedImage]>::len), Some(1));
    }

    #[test]
    fn clear_forgets_both_slots() {
        let mut cache = SessionCache::new();
        cache.set_variants(parse_variants("A\nB", CampaignMode::SingleField, 10));
        cache.toggle(0).unwrap();
        cache.set_images(vec![image_for(Variant::title(0, "A"))]);
        let epoch = cache.epoch();

        cache.clear();

        assert!(cache.variants().is_none());
        assert!(cache.images().is_none());
        assert!(cache.selection().is_empty());
        assert!(cache.toggle(0).is_err());
        assert!(!cache.set_images_for(epoch, vec![image_for(Variant::title(0, "A"))]));
    }

    #[test]
    fn stale_batches_are_dropped() {
        let mut cache = SessionCache::new();
        cache.set_variants(parse_variants("A", CampaignMode::SingleField, 10));
        let epoch = cache.epoch();
        cache.set_variants(parse_variants("B", CampaignMode::SingleField, 10));

        assert!(!cache.set_images_for(epoch, vec![image_for(Variant::title(0, "A"))]));
        assert!(cache.images().is_none());
        assert!(cache.set_images_for(cache.epoch(), vec![image_for(Variant::title(0, "B"))]));
        assert!(cache.images().is_some());
    }
}
