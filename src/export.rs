//! Writes a rendered batch to disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::batch::GeneratedImage;
use crate::error::CopyforgeError;

/// Writes each image as `template_<n>.<ext>` under `dir`, numbered in batch order.
pub fn export_images(
    dir: &Path,
    images: &[GeneratedImage],
) -> Result<Vec<PathBuf>, CopyforgeError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(images.len());
    for (position, image) in images.iter().enumerate() {
        let path = dir.join(image.file_name(position + 1));
        fs::write(&path, &image.bytes)?;
        info!("Saved {} ({})", path.display(), image.variant.label());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::inspect_image;
    use crate::batch::tests::png_fixture;
    use crate::variants::Variant;

    #[test]
    fn writes_numbered_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let images: Vec<GeneratedImage> = ["First", "Second"]
            .iter()
            .enumerate()
            .map(|(index, title)| {
                let bytes = png_fixture(index as u32 + 1, 1);
                let (format, width, height) = inspect_image(&bytes).unwrap();
                GeneratedImage {
                    variant: Variant::title(index * 3, *title),
                    bytes,
                    format,
                    width,
                    height,
                    rendered_at: chrono::Utc::now(),
                }
            })
            .collect();

        let written = export_images(&target, &images).unwrap();

        assert_eq!(
            written,
            vec![target.join("template_1.png"), target.join("template_2.png")]
        );
        assert_eq!(fs::read(&written[1]).unwrap(), images[1].bytes);
    }
}
