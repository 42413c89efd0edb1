//! Document assembly.
//!
//! [`DocumentAssembler`] turns the ordered image list produced by the
//! capture phase into one paginated PDF: a title page followed by one
//! full-bleed image per page, in timestamp order. On a successful write the
//! assembler retires (deletes) the intermediate images it consumed; on
//! failure it leaves them in place so assembly can be retried without
//! re-capturing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use printpdf::image_crate::codecs::{jpeg::JpegDecoder, png::PngDecoder};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, Pt};

use crate::error::FramepressError;
use crate::progress::{NoOpObserver, PipelinePhase, ProgressEvent, ProgressObserver};
use crate::utilities::{sanitize_title, wrap_text};

/// DPI at which captured frames are embedded. Only affects the
/// points-per-pixel conversion, not the stored pixel data.
const EMBED_DPI: f32 = 300.0;

/// Page layout for the assembled document.
///
/// Dimensions are in PDF points. The defaults reproduce an A4 landscape
/// page (842×595 pt) with a uniform 20 pt margin and titles wrapped at 45
/// columns.
#[derive(Debug, Clone)]
#[must_use]
pub struct LayoutOptions {
    /// Page width in points.
    pub page_width: f32,
    /// Page height in points.
    pub page_height: f32,
    /// Uniform margin in points.
    pub margin: f32,
    /// Column width at which the title is hard-wrapped.
    pub title_wrap: usize,
    /// Directory that receives documents whose output path has no
    /// directory component.
    pub output_dir: PathBuf,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_width: 842.0,
            page_height: 595.0,
            margin: 20.0,
            title_wrap: 45,
            output_dir: PathBuf::from("PDF"),
        }
    }
}

impl LayoutOptions {
    /// Create the default A4-landscape layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size in points.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Set the uniform margin in points.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Set the title wrap column width.
    pub fn with_title_wrap(mut self, columns: usize) -> Self {
        self.title_wrap = columns.max(1);
        self
    }

    /// Set the default output directory for bare file names.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
}

/// The terminal output of a run.
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    /// Where the document was written (after default-directory resolution).
    pub output_path: PathBuf,
    /// Total pages: one title page plus one page per image.
    pub page_count: usize,
}

/// Assembles captured images into a paginated PDF.
///
/// # Example
///
/// ```no_run
/// use std::path::{Path, PathBuf};
///
/// use framepress::DocumentAssembler;
///
/// let images = vec![
///     PathBuf::from("shots/screenshot_001_10s.jpg"),
///     PathBuf::from("shots/screenshot_002_60s.jpg"),
/// ];
/// let assembler = DocumentAssembler::new();
/// let report = assembler.assemble(&images, "My Video", Path::new("my_video.pdf"))?;
/// println!("{} pages -> {}", report.page_count, report.output_path.display());
/// # Ok::<(), framepress::FramepressError>(())
/// ```
pub struct DocumentAssembler {
    layout: LayoutOptions,
    observer: Arc<dyn ProgressObserver>,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAssembler {
    /// Create an assembler with the default layout and no observer.
    pub fn new() -> Self {
        Self {
            layout: LayoutOptions::default(),
            observer: Arc::new(NoOpObserver),
        }
    }

    /// Use a custom page layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Attach a progress observer for assembly and cleanup events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Resolve an output path against the layout's default directory.
    ///
    /// A path with no directory component lands in
    /// [`LayoutOptions::output_dir`]; anything else is used as-is.
    pub fn resolve_output_path(&self, output: &Path) -> PathBuf {
        let bare = output
            .parent()
            .is_none_or(|parent| parent.as_os_str().is_empty());
        if bare {
            self.layout.output_dir.join(output)
        } else {
            output.to_path_buf()
        }
    }

    /// Assemble `images` (ascending-timestamp order) into a PDF at `output`.
    ///
    /// Page 1 carries the sanitized title and the screenshot count; pages
    /// 2..N+1 carry one image each, scaled to fit the page canvas without
    /// cropping, centred within the margins.
    ///
    /// On success every consumed image is deleted (failures are logged as
    /// warnings, not propagated — the document already exists) and the
    /// directory holding them is removed when empty. On failure the images
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FramepressError::AssemblyFailed`] with the resolved output
    /// path and the underlying reason.
    pub fn assemble(
        &self,
        images: &[PathBuf],
        title: &str,
        output: &Path,
    ) -> Result<AssemblyReport, FramepressError> {
        let resolved = self.resolve_output_path(output);
        let fail = |reason: String| FramepressError::AssemblyFailed {
            path: resolved.clone(),
            reason,
        };

        self.emit(
            PipelinePhase::Assemble,
            format!("assembling {} page(s) into {}", images.len() + 1, resolved.display()),
            80.0,
        );

        if let Some(parent) = resolved.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|error| fail(format!("cannot create output directory: {error}")))?;
        }

        let document = self.build_document(images, title, &fail)?;

        let file = File::create(&resolved)
            .map_err(|error| fail(format!("cannot create output file: {error}")))?;
        let mut writer = BufWriter::new(file);
        document
            .save(&mut writer)
            .map_err(|error| fail(format!("cannot write document: {error}")))?;

        log::info!("document written to {}", resolved.display());
        self.retire_images(images);

        Ok(AssemblyReport {
            output_path: resolved,
            page_count: images.len() + 1,
        })
    }

    fn build_document(
        &self,
        images: &[PathBuf],
        title: &str,
        fail: &dyn Fn(String) -> FramepressError,
    ) -> Result<printpdf::PdfDocumentReference, FramepressError> {
        let layout = &self.layout;
        let page_width = Mm::from(Pt(layout.page_width));
        let page_height = Mm::from(Pt(layout.page_height));

        let sanitized = sanitize_title(title);
        let (document, title_page, title_layer) =
            PdfDocument::new(&sanitized, page_width, page_height, "title");

        let header_font = document
            .add_builtin_font(BuiltinFont::TimesBold)
            .map_err(|error| fail(format!("cannot load header font: {error}")))?;
        let title_font = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|error| fail(format!("cannot load title font: {error}")))?;
        let body_font = document
            .add_builtin_font(BuiltinFont::TimesRoman)
            .map_err(|error| fail(format!("cannot load body font: {error}")))?;

        // Title page. Baselines are measured from the bottom-left corner.
        let layer = document.get_page(title_page).get_layer(title_layer);
        let mut baseline = layout.page_height - layout.margin - 120.0;

        layer.use_text(
            "Screenshots from:",
            28.0,
            Mm::from(Pt(centered_x("Screenshots from:", 28.0, 0.45, layout.page_width))),
            Mm::from(Pt(baseline)),
            &header_font,
        );
        baseline -= 64.0;

        for line in wrap_text(&sanitized, layout.title_wrap) {
            layer.use_text(
                line.as_str(),
                32.0,
                Mm::from(Pt(centered_x(&line, 32.0, 0.5, layout.page_width))),
                Mm::from(Pt(baseline.max(layout.margin))),
                &title_font,
            );
            baseline -= 38.0;
        }
        baseline -= 18.0;

        let count_line = format!("Total screenshots: {}", images.len());
        layer.use_text(
            count_line.as_str(),
            18.0,
            Mm::from(Pt(centered_x(&count_line, 18.0, 0.45, layout.page_width))),
            Mm::from(Pt(baseline.max(layout.margin))),
            &body_font,
        );

        // One image per page, scaled to fit inside the margins without
        // cropping, centred on the page.
        for path in images {
            let image = load_image(path).map_err(fail)?;

            let pixel_width = image.image.width.0 as f32;
            let pixel_height = image.image.height.0 as f32;
            if pixel_width <= 0.0 || pixel_height <= 0.0 {
                return Err(fail(format!("empty image: {}", path.display())));
            }

            let native_width = pixel_width * 72.0 / EMBED_DPI;
            let native_height = pixel_height * 72.0 / EMBED_DPI;
            let available_width = layout.page_width - 2.0 * layout.margin;
            let available_height = layout.page_height - 2.0 * layout.margin;
            let scale = (available_width / native_width).min(available_height / native_height);

            let x = (layout.page_width - native_width * scale) / 2.0;
            let y = (layout.page_height - native_height * scale) / 2.0;

            let (page, layer_index) = document.add_page(page_width, page_height, "screenshot");
            let layer = document.get_page(page).get_layer(layer_index);
            image.add_to_layer(
                layer,
                ImageTransform {
                    translate_x: Some(Mm::from(Pt(x))),
                    translate_y: Some(Mm::from(Pt(y))),
                    rotate: None,
                    scale_x: Some(scale),
                    scale_y: Some(scale),
                    dpi: Some(EMBED_DPI),
                },
            );
        }

        Ok(document)
    }

    /// Delete consumed images and, when it ends up empty, the directory
    /// holding them. Failures here are warnings — the document already
    /// succeeded.
    fn retire_images(&self, images: &[PathBuf]) {
        let mut removed = 0usize;
        for path in images {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(error) => {
                    log::warn!("could not delete {}: {error}", path.display());
                    self.emit(
                        PipelinePhase::Cleanup,
                        format!("could not delete {}: {error}", path.display()),
                        95.0,
                    );
                }
            }
        }

        if let Some(directory) = images.first().and_then(|path| path.parent()) {
            // Succeeds only when the directory is empty.
            let _ = fs::remove_dir(directory);
        }

        self.emit(
            PipelinePhase::Cleanup,
            format!("removed {removed} intermediate image(s)"),
            95.0,
        );
    }

    fn emit(&self, phase: PipelinePhase, detail: impl Into<String>, percent: f32) {
        self.observer.on_event(&ProgressEvent {
            phase,
            detail: detail.into(),
            percent,
        });
    }
}

/// Load an intermediate image for embedding.
///
/// The capture phase always writes JPEG; PNG is accepted for library users
/// assembling their own image sets.
fn load_image(path: &Path) -> Result<Image, String> {
    let file =
        File::open(path).map_err(|error| format!("cannot open {}: {error}", path.display()))?;
    let reader = BufReader::new(file);

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let decoder = JpegDecoder::new(reader)
                .map_err(|error| format!("cannot decode {}: {error}", path.display()))?;
            Image::try_from(decoder)
                .map_err(|error| format!("cannot embed {}: {error}", path.display()))
        }
        "png" => {
            let decoder = PngDecoder::new(reader)
                .map_err(|error| format!("cannot decode {}: {error}", path.display()))?;
            Image::try_from(decoder)
                .map_err(|error| format!("cannot embed {}: {error}", path.display()))
        }
        other => Err(format!(
            "unsupported image format '{other}': {}",
            path.display()
        )),
    }
}

/// Approximate centring for built-in fonts: their metrics are not exposed,
/// so text width is estimated from an average glyph/em ratio.
fn centered_x(text: &str, font_size: f32, glyph_ratio: f32, page_width: f32) -> f32 {
    let text_width = text.chars().count() as f32 * font_size * glyph_ratio;
    ((page_width - text_width) / 2.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{DocumentAssembler, LayoutOptions};

    #[test]
    fn bare_filename_lands_in_default_directory() {
        let assembler = DocumentAssembler::new()
            .with_layout(LayoutOptions::new().with_output_dir("documents"));
        let resolved = assembler.resolve_output_path(Path::new("video.pdf"));
        assert_eq!(resolved, Path::new("documents/video.pdf"));
    }

    #[test]
    fn explicit_directory_is_untouched() {
        let assembler = DocumentAssembler::new();
        let resolved = assembler.resolve_output_path(Path::new("out/video.pdf"));
        assert_eq!(resolved, Path::new("out/video.pdf"));
    }
}
