//! Renders selected variants onto the template, one remote request at a time.
//!
//! [`plan_batch`] decides what gets rendered and with which layer bindings,
//! without touching the network. [`BatchDriver`] then executes the plan
//! against a [`Compositor`], isolating failures per item and reporting
//! progress after each one.

use std::fmt;
use std::future::Future;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use image::{ImageFormat, ImageReader};
use tracing::{debug, info, warn};

use crate::config::CampaignConfig;
use crate::error::CopyforgeError;
use crate::variants::Variant;

/// Why one item of a batch produced no image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The compositor answered with a non-success status
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },
    /// The response body was not a readable image
    InvalidImage(String),
    /// The request could not be sent or timed out
    Transport(String),
    /// A variant slot has no configured template layer
    UnboundSlot(String),
    /// The batch was cancelled before this item ran
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => write!(f, "compositor returned {status}: {body}"),
            Self::InvalidImage(err) => write!(f, "response was not a valid image: {err}"),
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::UnboundSlot(slot) => write!(f, "no template layer bound to slot {slot:?}"),
            Self::Cancelled => write!(f, "cancelled before rendering"),
        }
    }
}

/// Text for one template layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerText {
    /// Remote layer id
    pub layer_id: String,
    /// Text to place in the layer
    pub text: String,
}

/// Everything the compositor needs to render one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeRequest {
    /// Remote template identifier
    pub template_id: String,
    /// Layer texts, in variant slot order
    pub layers: Vec<LayerText>,
}

/// One selected variant and the request it will be rendered with.
#[derive(Clone, Debug)]
pub struct PlannedItem {
    /// The selected variant
    pub variant: Variant,
    /// The request, or why none could be built
    pub request: Result<CompositeRequest, FailureReason>,
}

/// Ordered list of items to render, one per selected variant.
#[derive(Clone, Debug)]
pub struct BatchPlan {
    /// Items, in selection order
    pub items: Vec<PlannedItem>,
}

impl BatchPlan {
    /// Number of selected variants.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Never true for a plan built by [`plan_batch`].
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn build_request(
    variant: &Variant,
    config: &CampaignConfig,
) -> Result<CompositeRequest, FailureReason> {
    let layers = variant
        .fields
        .iter()
        .map(|field| {
            config
                .layer_for(field.slot)
                .map(|layer_id| LayerText {
                    layer_id: layer_id.to_string(),
                    text: field.text.clone(),
                })
                .ok_or_else(|| FailureReason::UnboundSlot(field.slot.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CompositeRequest {
        template_id: config.template_id.clone(),
        layers,
    })
}

/// Builds the render plan for the `selected` indices of `variants`.
///
/// An empty selection or an index outside the sequence is rejected here, so
/// no request is ever issued for an invalid batch. Variants with a slot that
/// has no layer binding stay in the plan and fail individually.
pub fn plan_batch(
    variants: &[Variant],
    selected: &[usize],
    config: &CampaignConfig,
) -> Result<BatchPlan, CopyforgeError> {
    if selected.is_empty() {
        return Err(CopyforgeError::Precondition(
            "Please select at least one variant".to_string(),
        ));
    }
    let items = selected
        .iter()
        .map(|&index| -> Result<PlannedItem, CopyforgeError> {
            let variant = variants.get(index).ok_or_else(|| {
                CopyforgeError::Precondition(format!(
                    "Variant {} does not exist (only {} generated)",
                    index + 1,
                    variants.len()
                ))
            })?;
            Ok(PlannedItem {
                variant: variant.clone(),
                request: build_request(variant, config),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BatchPlan { items })
}

/// A remote service that renders a template with layer texts.
pub trait Compositor {
    /// Renders one request, returning the encoded image bytes.
    fn render(
        &self,
        request: &CompositeRequest,
    ) -> impl Future<Output = Result<Vec<u8>, FailureReason>> + Send;
}

/// Reads just enough of `bytes` to know its format and size.
pub fn inspect_image(bytes: &[u8]) -> Result<(ImageFormat, u32, u32), FailureReason> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| FailureReason::InvalidImage(err.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| FailureReason::InvalidImage("unrecognised image format".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|err| FailureReason::InvalidImage(err.to_string()))?;
    Ok((format, width, height))
}

/// A successfully rendered variant.
#[derive(Clone, Debug)]
pub struct GeneratedImage {
    /// The variant the image was rendered from
    pub variant: Variant,
    /// Encoded image, as returned by the compositor
    pub bytes: Vec<u8>,
    /// Detected image format
    pub format: ImageFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// When the image came back
    pub rendered_at: DateTime<Utc>,
}

impl GeneratedImage {
    /// MIME type of the encoded image.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Preferred file extension for the encoded image.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }

    /// Download file name for the `number`th (1-based) image of a batch.
    pub fn file_name(&self, number: usize) -> String {
        format!("template_{number}.{}", self.extension())
    }
}

/// One item that produced no image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderFailure {
    /// Index of the variant in the generated sequence
    pub index: usize,
    /// Variant label, for reporting
    pub label: String,
    /// What went wrong
    pub reason: FailureReason,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to generate image for variant {}: {}",
            self.index + 1,
            self.reason
        )
    }
}

/// Progress after an item finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchProgress {
    /// Items finished so far
    pub completed: usize,
    /// Items in the batch
    pub total: usize,
    /// Label of the item that just finished
    pub label: String,
}

impl BatchProgress {
    /// Completed share of the batch, between 0 and 1.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Outcome of a batch run.
#[derive(Clone, Debug)]
pub struct BatchReport {
    /// Rendered images, in selection order
    pub images: Vec<GeneratedImage>,
    /// Failed items, in selection order
    pub failures: Vec<RenderFailure>,
    /// Items in the batch when it started
    pub total: usize,
    /// Start of the run
    pub started_at: DateTime<Utc>,
    /// End of the run
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Final textual summary.
    pub fn summary(&self) -> String {
        let elapsed = (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        if self.failures.is_empty() {
            format!(
                "Image generation complete: {} of {} rendered in {elapsed:.1}s",
                self.images.len(),
                self.total
            )
        } else {
            format!(
                "Image generation complete: {} of {} rendered, {} failed in {elapsed:.1}s",
                self.images.len(),
                self.total,
                self.failures.len()
            )
        }
    }
}

/// Executes a [`BatchPlan`] strictly sequentially.
pub struct BatchDriver<'a, C> {
    compositor: &'a C,
    cancel: Option<&'a AtomicBool>,
}

impl<'a, C: Compositor + Sync> BatchDriver<'a, C> {
    /// Driver rendering through `compositor`.
    pub fn new(compositor: &'a C) -> Self {
        Self {
            compositor,
            cancel: None,
        }
    }

    /// Checks `flag` between items; once set, the remaining items are recorded as cancelled.
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    async fn render_one(
        &self,
        request: &CompositeRequest,
    ) -> Result<(Vec<u8>, ImageFormat, u32, u32), FailureReason> {
        let bytes = self.compositor.render(request).await?;
        let (format, width, height) = inspect_image(&bytes)?;
        Ok((bytes, format, width, height))
    }

    /// Runs every item of `plan`, calling `on_progress` after each one.
    pub async fn run<F>(self, plan: BatchPlan, mut on_progress: F) -> BatchReport
    where
        F: FnMut(&BatchProgress) + Send,
    {
        let total = plan.len();
        let started_at = Utc::now();
        let mut images = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (position, item) in plan.items.into_iter().enumerate() {
            let label = item.variant.label();
            debug!("Rendering item {}/{}: {}", position + 1, total, label);

            let outcome = if self.is_cancelled() {
                Err(FailureReason::Cancelled)
            } else {
                match &item.request {
                    Ok(request) => self.render_one(request).await,
                    Err(reason) => Err(reason.clone()),
                }
            };

            match outcome {
                Ok((bytes, format, width, height)) => {
                    info!(
                        "Rendered variant {} ({width}x{height} {format:?})",
                        item.variant.index + 1
                    );
                    images.push(GeneratedImage {
                        variant: item.variant,
                        bytes,
                        format,
                        width,
                        height,
                        rendered_at: Utc::now(),
                    });
                }
                Err(reason) => {
                    let failure = RenderFailure {
                        index: item.variant.index,
                        label: label.clone(),
                        reason,
                    };
                    warn!("{}", failure);
                    failures.push(failure);
                }
            }

            let progress = BatchProgress {
                completed: position + 1,
                total,
                label,
            };
            info!(
                "Batch progress {:.0}% ({}/{})",
                progress.fraction() * 100.0,
                progress.completed,
                progress.total
            );
            on_progress(&progress);
        }

        let report = BatchReport {
            images,
            failures,
            total,
            started_at,
            finished_at: Utc::now(),
        };
        info!("{}", report.summary());
        report
    }
}
