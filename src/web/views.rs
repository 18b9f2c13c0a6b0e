use super::images::{data_uri, download_response};
use super::prelude::*;
use crate::batch::{BatchDriver, plan_batch};
use crate::generation::generate_variants;
use crate::variants::CampaignMode;
use std::sync::atomic::Ordering;

const BRIEF_KEY: &str = "brief";
const MODE_KEY: &str = "mode";
const DEFAULT_BRIEF: &str = "marketing for black friday";

#[derive(Deserialize)]
pub(crate) struct GenerateForm {
    csrf_token: String,
    brief: String,
    mode: String,
}

#[derive(Deserialize)]
pub(crate) struct CsrfForm {
    csrf_token: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ModeOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct VariantView {
    index: usize,
    number: usize,
    label: String,
    checked: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct ImageView {
    number: usize,
    label: String,
    src: String,
    file_name: String,
    width: u32,
    height: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub(crate) struct IndexTemplate {
    template_id: String,
    bindings: Vec<String>,
    has_completion_key: bool,
    has_compositor_key: bool,
    brief: String,
    modes: Vec<ModeOption>,
    variant_limit: usize,
    variants: Vec<VariantView>,
    has_variants: bool,
    selected_count: usize,
    has_shortfall: bool,
    shortfall_message: String,
    images: Vec<ImageView>,
    has_images: bool,
    flashes: Vec<flash::FlashMessage>,
    csrf_token: String,
}

fn mode_options(current: CampaignMode) -> Vec<ModeOption> {
    [
        (CampaignMode::SingleField, "Titles"),
        (CampaignMode::MultiField, "Header + CTA"),
    ]
    .into_iter()
    .map(|(mode, label)| ModeOption {
        value: mode.as_str(),
        label,
        selected: mode == current,
    })
    .collect()
}

/// handles the / GET
pub(crate) async fn index_handler(
    State(state): State<AppState>,
    session: Session,
) -> Result<IndexTemplate, CopyforgeError> {
    let csrf_token = csrf_token(&session).await?;
    let flashes = flash::take_messages(&session).await?;
    let brief = session
        .get::<String>(BRIEF_KEY)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?
        .unwrap_or_else(|| DEFAULT_BRIEF.to_string());
    let mode = session
        .get::<CampaignMode>(MODE_KEY)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?
        .unwrap_or_default();

    let cache = state.session.lock().await;
    let variants: Vec<VariantView> = cache
        .variant_list()
        .iter()
        .map(|variant| VariantView {
            index: variant.index,
            number: variant.index + 1,
            label: variant.label(),
            checked: cache.selection().is_selected(variant.index),
        })
        .collect();
    let shortfall_message = cache
        .variants()
        .and_then(|parsed| {
            parsed.shortfall().map(|_| {
                format!(
                    "Only {} of {} requested variants were generated.",
                    parsed.len(),
                    parsed.requested
                )
            })
        })
        .unwrap_or_default();
    let images: Vec<ImageView> = cache
        .images()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(position, image)| ImageView {
            number: position + 1,
            label: image.variant.label(),
            src: data_uri(image),
            file_name: image.file_name(position + 1),
            width: image.width,
            height: image.height,
        })
        .collect();

    Ok(IndexTemplate {
        template_id: state.config.template_id.clone(),
        bindings: state
            .config
            .bindings
            .iter()
            .map(ToString::to_string)
            .collect(),
        has_completion_key: state.completion.has_key(),
        has_compositor_key: state.config.credentials.compositor_key.is_some(),
        brief,
        modes: mode_options(mode),
        variant_limit: state.variant_limit,
        has_variants: !variants.is_empty(),
        variants,
        selected_count: cache.selection().len(),
        has_shortfall: !shortfall_message.is_empty(),
        shortfall_message,
        has_images: !images.is_empty(),
        images,
        flashes,
        csrf_token,
    })
}

/// handles the /variants POST
pub(crate) async fn generate_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GenerateForm>,
) -> Result<Redirect, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let mode: CampaignMode = form.mode.parse().map_err(|err: String| {
        warn!("{err}");
        CopyforgeError::BadRequest
    })?;
    session
        .insert(BRIEF_KEY, form.brief.clone())
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?;
    session
        .insert(MODE_KEY, mode)
        .await
        .map_err(|err| CopyforgeError::InternalServerError(err.to_string()))?;

    match generate_variants(&state.completion, &form.brief, mode, state.variant_limit).await {
        Ok(parsed) => {
            // a shortfall is shown next to the variant list for as long as they are cached
            let message = format!("Generated {} {} variants!", parsed.len(), mode);
            state.session.lock().await.set_variants(parsed);
            flash::push(&session, flash::SUCCESS, message).await?;
        }
        Err(err) => {
            warn!("Variant generation failed: {err}");
            flash::push_error(&session, &err).await?;
        }
    }
    Ok(Redirect::to("/"))
}

/// handles the /variants/{index}/toggle POST
pub(crate) async fn toggle_handler(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    let toggled = state.session.lock().await.toggle(index);
    match toggled {
        Ok(selected) => debug!("Variant {} selected: {selected}", index + 1),
        Err(err) => flash::push_error(&session, &err).await?,
    }
    Ok(Redirect::to("/"))
}

/// handles the /selection/reset POST
pub(crate) async fn reset_selection_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    state.session.lock().await.reset_selection();
    Ok(Redirect::to("/"))
}

/// handles the /images POST
pub(crate) async fn render_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    if let Err(err) = state.config.require_render_settings() {
        flash::push_error(&session, &err).await?;
        return Ok(Redirect::to("/"));
    }

    let planned = {
        let cache = state.session.lock().await;
        plan_batch(
            cache.variant_list(),
            &cache.selection().current(),
            &state.config,
        )
        .map(|plan| (plan, cache.epoch()))
    };
    let (plan, epoch) = match planned {
        Ok(planned) => planned,
        Err(err) => {
            flash::push(&session, flash::WARNING, err.to_string()).await?;
            return Ok(Redirect::to("/"));
        }
    };

    info!("Rendering {} selected variant(s)", plan.len());
    state.cancel.store(false, Ordering::Relaxed);
    let report = BatchDriver::new(&state.compositor)
        .with_cancellation(state.cancel.as_ref())
        .run(plan, |progress| {
            info!(
                "Generating images {:.0}% ({}/{}): {}",
                progress.fraction() * 100.0,
                progress.completed,
                progress.total,
                progress.label
            );
        })
        .await;

    for failure in &report.failures {
        flash::push(&session, flash::ERROR, failure.to_string()).await?;
    }
    let summary = report.summary();
    let class = if report.failures.is_empty() {
        flash::SUCCESS
    } else {
        flash::WARNING
    };

    let stored = state
        .session
        .lock()
        .await
        .set_images_for(epoch, report.images);
    if stored {
        flash::push(&session, class, summary).await?;
    } else {
        flash::push(
            &session,
            flash::WARNING,
            "The variants changed while rendering, so the rendered images were discarded.",
        )
        .await?;
    }
    Ok(Redirect::to("/"))
}

/// handles the /images/cancel POST
pub(crate) async fn cancel_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<Redirect, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    state.cancel.store(true, Ordering::Relaxed);
    flash::push(&session, flash::WARNING, "Cancelling the running batch.").await?;
    Ok(Redirect::to("/"))
}

/// handles the /images/{number} GET
pub(crate) async fn download_handler(
    State(state): State<AppState>,
    Path(number): Path<usize>,
) -> Result<Response, CopyforgeError> {
    let cache = state.session.lock().await;
    let image = number
        .checked_sub(1)
        .and_then(|position| cache.images()?.get(position))
        .ok_or_else(|| CopyforgeError::NotFound(format!("image {number}")))?;
    download_response(image, number)
}

/// handles the /session/clear POST
pub(crate) async fn clear_handler(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CsrfForm>,
) -> Result<impl IntoResponse, CopyforgeError> {
    validate_csrf(&session, &form.csrf_token).await?;
    state.session.lock().await.clear();
    flash::push(&session, flash::SUCCESS, "Session cleared.").await?;
    Ok(Redirect::to("/"))
}
