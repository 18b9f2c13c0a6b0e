//! Config handling

use std::fmt;
use std::str::FromStr;

use tracing::log::LevelFilter;

use crate::cli::ServiceOptions;
use crate::error::CopyforgeError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Binds a variant slot to a text layer of the remote template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerBinding {
    /// Variant slot name, eg `title`
    pub slot: String,
    /// Remote template layer id, eg `header`
    pub layer_id: String,
}

impl FromStr for LayerBinding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (slot, layer_id) = value
            .split_once('=')
            .ok_or_else(|| format!("expected slot=layerId, got {value:?}"))?;
        let (slot, layer_id) = (slot.trim(), layer_id.trim());
        if slot.is_empty() || layer_id.is_empty() {
            return Err(format!("empty slot or layer id in {value:?}"));
        }
        Ok(Self {
            slot: slot.to_ascii_lowercase(),
            layer_id: layer_id.to_string(),
        })
    }
}

impl fmt::Display for LayerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.slot, self.layer_id)
    }
}

/// API keys for the two remote services. Both are optional until used.
#[derive(Clone, Default)]
pub struct Credentials {
    /// Completion service key
    pub completion_key: Option<String>,
    /// Image compositor key
    pub compositor_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("completion_key", &self.completion_key.as_ref().map(|_| "<redacted>"))
            .field("compositor_key", &self.compositor_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Template settings that stay fixed for a run.
#[derive(Clone, Debug)]
pub struct CampaignConfig {
    /// Remote template identifier
    pub template_id: String,
    /// Slot to layer bindings, in configuration order
    pub bindings: Vec<LayerBinding>,
    /// Remote service credentials
    pub credentials: Credentials,
}

impl CampaignConfig {
    /// Builds the campaign config from the shared service options.
    pub fn from_options(options: &ServiceOptions) -> Self {
        Self {
            template_id: options.template_id.trim().to_string(),
            bindings: options.layers.clone(),
            credentials: Credentials {
                completion_key: non_empty(options.writer_api_key.as_ref()),
                compositor_key: non_empty(options.photoroom_api_key.as_ref()),
            },
        }
    }

    /// The layer id bound to `slot`, first binding wins.
    pub fn layer_for(&self, slot: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|binding| binding.slot == slot)
            .map(|binding| binding.layer_id.as_str())
    }

    /// Checks everything a render batch needs before any request is made.
    pub fn require_render_settings(&self) -> Result<&str, CopyforgeError> {
        let key = self.credentials.compositor_key.as_deref().ok_or_else(|| {
            CopyforgeError::Configuration("Please provide a PhotoRoom API key".to_string())
        })?;
        if self.template_id.is_empty() {
            return Err(CopyforgeError::Configuration(
                "Please provide a template ID".to_string(),
            ));
        }
        if self.bindings.is_empty() {
            return Err(CopyforgeError::Configuration(
                "Please provide at least one slot=layerId binding".to_string(),
            ));
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>, template: &str, bindings: &[&str]) -> CampaignConfig {
        CampaignConfig {
            template_id: template.to_string(),
            bindings: bindings.iter().map(|b| b.parse().unwrap()).collect(),
            credentials: Credentials {
                completion_key: None,
                compositor_key: key.map(str::to_string),
            },
        }
    }

    #[test]
    fn parses_layer_bindings() {
        let binding: LayerBinding = " Title = header ".parse().unwrap();
        assert_eq!(binding.slot, "title");
        assert_eq!(binding.layer_id, "header");
        assert_eq!(binding.to_string(), "title=header");
        assert!("title".parse::<LayerBinding>().is_err());
        assert!("=header".parse::<LayerBinding>().is_err());
    }

    #[test]
    fn first_binding_for_a_slot_wins() {
        let config = config(Some("k"), "tpl", &["title=one", "title=two", "cta=cta"]);
        assert_eq!(config.layer_for("title"), Some("one"));
        assert_eq!(config.layer_for("cta"), Some("cta"));
        assert_eq!(config.layer_for("header"), None);
    }

    #[test]
    fn render_settings_require_key_template_and_bindings() {
        assert!(matches!(
            config(None, "tpl", &["title=header"]).require_render_settings(),
            Err(CopyforgeError::Configuration(_))
        ));
        assert!(matches!(
            config(Some("k"), "", &["title=header"]).require_render_settings(),
            Err(CopyforgeError::Configuration(_))
        ));
        assert!(matches!(
            config(Some("k"), "tpl", &[]).require_render_settings(),
            Err(CopyforgeError::Configuration(_))
        ));
        assert_eq!(
            config(Some("k"), "tpl", &["title=header"])
                .require_render_settings()
                .unwrap(),
            "k"
        );
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let credentials = Credentials {
            completion_key: Some("secret-one".to_string()),
            compositor_key: None,
        };
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("secret-one"));
        assert!(rendered.contains("<redacted>"));
    }
}
