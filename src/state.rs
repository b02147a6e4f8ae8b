//! Process-wide shared state and its builder.
//!
//! # Responsibilities
//! - Collect startup options (template, version, shared props, SSR, encoder)
//! - Load the root template and asset version once, failing fast on errors
//! - Freeze everything into an immutable `SharedState` behind an `Arc`
//!
//! # Design Decisions
//! - No mutation API exists after `build()`; requests only read shared state
//! - Shared props may hold producers; they are re-run on every request

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::config::InertiaConfig;
use crate::error::{BoxError, InertiaError};
use crate::props::{Prop, Props};
use crate::render::page::Page;
use crate::render::pipeline::Inertia;
use crate::render::ssr::SsrClient;
use crate::render::template::{
    HtmlTemplate, RootTemplate, TemplateData, TemplateFunc, TemplateFuncs, TemplateValue,
};

/// Encodes a page into the bytes sent to the client.
pub type JsonEncoder = Arc<dyn Fn(&Page) -> Result<Vec<u8>, BoxError> + Send + Sync>;

/// Immutable configuration shared by every request.
pub struct SharedState {
    pub(crate) template: Arc<dyn RootTemplate>,
    pub(crate) shared_props: Props,
    pub(crate) template_data: TemplateData,
    pub(crate) template_funcs: TemplateFuncs,
    pub(crate) container_id: String,
    pub(crate) version: String,
    pub(crate) ssr: Option<SsrClient>,
    pub(crate) encoder: JsonEncoder,
}

impl fmt::Debug for SharedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedState")
            .field("shared_props", &self.shared_props)
            .field("template_data", &self.template_data)
            .field("template_funcs", &self.template_funcs.keys().collect::<Vec<_>>())
            .field("container_id", &self.container_id)
            .field("version", &self.version)
            .field("ssr", &self.ssr)
            .finish_non_exhaustive()
    }
}

enum TemplateSource {
    Path(PathBuf),
    Inline(String),
    Custom(Arc<dyn RootTemplate>),
}

enum VersionSource {
    Literal(String),
    File(PathBuf),
}

/// Builder for [`Inertia`].
pub struct InertiaBuilder {
    template: TemplateSource,
    version: VersionSource,
    container_id: String,
    shared_props: Props,
    template_data: TemplateData,
    template_funcs: TemplateFuncs,
    ssr_url: Option<String>,
    ssr_timeout: Duration,
    ssr_client: Option<reqwest::Client>,
    encoder: JsonEncoder,
}

impl InertiaBuilder {
    /// Start a builder whose root template is read from `path`.
    pub fn new(root_template_path: impl Into<PathBuf>) -> Self {
        Self {
            template: TemplateSource::Path(root_template_path.into()),
            version: VersionSource::Literal(String::new()),
            container_id: "app".to_string(),
            shared_props: Props::new(),
            template_data: TemplateData::new(),
            template_funcs: TemplateFuncs::new(),
            ssr_url: None,
            ssr_timeout: Duration::from_secs(2),
            ssr_client: None,
            encoder: Arc::new(|page: &Page| serde_json::to_vec(page).map_err(BoxError::from)),
        }
    }

    /// Start a builder from validated configuration.
    pub fn from_config(config: &InertiaConfig) -> Self {
        let mut builder = Self::new(&config.root_template)
            .version(config.version.clone())
            .container_id(config.container_id.clone());

        if let Some(path) = &config.version_file {
            builder = builder.version_from_file(path);
        }
        if config.ssr.enabled {
            builder = builder.ssr(
                config.ssr.url.clone(),
                Duration::from_millis(config.ssr.timeout_ms),
            );
        }
        builder
    }

    /// Read the root template from a file.
    pub fn root_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = TemplateSource::Path(path.into());
        self
    }

    /// Use in-memory template source (e.g. from `include_str!`).
    pub fn root_template_source(mut self, source: impl Into<String>) -> Self {
        self.template = TemplateSource::Inline(source.into());
        self
    }

    /// Use a custom root template implementation.
    pub fn root_template(mut self, template: Arc<dyn RootTemplate>) -> Self {
        self.template = TemplateSource::Custom(template);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = VersionSource::Literal(version.into());
        self
    }

    /// Derive the asset version from the SHA-256 of a file (e.g. a build manifest).
    pub fn version_from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.version = VersionSource::File(path.into());
        self
    }

    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Enable pre-rendering through the service at `url`.
    pub fn ssr(mut self, url: impl Into<String>, timeout: Duration) -> Self {
        self.ssr_url = Some(url.into());
        self.ssr_timeout = timeout;
        self
    }

    /// Reuse an existing HTTP client for pre-render calls.
    pub fn ssr_client(mut self, client: reqwest::Client) -> Self {
        self.ssr_client = Some(client);
        self
    }

    /// Replace the page encoder.
    pub fn json_encoder<F>(mut self, encoder: F) -> Self
    where
        F: Fn(&Page) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Add a prop merged into every page.
    pub fn share_prop(mut self, name: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.shared_props.insert(name, prop);
        self
    }

    /// Add a value available to the root template on every render.
    pub fn share_template_data(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.template_data.insert(name.into(), value.into());
        self
    }

    /// Add a function callable from the root template.
    pub fn share_template_func<F>(mut self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        let func: TemplateFunc = Arc::new(func);
        self.template_funcs.insert(name.into(), func);
        self
    }

    /// Load the template and version, then freeze the state.
    pub fn build(self) -> Result<Inertia, InertiaError> {
        let template: Arc<dyn RootTemplate> = match self.template {
            TemplateSource::Path(path) => Arc::new(HtmlTemplate::from_file(path)?),
            TemplateSource::Inline(source) => Arc::new(HtmlTemplate::parse(&source)?),
            TemplateSource::Custom(template) => template,
        };

        let version = match self.version {
            VersionSource::Literal(version) => version,
            VersionSource::File(path) => file_version(path)?,
        };

        let ssr = self.ssr_url.map(|url| match self.ssr_client {
            Some(client) => SsrClient::with_client(&url, client, self.ssr_timeout),
            None => SsrClient::new(&url, self.ssr_timeout),
        });

        tracing::info!(
            version = %version,
            container_id = %self.container_id,
            shared_props = self.shared_props.len(),
            ssr = ssr.as_ref().map(SsrClient::endpoint).unwrap_or("disabled"),
            "Inertia initialized"
        );

        Ok(Inertia::from_state(SharedState {
            template,
            shared_props: self.shared_props,
            template_data: self.template_data,
            template_funcs: self.template_funcs,
            container_id: self.container_id,
            version,
            ssr,
            encoder: self.encoder,
        }))
    }
}

fn file_version(path: PathBuf) -> Result<String, InertiaError> {
    let bytes = std::fs::read(&path).map_err(|source| InertiaError::VersionFile { path, source })?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ROOT: &str = "<html><head>{{ .inertiaHead }}</head><body>{{ .inertia }}</body></html>";

    #[test]
    fn test_build_inline_template() {
        let inertia = InertiaBuilder::new("unused.html")
            .root_template_source(ROOT)
            .version("f8v01xv4h4")
            .share_prop("app", "demo")
            .build()
            .unwrap();

        assert_eq!(inertia.version(), "f8v01xv4h4");
        assert_eq!(inertia.container_id(), "app");
        assert!(inertia.shared_prop("app").is_some());
        assert!(inertia.shared_prop("missing").is_none());
    }

    #[test]
    fn test_missing_template_file_fails_fast() {
        let err = InertiaBuilder::new("/no/such/template.html")
            .build()
            .unwrap_err();
        assert!(matches!(err, InertiaError::Template(_)));
    }

    #[test]
    fn test_version_from_file_is_sha256() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest.write_all(b"abc").unwrap();

        let inertia = InertiaBuilder::new("unused.html")
            .root_template_source(ROOT)
            .version_from_file(manifest.path())
            .build()
            .unwrap();

        assert_eq!(
            inertia.version(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_missing_version_file() {
        let err = InertiaBuilder::new("unused.html")
            .root_template_source(ROOT)
            .version_from_file("/no/such/manifest.json")
            .build()
            .unwrap_err();
        assert!(matches!(err, InertiaError::VersionFile { .. }));
    }

    #[test]
    fn test_from_config() {
        let mut template = tempfile::NamedTempFile::new().unwrap();
        template.write_all(ROOT.as_bytes()).unwrap();

        let mut config = InertiaConfig::default();
        config.root_template = template.path().to_string_lossy().into_owned();
        config.version = "v1".into();
        config.container_id = "root".into();

        let inertia = InertiaBuilder::from_config(&config).build().unwrap();
        assert_eq!(inertia.version(), "v1");
        assert_eq!(inertia.container_id(), "root");
    }
}
