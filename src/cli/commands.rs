use anyhow::{Context, Result};
use arboard::Clipboard;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::{AnalysisClient, EffectivenessScore, SuggestionClient};
use crate::cli::{Commands, OutputFormatter, Spinner};
use crate::config::{DefaultConfig, Settings, ENDPOINT_ENV};
use crate::framework::{Framework, FrameworkDraft, FrameworkLibrary, PreviewSession};
use crate::server;

pub struct CommandHandler {
    settings: Settings,
    config_path: PathBuf,
    formatter: OutputFormatter,
}

impl CommandHandler {
    pub fn new(config_path: Option<PathBuf>, no_color: bool) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => Settings::default_config_path()?,
        };
        let settings = Settings::load_from(&config_path)?;
        let formatter = OutputFormatter::new(settings.output.use_colors && !no_color);

        Ok(Self {
            settings,
            config_path,
            formatter,
        })
    }

    pub async fn handle_command(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Highlight { file } => self.handle_highlight(&file),
            Commands::Preview {
                file,
                set,
                copy,
                analyze,
            } => self.handle_preview(&file, set, copy, analyze).await,
            Commands::Analyze {
                text,
                framework,
                set,
            } => self.handle_analyze(text, framework, set).await,
            Commands::Suggest {
                text,
                framework,
                accept,
            } => self.handle_suggest(text, framework, accept).await,
            Commands::List { files, search } => self.handle_list(&files, search.as_deref()),
            Commands::Serve { bind } => self.handle_serve(bind.as_deref()).await,
            Commands::Init => self.handle_init(),
            Commands::Config => self.handle_config(),
            Commands::Version => Ok(version_info()),
        }
    }

    fn handle_highlight(&self, file: &Path) -> Result<String> {
        let framework = Framework::load(file)?;
        let draft = FrameworkDraft::from(framework);
        Ok(draft.render_highlighted()?)
    }

    async fn handle_preview(
        &self,
        file: &Path,
        set: Vec<(String, String)>,
        copy: bool,
        analyze: bool,
    ) -> Result<String> {
        let session = preview_session(file, set)?;
        let preview = session.preview()?;
        let mut sections = vec![preview.clone()];

        if copy {
            match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(preview.clone())) {
                Ok(()) => sections.push(self.formatter.format_success("Prompt copied to clipboard")),
                Err(e) => {
                    warn!("Clipboard unavailable: {e}");
                    sections.push(
                        self.formatter
                            .format_warning(&format!("Could not copy to clipboard: {e}")),
                    );
                }
            }
        }

        if analyze {
            let score = self.analyze_text(&preview).await?;
            sections.push(self.formatter.format_score(&score));
        }

        Ok(sections.join("\n\n"))
    }

    async fn handle_analyze(
        &self,
        text: Option<String>,
        framework: Option<PathBuf>,
        set: Vec<(String, String)>,
    ) -> Result<String> {
        if framework.is_none() && !set.is_empty() {
            anyhow::bail!("--set applies to a framework preview; pass --framework");
        }

        let prompt_text = match (text, framework) {
            (Some(text), _) => text,
            (None, Some(file)) => preview_session(&file, set)?.preview()?,
            (None, None) => anyhow::bail!("Provide prompt text or --framework"),
        };

        let score = self.analyze_text(&prompt_text).await?;
        Ok(self.formatter.format_score(&score))
    }

    async fn analyze_text(&self, prompt_text: &str) -> Result<EffectivenessScore> {
        let client = AnalysisClient::from_settings(&self.settings)?;

        let spinner = Spinner::new("Analyzing prompt...");
        let result = client.analyze(prompt_text).await;
        spinner.stop();

        Ok(result?)
    }

    async fn handle_suggest(
        &self,
        text: Option<String>,
        framework: Option<PathBuf>,
        accept: bool,
    ) -> Result<String> {
        if accept && framework.is_none() {
            anyhow::bail!("--accept needs a framework to add variables to; pass --framework");
        }

        let framework = framework.map(Framework::load).transpose()?;
        let text = match (&text, &framework) {
            (Some(text), _) => text.clone(),
            (None, Some(framework)) => framework.text.clone(),
            (None, None) => anyhow::bail!("Provide text or --framework"),
        };

        let client = SuggestionClient::from_settings(&self.settings)?;
        let spinner = Spinner::new("Generating variable suggestions...");
        let result = client.suggest(&text).await;
        spinner.stop();
        let suggestions = result.context("Failed to generate variables")?;

        let Some(framework) = framework.filter(|_| accept) else {
            return Ok(self.formatter.format_suggestions(&suggestions));
        };

        let mut draft = FrameworkDraft::from(framework);
        draft.set_suggestions(suggestions);

        let mut notes = Vec::new();
        let mut index = 0;
        while index < draft.suggestions().len() {
            match draft.accept_suggestion(index) {
                Ok(name) => notes.push(
                    self.formatter
                        .format_success(&format!("Variable \"{name}\" added!")),
                ),
                Err(e) => {
                    debug!("Suggestion {index} kept pending: {e}");
                    notes.push(self.formatter.format_warning(&e.to_string()));
                    index += 1;
                }
            }
        }

        let framework = draft.finish()?;
        notes.push(String::new());
        notes.push(framework.to_toml_string()?);
        Ok(notes.join("\n").trim_end().to_string())
    }

    fn handle_list(&self, files: &[PathBuf], search: Option<&str>) -> Result<String> {
        let mut library = FrameworkLibrary::new();
        let mut warnings = Vec::new();

        for file in files {
            let framework = Framework::load(file)?;
            if let Err(e) = library.add(framework) {
                warnings.push(
                    self.formatter
                        .format_warning(&format!("Skipping {}: {e}", file.display())),
                );
            }
        }

        let matches = library.search(search.unwrap_or_default());
        info!("{} of {} frameworks match", matches.len(), library.len());

        warnings.push(self.formatter.format_frameworks(&matches));
        Ok(warnings.join("\n"))
    }

    async fn handle_serve(&self, bind: Option<&str>) -> Result<String> {
        eprintln!(
            "{}",
            self.formatter.format_info(&format!(
                "Proxy listening on {}",
                bind.unwrap_or(&self.settings.server.bind)
            ))
        );
        server::serve(&self.settings, bind).await?;
        Ok(String::new())
    }

    fn handle_init(&self) -> Result<String> {
        if self.config_path.exists() {
            return Ok(self.formatter.format_info(&format!(
                "Config already exists at {}",
                self.config_path.display()
            )));
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&self.config_path, DefaultConfig::config_file_contents()?)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(self.formatter.format_success(&format!(
            "Wrote default config to {}",
            self.config_path.display()
        )))
    }

    fn handle_config(&self) -> Result<String> {
        let endpoint_source = if std::env::var(ENDPOINT_ENV).is_ok() {
            format!(" (from {ENDPOINT_ENV})")
        } else {
            String::new()
        };
        let key_state = if self.settings.api_key().is_some() {
            "set"
        } else {
            "not set"
        };

        Ok(format!(
            "promptframe configuration:\n\
            - Config file: {}\n\
            - Endpoint: {}{endpoint_source}\n\
            - Endpoint timeout: {}ms\n\
            - Analysis: {} attempts, {}ms backoff, {}ms spacing, {} requests/day\n\
            - Suggestion: {} attempts, {}ms backoff\n\
            - Proxy bind: {}\n\
            - Upstream: {} (analysis: {}, suggestion: {})\n\
            - API key ({}): {key_state}\n\
            - Use colors: {}",
            self.config_path.display(),
            self.settings.endpoint.base_url,
            self.settings.endpoint.timeout_ms,
            self.settings.analysis.max_attempts,
            self.settings.analysis.base_delay_ms,
            self.settings.analysis.min_interval_ms,
            self.settings.analysis.daily_limit,
            self.settings.suggestion.max_attempts,
            self.settings.suggestion.base_delay_ms,
            self.settings.server.bind,
            self.settings.server.upstream_base_url,
            self.settings.server.analysis_model,
            self.settings.server.suggestion_model,
            self.settings.server.api_key_env,
            self.settings.output.use_colors,
        ))
    }

    pub fn format_error(&self, message: &str) -> String {
        self.formatter.format_error(message)
    }
}

pub fn version_info() -> String {
    format!(
        "promptframe {}\nRust version: {}\nPlatform: {}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("PROMPTFRAME_RUSTC_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

fn preview_session(file: &Path, set: Vec<(String, String)>) -> Result<PreviewSession> {
    let mut session = PreviewSession::new(Framework::load(file)?);
    for (name, value) in set {
        session.set_value(&name, value)?;
    }
    Ok(session)
}
