//! TOML parser with helpful error messages

use std::path::Path;

use anyhow::{Context, Result};

use super::schema::RedeployConfig;

/// Parse redeploy.toml with detailed error messages
pub fn parse_redeploy_toml(path: &Path) -> Result<RedeployConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_redeploy_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse redeploy.toml content from string
pub fn parse_redeploy_toml_str(content: &str) -> Result<RedeployConfig> {
    let config: RedeployConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    validate_config(&config)?;

    Ok(config)
}

pub fn to_toml(config: &RedeployConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config to TOML")
}

/// Enhance TOML parsing errors with the offending line
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    let Some(span) = error.span() else {
        return anyhow::anyhow!("TOML parsing error: {}", message);
    };

    let line_num = content[..span.start.min(content.len())].matches('\n').count() + 1;
    anyhow::anyhow!(
        "TOML parsing error at line {}:\n{}\n\nError: {}",
        line_num,
        get_line_context(content, line_num),
        message
    )
}

/// Show the line and its neighbours, marking the failing one
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    let mut context = String::new();
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        let current = i + 1;
        let marker = if current == line_num { ">" } else { " " };
        context.push_str(&format!("{} {:4} | {}\n", marker, current, line));
    }
    context
}

fn validate_config(config: &RedeployConfig) -> Result<()> {
    require_word("container.runtime", &config.container.runtime)?;
    require_word("container.container_name", &config.container.container_name)?;
    require_word("git.remote", &config.git.remote)?;
    require_word("git.branch", &config.git.branch)?;

    match config.container.compose.first() {
        Some(program) if !program.trim().is_empty() => {}
        _ => anyhow::bail!("container.compose must name a program"),
    }
    if config.git.branch.starts_with('-') || config.git.remote.starts_with('-') {
        anyhow::bail!("git.remote and git.branch must not start with '-'");
    }
    if let Some(script) = &config.pipeline.sync_script
        && script.as_os_str().is_empty()
    {
        anyhow::bail!("pipeline.sync_script must not be empty when set");
    }

    Ok(())
}

fn require_word(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    if value.contains(char::is_whitespace) {
        anyhow::bail!("{} must not contain whitespace: '{}'", field, value);
    }
    Ok(())
}
