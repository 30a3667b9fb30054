/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! Tracing setup (§6 "Logging"): display to stdout/stderr and/or a
//! rolling file appender, composed as `tracing-subscriber` layers. The
//! session front-end emits `info!`/`debug!`/`warn!` around connect,
//! disconnect, and dispatch.

use std::path::PathBuf;

use thiserror::Error;
use tracing_core::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, Layer};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log file path {0:?} has no parent directory")]
    NoParentDir(PathBuf),

    #[error("log file path {0:?} has no file name")]
    NoFileName(PathBuf),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Where logs should go. `None` disables tracing setup entirely (the
/// default for library consumers that want to install their own
/// subscriber).
#[derive(Clone, Debug, Default)]
pub enum WriterConfig {
    #[default]
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level: tracing::Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        TracingConfig {
            writer_config: WriterConfig::Display(DisplayPreference::Stdout),
            level: tracing::Level::INFO,
        }
    }
}

impl TracingConfig {
    pub fn new_display(preferred: DisplayPreference) -> Self {
        TracingConfig {
            writer_config: WriterConfig::Display(preferred),
            level: tracing::Level::INFO,
        }
    }

    pub fn new_file_and_display(path_and_prefix: impl Into<String>, preferred: DisplayPreference) -> Self {
        TracingConfig {
            writer_config: WriterConfig::DisplayAndFile(preferred, path_and_prefix.into()),
            level: tracing::Level::INFO,
        }
    }

    fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_level(self.level)
    }
}

macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_thread_ids(true)
            .with_thread_names(false)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
    };
}

type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

fn try_rolling_file_appender(
    path_str: &str,
) -> Result<tracing_appender::rolling::RollingFileAppender, LoggingError> {
    let path = PathBuf::from(path_str);
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::NoFileName(path.clone()))?;
    Ok(tracing_appender::rolling::never(parent, file_name))
}

fn try_display_layer<S>(
    level_filter: LevelFilter,
    preferred: DisplayPreference,
) -> Box<DynLayer<S>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    match preferred {
        DisplayPreference::Stdout => Box::new(
            create_fmt!()
                .with_writer(std::io::stdout)
                .with_filter(level_filter),
        ),
        DisplayPreference::Stderr => Box::new(
            create_fmt!()
                .with_writer(std::io::stderr)
                .with_filter(level_filter),
        ),
    }
}

fn try_file_layer<S>(level_filter: LevelFilter, path_and_prefix: &str) -> Result<Box<DynLayer<S>>, LoggingError>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let appender = try_rolling_file_appender(path_and_prefix)?;
    Ok(Box::new(create_fmt!().with_writer(appender).with_filter(level_filter)))
}

/// Builds the subscriber layers for `config` without installing them.
/// Returns `Ok(None)` for [`WriterConfig::None`].
pub fn try_create_layers(
    config: &TracingConfig,
) -> Result<Option<Vec<Box<DynLayer<tracing_subscriber::Registry>>>>, LoggingError> {
    let level_filter = config.level_filter();

    let layers: Vec<Box<DynLayer<tracing_subscriber::Registry>>> = match &config.writer_config {
        WriterConfig::None => return Ok(None),
        WriterConfig::Display(preferred) => vec![try_display_layer(level_filter, *preferred)],
        WriterConfig::File(path) => vec![try_file_layer(level_filter, path)?],
        WriterConfig::DisplayAndFile(preferred, path) => {
            vec![try_display_layer(level_filter, *preferred), try_file_layer(level_filter, path)?]
        }
    };

    Ok(Some(layers))
}

/// Installs a global subscriber built from `config`. A no-op if `config`
/// chooses [`WriterConfig::None`].
pub fn init(config: TracingConfig) -> Result<(), LoggingError> {
    if let Some(layers) = try_create_layers(&config)? {
        tracing_subscriber::registry().with(layers).init();
    }
    Ok(())
}
